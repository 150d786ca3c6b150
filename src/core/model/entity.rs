// src/core/model/entity.rs
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::error::{UmlError, Result};
use super::{Relative, RelationshipType};

/// Member visibility as written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    #[default]
    Package,
}

impl Visibility {
    /// PlantUML member visibility marker
    pub fn symbol(&self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Protected => '#',
            Visibility::Private => '-',
            Visibility::Package => '~',
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::Package => "package",
        };
        f.write_str(text)
    }
}

/// What kind of type declaration an entity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
}

impl EntityKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Enum => "enum",
            EntityKind::Record => "record",
        }
    }
}

/// A method declared on an entity.
///
/// Identity and ordering only look at `(name, return_type)`, so two overloads
/// with the same return type are considered the same method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<String>,
    pub visibility: Visibility,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            visibility: Visibility::default(),
        }
    }

    pub fn with_parameter(mut self, param_type: impl Into<String>) -> Self {
        self.parameters.push(param_type.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn key(&self) -> (&str, &str) {
        (&self.name, &self.return_type)
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Method {}

impl PartialOrd for Method {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Method {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A field declared on an entity, identified by `(name, type_name)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility: Visibility::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn key(&self) -> (&str, &str) {
        (&self.name, &self.type_name)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Field {}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A declared type (class, interface, enum, record) with its members and
/// outgoing relationships
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    kind: EntityKind,
    methods: BTreeSet<Method>,
    fields: BTreeSet<Field>,
    relatives: Vec<Relative>,
}

impl Entity {
    /// Create an entity. The fully-qualified name must not be blank.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UmlError::invalid("entity", "entity name cannot be empty"));
        }

        Ok(Self {
            name,
            kind: EntityKind::default(),
            methods: BTreeSet::new(),
            fields: BTreeSet::new(),
            relatives: Vec::new(),
        })
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn methods(&self) -> &BTreeSet<Method> {
        &self.methods
    }

    pub fn fields(&self) -> &BTreeSet<Field> {
        &self.fields
    }

    pub fn relatives(&self) -> &[Relative] {
        &self.relatives
    }

    /// Relatives of one kind, in insertion order
    pub fn relatives_of(&self, kind: RelationshipType) -> impl Iterator<Item = &Relative> {
        self.relatives.iter().filter(move |r| r.kind() == kind)
    }

    /// Caller-callee relatives that originate in `method`, in insertion order
    pub fn calls_from<'a>(&'a self, method: &'a str) -> impl Iterator<Item = &'a Relative> + 'a {
        self.relatives
            .iter()
            .filter(move |r| r.caller_method() == Some(method))
    }

    /// Add a method. Returns `Ok(false)` when an equal method is already present.
    pub fn add_method(&mut self, method: Method) -> Result<bool> {
        if method.name.trim().is_empty() {
            return Err(UmlError::invalid("method", format!("method name cannot be empty on {}", self.name)));
        }

        let name = method.name.clone();
        let added = self.methods.insert(method);
        if added {
            debug!("Method added to {}: {}", self.name, name);
        } else {
            warn!("Duplicate method not added to {}: {}", self.name, name);
        }
        Ok(added)
    }

    /// Add a field. Returns `Ok(false)` when an equal field is already present.
    pub fn add_field(&mut self, field: Field) -> Result<bool> {
        if field.name.trim().is_empty() {
            return Err(UmlError::invalid("field", format!("field name cannot be empty on {}", self.name)));
        }

        let name = field.name.clone();
        let added = self.fields.insert(field);
        if added {
            debug!("Field added to {}: {}", self.name, name);
        } else {
            warn!("Duplicate field not added to {}: {}", self.name, name);
        }
        Ok(added)
    }

    pub fn add_relative(&mut self, relative: Relative) {
        debug!("Relative added to {}: {}", self.name, relative);
        self.relatives.push(relative);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} methods, {} fields, {} relatives)",
            self.kind.keyword(),
            self.name,
            self.methods.len(),
            self.fields.len(),
            self.relatives.len()
        )
    }
}
