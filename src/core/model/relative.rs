// src/core/model/relative.rs
use std::fmt;
use serde::{Serialize, Deserialize};

/// Kinds of relationships drawn between entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Inheritance,
    Implementation,
    Association,
    CallerCallee,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RelationshipType::Inheritance => "INHERITANCE",
            RelationshipType::Implementation => "IMPLEMENTATION",
            RelationshipType::Association => "ASSOCIATION",
            RelationshipType::CallerCallee => "CALLER_CALLEE",
        };
        f.write_str(text)
    }
}

/// The relationship payload. Only call edges and field-access associations
/// carry member names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    Inheritance,
    Implementation,
    Association {
        /// Set when the association comes from a field access inside a method body
        #[serde(skip_serializing_if = "Option::is_none")]
        access: Option<FieldAccess>,
    },
    CallerCallee {
        caller_method: String,
        callee_method: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    pub accessing_method: String,
    pub field: String,
}

/// One directed relationship owned by a source entity. The target is a
/// fully-qualified name, resolved against the graph when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relative {
    target: String,
    #[serde(flatten)]
    relation: Relation,
}

impl Relative {
    pub fn new(target: impl Into<String>, relation: Relation) -> Self {
        Self { target: target.into(), relation }
    }

    pub fn inheritance(target: impl Into<String>) -> Self {
        Self::new(target, Relation::Inheritance)
    }

    pub fn implementation(target: impl Into<String>) -> Self {
        Self::new(target, Relation::Implementation)
    }

    pub fn association(target: impl Into<String>) -> Self {
        Self::new(target, Relation::Association { access: None })
    }

    pub fn field_access(
        target: impl Into<String>,
        accessing_method: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::new(
            target,
            Relation::Association {
                access: Some(FieldAccess {
                    accessing_method: accessing_method.into(),
                    field: field.into(),
                }),
            },
        )
    }

    pub fn caller_callee(
        target: impl Into<String>,
        caller_method: impl Into<String>,
        callee_method: impl Into<String>,
    ) -> Self {
        Self::new(
            target,
            Relation::CallerCallee {
                caller_method: caller_method.into(),
                callee_method: callee_method.into(),
            },
        )
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> RelationshipType {
        match self.relation {
            Relation::Inheritance => RelationshipType::Inheritance,
            Relation::Implementation => RelationshipType::Implementation,
            Relation::Association { .. } => RelationshipType::Association,
            Relation::CallerCallee { .. } => RelationshipType::CallerCallee,
        }
    }

    pub fn caller_method(&self) -> Option<&str> {
        match &self.relation {
            Relation::CallerCallee { caller_method, .. } => Some(caller_method),
            _ => None,
        }
    }

    pub fn callee_method(&self) -> Option<&str> {
        match &self.relation {
            Relation::CallerCallee { callee_method, .. } => Some(callee_method),
            _ => None,
        }
    }
}

impl fmt::Display for Relative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Relation::CallerCallee { caller_method, callee_method } => {
                write!(f, "{} -> {}::{} (from {})", self.kind(), self.target, callee_method, caller_method)
            }
            Relation::Association { access: Some(access) } => {
                write!(f, "{} -> {}.{} (from {})", self.kind(), self.target, access.field, access.accessing_method)
            }
            _ => write!(f, "{} -> {}", self.kind(), self.target),
        }
    }
}
