// src/core/declaration.rs
//! Resolved declarations: the hand-off between symbol resolution and
//! relationship extraction. Every type reference has already been resolved to
//! a fully-qualified name, or carries the reason it could not be.

use thiserror::Error;

use super::model::{EntityKind, Visibility};

/// Why one expression or type reference could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("'{0}' is not a reference type")]
    NotReferenceType(String),

    #[error("member '{member}' of external type {owner} cannot be resolved")]
    ExternalMember { owner: String, member: String },

    #[error("unsupported expression '{0}'")]
    UnsupportedExpression(String),
}

impl ResolutionError {
    /// Failures that are expected for ordinary code and not worth a warning
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            ResolutionError::NotReferenceType(_) | ResolutionError::ExternalMember { .. }
        )
    }
}

pub type Resolution = std::result::Result<String, ResolutionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupertypeKind {
    Extends,
    Implements,
}

#[derive(Debug, Clone)]
pub struct SupertypeRef {
    /// The name as written in the source
    pub written: String,
    pub kind: SupertypeKind,
    pub resolved: Resolution,
}

/// A method call found in a method body
#[derive(Debug, Clone)]
pub struct CallExpression {
    pub method: String,
    /// `None` when the call has no explicit receiver (`foo()`)
    pub receiver: Option<Resolution>,
}

/// A `receiver.field` expression found in a method body
#[derive(Debug, Clone)]
pub struct FieldAccessExpression {
    pub field: String,
    pub owner: Resolution,
}

#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub name: String,
    pub return_type: String,
    pub visibility: Visibility,
    pub parameter_types: Vec<String>,
    pub calls: Vec<CallExpression>,
    pub field_accesses: Vec<FieldAccessExpression>,
}

#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub name: String,
    /// The type as written in the source, used for display
    pub type_name: String,
    pub visibility: Visibility,
    pub resolved_type: Resolution,
}

/// One analyzed type declaration, at most one per source file
#[derive(Debug, Clone)]
pub struct ResolvedDeclaration {
    pub name: String,
    pub kind: EntityKind,
    pub supertypes: Vec<SupertypeRef>,
    pub methods: Vec<MethodDeclaration>,
    pub fields: Vec<FieldDeclaration>,
}

impl ResolvedDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Class,
            supertypes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }
}
