use thiserror::Error;

/// Main error type for umlgen operations
#[derive(Error, Debug)]
pub enum UmlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Invalid {kind}: {reason}")]
    InvalidElement { kind: &'static str, reason: String },

    #[error("No declarations were supplied for analysis")]
    EmptyInput,

    #[error("Diagram rendering failed for {source_file}: {reason}")]
    Render { source_file: String, reason: String },
}

impl UmlError {
    pub fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidElement { kind, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, UmlError>;
