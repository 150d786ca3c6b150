//! Language-specific parsers
//!
//! Each language gets its own module with a consistent interface for turning
//! source code into a `CompilationUnit`.

mod java;

pub use java::JavaParser;

use crate::error::Result;
use super::parser::CompilationUnit;

/// Trait that all language parsers must implement
pub trait LanguageParser: Send {
    /// Parse source code and extract its outline
    fn parse(&mut self, content: &str, file_path: &std::path::Path) -> Result<CompilationUnit>;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
