use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Digest};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{UmlError, Result};
use super::languages::{LanguageParser, JavaParser};
use super::model::{EntityKind, Visibility};

/// Represents a parsed source file with its syntactic outline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    /// File path as found while walking the input directory
    pub path: PathBuf,

    /// Programming language detected
    pub language: String,

    /// Content hash for change detection
    pub content_hash: String,

    pub compilation_unit: CompilationUnit,
}

/// Everything the resolver needs from one source file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,

    /// The first top-level type; later ones are ignored
    pub primary_type: Option<TypeSyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Dotted path without the trailing `.*`
    pub path: String,
    pub wildcard: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSyntax {
    pub name: String,
    pub kind: EntityKind,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub fields: Vec<FieldSyntax>,
    pub methods: Vec<MethodSyntax>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSyntax {
    pub name: String,
    pub type_text: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSyntax {
    pub name: String,
    pub type_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodSyntax {
    pub name: String,
    pub return_type: String,
    pub visibility: Visibility,
    pub parameters: Vec<VariableSyntax>,

    /// Local variables with a known declared type, in source order
    pub locals: Vec<VariableSyntax>,
    pub calls: Vec<CallSyntax>,
    pub field_accesses: Vec<FieldAccessSyntax>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSyntax {
    pub receiver: Option<ExprSyntax>,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAccessSyntax {
    pub object: ExprSyntax,
    pub field: String,
}

/// The shape of a receiver or field-access object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprSyntax {
    This,
    Super,
    Name(String),
    FieldAccess { object: Box<ExprSyntax>, field: String },
    Call { receiver: Option<Box<ExprSyntax>>, method: String },
    /// An expression whose static type is written in the source: `new T()`, `(T) x`, literals
    Typed(String),
    Other(String),
}

impl ExprSyntax {
    /// `a.b.c` for plain name chains, which may also be a qualified type name
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            ExprSyntax::Name(name) => Some(name.clone()),
            ExprSyntax::FieldAccess { object, field } => {
                object.dotted_name().map(|prefix| format!("{}.{}", prefix, field))
            }
            _ => None,
        }
    }
}

/// Source parser that delegates to language-specific parsers
pub struct CodeParser {
    max_file_size: usize,
    ignore_patterns: Vec<String>,
    language_parsers: Vec<Box<dyn LanguageParser>>,
}

impl CodeParser {
    pub fn new(config: &AnalysisConfig, ignore_patterns: &[String]) -> Result<Self> {
        let java_parser = JavaParser::new()?;

        Ok(Self {
            max_file_size: config.max_file_size,
            ignore_patterns: ignore_patterns.to_vec(),
            language_parsers: vec![Box::new(java_parser)],
        })
    }

    /// Parse all supported files under `dir`, sorted by path. Files that fail
    /// to parse are logged and skipped.
    pub async fn parse_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<Vec<ParsedFile>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(UmlError::FileSystem(format!(
                "Source directory does not exist: {}",
                dir.display()
            )));
        }

        let mut overrides = OverrideBuilder::new(dir);
        for pattern in &self.ignore_patterns {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| UmlError::Config(format!("Invalid ignore pattern '{}': {}", pattern, e)))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| UmlError::Config(e.to_string()))?;

        // Use ignore crate to respect .gitignore and custom patterns
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .build();

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| UmlError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if path.is_file() && self.should_parse_file(path) {
                candidates.push(path.to_path_buf());
            }
        }
        candidates.sort();

        let mut parsed_files = Vec::with_capacity(candidates.len());
        for path in candidates {
            match self.parse_file(&path).await {
                Ok(parsed) => parsed_files.push(parsed),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        info!("Parsed {} source files in {}", parsed_files.len(), dir.display());
        Ok(parsed_files)
    }

    /// Parse a single source file
    pub async fn parse_file<P: AsRef<Path>>(&mut self, file_path: P) -> Result<ParsedFile> {
        let path = file_path.as_ref();

        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() as usize > self.max_file_size {
            return Err(UmlError::Parser(
                format!("File {} exceeds maximum size limit", path.display())
            ));
        }

        let source_content = tokio::fs::read_to_string(path).await?;
        let parser = self.parser_for(path)?;
        let language = parser.language_name().to_string();
        let compilation_unit = parser.parse(&source_content, path)?;
        debug!(
            "Parsed {} ({})",
            path.display(),
            compilation_unit.primary_type.as_ref().map_or("no type", |t| t.name.as_str())
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            language,
            content_hash: content_hash(source_content.as_bytes()),
            compilation_unit,
        })
    }

    fn should_parse_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                self.language_parsers.iter().any(|p| p.file_extensions().contains(&ext))
            })
    }

    fn parser_for(&mut self, path: &Path) -> Result<&mut Box<dyn LanguageParser>> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        self.language_parsers
            .iter_mut()
            .find(|p| p.file_extensions().contains(&extension))
            .ok_or_else(|| UmlError::Parser(
                format!("Could not detect language for file: {}", path.display())
            ))
    }
}

/// SHA256 of some content, hex encoded
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
