use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{UmlError, Result};

/// Namespaces that never take part in relationships
pub const DEFAULT_LIBRARY_PREFIXES: &[&str] = &["java.", "javax.", "org.springframework."];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Relationship analysis settings
    pub analysis: AnalysisConfig,

    /// Which diagrams to produce
    pub diagrams: DiagramConfig,

    /// External renderer settings
    pub rendering: RenderingConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Root directory of the Java sources
    pub input_dir: PathBuf,

    /// Where .puml files and images are written
    pub output_dir: PathBuf,

    /// Where the HTML index is written
    pub htmldoc_dir: PathBuf,

    /// Paths to ignore while walking the sources
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Package prefix that marks project types. Empty means everything qualifies.
    #[serde(default)]
    pub include_package: String,

    /// Namespace prefixes that are always treated as library code
    pub library_prefixes: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Class,
    Sequence,
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramType::Class => write!(f, "class"),
            DiagramType::Sequence => write!(f, "sequence"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// Diagram kinds to generate
    pub types: Vec<DiagramType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Whether to turn .puml files into images
    pub enabled: bool,

    /// PlantUML executable (e.g. "plantuml" or "java")
    pub command: String,

    /// Arguments placed before the format flag and source file (e.g. ["-jar", "plantuml.jar"])
    #[serde(default)]
    pub args: Vec<String>,

    /// Image format requested from the renderer
    pub format: ImageFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Dump entities and scenarios as model.json
    pub write_model_json: bool,

    /// Build an index.html over the rendered images
    pub html_index: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "Unnamed Project".to_string(),
                input_dir: PathBuf::from("./input"),
                output_dir: PathBuf::from("./output"),
                htmldoc_dir: PathBuf::from("htmldoc"),
                ignore_patterns: vec![
                    "target/".to_string(),
                    "build/".to_string(),
                    ".git/".to_string(),
                ],
            },
            analysis: AnalysisConfig {
                include_package: String::new(),
                library_prefixes: DEFAULT_LIBRARY_PREFIXES.iter().map(|p| p.to_string()).collect(),
                max_file_size: 1024 * 1024, // 1MB
            },
            diagrams: DiagramConfig {
                types: vec![DiagramType::Class, DiagramType::Sequence],
            },
            rendering: RenderingConfig {
                enabled: true,
                command: "plantuml".to_string(),
                args: Vec::new(),
                format: ImageFormat::Png,
            },
            output: OutputConfig {
                write_model_json: false,
                html_index: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| UmlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| UmlError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["umlgen.toml", "Umlgen.toml", ".umlgen.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Check values that serde alone cannot
    pub fn validate(&self) -> Result<()> {
        if self.diagrams.types.is_empty() {
            return Err(UmlError::Config("No diagram types specified".to_string()));
        }
        if self.project.input_dir.as_os_str().is_empty() {
            return Err(UmlError::Config("Input directory is not configured".to_string()));
        }
        if self.project.output_dir.as_os_str().is_empty() {
            return Err(UmlError::Config("Output directory is not configured".to_string()));
        }
        if self.rendering.enabled && self.rendering.command.trim().is_empty() {
            return Err(UmlError::Config("Rendering is enabled but no command is set".to_string()));
        }
        // include_package is free-form: an empty prefix selects every type
        Ok(())
    }

    pub fn wants(&self, diagram: DiagramType) -> bool {
        self.diagrams.types.contains(&diagram)
    }
}
