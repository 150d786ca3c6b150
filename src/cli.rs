use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;
use tracing::info;

use crate::config::{Config, DiagramType};
use crate::core::Engine;

#[derive(Parser)]
#[command(name = "umlgen")]
#[command(about = "Class and sequence diagrams straight from Java sources")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default umlgen.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Generate PlantUML diagrams (and images) for a source tree
    Generate {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory for diagrams
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Package prefix that marks project types
        #[arg(short, long)]
        include_package: Option<String>,

        /// Diagram types to generate
        #[arg(short, long, value_enum, value_delimiter = ',')]
        types: Vec<DiagramType>,

        /// Only write .puml files
        #[arg(long)]
        no_render: bool,
    },

    /// Print relationship statistics, entry points and scenarios
    Analyze {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Package prefix that marks project types
        #[arg(short, long)]
        include_package: Option<String>,
    },
}

impl Cli {
    /// Fold command-line flags into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        match &self.command {
            Commands::Generate { include_package, types, no_render, .. } => {
                if let Some(prefix) = include_package {
                    config.analysis.include_package = prefix.clone();
                }
                if !types.is_empty() {
                    config.diagrams.types = types.clone();
                }
                if *no_render {
                    config.rendering.enabled = false;
                }
            }
            Commands::Analyze { include_package, .. } => {
                if let Some(prefix) = include_package {
                    config.analysis.include_package = prefix.clone();
                }
            }
            Commands::Init { .. } => {}
        }
    }

    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => {
                engine.init(path, force).await
            }
            Commands::Generate { source, output, .. } => {
                let report = engine.generate(source, output).await?;
                info!("Manifest written to {}", report.manifest.display());
                if let Some(index) = report.html_index {
                    info!("Browse the diagrams at {}", index.display());
                }
                Ok(())
            }
            Commands::Analyze { source, .. } => {
                engine.summarize(source).await
            }
        }
    }
}
