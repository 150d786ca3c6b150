// src/core/diagram/renderer.rs
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{ImageFormat, RenderingConfig};
use crate::error::{UmlError, Result};

/// Turns a diagram description file into one or more images
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render `source` and return the images that were produced. Producing
    /// no image is an error.
    async fn render(&self, source: &Path) -> Result<Vec<PathBuf>>;

    fn renderer_name(&self) -> &str;
}

/// Runs an external PlantUML executable
pub struct PlantUmlRenderer {
    command: String,
    args: Vec<String>,
    format: ImageFormat,
}

impl PlantUmlRenderer {
    pub fn new(config: &RenderingConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            format: config.format,
        }
    }

    fn expected_image(&self, source: &Path) -> PathBuf {
        source.with_extension(self.format.extension())
    }
}

#[async_trait]
impl DiagramRenderer for PlantUmlRenderer {
    async fn render(&self, source: &Path) -> Result<Vec<PathBuf>> {
        let render_error = |reason: String| UmlError::Render {
            source_file: source.display().to_string(),
            reason,
        };

        if !source.is_file() {
            return Err(render_error("diagram source not found".to_string()));
        }

        debug!("Running {} {:?} on {}", self.command, self.args, source.display());
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(format!("-t{}", self.format.extension()))
            .arg(source)
            .output()
            .await
            .map_err(|e| render_error(format!("failed to start '{}': {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_error(format!("{} exited with {}: {}", self.command, output.status, stderr.trim())));
        }

        let image = self.expected_image(source);
        if !image.is_file() {
            return Err(render_error("no images were generated".to_string()));
        }

        info!("Generated diagram image: {}", image.display());
        Ok(vec![image])
    }

    fn renderer_name(&self) -> &str {
        "plantuml"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn renderer(command: &str, args: &[&str]) -> PlantUmlRenderer {
        PlantUmlRenderer::new(&RenderingConfig {
            enabled: true,
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            format: ImageFormat::Png,
        })
    }

    fn write_source(dir: &Path) -> PathBuf {
        let source = dir.join("classDiagram.puml");
        std::fs::write(&source, "@startuml\nclass A\n@enduml\n").unwrap();
        source
    }

    #[tokio::test]
    async fn test_reports_produced_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());
        // $0 is the format flag, $1 the source file
        let fake = renderer("sh", &["-c", "touch \"${1%.puml}.png\""]);

        let images = fake.render(&source).await.unwrap();
        assert_eq!(images, vec![dir.path().join("classDiagram.png")]);
    }

    #[tokio::test]
    async fn test_zero_images_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());

        let result = renderer("true", &[]).render(&source).await;
        assert!(matches!(result, Err(UmlError::Render { .. })));
    }

    #[tokio::test]
    async fn test_failing_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path());

        let result = renderer("false", &[]).render(&source).await;
        assert!(matches!(result, Err(UmlError::Render { .. })));
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let result = renderer("true", &[]).render(Path::new("/no/such/file.puml")).await;
        assert!(result.is_err());
    }
}
