// src/core/engine.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn, debug, error};

use crate::config::{Config, DiagramType};
use super::{
    CodeParser, Resolver, RelationshipClassifier, RelationshipExtractor, EntityGraph, GraphStats,
    EntryPointDetector, ScenarioBuilder, ClassDiagramEmitter, SequenceDiagramEmitter,
    DiagramRenderer, PlantUmlRenderer, HtmlIndexGenerator, Entity, Scenario, content_hash,
};

const CLASS_DIAGRAM_FILE: &str = "classDiagram.puml";
const MANIFEST_FILE: &str = "manifest.json";
const MODEL_FILE: &str = "model.json";

/// Everything learned from one pass over the sources
#[derive(Debug)]
pub struct AnalysisResult {
    pub graph: EntityGraph,
    pub scenarios: Vec<Scenario>,
    pub stats: GraphStats,
}

/// What a `generate` run wrote
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub diagrams: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
    pub failed_renders: usize,
    pub manifest: PathBuf,
    pub html_index: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Manifest {
    project: String,
    generated_at: DateTime<Utc>,
    files: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    path: String,
    kind: &'static str,
    sha256: String,
}

#[derive(Serialize)]
struct ModelDump<'a> {
    entities: &'a [Entity],
    scenarios: &'a [Scenario],
}

/// Main orchestration engine for umlgen
pub struct Engine {
    config: Config,
    parser: CodeParser,
    resolver: Resolver,
    extractor: RelationshipExtractor,
    entry_point_detector: EntryPointDetector,
    scenario_builder: ScenarioBuilder,
    class_emitter: ClassDiagramEmitter,
    sequence_emitter: SequenceDiagramEmitter,
    renderer: Option<Box<dyn DiagramRenderer>>,
    html_generator: HtmlIndexGenerator,
    file_name_pattern: Regex,
}

impl Engine {
    /// Create a new engine from an already validated configuration
    pub async fn new(config: Config) -> Result<Self> {
        debug!("Loaded configuration: {:?}", config);

        let parser = CodeParser::new(&config.analysis, &config.project.ignore_patterns)?;
        let classifier = RelationshipClassifier::from_config(&config.analysis);
        let class_emitter = match classifier.include_prefix() {
            Some(prefix) => {
                info!("Restricting diagrams to package {}", prefix);
                ClassDiagramEmitter::new().with_package_filter(prefix)
            }
            None => ClassDiagramEmitter::new(),
        };
        let extractor = RelationshipExtractor::new(classifier);
        let html_generator = HtmlIndexGenerator::new()?;
        let file_name_pattern = Regex::new(r"[^A-Za-z0-9_.\-]")?;

        let renderer: Option<Box<dyn DiagramRenderer>> = if config.rendering.enabled {
            let renderer = PlantUmlRenderer::new(&config.rendering);
            info!("✅ Rendering enabled: {} ({})", renderer.renderer_name(), config.rendering.command);
            Some(Box::new(renderer))
        } else {
            debug!("Rendering disabled");
            None
        };

        Ok(Self {
            config,
            parser,
            resolver: Resolver::new(),
            extractor,
            entry_point_detector: EntryPointDetector::new(),
            scenario_builder: ScenarioBuilder::new(),
            class_emitter,
            sequence_emitter: SequenceDiagramEmitter::new(),
            renderer,
            html_generator,
            file_name_pattern,
        })
    }

    /// Parse, resolve and extract the sources, then build scenarios
    pub async fn analyze(&mut self, source: Option<PathBuf>) -> Result<AnalysisResult> {
        let source_dir = source.unwrap_or_else(|| self.config.project.input_dir.clone());
        info!("🔍 Analyzing Java sources in {}", source_dir.display());

        let files = self.parser.parse_directory(&source_dir).await?;
        let declarations = self.resolver.resolve(&files);
        let entities = self.extractor
            .extract_entities(&declarations)
            .with_context(|| format!("No analyzable declarations in {}", source_dir.display()))?;

        let graph = EntityGraph::from_entities(entities);
        if graph.is_empty() {
            warn!("⚠️ No entities matched the include package, diagrams will be empty");
        }
        let scenarios = if self.config.wants(DiagramType::Sequence) {
            self.scenario_builder.build_scenarios(&graph)
        } else {
            Vec::new()
        };
        let stats = graph.get_statistics();

        info!("📊 Analysis complete:");
        info!("  - {} entities, {} methods, {} fields", stats.entities, stats.methods, stats.fields);
        info!("  - {} relationships ({} dangling)", stats.total_relationships(), stats.dangling_targets);
        info!("  - {} scenarios", scenarios.len());

        Ok(AnalysisResult { graph, scenarios, stats })
    }

    /// Full run: analyze, write diagrams, render them and write the manifest
    pub async fn generate(&mut self, source: Option<PathBuf>, output: Option<PathBuf>) -> Result<GenerationReport> {
        let output_dir = output.unwrap_or_else(|| self.config.project.output_dir.clone());
        let analysis = self.analyze(source).await?;

        tokio::fs::create_dir_all(&output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
        info!("📝 Writing diagrams to {}", output_dir.display());

        let mut report = GenerationReport::default();
        let mut class_diagram = None;

        if self.config.wants(DiagramType::Class) {
            let path = output_dir.join(CLASS_DIAGRAM_FILE);
            write_file(&path, &self.class_emitter.render(&analysis.graph)).await?;
            class_diagram = Some(path.clone());
            report.diagrams.push(path);
        }

        let mut sequence_diagrams = Vec::new();
        let mut used_names = HashSet::new();
        for scenario in &analysis.scenarios {
            let path = output_dir.join(self.sequence_file_name(scenario, &mut used_names));
            write_file(&path, &self.sequence_emitter.render(scenario)).await?;
            sequence_diagrams.push(path.clone());
            report.diagrams.push(path);
        }
        info!("Wrote {} diagram files", report.diagrams.len());

        if let Some(renderer) = &self.renderer {
            info!("🎨 Rendering diagrams with {}", renderer.renderer_name());
            if let Some(path) = &class_diagram {
                let images = renderer
                    .render(path)
                    .await
                    .context("Class diagram rendering failed")?;
                report.images.extend(images);
            }

            for path in &sequence_diagrams {
                match renderer.render(path).await {
                    Ok(images) => report.images.extend(images),
                    Err(e) => {
                        warn!("⚠️ {}", e);
                        report.failed_renders += 1;
                    }
                }
            }
        }

        report.manifest = self.write_manifest(&output_dir, &report).await?;

        if self.config.output.write_model_json {
            let dump = ModelDump {
                entities: analysis.graph.entities(),
                scenarios: &analysis.scenarios,
            };
            let path = output_dir.join(MODEL_FILE);
            write_file(&path, &serde_json::to_string_pretty(&dump)?).await?;
            debug!("Wrote model to {}", path.display());
        }

        if self.config.output.html_index && !report.images.is_empty() {
            let html_dir = self.html_dir(&output_dir);
            match self.html_generator.generate(&self.config.project.name, &output_dir, &html_dir) {
                Ok(index) => report.html_index = Some(index),
                Err(e) => error!("❌ Failed to build the HTML index: {}", e),
            }
        }

        if report.failed_renders > 0 {
            warn!("{} sequence diagrams could not be rendered", report.failed_renders);
        }
        info!("🎉 Generation complete: {} diagrams, {} images", report.diagrams.len(), report.images.len());
        Ok(report)
    }

    /// Log what `generate` would draw, without writing anything
    pub async fn summarize(&mut self, source: Option<PathBuf>) -> Result<()> {
        let analysis = self.analyze(source).await?;

        for (kind, count) in &analysis.stats.relationships {
            info!("  {}: {}", kind, count);
        }

        let entry_points = self.entry_point_detector.detect_entry_points(&analysis.graph);
        info!("🚪 {} entry points:", entry_points.len());
        for entity in entry_points {
            info!("  - {}", entity.name());
        }

        for scenario in &analysis.scenarios {
            if scenario.is_empty() {
                info!("  {} (no outgoing calls)", scenario.title());
            } else {
                info!("  {} ({} interactions)", scenario.title(), scenario.interactions().len());
            }
        }
        Ok(())
    }

    /// Write a default configuration file
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        info!("Initializing umlgen in: {}", target_dir.display());

        let config_path = target_dir.join("umlgen.toml");
        if config_path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", config_path.display());
        }

        tokio::fs::create_dir_all(&target_dir).await?;
        let mut config = Config::default();
        if let Some(name) = target_dir.file_name() {
            config.project.name = name.to_string_lossy().to_string();
        }
        config.save(&config_path)?;

        info!("✅ Wrote {}", config_path.display());
        Ok(())
    }

    /// `<Entry>_<method>.puml` with anything unsafe replaced; clashes get a numeric suffix
    fn sequence_file_name(&self, scenario: &Scenario, used: &mut HashSet<String>) -> String {
        let raw = format!("{}_{}", scenario.entry_entity(), scenario.entry_method());
        let base = self.file_name_pattern.replace_all(&raw, "_").to_string();

        let mut candidate = base.clone();
        let mut suffix = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        format!("{}.puml", candidate)
    }

    fn html_dir(&self, output_dir: &Path) -> PathBuf {
        let configured = &self.config.project.htmldoc_dir;
        if configured.is_absolute() {
            configured.clone()
        } else {
            output_dir.join(configured)
        }
    }

    async fn write_manifest(&self, output_dir: &Path, report: &GenerationReport) -> Result<PathBuf> {
        let mut files = Vec::with_capacity(report.diagrams.len() + report.images.len());
        let tagged = report
            .diagrams
            .iter()
            .map(|p| (p, "diagram"))
            .chain(report.images.iter().map(|p| (p, "image")));

        for (path, kind) in tagged {
            let bytes = tokio::fs::read(path).await?;
            let relative = path.strip_prefix(output_dir).unwrap_or(path);
            files.push(ManifestEntry {
                path: relative.display().to_string(),
                kind,
                sha256: content_hash(&bytes),
            });
        }

        let manifest = Manifest {
            project: self.config.project.name.clone(),
            generated_at: Utc::now(),
            files,
        };
        let path = output_dir.join(MANIFEST_FILE);
        write_file(&path, &serde_json::to_string_pretty(&manifest)?).await?;
        Ok(path)
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    fn write_sources(dir: &assert_fs::TempDir) {
        dir.child("src/com/app/A.java")
            .write_str(
                "package com.app;\n\
                 public class A {\n\
                   private B b;\n\
                   public void run() { b.step(); }\n\
                 }\n",
            )
            .unwrap();
        dir.child("src/com/app/B.java")
            .write_str(
                "package com.app;\n\
                 public class B {\n\
                   private C c = new C();\n\
                   public void step() { c.finish(); System.out.println(\"done\"); }\n\
                 }\n",
            )
            .unwrap();
        dir.child("src/com/app/C.java")
            .write_str("package com.app;\npublic class C { public void finish() {} }\n")
            .unwrap();
        dir.child("src/org/lib/Helper.java")
            .write_str("package org.lib;\npublic class Helper { public void help() {} }\n")
            .unwrap();
    }

    fn config(types: Vec<DiagramType>) -> Config {
        let mut config = Config::default();
        config.analysis.include_package = "com.app".to_string();
        config.diagrams.types = types;
        config.rendering.enabled = false;
        config.output.write_model_json = true;
        config
    }

    #[tokio::test]
    async fn test_generate_writes_diagrams_and_manifest() {
        let dir = assert_fs::TempDir::new().unwrap();
        write_sources(&dir);
        let output = dir.child("out");

        let mut engine = Engine::new(config(vec![DiagramType::Class, DiagramType::Sequence])).await.unwrap();
        let report = engine
            .generate(Some(dir.path().join("src")), Some(output.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(report.diagrams.len(), 2);
        assert!(report.images.is_empty());
        assert!(report.html_index.is_none());

        output.child("classDiagram.puml").assert(predicate::str::contains("com.app.A --> com.app.B : caller-callee"));
        output.child("classDiagram.puml").assert(predicate::str::contains("com.app.A -- com.app.B : association"));
        output.child("classDiagram.puml").assert(predicate::str::contains("org.lib.Helper").not());
        output.child("com.app.A_run.puml").assert(
            "@startuml\n\
             title Sequence Diagram for com.app.A::run\n\
             \"com.app.A\" -> \"com.app.B\" : run calls step\n\
             \"com.app.B\" -> \"com.app.C\" : step calls finish\n\
             @enduml\n",
        );
        output.child("manifest.json").assert(predicate::str::contains("\"sha256\""));
        output.child("manifest.json").assert(predicate::str::contains("com.app.A_run.puml"));
        output.child("model.json").assert(predicate::str::contains("\"com.app.C\""));
    }

    #[tokio::test]
    async fn test_class_only_run_skips_scenarios() {
        let dir = assert_fs::TempDir::new().unwrap();
        write_sources(&dir);
        let output = dir.child("out");

        let mut engine = Engine::new(config(vec![DiagramType::Class])).await.unwrap();
        let report = engine
            .generate(Some(dir.path().join("src")), Some(output.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(report.diagrams, vec![output.path().join("classDiagram.puml")]);
        output.child("com.app.A_run.puml").assert(predicate::path::missing());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rendered_images_feed_the_html_index() {
        let dir = assert_fs::TempDir::new().unwrap();
        write_sources(&dir);
        let output = dir.child("out");

        let mut config = config(vec![DiagramType::Class, DiagramType::Sequence]);
        config.rendering.enabled = true;
        config.rendering.command = "sh".to_string();
        config.rendering.args = vec!["-c".to_string(), "touch \"${1%.puml}.png\"".to_string()];

        let mut engine = Engine::new(config).await.unwrap();
        let report = engine
            .generate(Some(dir.path().join("src")), Some(output.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(report.images.len(), 2);
        assert_eq!(report.failed_renders, 0);
        assert_eq!(report.html_index, Some(output.path().join("htmldoc").join("index.html")));
        output.child("htmldoc/images/com.app.A_run.png").assert(predicate::path::exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_class_render_failure_fails_the_run() {
        let dir = assert_fs::TempDir::new().unwrap();
        write_sources(&dir);

        let mut config = config(vec![DiagramType::Class]);
        config.rendering.enabled = true;
        config.rendering.command = "false".to_string();

        let mut engine = Engine::new(config).await.unwrap();
        let result = engine
            .generate(Some(dir.path().join("src")), Some(dir.path().join("out")))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_source_tree_is_an_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("src/README.md").write_str("nothing here").unwrap();

        let mut engine = Engine::new(config(vec![DiagramType::Class])).await.unwrap();
        assert!(engine.analyze(Some(dir.path().join("src"))).await.is_err());
    }

    #[tokio::test]
    async fn test_sequence_file_names_are_sanitized_and_unique() {
        let engine = Engine::new(config(vec![DiagramType::Sequence])).await.unwrap();
        let mut used = HashSet::new();
        let scenario = Scenario::new("com.app.Outer$Inner", "run");

        assert_eq!(engine.sequence_file_name(&scenario, &mut used), "com.app.Outer_Inner_run.puml");
        assert_eq!(engine.sequence_file_name(&scenario, &mut used), "com.app.Outer_Inner_run_2.puml");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = assert_fs::TempDir::new().unwrap();
        let engine = Engine::new(config(vec![DiagramType::Class])).await.unwrap();

        engine.init(Some(dir.path().to_path_buf()), false).await.unwrap();
        dir.child("umlgen.toml").assert(predicate::str::contains("[rendering]"));
        assert!(engine.init(Some(dir.path().to_path_buf()), false).await.is_err());
        assert!(engine.init(Some(dir.path().to_path_buf()), true).await.is_ok());

        let loaded = Config::load(dir.path().join("umlgen.toml")).unwrap();
        assert!(loaded.wants(DiagramType::Class));
    }
}
