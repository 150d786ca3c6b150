// src/core/mod.rs
mod engine;
mod parser;
mod resolver;
mod declaration;
mod classifier;
mod extractor;

// Language-specific parsers
mod languages;

// Relationship model, graph traversal and diagram output
mod model;
mod graph;
mod diagram;

pub use parser::{CodeParser, content_hash};
pub use resolver::Resolver;
pub use classifier::RelationshipClassifier;
pub use extractor::RelationshipExtractor;

pub use model::{Entity, Scenario};
pub use graph::{EntityGraph, GraphStats, EntryPointDetector, ScenarioBuilder};
pub use diagram::{
    ClassDiagramEmitter, SequenceDiagramEmitter, DiagramRenderer, PlantUmlRenderer,
    HtmlIndexGenerator,
};

// Export the main engine
pub use engine::Engine;
