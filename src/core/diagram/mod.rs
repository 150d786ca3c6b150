// src/core/diagram/mod.rs
//! Diagram text emitters and the downstream collaborators that turn the text
//! into images and an HTML index.

mod class_diagram;
mod sequence_diagram;
mod renderer;
mod html_index;

pub use class_diagram::ClassDiagramEmitter;
pub use sequence_diagram::SequenceDiagramEmitter;
pub use renderer::{DiagramRenderer, PlantUmlRenderer};
pub use html_index::HtmlIndexGenerator;
