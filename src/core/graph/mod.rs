// src/core/graph/mod.rs
//! Relationship graph assembly and the scenario traversal built on top of it.
//!
//! Entities are assembled into a name-indexed arena once; entry points are the
//! entities no call edge points at, and each entry method seeds one scenario.

mod entity_graph;
mod entry_point_detector;
mod scenario_builder;

pub use entity_graph::{EntityGraph, GraphStats};
pub use entry_point_detector::EntryPointDetector;
pub use scenario_builder::ScenarioBuilder;
