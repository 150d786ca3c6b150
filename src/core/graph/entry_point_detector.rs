// src/core/graph/entry_point_detector.rs
use tracing::debug;

use super::EntityGraph;
use super::super::model::Entity;

/// Finds the roots of the call graph: entities that nothing calls into
pub struct EntryPointDetector;

impl EntryPointDetector {
    pub fn new() -> Self {
        Self
    }

    /// Entities whose name is never the target of a caller-callee
    /// relationship, in graph order. An entity without any call edges
    /// qualifies trivially.
    pub fn detect_entry_points<'g>(&self, graph: &'g EntityGraph) -> Vec<&'g Entity> {
        let callees = graph.callee_names();

        let entry_points: Vec<&Entity> = graph
            .entities()
            .iter()
            .filter(|entity| !callees.contains(entity.name()))
            .collect();

        debug!(
            "{} of {} entities are entry points ({} distinct callees)",
            entry_points.len(),
            graph.len(),
            callees.len()
        );
        entry_points
    }
}

impl Default for EntryPointDetector {
    fn default() -> Self {
        Self::new()
    }
}
