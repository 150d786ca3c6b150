// src/core/graph/entity_graph.rs
use std::collections::{BTreeMap, HashMap, HashSet};
use serde::{Serialize, Deserialize};
use tracing::warn;

use super::super::model::{Entity, RelationshipType};

/// All analyzed entities, stored once and indexed by fully-qualified name.
/// Relationships point at targets by name, so the graph may contain cycles
/// and dangling targets.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph, keeping the first entity seen for each name
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut graph = Self::new();
        for entity in entities {
            graph.insert(entity);
        }
        graph
    }

    /// Insert an entity. Returns false (and drops it) if the name is taken.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.index.contains_key(entity.name()) {
            warn!("Duplicate entity dropped during assembly: {}", entity.name());
            return false;
        }
        self.index.insert(entity.name().to_string(), self.entities.len());
        self.entities.push(entity);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entities in assembly order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Names targeted by at least one caller-callee relationship
    pub fn callee_names(&self) -> HashSet<&str> {
        self.entities
            .iter()
            .flat_map(|e| e.relatives_of(RelationshipType::CallerCallee))
            .map(|r| r.target())
            .collect()
    }

    pub fn get_statistics(&self) -> GraphStats {
        let mut relationships = BTreeMap::new();
        let mut dangling_targets = 0;

        for entity in &self.entities {
            for relative in entity.relatives() {
                *relationships.entry(relative.kind()).or_insert(0) += 1;
                if !self.contains(relative.target()) {
                    dangling_targets += 1;
                }
            }
        }

        GraphStats {
            entities: self.entities.len(),
            methods: self.entities.iter().map(|e| e.methods().len()).sum(),
            fields: self.entities.iter().map(|e| e.fields().len()).sum(),
            relationships,
            dangling_targets,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub entities: usize,
    pub methods: usize,
    pub fields: usize,
    pub relationships: BTreeMap<RelationshipType, usize>,
    /// Relationships whose target is not an analyzed entity
    pub dangling_targets: usize,
}

impl GraphStats {
    pub fn total_relationships(&self) -> usize {
        self.relationships.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Method, Relative};

    #[test]
    fn test_first_entity_wins_on_duplicate_names() {
        let mut first = Entity::new("com.app.A").unwrap();
        first.add_method(Method::new("first", "void")).unwrap();
        let mut second = Entity::new("com.app.A").unwrap();
        second.add_method(Method::new("second", "void")).unwrap();
        let other = Entity::new("com.app.B").unwrap();

        let graph = EntityGraph::from_entities(vec![first, second, other]);
        assert_eq!(graph.len(), 2);
        let names: Vec<_> = graph.get("com.app.A").unwrap().methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["first"]);
        assert_eq!(graph.entities()[1].name(), "com.app.B");
    }

    #[test]
    fn test_statistics_count_relationships_by_kind() {
        let mut a = Entity::new("com.app.A").unwrap();
        a.add_relative(Relative::caller_callee("com.app.B", "a", "b"));
        a.add_relative(Relative::caller_callee("com.app.Gone", "a", "x"));
        a.add_relative(Relative::association("com.app.B"));
        let b = Entity::new("com.app.B").unwrap();

        let graph = EntityGraph::from_entities(vec![a, b]);
        let stats = graph.get_statistics();
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.relationships[&RelationshipType::CallerCallee], 2);
        assert_eq!(stats.relationships[&RelationshipType::Association], 1);
        assert_eq!(stats.total_relationships(), 3);
        assert_eq!(stats.dangling_targets, 1);

        let callees = graph.callee_names();
        assert!(callees.contains("com.app.B"));
        assert!(callees.contains("com.app.Gone"));
        assert_eq!(callees.len(), 2);
    }
}
