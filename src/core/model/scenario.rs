// src/core/model/scenario.rs
use serde::{Serialize, Deserialize};

/// One traversed caller → callee edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub caller_entity: String,
    pub caller_method: String,
    pub callee_entity: String,
    pub callee_method: String,
}

impl Interaction {
    pub fn new(
        caller_entity: impl Into<String>,
        caller_method: impl Into<String>,
        callee_entity: impl Into<String>,
        callee_method: impl Into<String>,
    ) -> Self {
        Self {
            caller_entity: caller_entity.into(),
            caller_method: caller_method.into(),
            callee_entity: callee_entity.into(),
            callee_method: callee_method.into(),
        }
    }
}

/// The interactions reachable from one entry method, in traversal order.
/// Only the scenario builder appends to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    entry_entity: String,
    entry_method: String,
    interactions: Vec<Interaction>,
}

impl Scenario {
    pub(crate) fn new(entry_entity: impl Into<String>, entry_method: impl Into<String>) -> Self {
        Self {
            entry_entity: entry_entity.into(),
            entry_method: entry_method.into(),
            interactions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    pub fn entry_entity(&self) -> &str {
        &self.entry_entity
    }

    pub fn entry_method(&self) -> &str {
        &self.entry_method
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// `Entity::method`, used for titles and logging
    pub fn title(&self) -> String {
        format!("{}::{}", self.entry_entity, self.entry_method)
    }
}
