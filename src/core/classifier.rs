// src/core/classifier.rs
use crate::config::AnalysisConfig;

/// Decides whether a referenced type takes part in relationships
#[derive(Debug, Clone, Default)]
pub struct RelationshipClassifier {
    include_prefix: String,
    library_prefixes: Vec<String>,
}

impl RelationshipClassifier {
    pub fn new(include_prefix: impl Into<String>, library_prefixes: Vec<String>) -> Self {
        Self {
            include_prefix: include_prefix.into(),
            library_prefixes,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.include_package.clone(), config.library_prefixes.clone())
    }

    pub fn include_prefix(&self) -> Option<&str> {
        if self.include_prefix.is_empty() {
            None
        } else {
            Some(&self.include_prefix)
        }
    }

    /// True when no include prefix is set or `name` starts with it
    pub fn is_project_entity(&self, name: &str) -> bool {
        self.include_prefix.is_empty() || name.starts_with(&self.include_prefix)
    }

    pub fn is_library_entity(&self, name: &str) -> bool {
        self.library_prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    pub fn is_irrelevant(&self, name: &str) -> bool {
        self.is_library_entity(name) || !self.is_project_entity(name)
    }

    /// A relationship from `owner` to `target` is kept only if the target is
    /// relevant and not the owner itself
    pub fn accepts(&self, owner: &str, target: &str) -> bool {
        target != owner && !self.is_irrelevant(target)
    }
}
