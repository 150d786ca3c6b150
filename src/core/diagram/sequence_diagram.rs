// src/core/diagram/sequence_diagram.rs
use super::super::model::Scenario;

/// Emits one PlantUML sequence diagram per scenario
#[derive(Debug, Clone, Default)]
pub struct SequenceDiagramEmitter;

impl SequenceDiagramEmitter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, scenario: &Scenario) -> String {
        let mut out = String::new();
        out.push_str("@startuml\n");
        out.push_str(&format!("title Sequence Diagram for {}\n", scenario.title()));

        // participants are quoted since fully-qualified names contain dots
        for interaction in scenario.interactions() {
            out.push_str(&format!(
                "\"{}\" -> \"{}\" : {} calls {}\n",
                interaction.caller_entity,
                interaction.callee_entity,
                interaction.caller_method,
                interaction.callee_method
            ));
        }

        out.push_str("@enduml\n");
        out
    }
}
