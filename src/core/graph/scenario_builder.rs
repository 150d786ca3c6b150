// src/core/graph/scenario_builder.rs
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::{EntityGraph, EntryPointDetector};
use super::super::model::{Entity, Interaction, Scenario};

/// Visited (entity, method) pairs for one scenario
type VisitedSet<'g> = HashSet<(&'g str, &'g str)>;

/// Builds one sequence scenario per (entry entity, method) pair by walking
/// caller-callee relationships depth-first
pub struct ScenarioBuilder {
    entry_point_detector: EntryPointDetector,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            entry_point_detector: EntryPointDetector::new(),
        }
    }

    /// Scenarios for every method name of every entry point, in graph order
    /// and then method order. Overloads share a name and so share one scenario.
    pub fn build_scenarios(&self, graph: &EntityGraph) -> Vec<Scenario> {
        let entry_points = self.entry_point_detector.detect_entry_points(graph);
        info!("Building scenarios from {} entry points", entry_points.len());

        let mut scenarios = Vec::new();
        for entry in entry_points {
            let mut seen = HashSet::new();
            for method in entry.methods() {
                if !seen.insert(method.name.as_str()) {
                    debug!("Overload {}::{} already has a scenario", entry.name(), method.name);
                    continue;
                }
                let scenario = self.build_scenario(graph, entry, &method.name);
                debug!("Scenario {} has {} interactions", scenario.title(), scenario.interactions().len());
                scenarios.push(scenario);
            }
        }

        scenarios
    }

    /// The scenario starting at `entity::method`. Each (entity, method) pair
    /// is expanded at most once, so cycles terminate.
    pub fn build_scenario<'g>(&self, graph: &'g EntityGraph, entity: &'g Entity, method: &'g str) -> Scenario {
        let mut scenario = Scenario::new(entity.name(), method);
        let mut visited = VisitedSet::new();
        self.expand(graph, entity, method, &mut scenario, &mut visited);
        scenario
    }

    fn expand<'g>(
        &self,
        graph: &'g EntityGraph,
        entity: &'g Entity,
        method: &'g str,
        scenario: &mut Scenario,
        visited: &mut VisitedSet<'g>,
    ) {
        if !visited.insert((entity.name(), method)) {
            return;
        }

        for relative in entity.calls_from(method) {
            let Some(callee_method) = relative.callee_method() else {
                continue;
            };
            let Some(callee) = graph.get(relative.target()) else {
                warn!(
                    "Callee {} referenced from {}::{} is not an analyzed entity, skipping",
                    relative.target(),
                    entity.name(),
                    method
                );
                continue;
            };

            scenario.push(Interaction::new(entity.name(), method, callee.name(), callee_method));
            self.expand(graph, callee, callee_method, scenario, visited);
        }
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Method, Relative};

    fn entity(name: &str, methods: &[&str], calls: &[(&str, &str, &str)]) -> Entity {
        let mut e = Entity::new(name).unwrap();
        for m in methods {
            e.add_method(Method::new(*m, "void")).unwrap();
        }
        for (caller, target, callee) in calls {
            e.add_relative(Relative::caller_callee(*target, *caller, *callee));
        }
        e
    }

    fn edges(scenario: &Scenario) -> Vec<(&str, &str, &str, &str)> {
        scenario
            .interactions()
            .iter()
            .map(|i| (
                i.caller_entity.as_str(),
                i.caller_method.as_str(),
                i.callee_entity.as_str(),
                i.callee_method.as_str(),
            ))
            .collect()
    }

    #[test]
    fn test_chain_produces_single_ordered_scenario() {
        let graph = EntityGraph::from_entities(vec![
            entity("A", &["a"], &[("a", "B", "b")]),
            entity("B", &["b"], &[("b", "C", "c")]),
            entity("C", &["c"], &[]),
        ]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].entry_entity(), "A");
        assert_eq!(scenarios[0].entry_method(), "a");
        assert_eq!(edges(&scenarios[0]), vec![("A", "a", "B", "b"), ("B", "b", "C", "c")]);
    }

    #[test]
    fn test_cycle_terminates_with_each_edge_once() {
        let graph = EntityGraph::from_entities(vec![
            entity("A", &["a"], &[("a", "B", "b")]),
            entity("B", &["b"], &[("b", "A", "a")]),
        ]);
        let a = graph.get("A").unwrap();

        let scenario = ScenarioBuilder::new().build_scenario(&graph, a, "a");
        assert_eq!(edges(&scenario), vec![("A", "a", "B", "b"), ("B", "b", "A", "a")]);
    }

    #[test]
    fn test_cycle_reached_from_entry_point() {
        let graph = EntityGraph::from_entities(vec![
            entity("Main", &["main"], &[("main", "A", "a")]),
            entity("A", &["a"], &[("a", "B", "b")]),
            entity("B", &["b"], &[("b", "A", "a")]),
        ]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(
            edges(&scenarios[0]),
            vec![("Main", "main", "A", "a"), ("A", "a", "B", "b"), ("B", "b", "A", "a")]
        );
    }

    #[test]
    fn test_one_scenario_per_entry_method() {
        let graph = EntityGraph::from_entities(vec![
            entity("A", &["start", "stop"], &[("start", "B", "b"), ("stop", "B", "halt")]),
            entity("B", &["b", "halt"], &[]),
            entity("Idle", &["noop"], &[]),
        ]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        let titles: Vec<_> = scenarios.iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["A::start", "A::stop", "Idle::noop"]);
        assert_eq!(edges(&scenarios[1]), vec![("A", "stop", "B", "halt")]);
        assert!(scenarios[2].is_empty());
    }

    #[test]
    fn test_overloads_share_one_scenario() {
        let mut a = Entity::new("A").unwrap();
        a.add_method(Method::new("save", "void").with_parameter("String")).unwrap();
        a.add_method(Method::new("save", "int")).unwrap();
        a.add_relative(Relative::caller_callee("B", "save", "b"));
        let graph = EntityGraph::from_entities(vec![a, entity("B", &["b"], &[])]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].title(), "A::save");
        assert_eq!(edges(&scenarios[0]), vec![("A", "save", "B", "b")]);
    }

    #[test]
    fn test_siblings_follow_insertion_order_depth_first() {
        let graph = EntityGraph::from_entities(vec![
            entity("A", &["a"], &[("a", "C", "c"), ("a", "B", "b")]),
            entity("B", &["b"], &[("b", "D", "d")]),
            entity("C", &["c"], &[]),
            entity("D", &["d"], &[]),
        ]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        assert_eq!(
            edges(&scenarios[0]),
            vec![("A", "a", "C", "c"), ("A", "a", "B", "b"), ("B", "b", "D", "d")]
        );
    }

    #[test]
    fn test_missing_callee_is_skipped() {
        let graph = EntityGraph::from_entities(vec![
            entity("A", &["a"], &[("a", "Ghost", "boo"), ("a", "B", "b")]),
            entity("B", &["b"], &[]),
        ]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        assert_eq!(edges(&scenarios[0]), vec![("A", "a", "B", "b")]);
    }

    #[test]
    fn test_repeated_visit_of_shared_callee_is_not_expanded_twice() {
        let graph = EntityGraph::from_entities(vec![
            entity("A", &["a"], &[("a", "B", "b"), ("a", "C", "c")]),
            entity("B", &["b"], &[("b", "D", "d")]),
            entity("C", &["c"], &[("c", "B", "b")]),
            entity("D", &["d"], &[]),
        ]);

        let scenarios = ScenarioBuilder::new().build_scenarios(&graph);
        // C -> B is recorded, but B::b is not walked again
        assert_eq!(
            edges(&scenarios[0]),
            vec![("A", "a", "B", "b"), ("B", "b", "D", "d"), ("A", "a", "C", "c"), ("C", "c", "B", "b")]
        );
    }

    #[test]
    fn test_builds_are_deterministic() {
        let make = || EntityGraph::from_entities(vec![
            entity("A", &["x", "y"], &[("x", "B", "b"), ("y", "C", "c")]),
            entity("B", &["b"], &[("b", "C", "c")]),
            entity("C", &["c"], &[]),
        ]);
        assert_eq!(
            ScenarioBuilder::new().build_scenarios(&make()),
            ScenarioBuilder::new().build_scenarios(&make())
        );
    }
}
