// src/core/diagram/class_diagram.rs
use std::collections::HashSet;

use super::super::graph::EntityGraph;
use super::super::model::{Entity, Field, Method, RelationshipType};

/// Emits PlantUML class diagram text for an entity graph
#[derive(Debug, Clone, Default)]
pub struct ClassDiagramEmitter {
    package_filter: Option<String>,
}

impl ClassDiagramEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only draw entities whose name starts with `prefix`. An empty prefix
    /// draws everything.
    pub fn with_package_filter(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.package_filter = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn render(&self, graph: &EntityGraph) -> String {
        let entities: Vec<&Entity> = graph
            .entities()
            .iter()
            .filter(|e| self.package_filter.as_deref().map_or(true, |p| e.name().starts_with(p)))
            .collect();

        let mut out = String::new();
        out.push_str("@startuml\n");
        out.push_str("skinparam linetype Ortho\n");

        for entity in &entities {
            write_entity_block(&mut out, entity);
        }

        let mut seen: HashSet<(&str, RelationshipType, &str)> = HashSet::new();
        for entity in &entities {
            for relative in entity.relatives() {
                let source = entity.name();
                let target = relative.target();
                if source == target {
                    continue;
                }
                if seen.insert((source, relative.kind(), target)) {
                    out.push_str(&relationship_line(source, relative.kind(), target));
                    out.push('\n');
                }
            }
        }

        out.push_str("@enduml\n");
        out
    }
}

fn write_entity_block(out: &mut String, entity: &Entity) {
    out.push_str(&format!("{} {} {{\n", entity.kind().keyword(), entity.name()));
    for field in entity.fields() {
        out.push_str(&format!("    {}\n", field_line(field)));
    }
    for method in entity.methods() {
        out.push_str(&format!("    {}\n", method_line(method)));
    }
    out.push_str("}\n");
}

fn field_line(field: &Field) -> String {
    format!("{}{} {}", field.visibility.symbol(), field.type_name, field.name)
}

fn method_line(method: &Method) -> String {
    format!(
        "{}{} {}({})",
        method.visibility.symbol(),
        method.return_type,
        method.name,
        method.parameters.join(", ")
    )
}

fn relationship_line(source: &str, kind: RelationshipType, target: &str) -> String {
    match kind {
        RelationshipType::Inheritance => format!("{} --|> {} : extends", source, target),
        RelationshipType::Implementation => format!("{} ..|> {} : implements", source, target),
        RelationshipType::Association => format!("{} -- {} : association", source, target),
        RelationshipType::CallerCallee => format!("{} --> {} : caller-callee", source, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{EntityKind, Relative, Visibility};

    fn relationship_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.contains(" : ")).collect()
    }

    #[test]
    fn test_single_entity_block_without_relationships() {
        let mut entity = Entity::new("com.app.Order").unwrap();
        entity.add_field(Field::new("id", "long").with_visibility(Visibility::Private)).unwrap();
        entity
            .add_method(Method::new("total", "BigDecimal").with_parameter("int").with_parameter("String").with_visibility(Visibility::Public))
            .unwrap();
        let graph = EntityGraph::from_entities(vec![entity]);

        let text = ClassDiagramEmitter::new().render(&graph);
        assert_eq!(
            text,
            "@startuml\n\
             skinparam linetype Ortho\n\
             class com.app.Order {\n    \
             -long id\n    \
             +BigDecimal total(int, String)\n\
             }\n\
             @enduml\n"
        );
        assert!(relationship_lines(&text).is_empty());
    }

    #[test]
    fn test_relationships_are_deduplicated_and_self_edges_dropped() {
        let mut a = Entity::new("com.app.A").unwrap();
        a.add_relative(Relative::caller_callee("com.app.B", "x", "y"));
        a.add_relative(Relative::caller_callee("com.app.B", "z", "w"));
        a.add_relative(Relative::association("com.app.B"));
        a.add_relative(Relative::association("com.app.A"));
        a.add_relative(Relative::inheritance("com.app.Base"));
        a.add_relative(Relative::implementation("com.app.Api"));
        let b = Entity::new("com.app.B").unwrap().with_kind(EntityKind::Interface);

        let text = ClassDiagramEmitter::new().render(&EntityGraph::from_entities(vec![a, b]));
        assert_eq!(
            relationship_lines(&text),
            vec![
                "com.app.A --> com.app.B : caller-callee",
                "com.app.A -- com.app.B : association",
                "com.app.A --|> com.app.Base : extends",
                "com.app.A ..|> com.app.Api : implements",
            ]
        );
        assert!(text.contains("interface com.app.B {\n}"));
        assert!(!text.contains("com.app.A -- com.app.A"));
    }

    #[test]
    fn test_relationship_lines_end_each_with_newline() {
        let mut a = Entity::new("com.app.A").unwrap();
        a.add_relative(Relative::association("com.app.B"));
        let graph = EntityGraph::from_entities(vec![a, Entity::new("com.app.B").unwrap()]);

        assert_eq!(
            ClassDiagramEmitter::new().render(&graph),
            "@startuml\n\
             skinparam linetype Ortho\n\
             class com.app.A {\n\
             }\n\
             class com.app.B {\n\
             }\n\
             com.app.A -- com.app.B : association\n\
             @enduml\n"
        );
    }

    #[test]
    fn test_package_filter_limits_blocks() {
        let mut a = Entity::new("com.app.A").unwrap();
        a.add_relative(Relative::association("com.app.B"));
        let mut other = Entity::new("org.lib.C").unwrap();
        other.add_relative(Relative::association("com.app.A"));

        let graph = EntityGraph::from_entities(vec![a, Entity::new("com.app.B").unwrap(), other]);
        let text = ClassDiagramEmitter::new().with_package_filter("com.app").render(&graph);

        assert!(text.contains("class com.app.A {"));
        assert!(text.contains("class com.app.B {"));
        assert!(!text.contains("org.lib.C"));
    }

    #[test]
    fn test_rendering_is_byte_identical_across_runs() {
        let build = || {
            let mut a = Entity::new("com.app.A").unwrap();
            a.add_method(Method::new("b", "void")).unwrap();
            a.add_method(Method::new("a", "int")).unwrap();
            a.add_field(Field::new("z", "String")).unwrap();
            a.add_field(Field::new("y", "String")).unwrap();
            a.add_relative(Relative::association("com.app.B"));
            EntityGraph::from_entities(vec![a, Entity::new("com.app.B").unwrap()])
        };
        let emitter = ClassDiagramEmitter::new();
        assert_eq!(emitter.render(&build()), emitter.render(&build()));
    }
}
