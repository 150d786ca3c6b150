// src/core/languages/java.rs
use std::path::Path;
use tree_sitter::{Parser, Node};

use crate::error::{UmlError, Result};
use crate::core::model::{EntityKind, Visibility};
use crate::core::parser::{
    CallSyntax, CompilationUnit, ExprSyntax, FieldAccessSyntax, FieldSyntax, ImportDecl,
    MethodSyntax, TypeSyntax, VariableSyntax,
};
use super::LanguageParser;

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

/// Java parser using Tree-sitter
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let java_language = tree_sitter_java::language();
        parser.set_language(&java_language)
            .map_err(|e| UmlError::Parser(format!("Failed to set Java language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageParser for JavaParser {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<CompilationUnit> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| UmlError::Parser(format!("Failed to parse Java code in {}", file_path.display())))?;

        let root = tree.root_node();
        if root.has_error() && find_type_declaration(root).is_none() {
            return Err(UmlError::Parser(format!("No parsable type declaration in {}", file_path.display())));
        }

        let source = Source(content);
        let mut unit = CompilationUnit::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => unit.package = source.package_name(child),
                "import_declaration" => {
                    if let Some(import) = source.import(child) {
                        unit.imports.push(import);
                    }
                }
                kind if TYPE_DECLARATIONS.contains(&kind) && unit.primary_type.is_none() => {
                    unit.primary_type = source.type_declaration(child);
                }
                _ => {}
            }
        }

        Ok(unit)
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn language_name(&self) -> &str {
        "java"
    }
}

fn find_type_declaration(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    let found = root.named_children(&mut cursor).find(|c| TYPE_DECLARATIONS.contains(&c.kind()));
    found
}

/// Source text plus the node helpers that need it
#[derive(Clone, Copy)]
struct Source<'s>(&'s str);

impl<'s> Source<'s> {
    /// Extract text content of a node
    fn text(&self, node: Node) -> &'s str {
        &self.0[node.byte_range()]
    }

    fn package_name(&self, node: Node) -> Option<String> {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            .map(|c| self.text(c).to_string());
        name
    }

    fn import(&self, node: Node) -> Option<ImportDecl> {
        let text = self.text(node)
            .trim()
            .trim_start_matches("import")
            .trim_end_matches(';')
            .trim();
        let (is_static, rest) = match text.strip_prefix("static") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim()),
            _ => (false, text),
        };
        let path: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
        if path.is_empty() {
            return None;
        }

        match path.strip_suffix(".*") {
            Some(prefix) => Some(ImportDecl { path: prefix.to_string(), wildcard: true, is_static }),
            None => Some(ImportDecl { path, wildcard: false, is_static }),
        }
    }

    fn type_declaration(&self, node: Node) -> Option<TypeSyntax> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let kind = match node.kind() {
            "interface_declaration" => EntityKind::Interface,
            "enum_declaration" => EntityKind::Enum,
            "record_declaration" => EntityKind::Record,
            _ => EntityKind::Class,
        };
        let mut declaration = TypeSyntax { name, kind, ..Default::default() };

        if let Some(superclass) = node.child_by_field_name("superclass") {
            declaration.extends.extend(self.type_list(superclass));
        }
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            declaration.implements.extend(self.type_list(interfaces));
        }
        if let Some(extends) = find_child_by_kind(node, "extends_interfaces") {
            declaration.extends.extend(self.type_list(extends));
        }

        if let Some(parameters) = node.child_by_field_name("parameters") {
            // record components are private final fields
            for component in self.parameters(parameters) {
                declaration.fields.push(FieldSyntax {
                    name: component.name,
                    type_text: component.type_text,
                    visibility: Visibility::Private,
                });
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            let members = match find_child_by_kind(body, "enum_body_declarations") {
                Some(declarations) if kind == EntityKind::Enum => declarations,
                _ => body,
            };
            self.members(members, kind, &mut declaration);
        }

        Some(declaration)
    }

    /// Type names from a `superclass`, `super_interfaces` or `extends_interfaces` node
    fn type_list(&self, node: Node) -> Vec<String> {
        let list = find_child_by_kind(node, "type_list").unwrap_or(node);
        let mut cursor = list.walk();
        let types = list
            .named_children(&mut cursor)
            .filter(|c| is_type_node(c.kind()))
            .map(|c| self.text(c).to_string())
            .collect();
        types
    }

    fn members(&self, body: Node, owner_kind: EntityKind, declaration: &mut TypeSyntax) {
        let default_visibility = match owner_kind {
            EntityKind::Interface => Visibility::Public,
            _ => Visibility::Package,
        };

        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    let visibility = self.visibility(member).unwrap_or(default_visibility);
                    let Some(type_node) = member.child_by_field_name("type") else { continue };
                    let type_text = self.text(type_node).to_string();

                    let mut declarators = member.walk();
                    for declarator in member.children_by_field_name("declarator", &mut declarators) {
                        if let Some(name) = declarator.child_by_field_name("name") {
                            declaration.fields.push(FieldSyntax {
                                name: self.text(name).to_string(),
                                type_text: type_text.clone(),
                                visibility,
                            });
                        }
                    }
                }
                "method_declaration" => {
                    if let Some(method) = self.method(member, default_visibility) {
                        declaration.methods.push(method);
                    }
                }
                // constructors, initializers and nested types are not members we draw
                _ => {}
            }
        }
    }

    fn method(&self, node: Node, default_visibility: Visibility) -> Option<MethodSyntax> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let return_type = node
            .child_by_field_name("type")
            .map(|t| self.text(t).to_string())
            .unwrap_or_else(|| "void".to_string());
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();

        let mut method = MethodSyntax {
            name,
            return_type,
            visibility: self.visibility(node).unwrap_or(default_visibility),
            parameters,
            ..Default::default()
        };

        if let Some(body) = node.child_by_field_name("body") {
            self.walk_body(body, &mut method);
        }

        Some(method)
    }

    fn parameters(&self, node: Node) -> Vec<VariableSyntax> {
        let mut parameters = Vec::new();
        let mut cursor = node.walk();
        for parameter in node.named_children(&mut cursor) {
            match parameter.kind() {
                "formal_parameter" => {
                    let type_node = parameter.child_by_field_name("type");
                    let name_node = parameter.child_by_field_name("name");
                    if let (Some(t), Some(n)) = (type_node, name_node) {
                        parameters.push(VariableSyntax {
                            name: self.text(n).to_string(),
                            type_text: self.text(t).to_string(),
                        });
                    }
                }
                "spread_parameter" => {
                    let mut inner = parameter.walk();
                    let mut type_text = None;
                    let mut name = None;
                    for child in parameter.named_children(&mut inner) {
                        if child.kind() == "variable_declarator" {
                            name = child.child_by_field_name("name").map(|n| self.text(n).to_string());
                        } else if is_type_node(child.kind()) && type_text.is_none() {
                            type_text = Some(format!("{}...", self.text(child)));
                        }
                    }
                    if let (Some(type_text), Some(name)) = (type_text, name) {
                        parameters.push(VariableSyntax { name, type_text });
                    }
                }
                _ => {}
            }
        }
        parameters
    }

    /// Visibility keyword from a declaration's modifiers, if any
    fn visibility(&self, node: Node) -> Option<Visibility> {
        let modifiers = find_child_by_kind(node, "modifiers")?;
        let mut cursor = modifiers.walk();
        let visibility = modifiers.children(&mut cursor).find_map(|m| match m.kind() {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        });
        visibility
    }

    /// Collect calls, field accesses and typed locals in pre-order
    fn walk_body(&self, node: Node, method: &mut MethodSyntax) {
        match node.kind() {
            "method_invocation" => {
                if let Some(name) = node.child_by_field_name("name") {
                    method.calls.push(CallSyntax {
                        receiver: node.child_by_field_name("object").map(|o| self.expression(o)),
                        method: self.text(name).to_string(),
                    });
                }
            }
            "field_access" => {
                let object = node.child_by_field_name("object");
                let field = node.child_by_field_name("field");
                if let (Some(object), Some(field)) = (object, field) {
                    method.field_accesses.push(FieldAccessSyntax {
                        object: self.expression(object),
                        field: self.text(field).to_string(),
                    });
                }
            }
            "local_variable_declaration" => self.local_variables(node, method),
            "enhanced_for_statement" => {
                let type_node = node.child_by_field_name("type");
                let name_node = node.child_by_field_name("name");
                if let (Some(t), Some(n)) = (type_node, name_node) {
                    if self.text(t) != "var" {
                        method.locals.push(VariableSyntax {
                            name: self.text(n).to_string(),
                            type_text: self.text(t).to_string(),
                        });
                    }
                }
            }
            "catch_formal_parameter" => {
                let type_text = find_child_by_kind(node, "catch_type")
                    .and_then(|c| c.named_child(0))
                    .map(|t| self.text(t).to_string());
                let name = node.child_by_field_name("name").map(|n| self.text(n).to_string());
                if let (Some(type_text), Some(name)) = (type_text, name) {
                    method.locals.push(VariableSyntax { name, type_text });
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.walk_body(child, method);
        }
    }

    fn local_variables(&self, node: Node, method: &mut MethodSyntax) {
        let Some(type_node) = node.child_by_field_name("type") else { return };
        let declared = self.text(type_node);

        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some(name) = declarator.child_by_field_name("name") else { continue };
            let type_text = if declared == "var" {
                // only `var x = new T(...)` has a type we can read off the syntax
                declarator
                    .child_by_field_name("value")
                    .filter(|v| v.kind() == "object_creation_expression")
                    .and_then(|v| v.child_by_field_name("type"))
                    .map(|t| self.text(t).to_string())
            } else {
                Some(declared.to_string())
            };

            if let Some(type_text) = type_text {
                method.locals.push(VariableSyntax { name: self.text(name).to_string(), type_text });
            }
        }
    }

    fn expression(&self, node: Node) -> ExprSyntax {
        match node.kind() {
            "this" => ExprSyntax::This,
            "super" => ExprSyntax::Super,
            "identifier" => ExprSyntax::Name(self.text(node).to_string()),
            "field_access" => match (node.child_by_field_name("object"), node.child_by_field_name("field")) {
                (Some(object), Some(field)) => ExprSyntax::FieldAccess {
                    object: Box::new(self.expression(object)),
                    field: self.text(field).to_string(),
                },
                _ => ExprSyntax::Other(self.text(node).to_string()),
            },
            "method_invocation" => match node.child_by_field_name("name") {
                Some(name) => ExprSyntax::Call {
                    receiver: node.child_by_field_name("object").map(|o| Box::new(self.expression(o))),
                    method: self.text(name).to_string(),
                },
                None => ExprSyntax::Other(self.text(node).to_string()),
            },
            "object_creation_expression" | "cast_expression" => match node.child_by_field_name("type") {
                Some(t) => ExprSyntax::Typed(self.text(t).to_string()),
                None => ExprSyntax::Other(self.text(node).to_string()),
            },
            "parenthesized_expression" => match node.named_child(0) {
                Some(inner) => self.expression(inner),
                None => ExprSyntax::Other(self.text(node).to_string()),
            },
            "string_literal" => ExprSyntax::Typed("String".to_string()),
            _ => ExprSyntax::Other(self.text(node).to_string()),
        }
    }
}

/// Find a child node by its kind
fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier" | "scoped_type_identifier" | "generic_type" | "array_type" | "integral_type"
            | "floating_point_type" | "boolean_type" | "void_type"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CompilationUnit {
        JavaParser::new().unwrap().parse(source, Path::new("Test.java")).unwrap()
    }

    fn primary(source: &str) -> TypeSyntax {
        parse(source).primary_type.unwrap()
    }

    #[test]
    fn test_package_imports_and_supertypes() {
        let unit = parse(
            "package com.app.orders;\n\
             import java.util.List;\n\
             import com.app.common.*;\n\
             import static com.app.Util.helper;\n\
             public class OrderService extends BaseService implements Auditable, Comparable<OrderService> {}\n\
             class Second {}\n",
        );

        assert_eq!(unit.package.as_deref(), Some("com.app.orders"));
        assert_eq!(
            unit.imports,
            vec![
                ImportDecl { path: "java.util.List".to_string(), wildcard: false, is_static: false },
                ImportDecl { path: "com.app.common".to_string(), wildcard: true, is_static: false },
                ImportDecl { path: "com.app.Util.helper".to_string(), wildcard: false, is_static: true },
            ]
        );
        let ty = unit.primary_type.unwrap();
        assert_eq!(ty.name, "OrderService");
        assert_eq!(ty.kind, EntityKind::Class);
        assert_eq!(ty.extends, vec!["BaseService"]);
        assert_eq!(ty.implements, vec!["Auditable", "Comparable<OrderService>"]);
    }

    #[test]
    fn test_fields_and_method_signatures() {
        let ty = primary(
            "class Order {\n\
               private final List<Item> items = new ArrayList<>();\n\
               protected int a, b;\n\
               String note;\n\
               public Order(int a) { this.a = a; }\n\
               public BigDecimal total(int count, String... tags) { return null; }\n\
               private void reset() {}\n\
             }",
        );

        let fields: Vec<_> = ty.fields.iter().map(|f| (f.name.as_str(), f.type_text.as_str(), f.visibility)).collect();
        assert_eq!(
            fields,
            vec![
                ("items", "List<Item>", Visibility::Private),
                ("a", "int", Visibility::Protected),
                ("b", "int", Visibility::Protected),
                ("note", "String", Visibility::Package),
            ]
        );

        // constructors are not methods
        assert_eq!(ty.methods.len(), 2);
        let total = &ty.methods[0];
        assert_eq!(total.name, "total");
        assert_eq!(total.return_type, "BigDecimal");
        assert_eq!(total.visibility, Visibility::Public);
        assert_eq!(
            total.parameters,
            vec![
                VariableSyntax { name: "count".to_string(), type_text: "int".to_string() },
                VariableSyntax { name: "tags".to_string(), type_text: "String...".to_string() },
            ]
        );
        assert_eq!(ty.methods[1].visibility, Visibility::Private);
    }

    #[test]
    fn test_calls_are_collected_in_preorder() {
        let ty = primary(
            "class A {\n\
               void run() {\n\
                 helper();\n\
                 repo.find(this.lookup());\n\
                 new Printer().print();\n\
               }\n\
             }",
        );

        let calls = &ty.methods[0].calls;
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], CallSyntax { receiver: None, method: "helper".to_string() });
        assert_eq!(calls[1].receiver, Some(ExprSyntax::Name("repo".to_string())));
        assert_eq!(calls[1].method, "find");
        assert_eq!(calls[2], CallSyntax { receiver: Some(ExprSyntax::This), method: "lookup".to_string() });
        assert_eq!(calls[3].receiver, Some(ExprSyntax::Typed("Printer".to_string())));
    }

    #[test]
    fn test_locals_and_field_accesses() {
        let ty = primary(
            "class A {\n\
               void run(Config config) {\n\
                 Repo repo = lookup();\n\
                 var printer = new Printer();\n\
                 var unknown = compute();\n\
                 for (Item item : items) { item.touch(); }\n\
                 try { go(); } catch (IOException | RuntimeException e) { log(e); }\n\
                 int limit = config.limit;\n\
               }\n\
             }",
        );

        let method = &ty.methods[0];
        let locals: Vec<_> = method.locals.iter().map(|l| (l.name.as_str(), l.type_text.as_str())).collect();
        assert_eq!(
            locals,
            vec![("repo", "Repo"), ("printer", "Printer"), ("item", "Item"), ("e", "IOException"), ("limit", "int")]
        );
        assert_eq!(
            method.field_accesses,
            vec![FieldAccessSyntax { object: ExprSyntax::Name("config".to_string()), field: "limit".to_string() }]
        );
    }

    #[test]
    fn test_interface_members_default_to_public() {
        let ty = primary(
            "public interface Repo extends Base, Closeable {\n\
               int LIMIT = 10;\n\
               Order find(long id);\n\
             }",
        );

        assert_eq!(ty.kind, EntityKind::Interface);
        assert_eq!(ty.extends, vec!["Base", "Closeable"]);
        assert_eq!(ty.fields[0].visibility, Visibility::Public);
        assert_eq!(ty.methods[0].visibility, Visibility::Public);
        assert!(ty.methods[0].calls.is_empty());
    }

    #[test]
    fn test_enum_and_record_members() {
        let status = primary(
            "enum Status implements Labeled {\n\
               OPEN, CLOSED;\n\
               private String label;\n\
               public String label() { return label; }\n\
             }",
        );
        assert_eq!(status.kind, EntityKind::Enum);
        assert_eq!(status.implements, vec!["Labeled"]);
        assert_eq!(status.fields.len(), 1);
        assert_eq!(status.methods.len(), 1);

        let point = primary("record Point(int x, int y) { int sum() { return x + y; } }");
        assert_eq!(point.kind, EntityKind::Record);
        assert_eq!(point.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(point.methods[0].name, "sum");
    }

    #[test]
    fn test_file_without_type_has_no_primary_type() {
        let unit = parse("package com.app;\n");
        assert!(unit.primary_type.is_none());
    }
}
