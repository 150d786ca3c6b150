// src/core/resolver.rs
//! Static symbol resolution over the parsed project.
//!
//! Only project sources are indexed. Library types are known by name only,
//! which is enough to classify them: their members are never looked up.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::declaration::{
    CallExpression, FieldAccessExpression, FieldDeclaration, MethodDeclaration, Resolution,
    ResolutionError, ResolvedDeclaration, SupertypeKind, SupertypeRef,
};
use super::parser::{ExprSyntax, ImportDecl, MethodSyntax, ParsedFile, TypeSyntax, VariableSyntax};

const PRIMITIVES: &[&str] = &["boolean", "byte", "char", "short", "int", "long", "float", "double", "void"];

/// Library packages whose common types resolve when the package is imported
/// (`java.lang` is always imported)
const KNOWN_LIBRARY_TYPES: &[(&str, &[&str])] = &[
    ("java.lang", &[
        "Object", "String", "StringBuilder", "CharSequence", "Number", "Integer", "Long", "Short",
        "Byte", "Double", "Float", "Boolean", "Character", "Void", "Math", "System", "Thread",
        "Runnable", "Iterable", "Comparable", "Class", "Enum", "Record", "Throwable", "Exception",
        "Error", "RuntimeException", "IllegalArgumentException", "IllegalStateException",
        "NullPointerException", "UnsupportedOperationException", "AutoCloseable",
    ]),
    ("java.util", &[
        "List", "ArrayList", "LinkedList", "Map", "HashMap", "LinkedHashMap", "TreeMap", "Set",
        "HashSet", "LinkedHashSet", "TreeSet", "Collection", "Collections", "Arrays", "Optional",
        "Iterator", "Objects", "UUID", "Deque", "ArrayDeque", "Queue",
    ]),
    ("java.io", &["File", "InputStream", "OutputStream", "IOException", "Serializable", "Closeable"]),
    ("java.math", &["BigDecimal", "BigInteger"]),
    ("java.time", &["Instant", "LocalDate", "LocalDateTime", "Duration", "Clock"]),
];

/// Import context of the file a type was declared in
#[derive(Debug, Clone, Copy)]
struct TypeScope<'a> {
    package: Option<&'a str>,
    imports: &'a [ImportDecl],
}

#[derive(Debug)]
struct TypeEntry<'a> {
    scope: TypeScope<'a>,
    syntax: &'a TypeSyntax,
}

/// Index of every project type, by fully-qualified name
pub struct SymbolTable<'a> {
    types: HashMap<String, TypeEntry<'a>>,
    /// Fully-qualified names in source-file order
    order: Vec<String>,
}

impl<'a> SymbolTable<'a> {
    pub fn build(files: &'a [ParsedFile]) -> Self {
        let mut types = HashMap::new();
        let mut order = Vec::new();

        for file in files {
            let unit = &file.compilation_unit;
            let Some(syntax) = unit.primary_type.as_ref() else {
                debug!("No type declaration in {}", file.path.display());
                continue;
            };

            let fqn = qualify(unit.package.as_deref(), &syntax.name);
            if types.contains_key(&fqn) {
                warn!("Duplicate type {} in {}, keeping the first", fqn, file.path.display());
                continue;
            }

            let scope = TypeScope { package: unit.package.as_deref(), imports: &unit.imports };
            types.insert(fqn.clone(), TypeEntry { scope, syntax });
            order.push(fqn);
        }

        Self { types, order }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.types.contains_key(fqn)
    }

    /// Resolve a type as written in the declaring type's file
    fn resolve_type(&self, written: &str, scope: TypeScope) -> Resolution {
        let name = erase(written);
        if name.is_empty() {
            return Err(ResolutionError::UnknownSymbol(written.to_string()));
        }
        if PRIMITIVES.contains(&name) {
            return Err(ResolutionError::NotReferenceType(name.to_string()));
        }

        if let Some((head, tail)) = name.split_once('.') {
            if self.types.contains_key(name) {
                return Ok(name.to_string());
            }
            // Outer.Inner style references start with a resolvable simple name
            if head.starts_with(char::is_uppercase) {
                if let Ok(outer) = self.resolve_simple(head, scope) {
                    return Ok(format!("{}.{}", outer, tail));
                }
            }
            return Ok(name.to_string());
        }

        self.resolve_simple(name, scope)
    }

    fn resolve_simple(&self, name: &str, scope: TypeScope) -> Resolution {
        let single = scope.imports.iter().find(|i| {
            !i.wildcard && !i.is_static && i.path.rsplit('.').next() == Some(name)
        });
        if let Some(import) = single {
            return Ok(import.path.clone());
        }

        let local = qualify(scope.package, name);
        if self.types.contains_key(&local) {
            return Ok(local);
        }

        for import in scope.imports.iter().filter(|i| i.wildcard && !i.is_static) {
            let candidate = format!("{}.{}", import.path, name);
            if self.types.contains_key(&candidate) || is_known_library_type(&import.path, name) {
                return Ok(candidate);
            }
        }

        if is_known_library_type("java.lang", name) {
            return Ok(format!("java.lang.{}", name));
        }

        Err(ResolutionError::UnknownSymbol(name.to_string()))
    }

    /// Type of a field declared on `owner` or one of its project supertypes
    fn field_type(&self, owner: &str, field: &str) -> Option<Resolution> {
        let mut visited = HashSet::new();
        self.find_member(owner, &mut visited, &|entry: &TypeEntry<'a>| {
            entry
                .syntax
                .fields
                .iter()
                .find(|f| f.name == field)
                .map(|f| self.resolve_type(&f.type_text, entry.scope))
        })
    }

    /// Return type of a method declared on `owner` or one of its project supertypes
    fn method_return_type(&self, owner: &str, method: &str) -> Option<Resolution> {
        let mut visited = HashSet::new();
        self.find_member(owner, &mut visited, &|entry: &TypeEntry<'a>| {
            entry
                .syntax
                .methods
                .iter()
                .find(|m| m.name == method)
                .map(|m| self.resolve_type(&m.return_type, entry.scope))
        })
    }

    fn find_member<T>(
        &self,
        owner: &str,
        visited: &mut HashSet<String>,
        lookup: &dyn Fn(&TypeEntry<'a>) -> Option<T>,
    ) -> Option<T> {
        if !visited.insert(owner.to_string()) {
            return None;
        }
        let entry = self.types.get(owner)?;
        if let Some(found) = lookup(entry) {
            return Some(found);
        }

        for parent in entry.syntax.extends.iter().chain(&entry.syntax.implements) {
            if let Ok(parent) = self.resolve_type(parent, entry.scope) {
                if let Some(found) = self.find_member(&parent, visited, lookup) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// What is in scope inside one method body
struct MethodScope<'t, 'a> {
    table: &'t SymbolTable<'a>,
    owner: &'t str,
    entry: &'t TypeEntry<'a>,
    method: &'t MethodSyntax,
}

impl<'t, 'a> MethodScope<'t, 'a> {
    fn resolve(&self, expr: &ExprSyntax) -> Resolution {
        match expr {
            ExprSyntax::This => Ok(self.owner.to_string()),
            ExprSyntax::Super => match self.entry.syntax.extends.first() {
                Some(parent) => self.table.resolve_type(parent, self.entry.scope),
                None => Ok("java.lang.Object".to_string()),
            },
            ExprSyntax::Name(name) => self.resolve_name(name),
            ExprSyntax::FieldAccess { object, field } => match self.resolve(object) {
                Ok(owner) => self.member_type(&owner, field, |t, o| t.field_type(o, field)),
                Err(e) => match expr.dotted_name() {
                    // `com.app.Util` is a qualified type name, not a field chain
                    Some(dotted) if self.table.contains(&dotted) => Ok(dotted),
                    _ => Err(e),
                },
            },
            ExprSyntax::Call { receiver, method } => {
                let owner = match receiver {
                    Some(receiver) => self.resolve(receiver)?,
                    None => self.owner.to_string(),
                };
                self.member_type(&owner, method, |t, o| t.method_return_type(o, method))
            }
            ExprSyntax::Typed(type_text) => self.table.resolve_type(type_text, self.entry.scope),
            ExprSyntax::Other(text) => Err(ResolutionError::UnsupportedExpression(text.clone())),
        }
    }

    fn resolve_name(&self, name: &str) -> Resolution {
        let variable = find_variable(&self.method.locals, name)
            .or_else(|| find_variable(&self.method.parameters, name));
        if let Some(var) = variable {
            return self.table.resolve_type(&var.type_text, self.entry.scope);
        }

        if let Some(field) = self.table.field_type(self.owner, name) {
            return field;
        }

        // a type name as the receiver of a static call
        self.table.resolve_type(name, self.entry.scope)
    }

    fn member_type(
        &self,
        owner: &str,
        member: &str,
        lookup: impl Fn(&SymbolTable<'a>, &str) -> Option<Resolution>,
    ) -> Resolution {
        if !self.table.contains(owner) {
            return Err(ResolutionError::ExternalMember {
                owner: owner.to_string(),
                member: member.to_string(),
            });
        }
        lookup(self.table, owner)
            .unwrap_or_else(|| Err(ResolutionError::UnknownSymbol(format!("{}.{}", owner, member))))
    }
}

/// Resolves every parsed type into a `ResolvedDeclaration`
#[derive(Debug, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// One declaration per parsed file that declares a type, in file order
    pub fn resolve(&self, files: &[ParsedFile]) -> Vec<ResolvedDeclaration> {
        let table = SymbolTable::build(files);
        if table.is_empty() {
            warn!("No type declarations found in {} parsed files", files.len());
        }
        debug!("Symbol table holds {} project types", table.len());

        table
            .order
            .iter()
            .filter_map(|fqn| table.types.get(fqn).map(|entry| (fqn, entry)))
            .map(|(fqn, entry)| self.resolve_declaration(&table, fqn, entry))
            .collect()
    }

    fn resolve_declaration(&self, table: &SymbolTable, fqn: &str, entry: &TypeEntry) -> ResolvedDeclaration {
        let syntax = entry.syntax;
        let mut declaration = ResolvedDeclaration::new(fqn);
        declaration.kind = syntax.kind;

        let supertypes = syntax
            .extends
            .iter()
            .map(|t| (t, SupertypeKind::Extends))
            .chain(syntax.implements.iter().map(|t| (t, SupertypeKind::Implements)));
        for (written, kind) in supertypes {
            declaration.supertypes.push(SupertypeRef {
                written: written.clone(),
                kind,
                resolved: table.resolve_type(written, entry.scope),
            });
        }

        for field in &syntax.fields {
            declaration.fields.push(FieldDeclaration {
                name: field.name.clone(),
                type_name: field.type_text.clone(),
                visibility: field.visibility,
                resolved_type: table.resolve_type(&field.type_text, entry.scope),
            });
        }

        for method in &syntax.methods {
            let scope = MethodScope { table, owner: fqn, entry, method };
            declaration.methods.push(MethodDeclaration {
                name: method.name.clone(),
                return_type: method.return_type.clone(),
                visibility: method.visibility,
                parameter_types: method.parameters.iter().map(|p| p.type_text.clone()).collect(),
                calls: method
                    .calls
                    .iter()
                    .map(|call| CallExpression {
                        method: call.method.clone(),
                        receiver: call.receiver.as_ref().map(|r| scope.resolve(r)),
                    })
                    .collect(),
                field_accesses: method
                    .field_accesses
                    .iter()
                    .map(|access| FieldAccessExpression {
                        field: access.field.clone(),
                        owner: scope.resolve(&access.object),
                    })
                    .collect(),
            });
        }

        declaration
    }
}

/// Later declarations shadow earlier ones
fn find_variable<'v>(vars: &'v [VariableSyntax], name: &str) -> Option<&'v VariableSyntax> {
    vars.iter().rev().find(|v| v.name == name)
}

fn qualify(package: Option<&str>, name: &str) -> String {
    match package {
        Some(package) if !package.is_empty() => format!("{}.{}", package, name),
        _ => name.to_string(),
    }
}

/// Drop generic arguments, array dimensions and varargs
fn erase(written: &str) -> &str {
    let base = written.split('<').next().unwrap_or(written);
    let mut base = base.trim().trim_end_matches("...");
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
    }
    base.trim()
}

fn is_known_library_type(package: &str, name: &str) -> bool {
    KNOWN_LIBRARY_TYPES
        .iter()
        .any(|(p, names)| *p == package && names.contains(&name))
}
