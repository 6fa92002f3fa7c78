//! Resolution facade
//!
//! Turns call and constructor expressions into resolved declarations or
//! typed failures. Resolution is best-effort and purely syntactic: it
//! works from the project index, the unit's imports, the current package,
//! and a fixed `java.lang` table. Outcomes are returned as variants;
//! nothing here is exception-driven, and every failure is mapped onto the
//! five-kind taxonomy at this boundary.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tree_sitter::Node;

use crate::ast::{argument_count, enclosing, node_text};
use crate::project::{JavaUnit, ProjectIndex};

/// Classification of a resolution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Several candidate declarations match and cannot be told apart
    Ambiguous,
    /// The expression has a shape the resolver does not support
    /// (chained receivers, arbitrary field accesses, casts)
    UnsupportedOperation,
    /// Reserved for resolution backends whose iteration can be invalidated
    /// mid-walk; never produced by the index-based resolver itself
    ConcurrentModification,
    /// The symbol, type, or method does not exist where it should
    NoSuchElement,
    /// Anything else, including malformed expression nodes
    Other,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ambiguous => "ambiguous",
            Self::UnsupportedOperation => "unsupported-operation",
            Self::ConcurrentModification => "concurrent-modification",
            Self::NoSuchElement => "no-such-element",
            Self::Other => "other",
        }
    }
}

/// A method declaration resolved to a compilation unit of the analyzed
/// project. The walker re-locates the declaration by name inside `unit`
/// before recursing.
#[derive(Clone)]
pub struct ProjectMethod {
    pub unit: Arc<JavaUnit>,
    pub method: String,
    pub qualified_name: String,
    pub package: String,
}

/// Outcome of resolving a call expression
pub enum Resolution {
    /// Declared inside the analyzed source tree; recursable
    Project(ProjectMethod),
    /// Declared in a library; recorded but never recursed into
    External {
        qualified_name: String,
        package: String,
    },
    Unresolved(FailureKind),
}

/// Outcome of resolving a constructor expression. Anonymous classes carry
/// the named supertype's qualified name and package, since they have no
/// stable package of their own.
pub enum ConstructorResolution {
    Resolved {
        type_name: String,
        package: String,
        anonymous: bool,
    },
    Unresolved(FailureKind),
}

/// Types importable without an import statement
static JAVA_LANG_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Object", "String", "StringBuilder", "StringBuffer", "CharSequence",
        "Integer", "Long", "Short", "Byte", "Double", "Float", "Boolean",
        "Character", "Number", "Math", "System", "Thread", "Runnable",
        "Class", "Enum", "Iterable", "Comparable", "Exception",
        "RuntimeException", "Error", "Throwable", "IllegalArgumentException",
        "IllegalStateException", "UnsupportedOperationException",
    ]
    .into_iter()
    .collect()
});

/// Where a type name points after qualification
enum TypeRef {
    Project {
        unit: Arc<JavaUnit>,
        class_name: String,
        qualified: String,
    },
    External {
        qualified: String,
        package: String,
    },
    Unknown,
}

/// Outcome of looking a method up inside a class scope
enum MethodLookup {
    Found,
    Ambiguous,
    NotFound,
}

pub struct Resolver<'a> {
    index: &'a ProjectIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ProjectIndex) -> Self {
        Self { index }
    }

    /// Resolve one `method_invocation` node
    pub fn resolve_call(&self, unit: &Arc<JavaUnit>, call: Node) -> Resolution {
        let Some(name_node) = call.child_by_field_name("name") else {
            return Resolution::Unresolved(FailureKind::Other);
        };
        let name = node_text(&name_node, unit.source()).to_string();
        let args = argument_count(&call);

        match call.child_by_field_name("object") {
            None => self.resolve_unqualified(unit, call, &name, args),
            Some(recv) => self.resolve_with_receiver(unit, call, recv, &name, args),
        }
    }

    /// Resolve one `object_creation_expression` node
    pub fn resolve_constructor(
        &self,
        unit: &Arc<JavaUnit>,
        creation: Node,
    ) -> ConstructorResolution {
        let Some(type_node) = creation.child_by_field_name("type") else {
            return ConstructorResolution::Unresolved(FailureKind::Other);
        };
        let type_name = strip_type_decorations(node_text(&type_node, unit.source()));
        if type_name.is_empty() {
            return ConstructorResolution::Unresolved(FailureKind::Other);
        }

        let anonymous = has_class_body(&creation);

        match self.qualify_type(unit, &type_name) {
            TypeRef::Project { qualified, .. } => ConstructorResolution::Resolved {
                package: package_of(&qualified),
                type_name: qualified,
                anonymous,
            },
            TypeRef::External { qualified, package } => ConstructorResolution::Resolved {
                type_name: qualified,
                package,
                anonymous,
            },
            TypeRef::Unknown => {
                tracing::debug!(type_name = %type_name, "constructor type not resolved");
                ConstructorResolution::Unresolved(FailureKind::NoSuchElement)
            }
        }
    }

    /// A call with no receiver: the target lives in the enclosing class,
    /// its supertype chain, or a static import.
    fn resolve_unqualified(
        &self,
        unit: &Arc<JavaUnit>,
        call: Node,
        name: &str,
        args: usize,
    ) -> Resolution {
        let Some(class_node) = enclosing_type(call) else {
            return Resolution::Unresolved(FailureKind::Other);
        };

        let mut seen = HashSet::new();
        match self.lookup_in_class_chain(unit, class_node, name, args, &mut seen) {
            Some(resolution) => resolution,
            None => self.resolve_static_import(unit, name),
        }
    }

    fn resolve_with_receiver(
        &self,
        unit: &Arc<JavaUnit>,
        call: Node,
        recv: Node,
        name: &str,
        args: usize,
    ) -> Resolution {
        match recv.kind() {
            "this" => self.resolve_unqualified(unit, call, name, args),
            "super" => {
                let Some(class_node) = enclosing_type(call) else {
                    return Resolution::Unresolved(FailureKind::Other);
                };
                let mut seen = HashSet::new();
                self.lookup_in_supertype(unit, class_node, name, args, &mut seen)
                    .unwrap_or(Resolution::Unresolved(FailureKind::NoSuchElement))
            }
            "identifier" => {
                let recv_name = node_text(&recv, unit.source());
                if let Some(var_type) = find_variable_type(unit, call, recv_name) {
                    self.resolve_via_type(unit, &var_type, name, args)
                } else if starts_uppercase(recv_name) {
                    // Static call on a type name
                    self.resolve_via_type(unit, recv_name, name, args)
                } else {
                    Resolution::Unresolved(FailureKind::NoSuchElement)
                }
            }
            "field_access" => {
                let text = node_text(&recv, unit.source());
                if text == "System.out" || text == "System.err" {
                    return Resolution::External {
                        qualified_name: format!("java.io.PrintStream.{}", name),
                        package: "java.io".to_string(),
                    };
                }
                if let Some(field) = text.strip_prefix("this.") {
                    return match find_variable_type(unit, call, field) {
                        Some(ty) => self.resolve_via_type(unit, &ty, name, args),
                        None => Resolution::Unresolved(FailureKind::NoSuchElement),
                    };
                }
                // Fully qualified static call: a.b.C.method()
                if text
                    .rsplit('.')
                    .next()
                    .map(starts_uppercase)
                    .unwrap_or(false)
                {
                    return self.resolve_via_type(unit, text, name, args);
                }
                Resolution::Unresolved(FailureKind::UnsupportedOperation)
            }
            "string_literal" => Resolution::External {
                qualified_name: format!("java.lang.String.{}", name),
                package: "java.lang".to_string(),
            },
            // Chained calls and computed receivers carry no declared type
            // the syntactic resolver could consult
            _ => Resolution::Unresolved(FailureKind::UnsupportedOperation),
        }
    }

    /// Resolve a call through a receiver's declared type name
    fn resolve_via_type(
        &self,
        unit: &Arc<JavaUnit>,
        type_name: &str,
        method: &str,
        args: usize,
    ) -> Resolution {
        match self.qualify_type(unit, type_name) {
            TypeRef::Project {
                unit: target_unit,
                class_name,
                ..
            } => {
                let Some(class_node) = find_class_node(&target_unit, &class_name) else {
                    return Resolution::Unresolved(FailureKind::NoSuchElement);
                };
                let mut seen = HashSet::new();
                self.lookup_in_class_chain(&target_unit, class_node, method, args, &mut seen)
                    .unwrap_or(Resolution::Unresolved(FailureKind::NoSuchElement))
            }
            TypeRef::External { qualified, package } => Resolution::External {
                qualified_name: format!("{}.{}", qualified, method),
                package,
            },
            TypeRef::Unknown => Resolution::Unresolved(FailureKind::NoSuchElement),
        }
    }

    /// Look a method up in a class and, failing that, its supertype chain.
    /// Returns `None` when neither the class nor any project supertype
    /// declares the method and no external supertype could claim it.
    fn lookup_in_class_chain(
        &self,
        unit: &Arc<JavaUnit>,
        class_node: Node,
        name: &str,
        args: usize,
        seen: &mut HashSet<String>,
    ) -> Option<Resolution> {
        let class_name = class_node
            .child_by_field_name("name")
            .map(|n| node_text(&n, unit.source()).to_string())?;

        match lookup_method(class_node, unit, name, args) {
            MethodLookup::Found => {
                let qualified = qualify_member(&unit.package, &class_name, name);
                Some(Resolution::Project(ProjectMethod {
                    unit: unit.clone(),
                    method: name.to_string(),
                    package: unit.package.clone(),
                    qualified_name: qualified,
                }))
            }
            MethodLookup::Ambiguous => Some(Resolution::Unresolved(FailureKind::Ambiguous)),
            MethodLookup::NotFound => self.lookup_in_supertype(unit, class_node, name, args, seen),
        }
    }

    /// Continue a method lookup in the superclass of `class_node`
    fn lookup_in_supertype(
        &self,
        unit: &Arc<JavaUnit>,
        class_node: Node,
        name: &str,
        args: usize,
        seen: &mut HashSet<String>,
    ) -> Option<Resolution> {
        let super_node = class_node.child_by_field_name("superclass")?;
        let super_name = strip_type_decorations(
            node_text(&super_node, unit.source()).trim_start_matches("extends "),
        );
        if super_name.is_empty() || !seen.insert(super_name.clone()) {
            return None;
        }

        match self.qualify_type(unit, &super_name) {
            TypeRef::Project {
                unit: super_unit,
                class_name,
                ..
            } => {
                let super_class = find_class_node(&super_unit, &class_name)?;
                self.lookup_in_class_chain(&super_unit, super_class, name, args, seen)
            }
            TypeRef::External { qualified, package } => {
                // An external supertype can declare anything; attribute the
                // call to it rather than reporting a missing symbol.
                Some(Resolution::External {
                    qualified_name: format!("{}.{}", qualified, name),
                    package,
                })
            }
            TypeRef::Unknown => None,
        }
    }

    /// Match a receiver-less call against the unit's static imports
    fn resolve_static_import(&self, unit: &JavaUnit, name: &str) -> Resolution {
        for import in unit.imports.iter().filter(|i| i.is_static) {
            if import.wildcard {
                return Resolution::External {
                    qualified_name: format!("{}.{}", import.path, name),
                    package: package_of(&import.path),
                };
            }
            if import.simple_name() == Some(name) {
                return Resolution::External {
                    qualified_name: import.path.clone(),
                    package: package_of(&package_of(&import.path)),
                };
            }
        }
        Resolution::Unresolved(FailureKind::NoSuchElement)
    }

    /// Qualify a type name through the unit's context: explicit imports,
    /// types declared in the same unit, the current package, wildcard
    /// imports, then the `java.lang` table.
    fn qualify_type(&self, unit: &Arc<JavaUnit>, type_name: &str) -> TypeRef {
        // Already dotted: either a project type or a library reference
        if type_name.contains('.') {
            return self.qualify_dotted(type_name);
        }

        // Explicit import
        if let Some(import) = unit
            .imports
            .iter()
            .filter(|i| !i.is_static && !i.wildcard)
            .find(|i| i.simple_name() == Some(type_name))
        {
            return self.qualify_dotted(&import.path);
        }

        // Declared in this unit (covers nested classes)
        if unit.declared_type_names().iter().any(|n| n == type_name) {
            let qualified = if unit.package.is_empty() {
                type_name.to_string()
            } else {
                format!("{}.{}", unit.package, type_name)
            };
            return TypeRef::Project {
                unit: unit.clone(),
                class_name: type_name.to_string(),
                qualified,
            };
        }

        // Same package
        let same_package = if unit.package.is_empty() {
            type_name.to_string()
        } else {
            format!("{}.{}", unit.package, type_name)
        };
        if self.index.contains_type(&same_package) {
            return self.qualify_dotted(&same_package);
        }

        // Wildcard imports
        let wildcards: Vec<_> = unit
            .imports
            .iter()
            .filter(|i| !i.is_static && i.wildcard)
            .collect();
        for import in &wildcards {
            let candidate = format!("{}.{}", import.path, type_name);
            if self.index.contains_type(&candidate) {
                return self.qualify_dotted(&candidate);
            }
        }
        if let [only] = wildcards.as_slice() {
            return TypeRef::External {
                qualified: format!("{}.{}", only.path, type_name),
                package: only.path.clone(),
            };
        }

        if JAVA_LANG_TYPES.contains(type_name) {
            return TypeRef::External {
                qualified: format!("java.lang.{}", type_name),
                package: "java.lang".to_string(),
            };
        }

        TypeRef::Unknown
    }

    fn qualify_dotted(&self, qualified: &str) -> TypeRef {
        if self.index.contains_type(qualified) {
            match self.index.unit_for_type(qualified) {
                Ok(unit) => {
                    let class_name = qualified.rsplit('.').next().unwrap_or(qualified).to_string();
                    TypeRef::Project {
                        unit,
                        class_name,
                        qualified: qualified.to_string(),
                    }
                }
                Err(e) => {
                    tracing::warn!(qualified, error = %e, "indexed type failed to parse");
                    TypeRef::Unknown
                }
            }
        } else {
            TypeRef::External {
                package: package_of(qualified),
                qualified: qualified.to_string(),
            }
        }
    }
}

/// `a.b.C` → `a.b`; a bare name has no package
fn package_of(qualified: &str) -> String {
    qualified
        .rsplit_once('.')
        .map(|(pkg, _)| pkg.to_string())
        .unwrap_or_default()
}

fn qualify_member(package: &str, class: &str, member: &str) -> String {
    let mut out = String::new();
    if !package.is_empty() {
        out.push_str(package);
        out.push('.');
    }
    out.push_str(class);
    if !member.is_empty() {
        out.push('.');
        out.push_str(member);
    }
    out
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Drop generics and array suffixes from a type as written
fn strip_type_decorations(type_text: &str) -> String {
    let base = type_text.split('<').next().unwrap_or(type_text);
    base.trim_end_matches("[]").trim().to_string()
}

fn has_class_body(creation: &Node) -> bool {
    let mut cursor = creation.walk();
    let result = creation
        .children(&mut cursor)
        .any(|c| c.kind() == "class_body");
    result
}

/// Nearest enclosing type declaration of a node
fn enclosing_type(node: Node) -> Option<Node> {
    enclosing(node, "class_declaration")
        .or_else(|| enclosing(node, "enum_declaration"))
        .or_else(|| enclosing(node, "interface_declaration"))
}

/// Find a class/interface/enum declaration by simple name in a unit
fn find_class_node<'t>(unit: &'t JavaUnit, name: &str) -> Option<Node<'t>> {
    crate::ast::collect_kinds(
        unit.root(),
        &[
            "class_declaration",
            "interface_declaration",
            "enum_declaration",
        ],
    )
    .into_iter()
    .find(|d| {
        d.child_by_field_name("name")
            .map(|n| node_text(&n, unit.source()) == name)
            .unwrap_or(false)
    })
}

/// Look up `name` among the methods declared directly in a class scope
/// (nested type bodies are not searched). Overload sets are split by
/// argument count; several surviving candidates are ambiguous.
fn lookup_method(class_node: Node, unit: &JavaUnit, name: &str, args: usize) -> MethodLookup {
    let Some(body) = class_node.child_by_field_name("body") else {
        return MethodLookup::NotFound;
    };

    let mut candidates = Vec::new();
    collect_own_methods(body, unit, name, &mut candidates);

    match candidates.len() {
        0 => MethodLookup::NotFound,
        1 => MethodLookup::Found,
        _ => {
            let arity_matches = candidates
                .iter()
                .filter(|m| {
                    m.child_by_field_name("parameters")
                        .map(|p| p.named_child_count() == args)
                        .unwrap_or(false)
                })
                .count();
            match arity_matches {
                1 => MethodLookup::Found,
                _ => MethodLookup::Ambiguous,
            }
        }
    }
}

/// Declared type of a simple-name receiver: method parameters and locals
/// first, then fields of the enclosing classes. Declaration order within
/// the method is not checked; shadowing across scopes in the same method
/// resolves to the first declaration found.
fn find_variable_type(unit: &JavaUnit, call: Node, var_name: &str) -> Option<String> {
    let source = unit.source();

    if let Some(method) = enclosing(call, "method_declaration") {
        if let Some(params) = method.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.children(&mut cursor) {
                if param.kind() != "formal_parameter" {
                    continue;
                }
                let matches = param
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, source) == var_name)
                    .unwrap_or(false);
                if matches {
                    return param
                        .child_by_field_name("type")
                        .map(|t| strip_type_decorations(node_text(&t, source)));
                }
            }
        }

        for decl in crate::ast::collect_kinds(
            method,
            &["local_variable_declaration", "enhanced_for_statement"],
        ) {
            if let Some(ty) = declared_type_if_named(decl, source, var_name) {
                return Some(ty);
            }
        }
    }

    // Fields of the enclosing type chain
    let mut scope = enclosing_type(call);
    while let Some(class_node) = scope {
        if let Some(body) = class_node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                if member.kind() != "field_declaration" {
                    continue;
                }
                if let Some(ty) = declared_type_if_named(member, source, var_name) {
                    return Some(ty);
                }
            }
        }
        scope = enclosing_type(class_node);
    }

    None
}

/// Type of a declaration node if it declares `var_name`. Handles
/// `local_variable_declaration`, `field_declaration` (through their
/// `variable_declarator`s) and `enhanced_for_statement` (direct name).
fn declared_type_if_named(decl: Node, source: &str, var_name: &str) -> Option<String> {
    let type_node = decl.child_by_field_name("type")?;

    if decl.kind() == "enhanced_for_statement" {
        let named = decl
            .child_by_field_name("name")
            .map(|n| node_text(&n, source) == var_name)
            .unwrap_or(false);
        return named.then(|| strip_type_decorations(node_text(&type_node, source)));
    }

    let mut cursor = decl.walk();
    for child in decl.children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let named = child
            .child_by_field_name("name")
            .map(|n| node_text(&n, source) == var_name)
            .unwrap_or(false);
        if named {
            return Some(strip_type_decorations(node_text(&type_node, source)));
        }
    }
    None
}

/// Collect method declarations in a class body without descending into
/// nested type declarations or anonymous classes.
fn collect_own_methods<'t>(
    node: Node<'t>,
    unit: &JavaUnit,
    name: &str,
    out: &mut Vec<Node<'t>>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "method_declaration" => {
                if child
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, unit.source()) == name)
                    .unwrap_or(false)
                {
                    out.push(child);
                }
            }
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "object_creation_expression" => {}
            _ => collect_own_methods(child, unit, name, out),
        }
    }
}
