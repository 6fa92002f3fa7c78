//! Project source-tree index and parse cache
//!
//! Collects the `.java` files under the configured roots, derives each
//! file's qualified type name from its path, and parses files lazily into
//! [`JavaUnit`]s that stay cached for the rest of the run. Membership in
//! this index is what separates in-project declarations (recursable) from
//! external ones (a terminal leaf in the walk).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tree_sitter::{Node, Tree};

use crate::ast::{collect_kinds, node_text};
use crate::error::{BenchProbeError, Result};

/// A single `import` declaration of a compilation unit
#[derive(Debug, Clone)]
pub struct Import {
    /// Dotted path as written, without any trailing `.*`
    pub path: String,
    pub wildcard: bool,
    pub is_static: bool,
}

impl Import {
    /// Simple name of the imported type (`a.b.C` → `C`); `None` for
    /// wildcard imports.
    pub fn simple_name(&self) -> Option<&str> {
        if self.wildcard {
            None
        } else {
            self.path.rsplit('.').next()
        }
    }
}

/// A parsed Java compilation unit
pub struct JavaUnit {
    pub path: PathBuf,
    pub package: String,
    pub imports: Vec<Import>,
    source: String,
    tree: Tree,
}

impl JavaUnit {
    /// Parse `source` as Java. A fresh parser is constructed per file; the
    /// grammar never changes within a run.
    pub fn parse(path: &Path, source: String) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| BenchProbeError::ParseFailure {
                message: format!("failed to set Java grammar: {:?}", e),
            })?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| BenchProbeError::ParseFailure {
                message: format!("failed to parse {}", path.display()),
            })?;

        let root = tree.root_node();
        let package = extract_package(&root, &source);
        let imports = extract_imports(&root, &source);

        Ok(Self {
            path: path.to_path_buf(),
            package,
            imports,
            source,
            tree,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// First method declaration with the given name, anywhere in the unit
    /// (nested and anonymous classes included).
    pub fn find_method(&self, name: &str) -> Option<Node<'_>> {
        collect_kinds(self.root(), &["method_declaration"])
            .into_iter()
            .find(|m| {
                m.child_by_field_name("name")
                    .map(|n| node_text(&n, &self.source) == name)
                    .unwrap_or(false)
            })
    }

    /// Simple names of the types declared at any level of this unit
    pub fn declared_type_names(&self) -> Vec<String> {
        collect_kinds(
            self.root(),
            &[
                "class_declaration",
                "interface_declaration",
                "enum_declaration",
                "record_declaration",
            ],
        )
        .into_iter()
        .filter_map(|d| d.child_by_field_name("name"))
        .map(|n| node_text(&n, &self.source).to_string())
        .collect()
    }
}

fn extract_package(root: &Node, source: &str) -> String {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "package_declaration" {
            let mut inner = child.walk();
            for part in child.children(&mut inner) {
                if matches!(part.kind(), "scoped_identifier" | "identifier") {
                    return node_text(&part, source).to_string();
                }
            }
        }
    }
    String::new()
}

fn extract_imports(root: &Node, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "import_declaration" {
            continue;
        }
        let mut path = None;
        let mut wildcard = false;
        let mut is_static = false;
        let mut inner = child.walk();
        for part in child.children(&mut inner) {
            match part.kind() {
                "scoped_identifier" | "identifier" => {
                    path = Some(node_text(&part, source).to_string());
                }
                "asterisk" => wildcard = true,
                "static" => is_static = true,
                _ => {}
            }
        }
        if let Some(path) = path {
            imports.push(Import {
                path,
                wildcard,
                is_static,
            });
        }
    }
    imports
}

/// Index of every type declared under the analyzed source roots
pub struct ProjectIndex {
    /// Qualified type name → file declaring it
    types: HashMap<String, PathBuf>,
    /// Simple type name → qualified candidates
    simple: HashMap<String, Vec<String>>,
    /// Lazy parse cache; the batch is single-threaded, a `RefCell` is all
    /// the interior mutability needed
    units: RefCell<HashMap<PathBuf, Arc<JavaUnit>>>,
}

impl ProjectIndex {
    /// Scan the given roots for `.java` files. A missing root is logged
    /// and skipped; entries that later need it fail individually.
    pub fn scan(roots: &[PathBuf]) -> Self {
        let mut types = HashMap::new();
        let mut simple: HashMap<String, Vec<String>> = HashMap::new();

        for root in roots {
            if !root.is_dir() {
                tracing::warn!(root = %root.display(), "source root is not a directory, skipping");
                continue;
            }
            let mut files = Vec::new();
            collect_java_files(root, &mut files);
            for file in files {
                let Some(qualified) = qualified_name_for(root, &file) else {
                    continue;
                };
                let simple_name = qualified
                    .rsplit('.')
                    .next()
                    .unwrap_or(&qualified)
                    .to_string();
                simple.entry(simple_name).or_default().push(qualified.clone());
                types.entry(qualified).or_insert(file);
            }
        }

        tracing::debug!(types = types.len(), "project index built");
        Self {
            types,
            simple,
            units: RefCell::new(HashMap::new()),
        }
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn contains_type(&self, qualified: &str) -> bool {
        self.types.contains_key(qualified)
    }

    /// Qualified candidates for a simple type name
    pub fn candidates(&self, simple_name: &str) -> Vec<String> {
        self.simple.get(simple_name).cloned().unwrap_or_default()
    }

    /// Parsed unit for a qualified type name known to the index
    pub fn unit_for_type(&self, qualified: &str) -> Result<Arc<JavaUnit>> {
        let path = self
            .types
            .get(qualified)
            .ok_or_else(|| BenchProbeError::FileNotFound {
                path: qualified.to_string(),
            })?
            .clone();
        self.unit_for_path(&path)
    }

    /// Parsed unit for an arbitrary file path, cached for the run
    pub fn unit_for_path(&self, path: &Path) -> Result<Arc<JavaUnit>> {
        if let Some(unit) = self.units.borrow().get(path) {
            return Ok(unit.clone());
        }

        let source = fs::read_to_string(path).map_err(|_| BenchProbeError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let unit = Arc::new(JavaUnit::parse(path, source)?);
        self.units
            .borrow_mut()
            .insert(path.to_path_buf(), unit.clone());
        Ok(unit)
    }
}

/// Recursively collect `.java` files, skipping hidden entries and build
/// output directories.
fn collect_java_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if should_skip_path(&path) {
            continue;
        }
        if path.is_dir() {
            collect_java_files(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("java") {
            files.push(path);
        }
    }
}

fn should_skip_path(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.starts_with('.') || matches!(name, "target" | "build" | "out"),
        None => false,
    }
}

/// `<root>/a/b/C.java` → `a.b.C`
fn qualified_name_for(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let stem = rel.file_stem()?.to_str()?;
    let mut segments: Vec<&str> = rel
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect()
        })
        .unwrap_or_default();
    segments.push(stem);
    Some(segments.join("."))
}
