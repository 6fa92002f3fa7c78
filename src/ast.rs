//! Small tree-sitter node helpers shared by the metric extractor,
//! the resolver, and the walker.

use tree_sitter::Node;

/// Get the source text of a node
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Collect every descendant of `node` (including `node` itself) whose kind
/// matches one of `kinds`, in depth-first source order.
pub fn collect_kinds<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    collect_kinds_into(node, kinds, &mut out);
    out
}

fn collect_kinds_into<'t>(node: Node<'t>, kinds: &[&str], out: &mut Vec<Node<'t>>) {
    if kinds.contains(&node.kind()) {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_kinds_into(child, kinds, out);
    }
}

/// Visit every descendant of `node` (including `node` itself)
pub fn visit_all<'t, F: FnMut(Node<'t>)>(node: Node<'t>, f: &mut F) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_all(child, f);
    }
}

/// Number of arguments in a call or constructor `argument_list`
pub fn argument_count(node: &Node) -> usize {
    match node.child_by_field_name("arguments") {
        Some(args) => args.named_child_count(),
        None => 0,
    }
}

/// Nearest ancestor of `node` with the given kind
pub fn enclosing<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == kind {
            return Some(n);
        }
        current = n.parent();
    }
    None
}
