//! Structural metric extraction
//!
//! Pure functions over a single method declaration node: branching and
//! looping construct counts, maximum loop-nesting depth, and line counts.
//! No resolution happens here; the walker sums these per visited method.

use tree_sitter::Node;

use crate::ast::{collect_kinds, visit_all};

/// Loop statement kinds. Enhanced-for is deliberately absent: only classic
/// `for`, `while` and `do` count as loops.
const LOOP_KINDS: [&str; 3] = ["for_statement", "while_statement", "do_statement"];

/// Structural metrics of one method declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodMetrics {
    /// `if` nodes (each `else if` is its own node) plus non-default
    /// `case` labels
    pub conditionals: u64,
    /// `for`/`while`/`do` nodes anywhere in the body
    pub loops: u64,
    /// Deepest loop nesting reached; 0 when the method has no loops
    pub max_nesting: u64,
    /// Source line span of the declaration
    pub lines_of_code: u64,
    /// Statement-node count
    pub logical_lines: u64,
}

impl MethodMetrics {
    /// Nested-loop count reported upward: one non-nested loop contributes
    /// 0, two levels contribute 1.
    pub fn nested_loops(&self) -> u64 {
        self.max_nesting.saturating_sub(1)
    }
}

/// Extract all structural metrics from a method declaration. Metrics are
/// a function of node structure alone; no source text is consulted.
pub fn extract(method: Node) -> MethodMetrics {
    MethodMetrics {
        conditionals: count_conditionals(method),
        loops: count_loops(method),
        max_nesting: loop_nesting_depth(method, 0),
        lines_of_code: count_lines(method),
        logical_lines: count_logical_lines(method),
    }
}

fn count_conditionals(method: Node) -> u64 {
    let ifs = collect_kinds(method, &["if_statement"]).len() as u64;

    // Non-default case labels across every switch in the method
    let mut cases = 0u64;
    for label in collect_kinds(method, &["switch_label"]) {
        if label.child(0).map(|c| c.kind() == "case").unwrap_or(false) {
            cases += 1;
        }
    }

    ifs + cases
}

fn count_loops(method: Node) -> u64 {
    collect_kinds(method, &LOOP_KINDS).len() as u64
}

/// Depth-first walk that increments depth only when descending into a loop
/// node, returning the maximum depth reached anywhere in the subtree.
fn loop_nesting_depth(node: Node, depth: u64) -> u64 {
    let mut max_depth = depth;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let child_depth = if LOOP_KINDS.contains(&child.kind()) {
            loop_nesting_depth(child, depth + 1)
        } else {
            loop_nesting_depth(child, depth)
        };
        max_depth = max_depth.max(child_depth);
    }
    max_depth
}

fn count_lines(method: Node) -> u64 {
    (method.end_position().row - method.start_position().row + 1) as u64
}

fn count_logical_lines(method: Node) -> u64 {
    let mut count = 0u64;
    visit_all(method, &mut |node| {
        let kind = node.kind();
        if kind.ends_with("_statement") || kind == "local_variable_declaration" {
            count += 1;
        }
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{collect_kinds, node_text};

    /// Parse a class body and hand the named method's metrics to the test
    fn metrics_for(body: &str, method: &str) -> MethodMetrics {
        let source = format!("class Stub {{\n{}\n}}\n", body);
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(&source, None).unwrap();
        let node = collect_kinds(tree.root_node(), &["method_declaration"])
            .into_iter()
            .find(|m| {
                m.child_by_field_name("name")
                    .map(|n| node_text(&n, &source) == method)
                    .unwrap_or(false)
            })
            .expect("method not found in stub");
        extract(node)
    }

    #[test]
    fn test_empty_method_has_no_loops() {
        let m = metrics_for("void empty() { }", "empty");
        assert_eq!(m.loops, 0);
        assert_eq!(m.max_nesting, 0);
        assert_eq!(m.nested_loops(), 0);
        assert_eq!(m.conditionals, 0);
    }

    #[test]
    fn test_sequential_loops_do_not_nest() {
        let m = metrics_for(
            r#"void twoLoop() {
                for (int i = 0; i < 1; i++) { }
                for (int j = 0; j < 1; j++) { }
            }"#,
            "twoLoop",
        );
        assert_eq!(m.loops, 2);
        assert_eq!(m.nested_loops(), 0);
    }

    #[test]
    fn test_one_nested_loop() {
        let m = metrics_for(
            r#"void twoLoopNested() {
                for (int i = 0; i < 1; i++) {
                    for (int j = 0; j < 1; j++) { }
                }
            }"#,
            "twoLoopNested",
        );
        assert_eq!(m.loops, 2);
        assert_eq!(m.max_nesting, 2);
        assert_eq!(m.nested_loops(), 1);
    }

    #[test]
    fn test_three_loops_one_nested() {
        let m = metrics_for(
            r#"void threeLoop() {
                for (int i = 0; i < 1; i++) {
                    for (int j = 0; j < 1; j++) { }
                    for (int k = 0; k < 1; k++) { }
                }
            }"#,
            "threeLoop",
        );
        assert_eq!(m.loops, 3);
        assert_eq!(m.max_nesting, 2);
        assert_eq!(m.nested_loops(), 1);
    }

    #[test]
    fn test_deeply_nested_loops() {
        let m = metrics_for(
            r#"void fourLoop() {
                for (int i = 0; i < 1; i++) {
                    for (int j = 0; j < 1; j++) {
                        for (int k = 0; k < 1; k++) {
                            for (int l = 0; l < 1; l++) { }
                        }
                    }
                }
            }"#,
            "fourLoop",
        );
        assert_eq!(m.loops, 4);
        assert_eq!(m.max_nesting, 4);
        assert_eq!(m.nested_loops(), 3);
    }

    #[test]
    fn test_while_and_do_count_as_loops() {
        let m = metrics_for(
            r#"void mixed() {
                while (true) {
                    do { } while (false);
                }
            }"#,
            "mixed",
        );
        assert_eq!(m.loops, 2);
        assert_eq!(m.nested_loops(), 1);
    }

    #[test]
    fn test_enhanced_for_is_not_counted() {
        let m = metrics_for(
            r#"void forEach(java.util.List<String> xs) {
                for (String x : xs) { }
            }"#,
            "forEach",
        );
        assert_eq!(m.loops, 0);
    }

    #[test]
    fn test_if_with_else_counts_once() {
        let m = metrics_for(
            r#"void oneIf() {
                if (true) { } else { }
            }"#,
            "oneIf",
        );
        assert_eq!(m.conditionals, 1);
    }

    #[test]
    fn test_else_if_counts_separately() {
        let m = metrics_for(
            r#"void twoIf() {
                if (true) { }
                else if (true) { }
                else { }
            }"#,
            "twoIf",
        );
        assert_eq!(m.conditionals, 2);
    }

    #[test]
    fn test_switch_cases_exclude_default() {
        let m = metrics_for(
            r#"void threeCase(String s) {
                switch (s) {
                    case "1": break;
                    case "2": break;
                    case "3": break;
                    default: break;
                }
            }"#,
            "threeCase",
        );
        assert_eq!(m.conditionals, 3);
    }

    #[test]
    fn test_ifs_and_cases_sum() {
        let m = metrics_for(
            r#"void both(String s) {
                if (s != null) {
                    switch (s) {
                        case "1": break;
                        case "2": break;
                    }
                }
            }"#,
            "both",
        );
        assert_eq!(m.conditionals, 3);
    }

    #[test]
    fn test_line_counts() {
        let m = metrics_for(
            "void span() {\n    int x = 0;\n    x += 1;\n}",
            "span",
        );
        assert_eq!(m.lines_of_code, 4);
        // one declaration + one expression statement
        assert_eq!(m.logical_lines, 2);
    }
}
