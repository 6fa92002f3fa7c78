//! Recursive call-graph walker
//!
//! Visits a method declaration, extracts its structural metrics, resolves
//! every instantiation and call expression, recurses into in-project
//! targets, and accumulates everything into one [`AggregateStats`] owned
//! by the current benchmark entry. External targets are recorded but form
//! the boundary of the walk.
//!
//! There is no cycle detection: the depth bound is the only recursion
//! limit, and revisits of the same declaration are counted again. The
//! produced metrics are a sum over the full, possibly repeated, traversal
//! rather than over a deduplicated call graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use tree_sitter::Node;

use crate::ast::{collect_kinds, node_text};
use crate::ledger::FailureLedger;
use crate::location::SourceLocation;
use crate::metrics;
use crate::project::{JavaUnit, ProjectIndex};
use crate::resolve::{ConstructorResolution, Resolution, Resolver};

/// Accumulator for one top-level walk. Created fresh per benchmark entry
/// and threaded through the recursion by reference; nothing here is
/// shared between entries.
#[derive(Debug, Default, Clone)]
pub struct AggregateStats {
    /// Resolved call target → times called anywhere in the subtree
    pub method_calls: BTreeMap<String, u64>,
    /// Instantiated type → instantiation count
    pub object_instantiations: BTreeMap<String, u64>,
    /// Package touched by a call or instantiation → access count
    pub package_accesses: BTreeMap<String, u64>,

    pub conditionals: u64,
    pub loops: u64,
    pub nested_loops: u64,

    pub lines_of_code: u64,
    pub logical_lines: u64,
    /// Line counts of the entry method alone (depth 0)
    pub entry_lines_of_code: u64,
    pub entry_logical_lines: u64,

    /// Call sites that resolved into the project and were recursed into
    pub project_calls: u64,
}

impl AggregateStats {
    /// Sum of all resolved call counts
    pub fn total_calls(&self) -> u64 {
        self.method_calls.values().sum()
    }

    fn bump(map: &mut BTreeMap<String, u64>, key: String) {
        *map.entry(key).or_insert(0) += 1;
    }
}

pub struct MethodWalker<'a> {
    resolver: Resolver<'a>,
    max_depth: usize,
}

impl<'a> MethodWalker<'a> {
    pub fn new(index: &'a ProjectIndex, max_depth: usize) -> Self {
        Self {
            resolver: Resolver::new(index),
            max_depth,
        }
    }

    /// Walk one method declaration at the given depth, accumulating into
    /// `stats` and classifying resolution failures into `ledger` under
    /// `origin` (the benchmark entry that started the walk).
    pub fn walk(
        &self,
        unit: &Arc<JavaUnit>,
        method: Node,
        depth: usize,
        stats: &mut AggregateStats,
        ledger: &mut FailureLedger,
        origin: &SourceLocation,
    ) {
        if depth >= self.max_depth {
            let name = method
                .child_by_field_name("name")
                .map(|n| node_text(&n, unit.source()))
                .unwrap_or("<unnamed>");
            tracing::debug!(method = %name, depth, "maximum recursion depth reached");
            return;
        }

        let m = metrics::extract(method);
        stats.conditionals += m.conditionals;
        stats.loops += m.loops;
        stats.nested_loops += m.nested_loops();
        stats.lines_of_code += m.lines_of_code;
        stats.logical_lines += m.logical_lines;
        if depth == 0 {
            stats.entry_lines_of_code += m.lines_of_code;
            stats.entry_logical_lines += m.logical_lines;
        }

        self.record_instantiations(unit, method, stats, ledger, origin);
        self.record_calls(unit, method, depth, stats, ledger, origin);
    }

    fn record_instantiations(
        &self,
        unit: &Arc<JavaUnit>,
        method: Node,
        stats: &mut AggregateStats,
        ledger: &mut FailureLedger,
        origin: &SourceLocation,
    ) {
        for creation in collect_kinds(method, &["object_creation_expression"]) {
            match self.resolver.resolve_constructor(unit, creation) {
                ConstructorResolution::Resolved {
                    type_name,
                    package,
                    anonymous,
                } => {
                    if anonymous {
                        tracing::trace!(supertype = %type_name, "anonymous class instantiation");
                    }
                    AggregateStats::bump(&mut stats.object_instantiations, type_name);
                    if !package.is_empty() {
                        AggregateStats::bump(&mut stats.package_accesses, package);
                    }
                }
                ConstructorResolution::Unresolved(kind) => {
                    ledger.record(kind, origin.clone());
                }
            }
        }
    }

    fn record_calls(
        &self,
        unit: &Arc<JavaUnit>,
        method: Node,
        depth: usize,
        stats: &mut AggregateStats,
        ledger: &mut FailureLedger,
        origin: &SourceLocation,
    ) {
        for call in collect_kinds(method, &["method_invocation"]) {
            match self.resolver.resolve_call(unit, call) {
                Resolution::Project(target) => {
                    AggregateStats::bump(&mut stats.method_calls, target.qualified_name.clone());
                    if !target.package.is_empty() {
                        AggregateStats::bump(&mut stats.package_accesses, target.package.clone());
                    }
                    stats.project_calls += 1;

                    // Re-locate the declaration in its own unit; the first
                    // method with that name wins.
                    let target_unit = target.unit.clone();
                    match target_unit.find_method(&target.method) {
                        Some(target_node) => {
                            self.walk(&target_unit, target_node, depth + 1, stats, ledger, origin);
                        }
                        None => {
                            ledger.record(
                                crate::resolve::FailureKind::NoSuchElement,
                                origin.clone(),
                            );
                        }
                    }
                }
                Resolution::External {
                    qualified_name,
                    package,
                } => {
                    AggregateStats::bump(&mut stats.method_calls, qualified_name);
                    if !package.is_empty() {
                        AggregateStats::bump(&mut stats.package_accesses, package);
                    }
                }
                Resolution::Unresolved(kind) => {
                    tracing::debug!(kind = kind.label(), %origin, "call resolution failed");
                    ledger.record(kind, origin.clone());
                }
            }
        }
    }
}
