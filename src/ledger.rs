//! Failure ledger
//!
//! Run-scoped classification of resolution failures into five buckets,
//! keyed by the source location of the benchmark being walked when the
//! failure occurred. Appended to for the whole run and never cleared;
//! the orchestrator also uses it as a skip-list for locations already
//! known to fail.

use std::fmt::Write as _;

use crate::location::SourceLocation;
use crate::resolve::FailureKind;

#[derive(Debug, Default)]
pub struct FailureLedger {
    ambiguous: Vec<SourceLocation>,
    unsupported_operation: Vec<SourceLocation>,
    concurrent_modification: Vec<SourceLocation>,
    no_such_element: Vec<SourceLocation>,
    other: Vec<SourceLocation>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: FailureKind, location: SourceLocation) {
        self.bucket_mut(kind).push(location);
    }

    /// Whether any bucket holds this location
    pub fn contains(&self, location: &SourceLocation) -> bool {
        self.buckets().any(|(_, b)| b.contains(location))
    }

    pub fn bucket(&self, kind: FailureKind) -> &[SourceLocation] {
        match kind {
            FailureKind::Ambiguous => &self.ambiguous,
            FailureKind::UnsupportedOperation => &self.unsupported_operation,
            FailureKind::ConcurrentModification => &self.concurrent_modification,
            FailureKind::NoSuchElement => &self.no_such_element,
            FailureKind::Other => &self.other,
        }
    }

    pub fn total(&self) -> usize {
        self.buckets().map(|(_, b)| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// One line per bucket, printed at the end of a run
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (kind, bucket) in self.buckets() {
            let locations: Vec<String> = bucket.iter().map(|l| l.to_string()).collect();
            let _ = writeln!(
                out,
                "{}: {} [{}]",
                kind.label(),
                bucket.len(),
                locations.join(", ")
            );
        }
        out
    }

    fn buckets(&self) -> impl Iterator<Item = (FailureKind, &Vec<SourceLocation>)> {
        [
            (FailureKind::Ambiguous, &self.ambiguous),
            (
                FailureKind::UnsupportedOperation,
                &self.unsupported_operation,
            ),
            (
                FailureKind::ConcurrentModification,
                &self.concurrent_modification,
            ),
            (FailureKind::NoSuchElement, &self.no_such_element),
            (FailureKind::Other, &self.other),
        ]
        .into_iter()
    }

    fn bucket_mut(&mut self, kind: FailureKind) -> &mut Vec<SourceLocation> {
        match kind {
            FailureKind::Ambiguous => &mut self.ambiguous,
            FailureKind::UnsupportedOperation => &mut self.unsupported_operation,
            FailureKind::ConcurrentModification => &mut self.concurrent_modification,
            FailureKind::NoSuchElement => &mut self.no_such_element,
            FailureKind::Other => &mut self.other,
        }
    }
}
