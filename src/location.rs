//! Benchmark identity mapping
//!
//! Benchmark identifiers encode the JUnit test they drive as
//! `<dotted.class.path>_<methodName>`. The method name is the suffix after
//! the last underscore; the rest maps onto a Java source file below the
//! test root. The convention is applied as-is, without checking the source
//! layout first; identifiers that do not fit are rejected and handled as
//! entry-level failures by the orchestrator.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{BenchProbeError, Result};

/// A Java source file (relative to a root, `/`-separated) plus a method name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: String,
    pub method: String,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            method: method.into(),
        }
    }

    /// Derive a location from a benchmark identifier.
    ///
    /// `"pkg.Foo_bar"` becomes `pkg/Foo.java` + `bar`. Identifiers without
    /// an underscore, or with an empty class path or method part, are
    /// malformed.
    pub fn from_benchmark_id(id: &str) -> Result<Self> {
        let underscore = id
            .rfind('_')
            .ok_or_else(|| BenchProbeError::MalformedIdentifier { id: id.to_string() })?;

        let class_path = &id[..underscore];
        let method = &id[underscore + 1..];
        if class_path.is_empty() || method.is_empty() {
            return Err(BenchProbeError::MalformedIdentifier { id: id.to_string() });
        }

        let file = format!("{}.java", class_path.replace('.', "/"));
        Ok(Self::new(file, method))
    }

    /// Key used for this location's record in the output report:
    /// the slash path without its extension, a dot, then the method name.
    pub fn report_key(&self) -> String {
        let stem = self.file.strip_suffix(".java").unwrap_or(&self.file);
        format!("{}.{}", stem, self.method)
    }

    /// The location's file as a relative filesystem path
    pub fn fs_path(&self) -> PathBuf {
        PathBuf::from(&self.file)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.file, self.method)
    }
}

/// One record of the input index: a benchmark identifier and its
/// externally measured stability score. Deserialized from a 2-element
/// JSON array, order-preserving across the whole index.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkEntry(pub String, pub f64);

impl BenchmarkEntry {
    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn score(&self) -> f64 {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_identifier() {
        let loc = SourceLocation::from_benchmark_id("pkg.Foo_bar").unwrap();
        assert_eq!(loc.file, "pkg/Foo.java");
        assert_eq!(loc.method, "bar");
        assert_eq!(loc.report_key(), "pkg/Foo.bar");
    }

    #[test]
    fn test_deep_package() {
        let loc =
            SourceLocation::from_benchmark_id("io.reactivex.rxjava3.core.FlowableTest_flatMap")
                .unwrap();
        assert_eq!(loc.file, "io/reactivex/rxjava3/core/FlowableTest.java");
        assert_eq!(loc.method, "flatMap");
    }

    #[test]
    fn test_method_name_is_last_underscore_suffix() {
        // Underscores before the last one belong to the class path
        let loc = SourceLocation::from_benchmark_id("pkg.Foo_Benchmark_bar").unwrap();
        assert_eq!(loc.file, "pkg/Foo_Benchmark.java");
        assert_eq!(loc.method, "bar");
    }

    #[test]
    fn test_missing_underscore_is_malformed() {
        assert!(SourceLocation::from_benchmark_id("pkg.Foo.bar").is_err());
        assert!(SourceLocation::from_benchmark_id("_bar").is_err());
        assert!(SourceLocation::from_benchmark_id("pkg.Foo_").is_err());
    }

    #[test]
    fn test_entry_deserializes_from_pair() {
        let entries: Vec<BenchmarkEntry> =
            serde_json::from_str(r#"[["pkg.Foo_bar", 0.2], ["pkg.Baz_qux", 0.9]]"#).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id(), "pkg.Foo_bar");
        assert!((entries[1].score() - 0.9).abs() < f64::EPSILON);
    }
}
