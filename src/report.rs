//! Report sink
//!
//! Collects one [`ParsedMethodRecord`] per successfully walked benchmark
//! and persists them as a single JSON object keyed by
//! `<path-without-extension>.<methodName>`. The flush rewrites the whole
//! file from current state, so triggering it twice is harmless; a drop
//! guard performs a best-effort flush when the explicit one never ran,
//! which keeps already-computed records across a panic escaping the
//! batch loop.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::location::SourceLocation;
use crate::walker::AggregateStats;

/// Per-benchmark output unit, immutable once handed to the sink
#[derive(Debug, Clone, Serialize)]
pub struct ParsedMethodRecord {
    pub file_path: String,
    pub method_name: String,
    pub method_calls: BTreeMap<String, u64>,
    pub object_instantiations: BTreeMap<String, u64>,
    pub package_accesses: BTreeMap<String, u64>,
    pub conditionals: u64,
    pub loops: u64,
    pub nested_loops: u64,
    pub lines_of_code: u64,
    pub logical_lines_of_code: u64,
    /// Line counts of the benchmark's entry method alone
    pub entry_lines_of_code: u64,
    pub entry_logical_lines_of_code: u64,
    /// Sum of `method_calls` values
    pub total_calls: u64,
    /// Call sites that resolved into the project and were recursed into
    pub project_calls: u64,
    /// Externally measured stability score merged in by the orchestrator
    pub stability_score: f64,
}

impl ParsedMethodRecord {
    /// Merge a completed walk with its externally supplied score
    pub fn from_walk(location: &SourceLocation, stats: AggregateStats, score: f64) -> Self {
        let total_calls = stats.total_calls();
        Self {
            file_path: location.file.clone(),
            method_name: location.method.clone(),
            method_calls: stats.method_calls,
            object_instantiations: stats.object_instantiations,
            package_accesses: stats.package_accesses,
            conditionals: stats.conditionals,
            loops: stats.loops,
            nested_loops: stats.nested_loops,
            lines_of_code: stats.lines_of_code,
            logical_lines_of_code: stats.logical_lines,
            entry_lines_of_code: stats.entry_lines_of_code,
            entry_logical_lines_of_code: stats.entry_logical_lines,
            total_calls,
            project_calls: stats.project_calls,
            stability_score: score,
        }
    }
}

/// Accumulates records and writes them out once
pub struct ReportSink {
    path: PathBuf,
    records: BTreeMap<String, ParsedMethodRecord>,
    flushed: bool,
}

impl ReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
            flushed: false,
        }
    }

    pub fn add(&mut self, location: &SourceLocation, record: ParsedMethodRecord) {
        self.records.insert(location.report_key(), record);
        self.flushed = false;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full record map to the output path
    pub fn flush(&mut self) -> Result<()> {
        self.write_file()?;
        self.flushed = true;
        Ok(())
    }

    fn write_file(&self) -> Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.records)?;
        Ok(())
    }
}

impl Drop for ReportSink {
    fn drop(&mut self) {
        if !self.flushed {
            if let Err(e) = self.write_file() {
                tracing::warn!(path = %self.path.display(), error = %e, "flush on drop failed");
            }
        }
    }
}
