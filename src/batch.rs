//! Batch orchestration
//!
//! Drives the walker over a requested slice of the benchmark index with
//! partial-failure isolation: one bad entry is logged and skipped, the
//! batch never halts for it. Only an unreadable index or an empty /
//! inverted range abort the run. The report sink's drop guard keeps
//! accumulated records even when an error or panic escapes the loop.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{BenchProbeError, Result};
use crate::ledger::FailureLedger;
use crate::location::{BenchmarkEntry, SourceLocation};
use crate::project::ProjectIndex;
use crate::report::{ParsedMethodRecord, ReportSink};
use crate::resolve::FailureKind;
use crate::walker::{AggregateStats, MethodWalker};

/// Everything one batch invocation needs
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub index_path: PathBuf,
    pub source_root: PathBuf,
    pub test_root: PathBuf,
    pub output: PathBuf,
    /// Inclusive range into the index; both ends are clamped to the valid
    /// range before use
    pub first: Option<usize>,
    pub last: Option<usize>,
    pub max_depth: usize,
}

/// Running counts reported back to the caller
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchSummary {
    pub attempted: usize,
    pub successful: usize,
    pub written: usize,
}

/// Run the batch described by `config`
pub fn run(config: &BatchConfig) -> Result<BatchSummary> {
    let entries = read_index(&config.index_path)?;
    if entries.is_empty() {
        return Err(BenchProbeError::IndexFormat {
            message: "benchmark index is empty".to_string(),
        });
    }

    let first = config.first.unwrap_or(0);
    let last = config.last.unwrap_or(entries.len() - 1).min(entries.len() - 1);
    if first > last {
        return Err(BenchProbeError::InvalidRange {
            first,
            last,
            len: entries.len(),
        });
    }

    let index = ProjectIndex::scan(&[config.source_root.clone(), config.test_root.clone()]);
    eprintln!("Indexed {} project types", index.type_count());
    if index.type_count() == 0 {
        eprintln!("Warning: no Java sources found under the configured roots");
    }

    let walker = MethodWalker::new(&index, config.max_depth);
    let mut ledger = FailureLedger::new();
    let mut sink = ReportSink::new(&config.output);
    let mut summary = BatchSummary::default();

    let bar = ProgressBar::new((last - first + 1) as u64);
    bar.set_style(
        ProgressStyle::with_template("[{pos}/{len}] {bar:30} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for entry in &entries[first..=last] {
        summary.attempted += 1;
        if process_entry(entry, config, &index, &walker, &mut ledger, &mut sink) {
            summary.successful += 1;
        }
        bar.set_message(format!(
            "{} ok / {} attempted",
            summary.successful, summary.attempted
        ));
        bar.inc(1);
    }
    bar.finish_and_clear();

    eprint!("{}", ledger.summary());
    eprintln!(
        "Successful walks: {}/{}",
        summary.successful, summary.attempted
    );

    sink.flush()?;
    summary.written = sink.len();
    Ok(summary)
}

/// Process one index entry; returns whether a record was produced
fn process_entry(
    entry: &BenchmarkEntry,
    config: &BatchConfig,
    index: &ProjectIndex,
    walker: &MethodWalker,
    ledger: &mut FailureLedger,
    sink: &mut ReportSink,
) -> bool {
    let location = match SourceLocation::from_benchmark_id(entry.id()) {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!(id = entry.id(), error = %e, "skipping entry");
            return false;
        }
    };

    // A location that already failed earlier in the run is not retried
    if ledger.contains(&location) {
        tracing::info!(%location, "known failing location, skipping");
        return false;
    }

    let file = config.test_root.join(location.fs_path());
    let unit = match index.unit_for_path(&file) {
        Ok(unit) => unit,
        Err(e) => {
            tracing::warn!(%location, error = %e, "cannot load compilation unit");
            ledger.record(FailureKind::Other, location);
            return false;
        }
    };

    let Some(method) = unit.find_method(&location.method) else {
        tracing::warn!(%location, "start method not found");
        ledger.record(FailureKind::Other, location);
        return false;
    };

    let mut stats = AggregateStats::default();
    walker.walk(&unit, method, 0, &mut stats, ledger, &location);

    // A walk that deposited any failure for this location is excluded
    // from the report
    if ledger.contains(&location) {
        tracing::info!(%location, "walk hit resolution failures, excluded from report");
        return false;
    }

    let record = ParsedMethodRecord::from_walk(&location, stats, entry.score());
    sink.add(&location, record);
    true
}

/// Read the whole benchmark index into memory, order-preserving
fn read_index(path: &Path) -> Result<Vec<BenchmarkEntry>> {
    let file = File::open(path).map_err(|_| BenchProbeError::FileNotFound {
        path: path.display().to_string(),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| BenchProbeError::IndexFormat {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_index_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"[["pkg.Foo_bar", 0.2], ["pkg.Baz_qux", 0.9], ["pkg.Foo_again", 0.5]]"#
        )
        .unwrap();

        let entries = read_index(&path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id(), "pkg.Foo_bar");
        assert_eq!(entries[2].id(), "pkg.Foo_again");
    }

    #[test]
    fn test_read_index_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"pkg.Foo_bar": 0.2}}"#).unwrap();

        assert!(matches!(
            read_index(&path),
            Err(BenchProbeError::IndexFormat { .. })
        ));
    }

    #[test]
    fn test_missing_index_is_fatal() {
        assert!(matches!(
            read_index(Path::new("/nonexistent/index.json")),
            Err(BenchProbeError::FileNotFound { .. })
        ));
    }
}
