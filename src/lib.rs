//! benchprobe: structural and call-graph metrics for benchmark methods
//!
//! This library walks individual Java test/benchmark methods recursively,
//! following every method invocation and object instantiation it can
//! resolve, recursing into targets declared inside the analyzed project
//! and stopping at the boundary of library code. The aggregate metrics of
//! one walk (branching, looping, call fan-out, package usage) are merged
//! with an externally measured stability score into a per-method report
//! record.
//!
//! # Example
//!
//! ```ignore
//! use benchprobe::batch::{self, BatchConfig};
//!
//! let summary = batch::run(&BatchConfig {
//!     index_path: "benchmarks.json".into(),
//!     source_root: "project/src/main/java".into(),
//!     test_root: "project/src/test/java".into(),
//!     output: "parsed-benchmarks.json".into(),
//!     first: None,
//!     last: None,
//!     max_depth: 2147483647,
//! })?;
//!
//! println!("{} of {} entries succeeded", summary.successful, summary.attempted);
//! # Ok::<(), benchprobe::BenchProbeError>(())
//! ```

pub mod ast;
pub mod batch;
pub mod cli;
pub mod error;
pub mod ledger;
pub mod location;
pub mod metrics;
pub mod project;
pub mod report;
pub mod resolve;
pub mod walker;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchSummary};
pub use cli::Cli;
pub use error::{BenchProbeError, Result};
pub use ledger::FailureLedger;
pub use location::{BenchmarkEntry, SourceLocation};
pub use metrics::MethodMetrics;
pub use project::{JavaUnit, ProjectIndex};
pub use report::{ParsedMethodRecord, ReportSink};
pub use resolve::{ConstructorResolution, FailureKind, Resolution, Resolver};
pub use walker::{AggregateStats, MethodWalker};
