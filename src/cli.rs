//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::Parser;

use crate::batch::BatchConfig;

/// Structural and call-graph metrics extractor for Java benchmark suites
#[derive(Parser, Debug)]
#[command(name = "benchprobe")]
#[command(about = "Walks benchmark methods recursively and correlates code shape with stability scores")]
#[command(version)]
pub struct Cli {
    /// Benchmark index: a JSON list of [identifier, score] pairs
    #[arg(value_name = "INDEX")]
    pub index: PathBuf,

    /// Root directory of the project's main sources
    #[arg(long, value_name = "DIR")]
    pub source_root: PathBuf,

    /// Root directory the benchmark identifiers map into
    #[arg(long, value_name = "DIR")]
    pub test_root: PathBuf,

    /// Where to write the report
    #[arg(short, long, value_name = "FILE", default_value = "parsed-benchmarks.json")]
    pub output: PathBuf,

    /// First index entry to process (inclusive; clamped to the index)
    #[arg(long, value_name = "N")]
    pub first: Option<usize>,

    /// Last index entry to process (inclusive; clamped to the index)
    #[arg(long, value_name = "N")]
    pub last: Option<usize>,

    /// Maximum recursion depth of a single walk
    #[arg(long, value_name = "N", default_value_t = 2147483647)]
    pub max_depth: usize,

    /// Show verbose diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            index_path: self.index.clone(),
            source_root: self.source_root.clone(),
            test_root: self.test_root.clone(),
            output: self.output.clone(),
            first: self.first,
            last: self.last,
            max_depth: self.max_depth,
        }
    }
}
