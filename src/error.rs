//! Error types for benchprobe

use std::process::ExitCode;

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, BenchProbeError>;

/// All errors the tool can surface to a caller
#[derive(Debug, Error)]
pub enum BenchProbeError {
    /// A file or directory given on the command line does not exist
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// tree-sitter could not be set up or the file could not be parsed
    #[error("parse failure: {message}")]
    ParseFailure { message: String },

    /// The requested start method does not exist in its compilation unit
    #[error("method not found: \"{method}\" in {file}")]
    MethodNotFound { method: String, file: String },

    /// A benchmark identifier does not follow the expected naming convention
    #[error("malformed benchmark identifier: \"{id}\"")]
    MalformedIdentifier { id: String },

    /// The requested index range is empty or inverted after clamping
    #[error("illegal index range: [{first}, {last}] over {len} entries")]
    InvalidRange {
        first: usize,
        last: usize,
        len: usize,
    },

    /// The benchmark index file did not contain the expected structure
    #[error("invalid benchmark index: {message}")]
    IndexFormat { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BenchProbeError {
    /// Map errors to process exit codes: configuration errors exit with 2,
    /// everything else with 1.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. }
            | Self::InvalidRange { .. }
            | Self::IndexFormat { .. } => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}
