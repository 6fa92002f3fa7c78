//! Common test utilities and fixtures for benchprobe integration tests
//!
//! Provides a `TestProject` builder that lays a small Java project out in
//! a temp directory (main and test source roots, benchmark index, report
//! output path) so the walker and the batch orchestrator can run against
//! real files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
        };
        fs::create_dir_all(project.main_root()).expect("create main root");
        fs::create_dir_all(project.test_root()).expect("create test root");
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn main_root(&self) -> PathBuf {
        self.dir.path().join("src/main/java")
    }

    pub fn test_root(&self) -> PathBuf {
        self.dir.path().join("src/test/java")
    }

    /// Write a file under the main source root; `rel` uses `/` separators
    pub fn add_main_file(&self, rel: &str, source: &str) -> PathBuf {
        write_file(&self.main_root().join(rel), source)
    }

    /// Write a file under the test source root
    pub fn add_test_file(&self, rel: &str, source: &str) -> PathBuf {
        write_file(&self.test_root().join(rel), source)
    }

    /// Write a benchmark index JSON next to the roots
    pub fn write_index(&self, json: &str) -> PathBuf {
        write_file(&self.dir.path().join("benchmarks.json"), json)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("parsed-benchmarks.json")
    }

    /// Read the written report back as JSON
    pub fn read_report(&self) -> serde_json::Value {
        let text = fs::read_to_string(self.output_path()).expect("report file exists");
        serde_json::from_str(&text).expect("report is valid JSON")
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write file");
    path.to_path_buf()
}
