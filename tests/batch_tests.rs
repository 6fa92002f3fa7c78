//! Batch orchestrator integration tests
//!
//! Covers range handling, partial-failure isolation, report content and
//! the end-to-end scenario of a mixed success/failure index.

mod common;

use benchprobe::batch::{self, BatchConfig};
use benchprobe::BenchProbeError;
use common::TestProject;

fn config(project: &TestProject, index_path: std::path::PathBuf) -> BatchConfig {
    BatchConfig {
        index_path,
        source_root: project.main_root(),
        test_root: project.test_root(),
        output: project.output_path(),
        first: None,
        last: None,
        max_depth: 2147483647,
    }
}

/// A file whose methods resolve cleanly plus one whose method hits an
/// unsupported-operation resolution failure
fn mixed_project() -> TestProject {
    let project = TestProject::new();
    project.add_test_file(
        "pkg/Foo.java",
        r#"
        package pkg;

        public class Foo {
            public void bar() {
                if (true) { }
                for (int i = 0; i < 2; i++) {
                    for (int j = 0; j < 2; j++) { }
                }
                helper();
            }

            void helper() {
                String s = "x";
                s.length();
            }
        }
        "#,
    );
    project.add_test_file(
        "pkg/Baz.java",
        r#"
        package pkg;

        public class Baz {
            public void qux() {
                make().toString();
            }

            String make() {
                return "y";
            }
        }
        "#,
    );
    project
}

#[test]
fn mixed_batch_reports_only_clean_entries() {
    let project = mixed_project();
    let index = project.write_index(r#"[["pkg.Foo_bar", 0.2], ["pkg.Baz_qux", 0.9]]"#);

    let mut cfg = config(&project, index);
    cfg.first = Some(0);
    cfg.last = Some(1);
    let summary = batch::run(&cfg).unwrap();

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.written, 1);

    let report = project.read_report();
    let record = report.get("pkg/Foo.bar").expect("clean entry is reported");
    assert!(report.get("pkg/Baz.qux").is_none(), "failed entry excluded");

    assert!((record["stability_score"].as_f64().unwrap() - 0.2).abs() < f64::EPSILON);
    assert_eq!(record["file_path"], "pkg/Foo.java");
    assert_eq!(record["method_name"], "bar");
    assert_eq!(record["conditionals"], 1);
    assert_eq!(record["loops"], 2);
    assert_eq!(record["nested_loops"], 1);
    assert_eq!(record["method_calls"]["pkg.Foo.helper"], 1);
    assert_eq!(record["method_calls"]["java.lang.String.length"], 1);
    assert_eq!(record["total_calls"], 2);
    assert_eq!(record["project_calls"], 1);

    // Whole-walk line counts cover bar (7 lines) plus helper (4 lines);
    // the entry counters cover bar alone
    assert_eq!(record["lines_of_code"], 11);
    assert_eq!(record["entry_lines_of_code"], 7);
}

#[test]
fn range_attempts_exactly_its_span() {
    let project = TestProject::new();
    project.add_test_file(
        "pkg/T.java",
        r#"
        package pkg;
        public class T {
            public void m() { }
        }
        "#,
    );
    let index = project.write_index(
        r#"[["pkg.T_m", 0.1], ["pkg.T_m", 0.2], ["pkg.T_m", 0.3], ["pkg.T_m", 0.4], ["pkg.T_m", 0.5]]"#,
    );

    let mut cfg = config(&project, index);
    cfg.first = Some(1);
    cfg.last = Some(3);
    let summary = batch::run(&cfg).unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.successful, 3);
    // Identical keys collapse into one record
    assert_eq!(summary.written, 1);
    // Later entries win: the record carries the last merged score
    let report = project.read_report();
    assert!((report["pkg/T.m"]["stability_score"].as_f64().unwrap() - 0.4).abs() < f64::EPSILON);
}

#[test]
fn out_of_bounds_last_is_clamped() {
    let project = TestProject::new();
    project.add_test_file(
        "pkg/T.java",
        r#"
        package pkg;
        public class T {
            public void m() { }
        }
        "#,
    );
    let index = project.write_index(r#"[["pkg.T_m", 0.1], ["pkg.T_m", 0.2]]"#);

    let mut cfg = config(&project, index);
    cfg.last = Some(99);
    let summary = batch::run(&cfg).unwrap();
    assert_eq!(summary.attempted, 2);
}

#[test]
fn inverted_range_is_a_configuration_error() {
    let project = TestProject::new();
    let index = project.write_index(r#"[["pkg.T_m", 0.1], ["pkg.T_m", 0.2]]"#);

    let mut cfg = config(&project, index);
    cfg.first = Some(5);
    cfg.last = Some(1);
    assert!(matches!(
        batch::run(&cfg),
        Err(BenchProbeError::InvalidRange { .. })
    ));
}

#[test]
fn empty_index_is_a_configuration_error() {
    let project = TestProject::new();
    let index = project.write_index("[]");

    assert!(matches!(
        batch::run(&config(&project, index)),
        Err(BenchProbeError::IndexFormat { .. })
    ));
}

#[test]
fn unreadable_index_is_fatal() {
    let project = TestProject::new();
    let cfg = config(&project, project.root().join("missing.json"));
    assert!(matches!(
        batch::run(&cfg),
        Err(BenchProbeError::FileNotFound { .. })
    ));
}

#[test]
fn bad_entries_do_not_halt_the_batch() {
    let project = TestProject::new();
    project.add_test_file(
        "pkg/Good.java",
        r#"
        package pkg;
        public class Good {
            public void ok() { }
        }
        "#,
    );
    // A malformed identifier, a missing file, a missing method, then a
    // clean entry
    let index = project.write_index(
        r#"[
            ["no.underscore.here", 0.1],
            ["pkg.Missing_gone", 0.2],
            ["pkg.Good_absent", 0.3],
            ["pkg.Good_ok", 0.4]
        ]"#,
    );

    let summary = batch::run(&config(&project, index)).unwrap();
    assert_eq!(summary.attempted, 4);
    assert_eq!(summary.successful, 1);

    let report = project.read_report();
    assert!(report.get("pkg/Good.ok").is_some());
    assert_eq!(report.as_object().unwrap().len(), 1);
}

#[test]
fn known_failing_location_is_not_retried() {
    let project = TestProject::new();
    project.add_test_file(
        "pkg/Bad.java",
        r#"
        package pkg;
        public class Bad {
            public void broken() {
                make().toString();
            }
            String make() { return "z"; }
        }
        "#,
    );
    // The same failing benchmark twice; the second occurrence is skipped
    // through the ledger without another walk
    let index = project.write_index(r#"[["pkg.Bad_broken", 0.1], ["pkg.Bad_broken", 0.2]]"#);

    let summary = batch::run(&config(&project, index)).unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.successful, 0);
    assert_eq!(summary.written, 0);

    let report = project.read_report();
    assert_eq!(report.as_object().unwrap().len(), 0);
}

#[test]
fn report_file_is_written_even_when_every_entry_fails() {
    let project = TestProject::new();
    let index = project.write_index(r#"[["pkg.Nothing_here", 0.5]]"#);

    let summary = batch::run(&config(&project, index)).unwrap();
    assert_eq!(summary.successful, 0);

    // The sink still flushed an (empty) report
    let report = project.read_report();
    assert!(report.as_object().unwrap().is_empty());
}
