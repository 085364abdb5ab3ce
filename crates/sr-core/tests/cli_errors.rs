//! CLI error handling and exit code tests for sr-core.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a Command for the sr-core binary, isolated from the caller's config.
fn sr_core() -> Command {
    let mut cmd = Command::cargo_bin("sr-core").expect("sr-core binary should exist");
    cmd.env_remove("SR_CONFIG")
        .env_remove("SR_CONFIG_DIR")
        .env_remove("SR_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn review(user: &str, rating: u8, sentiment: f64, minute: i64) -> String {
    format!(
        r#"{{"entity_id":"{user}","rating":{rating},"sentiment":{sentiment},"timestamp":{}}}"#,
        1_700_000_000_000i64 + minute * 60_000
    )
}

fn write_reviews(dir: &TempDir) -> std::path::PathBuf {
    let mut lines = Vec::new();
    for u in 0..12 {
        for j in 0..=(u % 3) {
            let sentiment = ((u * 5 + j * 3) % 17) as f64 / 8.5 - 1.0;
            let rating = 1 + ((u * 2 + j) % 5) as u8;
            lines.push(review(&format!("user{u}"), rating, sentiment, (u * 10 + j) as i64));
        }
    }
    let path = dir.path().join("reviews.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

mod invalid_arguments {
    use super::*;

    #[test]
    fn unknown_command_fails() {
        sr_core()
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_config_subcommand_fails() {
        sr_core()
            .args(["config", "nonexistent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_format_fails() {
        sr_core()
            .args(["--format", "xml", "version"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn analyze_requires_input() {
        sr_core()
            .arg("analyze")
            .assert()
            .failure()
            .stderr(predicate::str::contains("INPUT"));
    }
}

mod config_errors {
    use super::*;

    #[test]
    fn missing_input_is_an_args_error() {
        sr_core()
            .args(["analyze", "/nonexistent/reviews.jsonl"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("input file not found"));
    }

    #[test]
    fn zero_workers_is_rejected_with_field_name() {
        let dir = TempDir::new().unwrap();
        let input = write_reviews(&dir);
        sr_core()
            .args(["analyze", "--workers", "0"])
            .arg(&input)
            .assert()
            .code(10)
            .stderr(predicate::str::contains("workers"));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        sr_core()
            .args(["--preset", "turbo", "config", "show"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("turbo"));
    }

    #[test]
    fn invalid_config_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis.json");
        fs::write(&path, r#"{"max_skip_rate": 2.0}"#).unwrap();
        sr_core()
            .args(["config", "validate"])
            .arg(&path)
            .assert()
            .code(10)
            .stderr(predicate::str::contains("max_skip_rate"));
    }
}

mod data_errors {
    use super::*;

    #[test]
    fn mostly_malformed_input_exits_with_data_integrity_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.jsonl");
        let mut lines = vec!["garbage"; 6]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        for i in 0..4 {
            lines.push(review("u", 4, 0.5, i));
        }
        fs::write(&path, lines.join("\n")).unwrap();

        sr_core()
            .arg("analyze")
            .arg(&path)
            .assert()
            .code(11)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("skip"));
    }

    #[test]
    fn corrupt_bundle_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.srb");
        fs::write(&path, b"not a zip").unwrap();
        sr_core()
            .arg("inspect")
            .arg(&path)
            .assert()
            .code(21)
            .stderr(predicate::str::contains("bundle"));
    }
}

mod successful_runs {
    use super::*;

    #[test]
    fn analyze_prints_json_report() {
        let dir = TempDir::new().unwrap();
        let input = write_reviews(&dir);
        let output = sr_core()
            .args(["analyze", "-k", "2"])
            .arg(&input)
            .output()
            .unwrap();
        assert!(matches!(output.status.code(), Some(0) | Some(1)));

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["schema_version"], "1.0.0");
        assert_eq!(report["ingest"]["accepted"], 24);
        assert_eq!(report["pearson"]["status"], "defined");
        assert_eq!(report["clustering"]["status"], "defined");
    }

    #[test]
    fn unconverged_clustering_exits_with_warnings() {
        let dir = TempDir::new().unwrap();
        let input = write_reviews(&dir);
        let config = dir.path().join("analysis.json");
        fs::write(
            &config,
            r#"{"clusters": 2, "kmeans_max_iterations": 1, "kmeans_tolerance": 0.0}"#,
        )
        .unwrap();

        let output = sr_core()
            .arg("--config")
            .arg(&config)
            .arg("analyze")
            .arg(&input)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["clustering"]["converged"], false);
        let warnings = report["warnings"].as_array().unwrap();
        assert!(warnings
            .iter()
            .any(|w| w["kind"] == "clustering_not_converged"));
    }

    #[test]
    fn summary_format_is_one_line() {
        let dir = TempDir::new().unwrap();
        let input = write_reviews(&dir);
        sr_core()
            .args(["-f", "summary", "analyze", "-k", "2"])
            .arg(&input)
            .assert()
            .stdout(predicate::str::contains("24 reviews (0 skipped), 12 users"));
    }

    #[test]
    fn markdown_report_has_sections() {
        let dir = TempDir::new().unwrap();
        let input = write_reviews(&dir);
        sr_core()
            .args(["-f", "md", "analyze"])
            .arg(&input)
            .assert()
            .stdout(predicate::str::contains("## Correlation"))
            .stdout(predicate::str::contains("## Users"));
    }

    #[test]
    fn bundle_written_by_analyze_can_be_inspected() {
        let dir = TempDir::new().unwrap();
        let input = write_reviews(&dir);
        let bundle = dir.path().join("run.srb");
        sr_core()
            .args(["-q", "analyze", "-k", "2", "--bundle"])
            .arg(&bundle)
            .arg(&input)
            .output()
            .unwrap();
        assert!(bundle.exists());

        let output = sr_core().arg("inspect").arg(&bundle).output().unwrap();
        let inspected: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(inspected["report"]["ingest"]["accepted"], 24);
        assert!(inspected["manifest"]["files"].as_array().unwrap().len() >= 2);
        assert!(inspected["moments"]["sentiment_rating"]["n"].as_u64() == Some(24));
    }

    #[test]
    fn schema_list_and_lookup() {
        sr_core()
            .args(["schema", "--list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("AnalysisReport"));
        sr_core()
            .args(["schema", "ClusterModel"])
            .assert()
            .success()
            .stdout(predicate::str::contains("centroids"));
        sr_core().args(["schema", "Nope"]).assert().code(10);
    }

    #[test]
    fn version_and_completions() {
        sr_core()
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sr_core_version"));
        sr_core()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sr-core"));
    }

    #[test]
    fn config_show_reports_builtin_defaults() {
        sr_core()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"clusters\": 4"));
    }
}
