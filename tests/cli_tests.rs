//! Binary-level checks of the command-line interface.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const OFFLINE: &str = r#"
dry_run = true
database = "cli.db"

[llm]
provider = "none"

[sources.reddit]
enabled = false

[sources.news]
enabled = false

[sources.quotes]
enabled = false

[sources.trends]
enabled = false
"#;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn trendsmith(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("trendsmith").unwrap();
    cmd.current_dir(dir)
        .env_remove("CONTRACT_ADDRESS")
        .env_remove("CONTRACT_SIGNER_KEY")
        .env_remove("SERPAPI_API_KEY");
    cmd
}

#[test]
fn config_check_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), OFFLINE);

    trendsmith(dir.path())
        .args(["--color", "never", "config", "check", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration check complete"))
        .stdout(predicate::str::contains("dry run"));
}

#[test]
fn invalid_values_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[aggregator]\nmin_sentiment = 3.0\n");

    trendsmith(dir.path())
        .args(["config", "check", "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_sentiment"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    trendsmith(dir.path())
        .args(["config", "check", "-c", "absent.toml"])
        .assert()
        .failure();
}

#[test]
fn generate_prints_json_fallback_offline() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), OFFLINE);

    let output = trendsmith(dir.path())
        .args(["--json", "generate", "Will the comet be visible?", "-c"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["query"], "Will the comet be visible?");
    assert_eq!(value["proposals"].as_array().unwrap().len(), 1);
    assert_eq!(value["proposals"][0]["question"], "Will the comet be visible?");
    assert!(dir.path().join("cli.db").exists());
}

#[test]
fn cycle_resolve_runs_in_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), OFFLINE);

    trendsmith(dir.path())
        .args(["--json", "cycle", "resolve", "-c"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"checked\":0"));
}

#[test]
fn contract_commands_need_credentials_outside_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &OFFLINE.replace("dry_run = true", "dry_run = false"));

    trendsmith(dir.path())
        .args(["cycle", "resolve", "-c"])
        .arg(&config)
        .assert()
        .failure();
}
