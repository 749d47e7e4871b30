//! CLI end-to-end tests
//!
//! Tests for the arcade-quota command-line interface against a database in
//! a temporary directory.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the arcade-quota binary pointed at `db`.
#[allow(deprecated)]
fn quota_cmd(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("arcade-quota").unwrap();
    cmd.arg("--db").arg(db);
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("arcade-quota").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let dir = tempdir().unwrap();
    quota_cmd(&dir.path().join("q.db"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("arcade-quota"));
}

#[test]
fn test_cli_today_prints_reference_zone() {
    let dir = tempdir().unwrap();
    quota_cmd(&dir.path().join("q.db"))
        .arg("today")
        .assert()
        .success()
        .stdout(predicate::str::contains("America/New_York"));
}

#[test]
fn test_cli_record_then_status() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("nested/q.db");

    for n in 1..=3 {
        quota_cmd(&db)
            .args(["record", "7", "riddle"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("{n} today")));
    }

    quota_cmd(&db)
        .args(["status", "7", "riddle", "--limit", "3", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"used_today\": 3"))
        .stdout(predicate::str::contains("\"can_use\": false"));

    quota_cmd(&db)
        .args(["status", "7", "riddle", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining:  2 of 5"));
}

#[test]
fn test_cli_stats_and_reset() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("q.db");

    quota_cmd(&db).args(["record", "7", "riddle"]).assert().success();
    quota_cmd(&db).args(["record", "7", "snake"]).assert().success();

    quota_cmd(&db)
        .args(["stats", "7", "riddle", "--days", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1"));

    quota_cmd(&db)
        .args(["reset", "7", "--feature", "riddle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset today's riddle usage"));

    quota_cmd(&db)
        .args(["status", "7", "riddle", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"used_today\": 0"));

    quota_cmd(&db)
        .args(["status", "7", "snake", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"used_today\": 1"));
}

#[test]
fn test_cli_stats_with_huge_window() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("q.db");

    quota_cmd(&db).args(["record", "7", "riddle"]).assert().success();
    quota_cmd(&db)
        .args(["stats", "7", "riddle", "--days", "4294967295"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1"));
}

#[test]
fn test_cli_rejects_bad_feature_name() {
    let dir = tempdir().unwrap();
    quota_cmd(&dir.path().join("q.db"))
        .args(["record", "7", "bad name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid character"));
}

#[test]
fn test_cli_validate_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"usage": {"reference_timezone": "Atlantis/Lost", "features": {"riddle": 3}}}"#,
    )
    .unwrap();

    quota_cmd(&dir.path().join("q.db"))
        .arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("warning"))
        .stdout(predicate::str::contains("riddle: 3"));
}

#[test]
fn test_cli_validate_missing_file_fails() {
    let dir = tempdir().unwrap();
    quota_cmd(&dir.path().join("q.db"))
        .args(["validate", "/nonexistent/config.json"])
        .assert()
        .failure();
}
