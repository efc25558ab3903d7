//! CLI options interaction tests
//!
//! These tests run the real binary against stand-in speed-test commands and
//! temporary log files; none of them reach the network.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const HEADER: &str = "Date,Time,Ping [ms],Download Speed [Mbit/s],Upload Speed [Mbit/s]";

const ENV_VARS: &[&str] = &[
    "SPEEDTEST_LOG_FILE",
    "CREDENTIALS_FILE",
    "CLIENT_SECRETS_FILE",
    "DRIVE_FOLDER",
    "SPEEDTEST_COMMAND",
    "SPEEDTEST_ARGS",
    "MEASUREMENT_TIMEOUT_SECONDS",
    "UPLOAD_ENABLED",
    "DRIVE_API_BASE",
    "ENABLE_COLOR",
];

/// Command running inside `dir` with a clean environment
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("speedlog").unwrap();
    cmd.current_dir(dir.path()).arg("--no-color");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn read_log(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-file"))
        .stdout(predicate::str::contains("--no-upload"))
        .stdout(predicate::str::contains("--speedtest-cmd"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("speedlog"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--count")
        .arg("3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--count"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--timeout", "0", "--no-upload"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than 0"));
}

#[test]
fn test_invalid_folder_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--folder", "it's-mine", "--no-upload"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONFIG"))
        .stderr(predicate::str::contains("Suggestion: Check your .env file"))
        .stderr(predicate::str::contains("Supported Environment Variables:"));

    assert!(!dir.path().join("internet_speedtest.csv").exists());
}

#[test]
fn test_missing_speedtest_utility_logs_zero_row() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--no-upload", "--speedtest-cmd", "speedlog-no-such-utility"])
        .assert()
        .success()
        .stdout(predicate::str::contains(", 0.000000, 0.000000, 0.000000"));

    let log = read_log(&dir, "internet_speedtest.csv");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER);
    assert!(lines[1].ends_with(",0.0,0.0,0.0"));
}

#[cfg(unix)]
#[test]
fn test_measured_values_are_printed_and_logged() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args([
            "--no-upload",
            "--log-file",
            "speed.csv",
            "--speedtest-cmd",
            "sh",
            "--speedtest-arg",
            "-c",
            "--speedtest-arg",
            "printf 'Ping: 12.3 ms\\nDownload: 45.6 Mbit/s\\nUpload: 7.8 Mbit/s\\n'",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(", 12.300000, 45.600000, 7.800000"));

    let log = read_log(&dir, "speed.csv");
    assert!(log.starts_with(HEADER));
    assert!(log.trim_end().ends_with(",12.3,45.6,7.8"));
}

#[cfg(unix)]
#[test]
fn test_rows_accumulate_across_runs() {
    let dir = TempDir::new().unwrap();
    for _ in 0..3 {
        create_test_cmd(&dir)
            .args(["--no-upload", "--speedtest-cmd", "false"])
            .assert()
            .success();
    }

    let log = read_log(&dir, "internet_speedtest.csv");
    assert_eq!(log.lines().count(), 4);
    assert_eq!(log.matches("Ping [ms]").count(), 1);
}

#[cfg(unix)]
#[test]
fn test_timeout_records_zero_row() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args([
            "--no-upload",
            "--speedtest-cmd",
            "sleep",
            "--speedtest-arg",
            "10",
            "--timeout",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(", 0.000000, 0.000000, 0.000000"));
}

#[test]
fn test_env_file_configures_log_path() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".env"),
        "SPEEDTEST_LOG_FILE=from_env.csv\nUPLOAD_ENABLED=false\nSPEEDTEST_COMMAND=speedlog-no-such-utility\n",
    )
    .unwrap();

    create_test_cmd(&dir).assert().success();

    assert!(dir.path().join("from_env.csv").exists());
    assert!(!dir.path().join("internet_speedtest.csv").exists());
}

#[test]
fn test_missing_client_secrets_is_auth_error_after_logging() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--speedtest-cmd", "speedlog-no-such-utility"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("AUTH"))
        .stderr(predicate::str::contains("client_secrets.json"))
        .stderr(predicate::str::contains("Suggestion: The row was logged locally."));

    let log = read_log(&dir, "internet_speedtest.csv");
    assert_eq!(log.lines().count(), 2);
    assert!(!dir.path().join("mycreds.txt").exists());
}
