use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_log_format_text() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--log-format", "text", "--log-level", "info"])
        .args(["--once", "--interval", "0"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("INFO"))
        .stderr(predicate::str::contains("Initialization complete"))
        .stderr(predicate::str::contains("Monitor finished"));
}

#[test]
fn test_log_format_json() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.env_remove("RUST_LOG")
        .args(["--log-format", "json", "--log-level", "info"])
        .args(["--once", "--interval", "0"]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    // Every stderr line is a JSON event
    let stderr = String::from_utf8(output.stderr).unwrap();
    let log_lines: Vec<Value> = stderr
        .lines()
        .map(|line| serde_json::from_str(line).expect("stderr line should be valid JSON"))
        .collect();

    let messages: Vec<&str> = log_lines
        .iter()
        .filter_map(|line| line["fields"]["message"].as_str())
        .collect();

    assert_eq!(
        messages.first().copied(),
        Some("Initialization complete. Starting monitor.")
    );
    assert_eq!(messages.last().copied(), Some("Monitor finished."));
    assert!(log_lines
        .iter()
        .all(|line| line["level"].as_str() == Some("INFO")));
}

#[test]
fn test_default_level_keeps_stderr_quiet() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--once", "--interval", "0"]).env_remove("RUST_LOG");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("INFO").not());
}

#[test]
fn test_log_level_debug() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--log-level", "debug", "--once", "--interval", "0"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"))
        .stderr(predicate::str::contains("cycle sampled"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--log-level", "info", "--once", "--json", "--interval", "0"]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stdout: Value = serde_json::from_slice(&output.stdout).expect("stdout is pure JSON");
    assert!(stdout["processes"].is_array());
}
