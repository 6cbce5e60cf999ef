use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn once_json_emits_snapshot() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--once", "--json", "--interval", "0"]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let doc: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert!(doc["schema_id"]
        .as_str()
        .unwrap()
        .contains("sampled-snapshot"));
    assert!(doc["timestamp"].as_str().unwrap().contains('T'));
    assert!(doc["core_count"].as_u64().unwrap() >= 1);

    let processes = doc["processes"].as_array().unwrap();
    assert!(!processes.is_empty());

    for p in processes {
        let cpu = p["cpu_percent"].as_f64().unwrap();
        assert!(cpu >= 0.0);
        assert!(p["pid"].is_u64());
        assert!(p["name"].is_string());
    }
}

#[test]
fn once_table_has_header() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--once", "--interval", "0", "--top", "3"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("procmon  |  Refresh 0s  |  Sort: CPU"))
        .stdout(predicate::str::contains("CPU(%)"))
        .stdout(predicate::str::contains("Enter: ").not());
}

#[test]
fn interactive_sort_toggle_and_quit() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--interval", "0"]).write_stdin("s\n\nq\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Sort: CPU"))
        .stdout(predicate::str::contains("Sort: PID"))
        .stdout(predicate::str::contains("Commands: (s)ort  (k)ill PID  (q)uit  (Enter) refresh"))
        .stdout(predicate::str::contains("Exiting monitor."))
        .stdout(predicate::str::contains("\x1b[2J").not());
}

#[test]
fn interactive_kill_pid_zero_is_rejected() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--interval", "0"]).write_stdin("k 0\n\nq\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Failed to terminate PID 0"))
        .stdout(predicate::str::contains("must be > 0"))
        .stdout(predicate::str::contains("(code 1)"))
        .stdout(predicate::str::contains("Press Enter to continue..."));
}

#[test]
fn interactive_reports_bad_input() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--interval", "0"])
        .write_stdin("help\n\nk abc\n\nq\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Unknown command: 'help'"))
        .stdout(predicate::str::contains("Invalid PID input: 'abc'"));
}

#[test]
fn interactive_exits_at_end_of_input() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--interval", "0"]).write_stdin("");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Exiting monitor."));
}

#[test]
fn top_zero_is_rejected() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--once", "--top", "0"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("top must be > 0"));
}

#[test]
fn bad_interval_is_rejected() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--once", "--interval", "soon"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration 'soon'"));
}

#[test]
fn json_without_once_is_a_usage_error() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.arg("--json");

    cmd.assert().failure().code(2);
}

#[test]
fn interactive_quit_after_unknown_command() {
    let mut cmd = cargo_bin_cmd!("procmon");
    cmd.args(["--interval", "0"]).write_stdin("help\nq\n\n\n");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Unknown command: 'help'"));
    assert!(!stdout.contains("Press Enter to continue..."));
    assert_eq!(stdout.matches("Enter: ").count(), 2);
}
