//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data directory
//! and verify outputs.

use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "cuetimer-cli", "--"])
        .args(args)
        .env("CUETIMER_DATA_DIR", data_dir)
        .env("CUETIMER_SOUNDS_DIR", data_dir.join("no-sounds"))
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_config_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["config", "get", "timer.mode"]).trim(), "countdown");
    assert_eq!(run_ok(dir.path(), &["config", "get", "timer.target_seconds"]).trim(), "1500");
    assert_eq!(run_ok(dir.path(), &["config", "get", "audio.volume"]).trim(), "0.7");
}

#[test]
fn test_config_set_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "timer.mode", "countup"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "timer.mode"]).trim(), "countup");

    let list = run_ok(dir.path(), &["config", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(parsed["timer"]["mode"], "countup");

    run_ok(dir.path(), &["config", "reset"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "timer.mode"]).trim(), "countdown");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "timer.target_seconds", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
}

#[test]
fn test_reminder_add_list_remove() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["reminder", "add", "5:00", "stretch"]);
    run_ok(dir.path(), &["reminder", "add", "1:00"]);

    let listed = run_ok(dir.path(), &["reminder", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&listed).unwrap();
    let reminders = parsed.as_array().unwrap();
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0]["at_seconds"], 60);
    assert_eq!(reminders[1]["message"], "stretch");

    run_ok(dir.path(), &["reminder", "remove", "1"]);
    let listed = run_ok(dir.path(), &["reminder", "list"]);
    assert!(listed.contains("stretch"));
    assert!(!listed.contains("01:00"));
}

#[test]
fn test_reminder_validation() {
    let dir = tempfile::tempdir().unwrap();
    // default countdown is 25 minutes
    let (code, _, stderr) = run_cli(dir.path(), &["reminder", "add", "30:00"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(dir.path(), &["reminder", "add", "-5"]);
    assert_ne!(code, 0);

    let (code, _, _) = run_cli(dir.path(), &["reminder", "remove", "1"]);
    assert_ne!(code, 0);
}

#[test]
fn test_countdown_cannot_shrink_below_reminder() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["reminder", "add", "20:00"]);

    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "timer.target_seconds", "600"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("exceeds the countdown target"));

    let (code, _, _) = run_cli(dir.path(), &["run", "--target", "10:00"]);
    assert_ne!(code, 0);

    let listed = run_ok(dir.path(), &["reminder", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&listed).unwrap();
    assert_eq!(parsed[0]["at_seconds"], 1200);
}

#[test]
fn test_preset_list_and_apply() {
    let dir = tempfile::tempdir().unwrap();
    let listed = run_ok(dir.path(), &["preset", "list"]);
    assert!(listed.contains("25 min"));
    assert!(listed.contains("1 hour"));

    run_ok(dir.path(), &["preset", "add", "1:30", "--label", "short"]);
    let parsed: serde_json::Value =
        serde_json::from_str(&run_ok(dir.path(), &["preset", "list", "--json"])).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 7);

    run_ok(dir.path(), &["preset", "apply", "7"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "timer.target_seconds"]).trim(), "90");

    let (code, _, _) = run_cli(dir.path(), &["preset", "apply", "99"]);
    assert_ne!(code, 0);
}

#[test]
fn test_run_records_completed_session() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_ok(dir.path(), &["run", "--target", "2"]);
    assert!(stdout.contains("time's up"));

    let history = run_ok(dir.path(), &["history", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&history).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["outcome"], "completed");
    assert_eq!(entries[0]["configured_seconds"], 2);
    assert_eq!(entries[0]["final_seconds"], 0);

    run_ok(dir.path(), &["history", "clear"]);
    assert!(run_ok(dir.path(), &["history", "list"]).contains("no sessions yet"));
}

#[test]
fn test_run_countup_with_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["run", "--countup", "--target", "2"]);

    let history = run_ok(dir.path(), &["history", "list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(parsed[0]["mode"], "countup");
    assert_eq!(parsed[0]["final_seconds"], 2);
}

#[test]
fn test_sound_list_and_select() {
    let dir = tempfile::tempdir().unwrap();
    let listed = run_ok(dir.path(), &["sound", "list"]);
    assert!(listed.contains("chime (short, missing)"));
    assert!(listed.contains("phone_ring (long, missing)"));

    run_ok(dir.path(), &["sound", "select", "bell", "gong"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "audio.long_cue_id"]).trim(), "gong");

    let (code, _, _) = run_cli(dir.path(), &["sound", "select", "kazoo", "gong"]);
    assert_ne!(code, 0);
}
