//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomowidget"))
        .args(args)
        .env("POMOWIDGET_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a command that must succeed and return the first JSON document it
/// printed.
fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::Deserializer::from_str(&stdout)
        .into_iter::<Value>()
        .next()
        .expect("no JSON output")
        .expect("invalid JSON output")
}

#[test]
fn status_on_fresh_install_is_idle_focus() {
    let dir = tempfile::tempdir().unwrap();
    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["type"], "StateSnapshot");
    assert_eq!(snap["mode"], "focus");
    assert_eq!(snap["phase"], "idle");
    assert_eq!(snap["remaining_ms"], 1_500_000);
    assert_eq!(snap["time_text"], "25:00");
}

#[test]
fn start_pause_start_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(started["type"], "TimerStarted");

    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["phase"], "running");
    assert!(snap["end_time_ms"].is_u64());

    let again = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(again["type"], "StateSnapshot", "second start is a no-op");

    let paused = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(paused["type"], "TimerPaused");
    assert!(paused["remaining_ms"].as_u64().unwrap() <= 1_500_000);

    let resumed = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(resumed["type"], "TimerStarted");
}

#[test]
fn watch_on_idle_timer_prints_status_line_then_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "watch"]);
    assert_eq!(code, 0, "watch failed: {stderr}");

    let (line, rest) = stdout.split_once('\n').expect("no status line");
    assert!(line.contains("[Focus]"));
    assert!(line.contains("25:00"));
    let snap: Value = serde_json::from_str(rest.trim()).unwrap();
    assert_eq!(snap["type"], "StateSnapshot");
    assert_eq!(snap["phase"], "idle");
}

#[test]
fn mode_switch_and_repeat() {
    let dir = tempfile::tempdir().unwrap();
    let changed = run_json(dir.path(), &["timer", "mode", "short"]);
    assert_eq!(changed["type"], "ModeChanged");
    assert_eq!(changed["to"], "short");
    assert_eq!(changed["remaining_ms"], 300_000);

    let repeat = run_json(dir.path(), &["timer", "mode", "short"]);
    assert_eq!(repeat["type"], "StateSnapshot");
    assert_eq!(repeat["mode"], "short");
}

#[test]
fn invalid_mode_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["timer", "mode", "nap"]);
    assert_ne!(code, 0);
}

#[test]
fn duration_change_persists() {
    let dir = tempfile::tempdir().unwrap();
    let changed = run_json(dir.path(), &["timer", "duration", "focus", "1"]);
    assert_eq!(changed["type"], "DurationChanged");
    assert_eq!(changed["duration_ms"], 60_000);

    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["total_ms"], 60_000);
    assert_eq!(snap["time_text"], "01:00");
}

#[test]
fn clear_forgets_state() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "mode", "long"]);
    run_json(dir.path(), &["timer", "clear"]);
    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["mode"], "focus");
}

#[test]
fn config_durations_seed_the_timer() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "durations.focus", "30"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("ok"));

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "durations.focus"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "30");

    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["remaining_ms"], 1_800_000);
}

#[test]
fn config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "ui.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn config_list_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let list = run_json(dir.path(), &["config", "list"]);
    assert_eq!(list["durations"]["short_break"], 5);
    assert_eq!(list["ui"]["frame_interval_ms"], 16);
}

#[test]
fn interactive_counter_and_quit() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomowidget"))
        .arg("run")
        .env("POMOWIDGET_DATA_DIR", dir.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"+\n+\n-\nl\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("counter: 2"));
    assert!(stdout.contains("counter: 1"));

    let snap = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(snap["mode"], "long");
}
