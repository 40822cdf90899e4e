use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("rotor-{nanos}-{file_name}"))
}

fn write_running_task_store(path: &PathBuf) {
    let content = serde_json::json!({
        "schema_version": 1,
        "projects": [
            {
                "id": "proj-1",
                "name": "inbox",
                "context": "",
                "task_ids": ["task-1"]
            }
        ],
        "tasks": [
            {
                "id": "task-1",
                "project_id": "proj-1",
                "title": "demo",
                "context": "",
                "status": "running",
                "created_at": "2026-08-01T00:00:00Z",
                "status_changed_at": "2026-08-01T00:00:00Z"
            }
        ],
        "cursor": null
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(store_path: &PathBuf, args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_rotor");
    Command::new(exe)
        .args(args)
        .env("ROTOR_STORE_PATH", store_path)
        .env("ROTOR_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run command")
}

#[test]
fn snooze_parks_the_task_until_the_target() {
    let store_path = temp_path("cli-snooze.json");
    write_running_task_store(&store_path);

    let output = run(&store_path, &["snooze", "task-1", "awaiting review", "2h"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Snoozed task:"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["status"], "waiting");
    assert_eq!(stored["tasks"][0]["waiting_reason"], "awaiting review");
    assert!(stored["tasks"][0]["snooze_until"].is_string());
}

#[test]
fn snooze_rejects_a_malformed_target() {
    let store_path = temp_path("cli-snooze-bad.json");
    write_running_task_store(&store_path);

    let output = run(&store_path, &["snooze", "task-1", "blocked", "soon"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_argument"));
}

#[test]
fn snooze_without_target_requires_a_configured_default() {
    let store_path = temp_path("cli-snooze-default.json");
    write_running_task_store(&store_path);

    // No config: refused.
    let output = run(&store_path, &["snooze", "task-1", "blocked"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_argument"));

    // With default_snooze configured the target may be omitted.
    let config_path = temp_path("cli-snooze-config.json");
    std::fs::write(&config_path, r#"{ "default_snooze": "30m" }"#).unwrap();

    let exe = env!("CARGO_BIN_EXE_rotor");
    let output = Command::new(exe)
        .args(["snooze", "task-1", "blocked"])
        .env("ROTOR_STORE_PATH", &store_path)
        .env("ROTOR_CONFIG_PATH", &config_path)
        .output()
        .expect("failed to run snooze command");

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    assert_eq!(stored["tasks"][0]["status"], "waiting");
}

#[test]
fn wake_before_expiry_needs_force() {
    let store_path = temp_path("cli-wake.json");
    write_running_task_store(&store_path);

    run(&store_path, &["snooze", "task-1", "blocked", "1d"]);

    let output = run(&store_path, &["wake", "task-1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_transition"));

    let output = run(&store_path, &["wake", "task-1", "--force"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Woke task:"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["status"], "running");
    assert!(stored["tasks"][0]["snooze_until"].is_null());
    assert!(stored["tasks"][0]["waiting_reason"].is_null());
}

#[test]
fn reopen_brings_a_done_task_back() {
    let store_path = temp_path("cli-reopen.json");
    write_running_task_store(&store_path);

    run(&store_path, &["done", "task-1"]);
    let output = run(&store_path, &["reopen", "task-1"]);
    assert!(output.status.success());

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["status"], "running");
}
