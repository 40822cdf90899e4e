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

fn write_store(path: &PathBuf, tasks: serde_json::Value, task_ids: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "projects": [
            {
                "id": "proj-1",
                "name": "inbox",
                "context": "",
                "task_ids": task_ids
            }
        ],
        "tasks": tasks,
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
fn done_marks_the_task_done_and_persists() {
    let store_path = temp_path("cli-done.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "project_id": "proj-1",
                "title": "demo",
                "context": "",
                "status": "running",
                "created_at": "2026-08-01T00:00:00Z",
                "status_changed_at": "2026-08-01T00:00:00Z"
            }
        ]),
        serde_json::json!(["task-1"]),
    );

    let output = run(&store_path, &["done", "task-1"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Completed task:"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["status"], "done");
    assert!(stored["tasks"][0]["snooze_until"].is_null());
}

#[test]
fn done_cancels_a_snooze() {
    let store_path = temp_path("cli-done-waiting.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "project_id": "proj-1",
                "title": "demo",
                "context": "",
                "status": "waiting",
                "waiting_reason": "blocked",
                "snooze_until": "2099-01-01T00:00:00Z",
                "created_at": "2026-08-01T00:00:00Z",
                "status_changed_at": "2026-08-01T00:00:00Z"
            }
        ]),
        serde_json::json!(["task-1"]),
    );

    let output = run(&store_path, &["done", "task-1"]);
    assert!(output.status.success());

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["status"], "done");
    assert!(stored["tasks"][0]["snooze_until"].is_null());
    assert!(stored["tasks"][0]["waiting_reason"].is_null());
}

#[test]
fn done_twice_fails_with_invalid_transition() {
    let store_path = temp_path("cli-done-twice.json");
    write_store(
        &store_path,
        serde_json::json!([
            {
                "id": "task-1",
                "project_id": "proj-1",
                "title": "demo",
                "context": "",
                "status": "done",
                "created_at": "2026-08-01T00:00:00Z",
                "status_changed_at": "2026-08-02T00:00:00Z"
            }
        ]),
        serde_json::json!(["task-1"]),
    );

    let output = run(&store_path, &["done", "task-1"]);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_transition"));
    assert_eq!(stored["tasks"][0]["status_changed_at"], "2026-08-02T00:00:00Z");
}

#[test]
fn done_rejects_unknown_task() {
    let store_path = temp_path("cli-done-missing.json");
    write_store(&store_path, serde_json::json!([]), serde_json::json!([]));

    let output = run(&store_path, &["done", "task-404"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: not_found"));
}
