use crate::board::Board;
use crate::error::AppError;
use crate::model::{Project, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "board.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredBoard {
    schema_version: u32,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    #[serde(default)]
    cursor: Option<String>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var("ROTOR_STORE_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("rotor").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("rotor")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<Board, AppError> {
    if !path.exists() {
        return Ok(Board::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredBoard =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let board = Board {
        projects: stored.projects,
        tasks: stored.tasks,
        cursor: stored.cursor,
    };
    validate(&board)?;
    Ok(board)
}

pub fn save_state(path: &Path, board: &Board) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredBoard {
        schema_version: SCHEMA_VERSION,
        projects: board.projects.clone(),
        tasks: board.tasks.clone(),
        cursor: board.cursor.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// Referential and status/snooze invariants a loaded board must satisfy;
/// a reload must reproduce the exact scheduling behavior, so a broken
/// hierarchy or cursor is rejected rather than repaired.
fn validate(board: &Board) -> Result<(), AppError> {
    let mut linked = HashSet::new();
    for project in &board.projects {
        for task_id in &project.task_ids {
            let task = board
                .tasks
                .iter()
                .find(|task| task.id == *task_id)
                .ok_or_else(|| AppError::invalid_data("project lists an unknown task id"))?;
            if task.project_id != project.id {
                return Err(AppError::invalid_data(
                    "task does not belong to the project listing it",
                ));
            }
            if !linked.insert(task_id.as_str()) {
                return Err(AppError::invalid_data("task is listed more than once"));
            }
        }
    }
    if linked.len() != board.tasks.len() {
        return Err(AppError::invalid_data(
            "task arena and project task lists disagree",
        ));
    }

    for task in &board.tasks {
        let waiting = task.status == TaskStatus::Waiting;
        if waiting != task.snooze_until.is_some() || waiting != task.waiting_reason.is_some() {
            return Err(AppError::invalid_data(
                "snooze fields are inconsistent with task status",
            ));
        }
    }

    if let Some(cursor) = board.cursor.as_deref() {
        let exists = board.tasks.iter().any(|task| task.id == cursor);
        if !exists {
            return Err(AppError::invalid_data("cursor task not found"));
        }
    }

    Ok(())
}
