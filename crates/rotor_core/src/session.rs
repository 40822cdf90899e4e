//! The session surface consumed by the presentation layer.
//!
//! Every operation is atomic with respect to the store: it takes the
//! advisory lock, loads the board, validates and mutates in memory, and
//! only then saves. A failure anywhere before the save leaves the
//! persisted state untouched.

use crate::board::Board;
use crate::error::AppError;
use crate::model::{Project, Task, TaskStatus, format_rfc3339};
use crate::scheduler;
use crate::state_machine;
use crate::storage::StoreLock;
use crate::storage::json_store;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// A selected task together with its owning project.
#[derive(Debug, Clone)]
pub struct NextTask {
    pub task: Task,
    pub project: Project,
}

pub fn add_project(name: &str, context: &str) -> Result<Project, AppError> {
    let path = json_store::store_path()?;
    add_project_with_path(&path, name, context, OffsetDateTime::now_utc())
}

pub fn add_task(
    project_id: &str,
    title: &str,
    context: &str,
    waiting: Option<(&str, &str)>,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, project_id, title, context, waiting, OffsetDateTime::now_utc())
}

/// Select the next task to present and advance the rotation cursor.
/// `None` is a valid result: nothing is eligible right now.
pub fn next_task() -> Result<Option<NextTask>, AppError> {
    let path = json_store::store_path()?;
    next_task_with_path(&path, OffsetDateTime::now_utc())
}

pub fn complete_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    complete_task_with_path(&path, id, OffsetDateTime::now_utc())
}

pub fn snooze_task(id: &str, reason: &str, until: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    snooze_task_with_path(&path, id, reason, until, OffsetDateTime::now_utc())
}

pub fn wake_task(id: &str, force: bool) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    wake_task_with_path(&path, id, force, OffsetDateTime::now_utc())
}

pub fn reopen_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    reopen_task_with_path(&path, id, OffsetDateTime::now_utc())
}

pub fn edit_task(id: &str, title: Option<&str>, context: Option<&str>) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    edit_task_with_path(&path, id, title, context, OffsetDateTime::now_utc())
}

pub fn edit_project(
    id: &str,
    name: Option<&str>,
    context: Option<&str>,
) -> Result<Project, AppError> {
    let path = json_store::store_path()?;
    edit_project_with_path(&path, id, name, context)
}

pub fn delete_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    delete_task_with_path(&path, id)
}

pub fn delete_project(id: &str, force: bool) -> Result<Project, AppError> {
    let path = json_store::store_path()?;
    delete_project_with_path(&path, id, force)
}

/// Read-only snapshot of the whole board, for listing.
pub fn load_board() -> Result<Board, AppError> {
    let path = json_store::store_path()?;
    json_store::load_state(&path)
}

pub fn show_task(id: &str) -> Result<NextTask, AppError> {
    let path = json_store::store_path()?;
    show_task_with_path(&path, id)
}

/// Resolve a snooze target: an RFC3339 timestamp, or a duration from
/// `now`. Durations are `45m` / `2h` / `1d6h30m` combinations; a bare
/// integer means minutes.
pub fn parse_snooze_until(raw: &str, now: OffsetDateTime) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("snooze target is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    now.checked_add(parse_duration(trimmed)?)
        .ok_or_else(|| AppError::invalid_argument("snooze target is out of range"))
}

/// A single `<value><unit>` component, built through checked arithmetic so
/// an absurd value surfaces as InvalidArgument rather than an overflow.
fn duration_component(value: i64, unit: char) -> Result<Duration, AppError> {
    let seconds_per_unit = match unit {
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        _ => return Err(AppError::invalid_argument("duration units are m, h and d")),
    };
    value
        .checked_mul(seconds_per_unit)
        .map(Duration::seconds)
        .ok_or_else(|| AppError::invalid_argument("duration is out of range"))
}

fn parse_duration(raw: &str) -> Result<Duration, AppError> {
    if raw.chars().all(|ch| ch.is_ascii_digit()) {
        let minutes: i64 = raw
            .parse()
            .map_err(|_| AppError::invalid_argument("duration is out of range"))?;
        return duration_component(minutes, 'm');
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        if digits.is_empty() {
            return Err(AppError::invalid_argument(
                "duration must look like 45m, 2h or 1d6h30m",
            ));
        }
        let value: i64 = digits
            .parse()
            .map_err(|_| AppError::invalid_argument("duration is out of range"))?;
        digits.clear();
        total = total
            .checked_add(duration_component(value, ch)?)
            .ok_or_else(|| AppError::invalid_argument("duration is out of range"))?;
    }
    if !digits.is_empty() {
        return Err(AppError::invalid_argument("duration must end with a unit"));
    }
    Ok(total)
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("id is required"));
    }
    Ok(trimmed)
}

fn add_project_with_path(
    path: &Path,
    name: &str,
    context: &str,
    now: OffsetDateTime,
) -> Result<Project, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("name is required"));
    }

    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let project = Project {
        id: format!("proj-{}", now.unix_timestamp_nanos()),
        name: trimmed.to_string(),
        context: context.trim().to_string(),
        task_ids: Vec::new(),
    };
    board.add_project(project.clone());
    json_store::save_state(path, &board)?;

    Ok(project)
}

fn add_task_with_path(
    path: &Path,
    project_id: &str,
    title: &str,
    context: &str,
    waiting: Option<(&str, &str)>,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let project_id = require_id(project_id)?;
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("title is required"));
    }

    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let stamp = format_rfc3339(now)?;
    let mut task = Task {
        id: format!("task-{}", now.unix_timestamp_nanos()),
        project_id: project_id.to_string(),
        title: trimmed.to_string(),
        context: context.trim().to_string(),
        status: TaskStatus::Running,
        waiting_reason: None,
        snooze_until: None,
        created_at: stamp.clone(),
        status_changed_at: stamp,
    };

    // A task may be born waiting; it goes through the same transition
    // checks as a later snooze.
    if let Some((reason, until)) = waiting {
        let until = parse_snooze_until(until, now)?;
        state_machine::snooze(&mut task, reason, until, now)?;
    }

    board.add_task(task.clone())?;
    json_store::save_state(path, &board)?;

    Ok(task)
}

fn next_task_with_path(path: &Path, now: OffsetDateTime) -> Result<Option<NextTask>, AppError> {
    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let Some(id) = scheduler::select_next(&board, now)? else {
        return Ok(None);
    };

    board.cursor = Some(id.clone());
    json_store::save_state(path, &board)?;

    let task = board.task(&id)?.clone();
    let project = board.project(&task.project_id)?.clone();
    Ok(Some(NextTask { task, project }))
}

fn complete_task_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Task, AppError> {
    let id = require_id(id)?;
    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let task = board.task_mut(id)?;
    state_machine::complete(task, now)?;
    let updated = task.clone();
    json_store::save_state(path, &board)?;

    Ok(updated)
}

fn snooze_task_with_path(
    path: &Path,
    id: &str,
    reason: &str,
    until: &str,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let id = require_id(id)?;
    let until = parse_snooze_until(until, now)?;

    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let task = board.task_mut(id)?;
    state_machine::snooze(task, reason, until, now)?;
    let updated = task.clone();
    json_store::save_state(path, &board)?;

    Ok(updated)
}

fn wake_task_with_path(
    path: &Path,
    id: &str,
    force: bool,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let id = require_id(id)?;
    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let task = board.task_mut(id)?;
    state_machine::wake(task, force, now)?;
    let updated = task.clone();
    json_store::save_state(path, &board)?;

    Ok(updated)
}

fn reopen_task_with_path(path: &Path, id: &str, now: OffsetDateTime) -> Result<Task, AppError> {
    let id = require_id(id)?;
    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let task = board.task_mut(id)?;
    state_machine::reopen(task, now)?;
    let updated = task.clone();
    json_store::save_state(path, &board)?;

    Ok(updated)
}

fn edit_task_with_path(
    path: &Path,
    id: &str,
    title: Option<&str>,
    context: Option<&str>,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let id = require_id(id)?;
    if title.is_none() && context.is_none() {
        return Err(AppError::invalid_argument("nothing to edit"));
    }
    if let Some(title) = title
        && title.trim().is_empty()
    {
        return Err(AppError::invalid_argument("title is required"));
    }

    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let stamp = format_rfc3339(now)?;
    let task = board.task_mut(id)?;
    if let Some(title) = title {
        task.title = title.trim().to_string();
    }
    if let Some(context) = context {
        task.context = context.trim().to_string();
    }
    task.status_changed_at = stamp;
    let updated = task.clone();
    json_store::save_state(path, &board)?;

    Ok(updated)
}

fn edit_project_with_path(
    path: &Path,
    id: &str,
    name: Option<&str>,
    context: Option<&str>,
) -> Result<Project, AppError> {
    let id = require_id(id)?;
    if name.is_none() && context.is_none() {
        return Err(AppError::invalid_argument("nothing to edit"));
    }
    if let Some(name) = name
        && name.trim().is_empty()
    {
        return Err(AppError::invalid_argument("name is required"));
    }

    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let project = board.project_mut(id)?;
    if let Some(name) = name {
        project.name = name.trim().to_string();
    }
    if let Some(context) = context {
        project.context = context.trim().to_string();
    }
    let updated = project.clone();
    json_store::save_state(path, &board)?;

    Ok(updated)
}

fn delete_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let id = require_id(id)?;
    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let removed = board.delete_task(id)?;
    json_store::save_state(path, &board)?;

    Ok(removed)
}

fn delete_project_with_path(path: &Path, id: &str, force: bool) -> Result<Project, AppError> {
    let id = require_id(id)?;
    let _lock = StoreLock::acquire(path)?;
    let mut board = json_store::load_state(path)?;

    let removed = board.delete_project(id, force)?;
    json_store::save_state(path, &board)?;

    Ok(removed)
}

fn show_task_with_path(path: &Path, id: &str) -> Result<NextTask, AppError> {
    let id = require_id(id)?;
    let board = json_store::load_state(path)?;
    let task = board.task(id)?.clone();
    let project = board.project(&task.project_id)?.clone();
    Ok(NextTask { task, project })
}
