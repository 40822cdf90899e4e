//! Round-robin selection over the eligible tasks.
//!
//! Eligibility is a pure function of the board and an injected `now`:
//! a task is eligible while Running, or while Waiting with an expired
//! snooze. Expiry never flips the persisted status here; a Waiting task
//! stays Waiting until an explicit wake.

use crate::board::Board;
use crate::error::AppError;
use crate::model::{Task, TaskStatus, parse_rfc3339};
use time::OffsetDateTime;

pub fn is_eligible(task: &Task, now: OffsetDateTime) -> Result<bool, AppError> {
    match task.status {
        TaskStatus::Running => Ok(true),
        TaskStatus::Done => Ok(false),
        TaskStatus::Waiting => {
            let raw = task
                .snooze_until
                .as_deref()
                .ok_or_else(|| AppError::invalid_data("waiting task has no snooze_until"))?;
            Ok(parse_rfc3339(raw, "snooze_until")? <= now)
        }
    }
}

/// The deterministic rotation order: projects in insertion order, tasks in
/// their project's insertion order. Done tasks are part of the order (the
/// cursor may point at one) but are never eligible.
pub fn rotation_order(board: &Board) -> Vec<&str> {
    let mut order = Vec::with_capacity(board.tasks.len());
    for project in &board.projects {
        for task_id in &project.task_ids {
            order.push(task_id.as_str());
        }
    }
    order
}

/// Select the first eligible task strictly after the cursor's position in
/// the rotation order, wrapping around; the cursor's own task is considered
/// last, so a single eligible task keeps being re-selected. Returns `None`
/// when nothing is eligible.
pub fn select_next(board: &Board, now: OffsetDateTime) -> Result<Option<String>, AppError> {
    let order = rotation_order(board);
    if order.is_empty() {
        return Ok(None);
    }

    // A cursor task that is no longer eligible still anchors the scan.
    let start = match board.cursor.as_deref() {
        Some(cursor) => order
            .iter()
            .position(|id| *id == cursor)
            .map(|position| position + 1)
            .unwrap_or(0),
        None => 0,
    };

    for offset in 0..order.len() {
        let id = order[(start + offset) % order.len()];
        if is_eligible(board.task(id)?, now)? {
            return Ok(Some(id.to_string()));
        }
    }

    Ok(None)
}
