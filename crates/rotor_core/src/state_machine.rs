use crate::error::AppError;
use crate::model::{Task, TaskStatus, format_rfc3339, parse_rfc3339};
use time::OffsetDateTime;

/// Legal status transitions, applied in place.
///
/// Running -> Waiting (snooze, needs a reason and a wake time)
/// Running | Waiting -> Done (complete)
/// Waiting -> Running (wake, once the snooze expired or forced)
/// Done -> Running (reopen)
///
/// Everything else, including same-state transitions, fails with
/// InvalidTransition and leaves the task untouched.

pub fn snooze(
    task: &mut Task,
    reason: &str,
    until: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    match task.status {
        TaskStatus::Running => {}
        TaskStatus::Waiting => {
            return Err(AppError::invalid_transition("task is already waiting"));
        }
        TaskStatus::Done => {
            return Err(AppError::invalid_transition("cannot snooze a done task"));
        }
    }

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::invalid_argument("waiting reason is required"));
    }

    task.status = TaskStatus::Waiting;
    task.waiting_reason = Some(reason.to_string());
    task.snooze_until = Some(format_rfc3339(until)?);
    task.status_changed_at = format_rfc3339(now)?;
    Ok(())
}

pub fn complete(task: &mut Task, now: OffsetDateTime) -> Result<(), AppError> {
    if task.status == TaskStatus::Done {
        return Err(AppError::invalid_transition("task is already done"));
    }

    task.status = TaskStatus::Done;
    task.waiting_reason = None;
    task.snooze_until = None;
    task.status_changed_at = format_rfc3339(now)?;
    Ok(())
}

pub fn wake(task: &mut Task, force: bool, now: OffsetDateTime) -> Result<(), AppError> {
    if task.status != TaskStatus::Waiting {
        return Err(AppError::invalid_transition("task is not waiting"));
    }

    if !force {
        let raw = task
            .snooze_until
            .as_deref()
            .ok_or_else(|| AppError::invalid_data("waiting task has no snooze_until"))?;
        if parse_rfc3339(raw, "snooze_until")? > now {
            return Err(AppError::invalid_transition(
                "snooze has not expired (use force to wake early)",
            ));
        }
    }

    task.status = TaskStatus::Running;
    task.waiting_reason = None;
    task.snooze_until = None;
    task.status_changed_at = format_rfc3339(now)?;
    Ok(())
}

pub fn reopen(task: &mut Task, now: OffsetDateTime) -> Result<(), AppError> {
    if task.status != TaskStatus::Done {
        return Err(AppError::invalid_transition("task is not done"));
    }

    task.status = TaskStatus::Running;
    task.waiting_reason = None;
    task.snooze_until = None;
    task.status_changed_at = format_rfc3339(now)?;
    Ok(())
}
