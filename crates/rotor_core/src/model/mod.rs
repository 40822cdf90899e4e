mod project;
mod task;

pub use project::Project;
pub use task::{Task, TaskStatus};

use crate::error::AppError;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Format a timestamp the way the store expects it.
pub fn format_rfc3339(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Parse a stored timestamp; `field` names the offending field on failure.
pub fn parse_rfc3339(raw: &str, field: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|_| AppError::invalid_data(format!("{field} must be RFC3339")))
}
