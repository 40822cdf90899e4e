use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub context: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub waiting_reason: Option<String>,
    #[serde(default)]
    pub snooze_until: Option<String>,
    pub created_at: String,
    pub status_changed_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Waiting,
    Done,
}
