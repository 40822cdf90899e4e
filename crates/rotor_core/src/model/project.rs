use serde::{Deserialize, Serialize};

/// A project owns its tasks by id. The order of `task_ids` is insertion
/// order and is the tie-break used by the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}
