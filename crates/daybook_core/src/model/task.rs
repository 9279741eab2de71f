use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type TaskId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new<T: Into<String>>(id: TaskId, text: T) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// A copy of the active list taken when it was cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub tasks: Vec<Task>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Direction of a `toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Completed,
    Reopened,
}
