use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::extract_json_object;
use crate::task::Priority;

/// Structured fields for AI task creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// Finds a JSON object with at least a title in free text (fenced,
    /// escaped or embedded in prose).
    pub fn from_text(text: &str) -> Option<Self> {
        let map = extract_json_object(text)?;
        let draft: TaskDraft = serde_json::from_value(Value::Object(map)).ok()?;
        if draft.title.trim().is_empty() {
            return None;
        }
        Some(draft)
    }
}

/// What the user asked the AI to create.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskPrompt {
    Text(String),
    Structured(TaskDraft),
}

impl TaskPrompt {
    pub fn from_input(input: &str) -> Self {
        match TaskDraft::from_text(input) {
            Some(draft) => TaskPrompt::Structured(draft),
            None => TaskPrompt::Text(input.trim().to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TaskPrompt::Text(text) => text.trim().is_empty(),
            TaskPrompt::Structured(draft) => draft.title.trim().is_empty(),
        }
    }

    /// The `message` sent to `POST /tasks/ai`. Structured drafts go out as a
    /// JSON string.
    pub fn message(&self) -> String {
        match self {
            TaskPrompt::Text(text) => text.clone(),
            TaskPrompt::Structured(draft) => {
                serde_json::to_string(draft).unwrap_or_else(|_| draft.title.clone())
            }
        }
    }
}

impl From<&str> for TaskPrompt {
    fn from(input: &str) -> Self {
        TaskPrompt::Text(input.to_string())
    }
}

impl From<TaskDraft> for TaskPrompt {
    fn from(draft: TaskDraft) -> Self {
        TaskPrompt::Structured(draft)
    }
}
