use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::task::{Subtask, SubtaskPatch, Task, TaskPatch};

#[derive(Debug, Serialize)]
pub struct CreateRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest {
    pub question: String,
}

/// What a subtask mutation answered with. The server may send back the whole
/// owning task, just the subtask, or nothing usable.
#[derive(Clone, Debug, PartialEq)]
pub enum SubtaskChange {
    Task(Task),
    Subtask(Subtask),
    Empty,
}

impl SubtaskChange {
    pub fn from_value(value: Value) -> Self {
        // a body with `subtasks` is the owning task; never read it as a subtask
        if value.get("subtasks").is_some_and(|v| v.is_array()) {
            return match serde_json::from_value::<Task>(value) {
                Ok(task) => SubtaskChange::Task(task),
                Err(_) => SubtaskChange::Empty,
            };
        }
        match serde_json::from_value::<Subtask>(value) {
            Ok(sub) => SubtaskChange::Subtask(sub),
            Err(_) => SubtaskChange::Empty,
        }
    }
}

/// One method per REST operation of the task service.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    async fn get_task(&self, id: &str) -> Result<Task, ApiError>;
    async fn create_with_ai(&self, message: &str) -> Result<Task, ApiError>;
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ApiError>;
    async fn delete_task(&self, id: &str) -> Result<(), ApiError>;
    /// Raw AI analysis; the shape is not trusted and goes through the normalizer.
    async fn analyze(&self, question: &str) -> Result<Value, ApiError>;
    async fn generate_subtasks(&self, id: &str) -> Result<Task, ApiError>;
    async fn summarize(&self) -> Result<Value, ApiError>;
    async fn update_subtask(
        &self,
        subtask_id: &str,
        patch: &SubtaskPatch,
    ) -> Result<SubtaskChange, ApiError>;
    async fn delete_subtask(&self, subtask_id: &str) -> Result<(), ApiError>;
}
