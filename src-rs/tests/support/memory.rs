use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Notify;

use taskia_rs::api::{SubtaskChange, TaskApi};
use taskia_rs::task::{Subtask, SubtaskPatch, Task, TaskPatch, TaskStatus};
use taskia_rs::ApiError;

/// How the fake answers `PATCH /subtasks/:id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtaskReply {
    Subtask,
    OwningTask,
    Empty,
}

/// In-memory stand-in for the task service.
pub struct MemoryApi {
    pub tasks: Mutex<Vec<Task>>,
    pub calls: Mutex<Vec<String>>,
    pub messages: Mutex<Vec<String>>,
    pub analysis: Mutex<Value>,
    pub fail_status: Mutex<Option<u16>>,
    pub subtask_reply: Mutex<SubtaskReply>,
    pub subtask_body: Mutex<Option<Value>>,
    pub gate: Option<Arc<Notify>>,
    next_id: AtomicUsize,
}

impl MemoryApi {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            calls: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            analysis: Mutex::new(json!({"insights": "looks fine", "suggestions": "ship it"})),
            fail_status: Mutex::new(None),
            subtask_reply: Mutex::new(SubtaskReply::Subtask),
            subtask_body: Mutex::new(None),
            gate: None,
            next_id: AtomicUsize::new(1),
        }
    }

    /// `list_tasks` waits on `gate` before answering.
    pub fn gated(tasks: Vec<Task>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(tasks)
        }
    }

    pub fn fail_next(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn set_analysis(&self, value: Value) {
        *self.analysis.lock().unwrap() = value;
    }

    pub fn set_subtask_reply(&self, reply: SubtaskReply) {
        *self.subtask_reply.lock().unwrap() = reply;
    }

    /// Answer the next subtask update with `body` as if it came off the wire.
    pub fn set_subtask_body(&self, body: Value) {
        *self.subtask_body.lock().unwrap() = Some(body);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn server_task(&self, id: &str) -> Option<Task> {
        self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }

    fn record(&self, call: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.to_string());
        match self.fail_status.lock().unwrap().take() {
            Some(status) => Err(ApiError::Status {
                status,
                message: format!("{} failed", call),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn missing(what: &str, id: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{} {} not found", what, id),
        }
    }
}

#[async_trait]
impl TaskApi for MemoryApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.record("list")?;
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        self.record("get")?;
        self.server_task(id).ok_or_else(|| Self::missing("task", id))
    }

    async fn create_with_ai(&self, message: &str) -> Result<Task, ApiError> {
        self.record("create")?;
        self.messages.lock().unwrap().push(message.to_string());
        let draft = serde_json::from_str::<Value>(message).ok();
        let title = draft
            .as_ref()
            .and_then(|v| v.get("title"))
            .and_then(|v| v.as_str())
            .unwrap_or(message)
            .to_string();
        let mut value = json!({
            "id": self.next_id("task"),
            "title": title,
            "createdAt": Utc::now(),
            "completed": false,
        });
        if let Some(priority) = draft.as_ref().and_then(|v| v.get("priority")) {
            value["priority"] = priority.clone();
        }
        let task: Task = serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.record("update")?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::missing("task", id))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if patch.description.is_some() {
            task.description = patch.description.clone();
        }
        if let Some(tags) = &patch.tags {
            task.tags = tags.clone();
        }
        if let Some(status) = patch.status {
            task.set_status(status);
        } else if let Some(completed) = patch.completed {
            task.set_status(TaskStatus::from_completed(completed));
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete")?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Self::missing("task", id));
        }
        Ok(())
    }

    async fn analyze(&self, question: &str) -> Result<Value, ApiError> {
        self.record(&format!("analyze:{}", question))?;
        Ok(self.analysis.lock().unwrap().clone())
    }

    async fn generate_subtasks(&self, id: &str) -> Result<Task, ApiError> {
        self.record("generate")?;
        let first = self.next_id("sub");
        let second = self.next_id("sub");
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::missing("task", id))?;
        for (sid, title) in [(first, "Outline"), (second, "Draft")] {
            task.subtasks.push(Subtask {
                id: sid,
                title: title.to_string(),
                description: None,
                completed: false,
                task_id: Some(id.to_string()),
            });
        }
        // the server also stamps the parent; only subtasks should reach the cache
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }

    async fn summarize(&self) -> Result<Value, ApiError> {
        self.record("summarize")?;
        let count = self.tasks.lock().unwrap().len();
        Ok(json!({"success": true, "summary": format!("{} tasks\\nkeep going", count)}))
    }

    async fn update_subtask(
        &self,
        subtask_id: &str,
        patch: &SubtaskPatch,
    ) -> Result<SubtaskChange, ApiError> {
        self.record("update-subtask")?;
        if let Some(body) = self.subtask_body.lock().unwrap().take() {
            return Ok(SubtaskChange::from_value(body));
        }
        let reply = *self.subtask_reply.lock().unwrap();
        let mut tasks = self.tasks.lock().unwrap();
        let owner = tasks
            .iter_mut()
            .find(|t| t.subtasks.iter().any(|s| s.id == subtask_id))
            .ok_or_else(|| Self::missing("subtask", subtask_id))?;
        let sub = owner
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| Self::missing("subtask", subtask_id))?;
        patch.apply(sub);
        let sub = sub.clone();
        Ok(match reply {
            SubtaskReply::Subtask => SubtaskChange::Subtask(sub),
            SubtaskReply::OwningTask => SubtaskChange::Task(owner.clone()),
            SubtaskReply::Empty => SubtaskChange::Empty,
        })
    }

    async fn delete_subtask(&self, subtask_id: &str) -> Result<(), ApiError> {
        self.record("delete-subtask")?;
        let mut tasks = self.tasks.lock().unwrap();
        for task in tasks.iter_mut() {
            let before = task.subtasks.len();
            task.subtasks.retain(|s| s.id != subtask_id);
            if task.subtasks.len() != before {
                return Ok(());
            }
        }
        Err(Self::missing("subtask", subtask_id))
    }
}
