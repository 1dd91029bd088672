//! Session-wide task cache and the operations that read and mutate it.
//!
//! Every mutation patches the cache from the server's answer. The cache is
//! only invalidated when the answer does not carry enough data to patch with.
//! Operations are not serialized per entity: when two responses for the same
//! task race, whichever arrives last wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ai::{normalize_summary, Summary, TaskPrompt};
use crate::api::{SubtaskChange, TaskApi};
use crate::error::ApiError;
use crate::task::{find_owner, upsert, MemoryCache, SubtaskPatch, Task, TaskCache, TaskFilter, TaskPatch};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Refresh,
    Create,
    Update,
    Delete,
    GenerateSubtasks,
    UpdateSubtask,
    DeleteSubtask,
    Analyze,
    Summarize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OperationState {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

pub struct TaskCoordinator {
    api: Arc<dyn TaskApi>,
    cache: Arc<dyn TaskCache>,
    states: Mutex<HashMap<Operation, OperationState>>,
}

impl TaskCoordinator {
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self::with_cache(api, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(api: Arc<dyn TaskApi>, cache: Arc<dyn TaskCache>) -> Self {
        Self {
            api,
            cache,
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self, op: Operation) -> OperationState {
        match self.states.lock() {
            Ok(map) => map.get(&op).cloned().unwrap_or_default(),
            Err(_) => OperationState::Idle,
        }
    }

    pub fn is_pending(&self, op: Operation) -> bool {
        self.state(op) == OperationState::Pending
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.cache.get().unwrap_or_default()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.cache.get()?.into_iter().find(|task| task.id == id)
    }

    pub fn filtered(&self, filter: TaskFilter) -> Vec<Task> {
        self.tasks()
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    pub async fn load(&self) -> Result<Vec<Task>, ApiError> {
        let tasks = self.track(Operation::Load, self.api.list_tasks()).await?;
        info!(count = tasks.len(), "task list loaded");
        self.cache.set(tasks.clone());
        Ok(tasks)
    }

    pub async fn ensure_loaded(&self) -> Result<Vec<Task>, ApiError> {
        match self.cache.get() {
            Some(tasks) => Ok(tasks),
            None => self.load().await,
        }
    }

    pub async fn refresh_task(&self, id: &str) -> Result<Task, ApiError> {
        let task = self.track(Operation::Refresh, self.api.get_task(id)).await?;
        self.patch("refresh", |tasks| upsert(tasks, task.clone()));
        Ok(task)
    }

    pub async fn create(&self, prompt: impl Into<TaskPrompt>) -> Result<Task, ApiError> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return Err(ApiError::EmptyPrompt);
        }
        let message = prompt.message();
        let task = self
            .track(Operation::Create, self.api.create_with_ai(&message))
            .await?;
        self.patch("create", |tasks| upsert(tasks, task.clone()));
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, ApiError> {
        let patch = patch.reconciled();
        let task = self
            .track(Operation::Update, self.api.update_task(id, &patch))
            .await?;
        self.patch("update", |tasks| upsert(tasks, task.clone()));
        Ok(task)
    }

    pub async fn toggle_completed(&self, id: &str) -> Result<Task, ApiError> {
        let current = self
            .task(id)
            .ok_or_else(|| ApiError::NotFound(format!("task {}", id)))?;
        self.update_task(id, TaskPatch::completion(!current.is_completed()))
            .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.track(Operation::Delete, self.api.delete_task(id))
            .await?;
        self.patch("delete", |tasks| tasks.retain(|task| task.id != id));
        Ok(())
    }

    /// Replaces only the matching task's subtasks; other tasks are left as is.
    pub async fn generate_subtasks(&self, id: &str) -> Result<Task, ApiError> {
        let task = self
            .track(Operation::GenerateSubtasks, self.api.generate_subtasks(id))
            .await?;
        self.patch("generate subtasks", |tasks| {
            match tasks.iter_mut().find(|cached| cached.id == task.id) {
                Some(cached) => cached.subtasks = task.subtasks.clone(),
                None => tasks.push(task.clone()),
            }
        });
        Ok(task)
    }

    pub async fn update_subtask(
        &self,
        subtask_id: &str,
        patch: SubtaskPatch,
    ) -> Result<SubtaskChange, ApiError> {
        let change = self
            .track(
                Operation::UpdateSubtask,
                self.api.update_subtask(subtask_id, &patch),
            )
            .await?;
        match &change {
            SubtaskChange::Task(task) => {
                self.patch("update subtask", |tasks| upsert(tasks, task.clone()));
            }
            SubtaskChange::Subtask(sub) if sub.id != subtask_id => {
                warn!(subtask_id, returned = %sub.id, "subtask update answered for another id");
                self.invalidate("subtask update returned a different subtask");
            }
            SubtaskChange::Subtask(sub) => {
                let found = self.patch_owner(subtask_id, |owner| {
                    if let Some(slot) = owner.subtasks.iter_mut().find(|s| s.id == subtask_id) {
                        let task_id = slot.task_id.clone();
                        *slot = sub.clone();
                        if slot.task_id.is_none() {
                            slot.task_id = task_id;
                        }
                    }
                });
                if !found {
                    self.invalidate("subtask owner not cached");
                }
            }
            SubtaskChange::Empty => self.invalidate("subtask update returned no data"),
        }
        Ok(change)
    }

    pub async fn delete_subtask(&self, subtask_id: &str) -> Result<(), ApiError> {
        self.track(
            Operation::DeleteSubtask,
            self.api.delete_subtask(subtask_id),
        )
        .await?;
        let found = self.patch_owner(subtask_id, |owner| {
            owner.subtasks.retain(|sub| sub.id != subtask_id);
        });
        if !found {
            self.invalidate("subtask owner not cached");
        }
        Ok(())
    }

    /// Raw AI analysis for a task. Read only; the cache is not touched.
    pub async fn analyze(&self, task_id: &str) -> Result<Value, ApiError> {
        self.track(Operation::Analyze, self.api.analyze(task_id))
            .await
    }

    pub async fn summarize(&self) -> Result<Summary, ApiError> {
        let raw = self
            .track(Operation::Summarize, self.api.summarize())
            .await?;
        Ok(normalize_summary(&raw))
    }

    async fn track<T, F>(&self, op: Operation, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.set_state(op, OperationState::Pending);
        let result = fut.await;
        match &result {
            Ok(_) => self.set_state(op, OperationState::Success),
            Err(err) => {
                warn!(?op, %err, "task operation failed");
                self.set_state(op, OperationState::Error(err.to_string()));
            }
        }
        result
    }

    fn set_state(&self, op: Operation, state: OperationState) {
        if let Ok(mut map) = self.states.lock() {
            map.insert(op, state);
        }
    }

    fn patch<F>(&self, what: &str, mut f: F)
    where
        F: FnMut(&mut Vec<Task>),
    {
        if self.cache.update(&mut f) {
            info!(what, "task cache patched");
        } else {
            debug!(what, "task cache not loaded, nothing to patch");
        }
    }

    fn patch_owner<F>(&self, subtask_id: &str, mut f: F) -> bool
    where
        F: FnMut(&mut Task),
    {
        let mut found = false;
        let loaded = self.cache.update(&mut |tasks: &mut Vec<Task>| {
            if let Some(idx) = find_owner(tasks, subtask_id) {
                f(&mut tasks[idx]);
                found = true;
            }
        });
        if found {
            info!(subtask_id, "subtask owner patched");
        }
        // an unloaded cache has nothing to keep consistent
        !loaded || found
    }

    fn invalidate(&self, reason: &str) {
        warn!(reason, "invalidating task cache");
        self.cache.invalidate();
    }
}
