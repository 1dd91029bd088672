use std::sync::RwLock;

use super::types::Task;

/// Session-local store for the task list.
///
/// `None` from [`TaskCache::get`] means the list was never loaded or has been
/// invalidated and must be fetched again.
pub trait TaskCache: Send + Sync {
    fn get(&self) -> Option<Vec<Task>>;
    fn set(&self, tasks: Vec<Task>);
    fn invalidate(&self);
    /// Patches the cached list in place. Returns `false` when nothing is cached.
    fn update(&self, patch: &mut dyn FnMut(&mut Vec<Task>)) -> bool;
}

pub struct MemoryCache {
    tasks: RwLock<Option<Vec<Task>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(None),
        }
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(Some(tasks)),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCache for MemoryCache {
    fn get(&self) -> Option<Vec<Task>> {
        let guard = self.tasks.read().ok()?;
        guard.clone()
    }

    fn set(&self, tasks: Vec<Task>) {
        if let Ok(mut guard) = self.tasks.write() {
            *guard = Some(tasks);
        }
    }

    fn invalidate(&self) {
        if let Ok(mut guard) = self.tasks.write() {
            *guard = None;
        }
    }

    fn update(&self, patch: &mut dyn FnMut(&mut Vec<Task>)) -> bool {
        let mut guard = match self.tasks.write() {
            Ok(lock) => lock,
            Err(_) => return false,
        };
        match guard.as_mut() {
            Some(tasks) => {
                patch(tasks);
                true
            }
            None => false,
        }
    }
}

/// Replaces the task with the same id, or appends when it is new.
pub fn upsert(tasks: &mut Vec<Task>, task: Task) {
    match tasks.iter().position(|existing| existing.id == task.id) {
        Some(idx) => tasks[idx] = task,
        None => tasks.push(task),
    }
}

/// Index of the task owning `subtask_id`. Subtask ids are unique across tasks.
pub fn find_owner(tasks: &[Task], subtask_id: &str) -> Option<usize> {
    tasks
        .iter()
        .position(|task| task.subtasks.iter().any(|sub| sub.id == subtask_id))
}
