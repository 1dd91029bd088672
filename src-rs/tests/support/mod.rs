#![allow(dead_code)]

pub mod memory;
pub mod server;

use serde_json::{json, Value};
use taskia_rs::Task;

pub use memory::{MemoryApi, SubtaskReply};
pub use server::spawn_server;

/// `(id, title, completed)` for each subtask.
pub fn task_json(id: &str, title: &str, completed: bool, subtasks: &[(&str, &str, bool)]) -> Value {
    let subtasks: Vec<Value> = subtasks
        .iter()
        .map(|(sid, stitle, done)| json!({"id": sid, "title": stitle, "completed": done}))
        .collect();
    json!({
        "id": id,
        "title": title,
        "description": format!("{} description", title),
        "tags": ["demo"],
        "completed": completed,
        "priority": "medium",
        "category": "personal",
        "dueDate": "2025-06-01T00:00:00Z",
        "createdAt": "2025-05-01T09:30:00Z",
        "subtasks": subtasks,
    })
}

pub fn task(id: &str, title: &str, completed: bool) -> Task {
    task_with_subtasks(id, title, completed, &[])
}

pub fn task_with_subtasks(
    id: &str,
    title: &str,
    completed: bool,
    subtasks: &[(&str, &str, bool)],
) -> Task {
    serde_json::from_value(task_json(id, title, completed, subtasks)).expect("fixture task")
}
