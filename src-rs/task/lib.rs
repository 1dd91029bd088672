pub mod store;
pub mod types;

pub use store::{find_owner, upsert, MemoryCache, TaskCache};
pub use types::{Priority, Subtask, SubtaskPatch, Task, TaskFilter, TaskPatch, TaskStatus};
