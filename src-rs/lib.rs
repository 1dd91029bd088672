pub mod config;
pub mod coordinator;
pub mod error;

#[path = "ai/lib.rs"]
pub mod ai;
#[path = "api/lib.rs"]
pub mod api;
#[path = "task/lib.rs"]
pub mod task;

pub use ai::{normalize_analysis, Analysis, Summary, TaskDraft, TaskPrompt};
pub use api::{HttpTaskApi, SubtaskChange, TaskApi};
pub use config::ClientConfig;
pub use coordinator::{Operation, OperationState, TaskCoordinator};
pub use error::{ApiError, ConfigError};
pub use task::{MemoryCache, Subtask, SubtaskPatch, Task, TaskCache, TaskFilter, TaskPatch, TaskStatus};
