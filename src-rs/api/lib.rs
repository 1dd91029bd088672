pub mod client;
pub mod types;

pub use client::{check_response, HttpTaskApi};
pub use types::{AnalyzeRequest, CreateRequest, SubtaskChange, TaskApi};
