use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use taskia_rs::api::{SubtaskChange, TaskApi};
use taskia_rs::task::{SubtaskPatch, TaskPatch};
use taskia_rs::ApiError;

use super::memory::MemoryApi;

#[derive(serde::Deserialize)]
struct CreateBody {
    message: String,
}

#[derive(serde::Deserialize)]
struct AnalyzeBody {
    question: String,
}

/// Serves the task routes over HTTP on an ephemeral port, backed by `api`.
/// Returns the base URL.
pub async fn spawn_server(api: Arc<MemoryApi>) -> String {
    let app = Router::new()
        .route("/tasks", get(handle_list))
        .route("/tasks/ai", post(handle_create))
        .route("/tasks/analyze", post(handle_analyze))
        .route("/tasks/summarize", post(handle_summarize))
        .route(
            "/tasks/:id",
            get(handle_get).patch(handle_update).delete(handle_delete),
        )
        .route("/tasks/:id/subtasks", post(handle_generate))
        .route(
            "/subtasks/:id",
            patch(handle_update_subtask).delete(handle_delete_subtask),
        )
        .with_state(api);

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let local = server.local_addr();
    tokio::spawn(server);
    format!("http://{}", local)
}

fn reply<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(err) => error_reply(err),
    }
}

fn error_reply(err: ApiError) -> Response {
    let (status, message) = match err {
        ApiError::Status { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        ),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    };
    (status, Json(json!({"message": message}))).into_response()
}

fn no_content(result: Result<(), ApiError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_reply(err),
    }
}

async fn handle_list(State(api): State<Arc<MemoryApi>>) -> Response {
    reply(api.list_tasks().await)
}

async fn handle_get(State(api): State<Arc<MemoryApi>>, Path(id): Path<String>) -> Response {
    reply(api.get_task(&id).await)
}

async fn handle_create(
    State(api): State<Arc<MemoryApi>>,
    Json(body): Json<CreateBody>,
) -> Response {
    reply(api.create_with_ai(&body.message).await)
}

async fn handle_update(
    State(api): State<Arc<MemoryApi>>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Response {
    reply(api.update_task(&id, &patch).await)
}

async fn handle_delete(State(api): State<Arc<MemoryApi>>, Path(id): Path<String>) -> Response {
    no_content(api.delete_task(&id).await)
}

/// A string analysis is sent as raw text, the way a model's reply would be.
async fn handle_analyze(
    State(api): State<Arc<MemoryApi>>,
    Json(body): Json<AnalyzeBody>,
) -> Response {
    match api.analyze(&body.question).await {
        Ok(Value::String(text)) => (StatusCode::OK, text).into_response(),
        other => reply(other),
    }
}

async fn handle_generate(State(api): State<Arc<MemoryApi>>, Path(id): Path<String>) -> Response {
    reply(api.generate_subtasks(&id).await)
}

async fn handle_summarize(State(api): State<Arc<MemoryApi>>) -> Response {
    reply(api.summarize().await)
}

async fn handle_update_subtask(
    State(api): State<Arc<MemoryApi>>,
    Path(id): Path<String>,
    Json(patch): Json<SubtaskPatch>,
) -> Response {
    match api.update_subtask(&id, &patch).await {
        Ok(SubtaskChange::Task(task)) => Json(task).into_response(),
        Ok(SubtaskChange::Subtask(sub)) => Json(sub).into_response(),
        Ok(SubtaskChange::Empty) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_reply(err),
    }
}

async fn handle_delete_subtask(
    State(api): State<Arc<MemoryApi>>,
    Path(id): Path<String>,
) -> Response {
    no_content(api.delete_subtask(&id).await)
}
