use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::types::{AnalyzeRequest, CreateRequest, SubtaskChange, TaskApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::task::{SubtaskPatch, Task, TaskPatch};

/// [`TaskApi`] over HTTP. No retries; a failed request is reported as is.
#[derive(Clone)]
pub struct HttpTaskApi {
    pub base_url: String,
    client: Client,
}

impl HttpTaskApi {
    pub fn new(cfg: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: cfg.base_url().to_string(),
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        debug!(%method, path, "task api request");
        let mut req = self.client.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        check_response(req.send().await?).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let resp = self.send(method, path, body).await?;
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|err| ApiError::Decode(format!("{}: {}", path, err)))
    }
}

/// Maps a non-success status to [`ApiError::Status`] carrying the body text.
pub async fn check_response(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pulls `message`/`error` out of a JSON error body, else returns the body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Empty bodies and JSON `null` both count as "no data".
fn body_value(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.send_json::<(), _>(Method::GET, "/tasks", None).await
    }

    async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        let path = format!("/tasks/{}", segment(id));
        self.send_json::<(), _>(Method::GET, &path, None).await
    }

    async fn create_with_ai(&self, message: &str) -> Result<Task, ApiError> {
        let body = CreateRequest {
            message: message.to_string(),
        };
        self.send_json(Method::POST, "/tasks/ai", Some(&body)).await
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ApiError> {
        let path = format!("/tasks/{}", segment(id));
        self.send_json(Method::PATCH, &path, Some(patch)).await
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/tasks/{}", segment(id));
        self.send::<()>(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn analyze(&self, question: &str) -> Result<Value, ApiError> {
        let body = AnalyzeRequest {
            question: question.to_string(),
        };
        let resp = self.send(Method::POST, "/tasks/analyze", Some(&body)).await?;
        Ok(body_value(&resp.text().await?))
    }

    async fn generate_subtasks(&self, id: &str) -> Result<Task, ApiError> {
        let path = format!("/tasks/{}/subtasks", segment(id));
        self.send_json::<(), _>(Method::POST, &path, None).await
    }

    async fn summarize(&self) -> Result<Value, ApiError> {
        let resp = self.send::<()>(Method::POST, "/tasks/summarize", None).await?;
        Ok(body_value(&resp.text().await?))
    }

    async fn update_subtask(
        &self,
        subtask_id: &str,
        patch: &SubtaskPatch,
    ) -> Result<SubtaskChange, ApiError> {
        let path = format!("/subtasks/{}", segment(subtask_id));
        let resp = self.send(Method::PATCH, &path, Some(patch)).await?;
        Ok(SubtaskChange::from_value(body_value(&resp.text().await?)))
    }

    async fn delete_subtask(&self, subtask_id: &str) -> Result<(), ApiError> {
        let path = format!("/subtasks/{}", segment(subtask_id));
        self.send::<()>(Method::DELETE, &path, None).await?;
        Ok(())
    }
}
