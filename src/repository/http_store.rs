//! HTTP Board Store
//!
//! `BoardStore` backed by the board service's JSON API:
//! - `GET/POST /columns`, `PUT/DELETE /columns/{id}`
//! - `GET /columns/{id}/tasks`
//! - `POST /tasks`, `PUT/DELETE /tasks/{id}`
//!
//! Error responses carry `{"error": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::traits::BoardStore;
use crate::config::BoardConfig;
use crate::domain::{
    Checkpoint, Column, ColumnFields, DomainError, DomainResult, NewTask, Task, TaskPatch,
};

#[derive(Serialize)]
struct CreateTaskBody<'a> {
    title: &'a str,
    description: &'a str,
    progress: u8,
    column_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkpoints: Option<&'a [Checkpoint]>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// REST client for the board service
pub struct HttpBoardStore {
    client: Client,
    base_url: String,
}

impl HttpBoardStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &BoardConfig) -> DomainResult<Self> {
        Self::new(config.base_url(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        log::warn!("board store answered {}: {}", status, message);
        Err(DomainError::RemoteRejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> DomainResult<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DomainError::Internal(format!("invalid response body: {}", e)))
    }

    async fn fetch_list<T: DeserializeOwned>(&self, request: RequestBuilder) -> DomainResult<Vec<T>> {
        let body = self
            .send(request)
            .await?
            .text()
            .await
            .map_err(transport_error)?;
        decode_list(&body)
    }
}

/// A list body; the service sends `null` for an empty list
fn decode_list<T: DeserializeOwned>(body: &str) -> DomainResult<Vec<T>> {
    serde_json::from_str::<Option<Vec<T>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| DomainError::Internal(format!("invalid response body: {}", e)))
}

/// Connection failures and timeouts mean the store is unreachable
fn transport_error(e: reqwest::Error) -> DomainError {
    if is_unreachable(&e) {
        log::warn!("board store unreachable: {}", e);
        DomainError::RemoteUnavailable(e.to_string())
    } else {
        log::error!("board store request failed: {}", e);
        DomainError::Internal(e.to_string())
    }
}

fn is_unreachable(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout()
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
}

#[async_trait]
impl BoardStore for HttpBoardStore {
    async fn list_columns(&self) -> DomainResult<Vec<Column>> {
        self.fetch_list(self.request(Method::GET, "/columns")).await
    }

    async fn create_column(&self, fields: &ColumnFields) -> DomainResult<Column> {
        self.fetch(self.request(Method::POST, "/columns").json(fields))
            .await
    }

    async fn update_column(&self, id: u32, fields: &ColumnFields) -> DomainResult<Column> {
        let path = format!("/columns/{}", id);
        self.fetch(self.request(Method::PUT, &path).json(fields))
            .await
    }

    async fn delete_column(&self, id: u32) -> DomainResult<()> {
        let path = format!("/columns/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn list_tasks_by_column(&self, column_id: u32) -> DomainResult<Vec<Task>> {
        let path = format!("/columns/{}/tasks", column_id);
        self.fetch_list(self.request(Method::GET, &path)).await
    }

    async fn create_task(&self, column_id: u32, task: &NewTask) -> DomainResult<Task> {
        let body = CreateTaskBody {
            title: &task.title,
            description: &task.description,
            progress: task.progress,
            column_id,
            checkpoints: task.checkpoints.as_deref(),
        };
        self.fetch(self.request(Method::POST, "/tasks").json(&body))
            .await
    }

    async fn update_task(&self, id: u32, patch: &TaskPatch) -> DomainResult<Task> {
        let path = format!("/tasks/{}", id);
        self.fetch(self.request(Method::PUT, &path).json(patch))
            .await
    }

    async fn delete_task(&self, id: u32) -> DomainResult<()> {
        let path = format!("/tasks/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
