//! In-Memory Board Store
//!
//! A store that behaves like the remote service (store-assigned ids, cascade
//! delete, timestamps) without leaving the process. Failures can be injected
//! and calls can be held back, which makes it the store of choice for tests
//! and offline demos.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};

use super::traits::BoardStore;
use crate::domain::{
    Column, ColumnFields, DomainError, DomainResult, NewTask, Task, TaskPatch,
};

#[derive(Default)]
struct StoreData {
    columns: Vec<Column>,
    last_column_id: u32,
    last_task_id: u32,
}

impl StoreData {
    fn column_mut(&mut self, id: u32) -> DomainResult<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.id == id)
            .ok_or_else(|| rejected(404, "Column not found"))
    }

    fn task_mut(&mut self, id: u32) -> DomainResult<&mut Task> {
        self.columns
            .iter_mut()
            .flat_map(|column| column.tasks.iter_mut())
            .find(|task| task.id == id)
            .ok_or_else(|| rejected(404, "Task not found"))
    }
}

fn rejected(status: u16, message: &str) -> DomainError {
    DomainError::RemoteRejected {
        status,
        message: message.to_string(),
    }
}

/// Process-local `BoardStore`
#[derive(Default)]
pub struct InMemoryBoardStore {
    data: Mutex<StoreData>,
    offline: AtomicBool,
    failures: Mutex<VecDeque<DomainError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing columns; id counters continue after the highest ids
    pub fn with_columns(columns: Vec<Column>) -> Self {
        let last_column_id = columns.iter().map(|c| c.id).max().unwrap_or(0);
        let last_task_id = columns
            .iter()
            .flat_map(|c| c.tasks.iter().map(|t| t.id))
            .max()
            .unwrap_or(0);
        Self {
            data: Mutex::new(StoreData {
                columns,
                last_column_id,
                last_task_id,
            }),
            ..Self::default()
        }
    }

    /// While offline every call fails with `RemoteUnavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the next call fail with `error` (queued, first in first out)
    pub async fn fail_next(&self, error: DomainError) {
        self.failures.lock().await.push_back(error);
    }

    /// Hold every following call until a permit is added to the returned
    /// semaphore (one permit releases one call)
    pub async fn hold_calls(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().await = Some(gate.clone());
        gate
    }

    /// Names of the operations received so far, in order
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Snapshot of what the store holds
    pub async fn columns(&self) -> Vec<Column> {
        self.data.lock().await.columns.clone()
    }

    async fn begin(&self, op: &str) -> DomainResult<()> {
        self.calls.lock().await.push(op.to_string());

        let gate = self.gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?
                .forget();
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(DomainError::RemoteUnavailable(
                "store is offline".to_string(),
            ));
        }
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn list_columns(&self) -> DomainResult<Vec<Column>> {
        self.begin("list_columns").await?;
        Ok(self.data.lock().await.columns.clone())
    }

    async fn create_column(&self, fields: &ColumnFields) -> DomainResult<Column> {
        self.begin("create_column").await?;
        let mut data = self.data.lock().await;

        data.last_column_id += 1;
        let column = Column::new(data.last_column_id, fields.title.clone(), fields.color);
        data.columns.push(column.clone());
        Ok(column)
    }

    async fn update_column(&self, id: u32, fields: &ColumnFields) -> DomainResult<Column> {
        self.begin("update_column").await?;
        let mut data = self.data.lock().await;

        let column = data.column_mut(id)?;
        column.title = fields.title.clone();
        column.color = fields.color;
        column.updated_at = Utc::now();
        // echo without tasks, like a plain save on the service side
        Ok(Column {
            tasks: Vec::new(),
            ..column.clone()
        })
    }

    async fn delete_column(&self, id: u32) -> DomainResult<()> {
        self.begin("delete_column").await?;
        let mut data = self.data.lock().await;

        data.column_mut(id)?;
        data.columns.retain(|column| column.id != id);
        Ok(())
    }

    async fn list_tasks_by_column(&self, column_id: u32) -> DomainResult<Vec<Task>> {
        self.begin("list_tasks_by_column").await?;
        let mut data = self.data.lock().await;

        Ok(data.column_mut(column_id)?.tasks.clone())
    }

    async fn create_task(&self, column_id: u32, task: &NewTask) -> DomainResult<Task> {
        self.begin("create_task").await?;
        let mut data = self.data.lock().await;

        data.column_mut(column_id)?;
        data.last_task_id += 1;
        let created = task.clone().into_task(data.last_task_id, column_id);
        data.column_mut(column_id)?.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: u32, patch: &TaskPatch) -> DomainResult<Task> {
        self.begin("update_task").await?;
        let mut data = self.data.lock().await;

        let task = data.task_mut(id)?;
        *task = patch.apply(task);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: u32) -> DomainResult<()> {
        self.begin("delete_task").await?;
        let mut data = self.data.lock().await;

        data.task_mut(id)?;
        for column in data.columns.iter_mut() {
            column.tasks.retain(|task| task.id != id);
        }
        Ok(())
    }
}
