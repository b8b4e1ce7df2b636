//! Repository Layer - Board Store Trait
//!
//! The remote persistence capability the board consumes. Implementations can
//! be an HTTP service, an in-process store, etc.

use async_trait::async_trait;

use crate::domain::{Column, ColumnFields, DomainResult, NewTask, Task, TaskPatch};

/// Remote CRUD for columns and tasks.
///
/// Every call is request/response and may fail; callers must not assume
/// partial success. Ids of created entities are assigned by the store.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// All columns, each with its tasks
    async fn list_columns(&self) -> DomainResult<Vec<Column>>;

    async fn create_column(&self, fields: &ColumnFields) -> DomainResult<Column>;

    async fn update_column(&self, id: u32, fields: &ColumnFields) -> DomainResult<Column>;

    /// Delete a column; the store cascades to its tasks
    async fn delete_column(&self, id: u32) -> DomainResult<()>;

    async fn list_tasks_by_column(&self, column_id: u32) -> DomainResult<Vec<Task>>;

    async fn create_task(&self, column_id: u32, task: &NewTask) -> DomainResult<Task>;

    async fn update_task(&self, id: u32, patch: &TaskPatch) -> DomainResult<Task>;

    async fn delete_task(&self, id: u32) -> DomainResult<()>;
}
