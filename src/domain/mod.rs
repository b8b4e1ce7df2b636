//! Domain Layer
//!
//! Board entities, the checkpoint engine and the shared error type.
//! This layer has no I/O (serde and chrono only).

pub mod checkpoint;
mod column;
mod entity;
mod task;

pub use checkpoint::{Checkpoint, EditableCheckpoint};
pub use column::{Column, ColumnFields, ColumnPatch, NewColumn, Rgb};
pub use entity::{DomainError, DomainResult, Entity};
pub use task::{NewTask, Progress, Task, TaskPatch};
