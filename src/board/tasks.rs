//! Task Entity Manager
//!
//! Splices tasks into, and out of, their owning column of a board value.

use super::columns::column_not_found;
use super::Board;
use crate::domain::{DomainError, DomainResult, Task};

impl Board {
    /// Tasks of a column in insertion order
    pub fn tasks_in(&self, column_id: u32) -> DomainResult<&[Task]> {
        self.column(column_id)
            .map(|column| column.tasks.as_slice())
            .ok_or_else(|| column_not_found(column_id))
    }

    /// Append a task to the column named by its `column_id`
    pub fn with_task_added(&self, task: Task) -> DomainResult<Board> {
        if self.find_task(task.id).is_some() {
            return Err(DomainError::Conflict(format!(
                "task {} is already on the board",
                task.id
            )));
        }
        self.map_column(task.column_id, |column| {
            let mut column = column.clone();
            column.tasks.push(task.clone());
            column
        })
    }

    /// Replace a task in place, keeping its position
    pub fn with_task_replaced(&self, task: Task) -> DomainResult<Board> {
        let owner = self
            .find_task(task.id)
            .map(|existing| existing.column_id)
            .ok_or_else(|| task_not_found(task.id))?;

        self.map_column(owner, |column| {
            let mut column = column.clone();
            if let Some(slot) = column.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = Task {
                    column_id: owner,
                    ..task.clone()
                };
            }
            column
        })
    }

    pub fn with_task_removed(&self, task_id: u32) -> DomainResult<Board> {
        let owner = self
            .find_task(task_id)
            .map(|task| task.column_id)
            .ok_or_else(|| task_not_found(task_id))?;

        self.map_column(owner, |column| {
            let mut column = column.clone();
            column.tasks.retain(|t| t.id != task_id);
            column
        })
    }
}

pub(crate) fn task_not_found(task_id: u32) -> DomainError {
    DomainError::not_found(format!("task {}", task_id))
}
