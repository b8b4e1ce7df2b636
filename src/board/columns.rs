//! Column Entity Manager
//!
//! Splices columns into, and out of, a board value.

use chrono::Utc;

use super::Board;
use crate::domain::{Column, ColumnFields, DomainError, DomainResult, Task};

impl Board {
    /// Append a column created by the store
    pub fn with_column_added(&self, column: Column) -> DomainResult<Board> {
        if self.column(column.id).is_some() {
            return Err(DomainError::Conflict(format!(
                "column {} is already on the board",
                column.id
            )));
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(self.with_columns(columns))
    }

    /// Replace a column's title/color/timestamps with the store's answer.
    ///
    /// Local tasks are kept: the store may echo a column without its tasks.
    pub fn with_column_updated(&self, updated: &Column) -> DomainResult<Board> {
        self.map_column(updated.id, |column| Column {
            title: updated.title.clone(),
            color: updated.color,
            updated_at: updated.updated_at,
            ..column.clone()
        })
    }

    /// Apply `fields` locally (placeholder mode)
    pub fn with_column_fields(&self, column_id: u32, fields: &ColumnFields) -> DomainResult<Board> {
        self.map_column(column_id, |column| Column {
            title: fields.title.clone(),
            color: fields.color,
            updated_at: Utc::now(),
            ..column.clone()
        })
    }

    /// Take a column's task list from a fetch that started when the column
    /// held `before`.
    ///
    /// Tasks committed locally since then win over the fetched copy, and
    /// tasks deleted locally since then stay deleted.
    pub fn with_column_reloaded(
        &self,
        column_id: u32,
        fetched: &[Task],
        before: &[Task],
    ) -> DomainResult<Board> {
        self.map_column(column_id, |column| {
            let was = |id: u32| before.iter().find(|task| task.id == id);
            let touched = |task: &Task| was(task.id) != Some(task);

            let mut tasks: Vec<Task> = fetched
                .iter()
                .filter(|task| column.task(task.id).is_some() || was(task.id).is_none())
                .map(|task| match column.task(task.id) {
                    Some(local) if touched(local) => local.clone(),
                    _ => task.clone(),
                })
                .collect();
            for local in column.tasks.iter().filter(|task| touched(*task)) {
                if tasks.iter().all(|task| task.id != local.id) {
                    tasks.push(local.clone());
                }
            }

            Column {
                tasks,
                ..column.clone()
            }
        })
    }

    /// Drop a column together with every task it owns
    pub fn with_column_removed(&self, column_id: u32) -> DomainResult<Board> {
        if self.column(column_id).is_none() {
            return Err(column_not_found(column_id));
        }
        let columns = self
            .columns
            .iter()
            .filter(|column| column.id != column_id)
            .cloned()
            .collect();
        Ok(self.with_columns(columns))
    }

    pub(super) fn map_column(
        &self,
        column_id: u32,
        f: impl Fn(&Column) -> Column,
    ) -> DomainResult<Board> {
        if self.column(column_id).is_none() {
            return Err(column_not_found(column_id));
        }
        let columns = self
            .columns
            .iter()
            .map(|column| if column.id == column_id { f(column) } else { column.clone() })
            .collect();
        Ok(self.with_columns(columns))
    }
}

pub(super) fn column_not_found(column_id: u32) -> DomainError {
    DomainError::not_found(format!("column {}", column_id))
}
