//! Placeholder Board
//!
//! Local stand-in shown when the store cannot be reached, so the UI is not
//! empty. Ids here are synthesized with `max + 1`; they are only valid for
//! this placeholder and are never sent to the store.

use super::{Board, BoardOrigin};
use crate::domain::{Column, Rgb, Task};

pub const PLACEHOLDER_COLUMN_TITLE: &str = "Column 1";
pub const PLACEHOLDER_TASK_TITLE: &str = "Sample Task";
pub const PLACEHOLDER_TASK_DESCRIPTION: &str = "This is a sample task";

/// `max(existing) + 1`, or 1 for an empty set
pub fn next_local_id(existing: impl IntoIterator<Item = u32>) -> u32 {
    existing.into_iter().max().map_or(1, |max| max.saturating_add(1))
}

impl Board {
    /// A single default column holding a single sample task
    pub fn placeholder() -> Board {
        let mut task = Task::new(1, 1, PLACEHOLDER_TASK_TITLE);
        task.description = PLACEHOLDER_TASK_DESCRIPTION.to_string();

        let mut column = Column::new(1, PLACEHOLDER_COLUMN_TITLE, Rgb::BLACK);
        column.tasks.push(task);

        Board {
            columns: vec![column],
            origin: BoardOrigin::Placeholder,
        }
    }

    pub fn next_local_column_id(&self) -> u32 {
        next_local_id(self.columns.iter().map(|column| column.id))
    }

    /// Next task id across the whole board
    pub fn next_local_task_id(&self) -> u32 {
        next_local_id(
            self.columns
                .iter()
                .flat_map(|column| column.tasks.iter().map(|task| task.id)),
        )
    }
}
