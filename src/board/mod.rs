//! Board State
//!
//! The in-memory board: ordered columns, each owning its tasks. A `Board` is
//! a plain value. Every mutation helper in `columns` and `tasks` takes
//! `&self` and returns a new `Board` with the affected collection replaced,
//! so a snapshot handed to the UI never changes underneath it.

mod columns;
mod placeholder;
mod tasks;

use serde::Serialize;

use crate::domain::{Column, Task};

pub use placeholder::next_local_id;

/// Where the board's contents came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardOrigin {
    /// Fetched from (and kept in step with) the store
    #[default]
    Remote,
    /// Local stand-in shown while the store is unreachable; never persisted
    Placeholder,
}

/// All columns loaded for the session, in fetch/creation order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Board {
    columns: Vec<Column>,
    origin: BoardOrigin,
}

impl Board {
    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            origin: BoardOrigin::Remote,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn origin(&self) -> BoardOrigin {
        self.origin
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == BoardOrigin::Placeholder
    }

    pub fn column(&self, column_id: u32) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    /// Find a task in whichever column owns it
    pub fn find_task(&self, task_id: u32) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .find(|task| task.id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    /// Same origin, new column list
    fn with_columns(&self, columns: Vec<Column>) -> Board {
        Board {
            columns,
            origin: self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rgb;

    #[test]
    fn test_lookup() {
        let mut todo = Column::new(1, "Todo", Rgb::BLACK);
        todo.tasks.push(Task::new(10, 1, "a"));
        let mut done = Column::new(2, "Done", Rgb::BLACK);
        done.tasks.push(Task::new(11, 2, "b"));
        let board = Board::from_columns(vec![todo, done]);

        assert_eq!(board.column(2).map(|c| c.title.as_str()), Some("Done"));
        assert_eq!(board.find_task(11).map(|t| t.column_id), Some(2));
        assert!(board.find_task(12).is_none());
        assert_eq!(board.task_count(), 2);
        assert_eq!(board.origin(), BoardOrigin::Remote);
    }
}
