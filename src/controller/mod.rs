//! Board Controller
//!
//! The single owner of the session's `Board`. Every mutation follows
//! confirm-then-apply: the store call goes out first, and only a successful
//! answer is spliced into a new board value. A failed call leaves the board
//! exactly as it was and the error goes back to the caller.
//!
//! While the board is a placeholder (store unreachable at load time),
//! mutations are applied locally with synthesized ids and never reach the
//! store.

mod editor;
mod in_flight;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::board::Board;
use crate::domain::{
    Column, ColumnPatch, DomainError, DomainResult, NewColumn, NewTask, Task, TaskPatch,
};
use crate::repository::BoardStore;

pub use editor::{EditTarget, EditorState, Submission, TaskEditor};
pub use in_flight::EntityKey;

use in_flight::InFlight;

/// Result of loading with placeholder fallback
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(Board),
    /// Store unreachable; the placeholder board is shown instead
    Placeholder { board: Board, cause: DomainError },
}

pub struct BoardController {
    store: Arc<dyn BoardStore>,
    board: Mutex<Board>,
    in_flight: InFlight,
}

impl BoardController {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self {
            store,
            board: Mutex::new(Board::default()),
            in_flight: InFlight::default(),
        }
    }

    /// Current board snapshot
    pub async fn board(&self) -> Board {
        self.board.lock().await.clone()
    }

    /// Whether a mutation of `key` is waiting for the store
    pub fn is_pending(&self, key: EntityKey) -> bool {
        self.in_flight.is_pending(key)
    }

    /// Swap in the result of `f` applied to the current board
    async fn commit(&self, f: impl FnOnce(&Board) -> DomainResult<Board>) -> DomainResult<Board> {
        let mut board = self.board.lock().await;
        let next = f(&board)?;
        *board = next.clone();
        Ok(next)
    }

    // ========================
    // Loading
    // ========================

    /// Fetch every column (with tasks) and replace the board
    pub async fn load(&self) -> DomainResult<Board> {
        let columns = self.store.list_columns().await.map_err(|e| {
            log::error!("failed to load board: {}", e);
            e
        })?;
        let board = Board::from_columns(columns);
        log::info!(
            "loaded board: {} columns, {} tasks",
            board.columns().len(),
            board.task_count()
        );
        *self.board.lock().await = board.clone();
        Ok(board)
    }

    /// Like `load`, but an unreachable store yields the placeholder board
    pub async fn load_or_placeholder(&self) -> DomainResult<LoadOutcome> {
        match self.load().await {
            Ok(board) => Ok(LoadOutcome::Loaded(board)),
            Err(cause @ DomainError::RemoteUnavailable(_)) => {
                log::warn!("store unavailable, showing placeholder board");
                let board = Board::placeholder();
                *self.board.lock().await = board.clone();
                Ok(LoadOutcome::Placeholder { board, cause })
            }
            Err(e) => Err(e),
        }
    }

    /// Refetch one column's tasks from the store.
    ///
    /// Task mutations committed while the fetch is out are kept.
    pub async fn reload_column(&self, column_id: u32) -> DomainResult<Vec<Task>> {
        let snapshot = self.board().await;
        if snapshot.is_placeholder() {
            return snapshot.tasks_in(column_id).map(<[Task]>::to_vec);
        }
        let before = snapshot.tasks_in(column_id)?;

        let _guard = self.in_flight.claim(EntityKey::Column(column_id))?;
        let fetched = self.store.list_tasks_by_column(column_id).await.map_err(|e| {
            log::warn!("failed to reload column {}: {}", column_id, e);
            e
        })?;
        let board = self
            .commit(|board| board.with_column_reloaded(column_id, &fetched, before))
            .await?;
        board.tasks_in(column_id).map(<[Task]>::to_vec)
    }

    // ========================
    // Columns
    // ========================

    pub async fn create_column(&self, new: NewColumn) -> DomainResult<Column> {
        let snapshot = self.board().await;
        let fields = new.resolve(snapshot.columns().len());

        if snapshot.is_placeholder() {
            let column = Column::new(snapshot.next_local_column_id(), fields.title, fields.color);
            self.commit(|board| board.with_column_added(column.clone()))
                .await?;
            return Ok(column);
        }

        let column = self.store.create_column(&fields).await.map_err(|e| {
            log::warn!("failed to create column {:?}: {}", fields.title, e);
            e
        })?;
        self.commit(|board| board.with_column_added(column.clone()))
            .await?;
        log::info!("created column {} ({})", column.id, column.title);
        Ok(column)
    }

    pub async fn update_column(&self, column_id: u32, patch: ColumnPatch) -> DomainResult<Column> {
        let _guard = self.in_flight.claim(EntityKey::Column(column_id))?;
        let snapshot = self.board().await;
        let current = snapshot
            .column(column_id)
            .ok_or_else(|| DomainError::not_found(format!("column {}", column_id)))?;
        let fields = patch.resolve(current)?;

        if snapshot.is_placeholder() {
            let board = self
                .commit(|board| board.with_column_fields(column_id, &fields))
                .await?;
            return column_of(&board, column_id);
        }

        let updated = self
            .store
            .update_column(column_id, &fields)
            .await
            .map_err(|e| {
                log::warn!("failed to update column {}: {}", column_id, e);
                e
            })?;
        let board = self
            .commit(|board| board.with_column_updated(&updated))
            .await?;
        column_of(&board, column_id)
    }

    /// Delete a column; its tasks leave the board with it
    pub async fn delete_column(&self, column_id: u32) -> DomainResult<()> {
        let _guard = self.in_flight.claim(EntityKey::Column(column_id))?;
        let snapshot = self.board().await;
        if snapshot.column(column_id).is_none() {
            return Err(DomainError::not_found(format!("column {}", column_id)));
        }

        if !snapshot.is_placeholder() {
            self.store.delete_column(column_id).await.map_err(|e| {
                log::warn!("failed to delete column {}: {}", column_id, e);
                e
            })?;
        }
        self.commit(|board| board.with_column_removed(column_id))
            .await?;
        log::info!("deleted column {}", column_id);
        Ok(())
    }

    // ========================
    // Tasks
    // ========================

    /// Tasks of a column in insertion order
    pub async fn tasks_in(&self, column_id: u32) -> DomainResult<Vec<Task>> {
        self.board.lock().await.tasks_in(column_id).map(<[Task]>::to_vec)
    }

    pub async fn create_task(&self, column_id: u32, new: NewTask) -> DomainResult<Task> {
        let new = new.validated()?;
        let snapshot = self.board().await;
        snapshot.tasks_in(column_id)?;

        if snapshot.is_placeholder() {
            let task = new.into_task(snapshot.next_local_task_id(), column_id);
            self.commit(|board| board.with_task_added(task.clone()))
                .await?;
            return Ok(task);
        }

        let confirmed = self.store.create_task(column_id, &new).await.map_err(|e| {
            log::warn!("failed to create task in column {}: {}", column_id, e);
            e
        })?;
        let expected = new.into_task(confirmed.id, column_id);
        let task = keep_checkpoints(confirmed, &expected);

        self.commit(|board| board.with_task_added(task.clone()))
            .await
            .map_err(|e| {
                log::warn!("created task {} could not be placed: {}", task.id, e);
                e
            })?;
        log::info!("created task {} in column {}", task.id, column_id);
        Ok(task)
    }

    /// Apply a partial update; progress is recomputed before the store sees it
    pub async fn update_task(&self, task_id: u32, patch: TaskPatch) -> DomainResult<Task> {
        let _guard = self.in_flight.claim(EntityKey::Task(task_id))?;
        let snapshot = self.board().await;
        let current = snapshot
            .find_task(task_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("task {}", task_id)))?;
        let patch = patch.resolve(&current)?;
        let expected = patch.apply(&current);

        let task = if snapshot.is_placeholder() {
            expected
        } else {
            let confirmed = self.store.update_task(task_id, &patch).await.map_err(|e| {
                log::warn!("failed to update task {}: {}", task_id, e);
                e
            })?;
            keep_checkpoints(confirmed, &expected)
        };

        self.commit(|board| board.with_task_replaced(task.clone()))
            .await?;
        log::debug!("updated task {} ({}%)", task.id, task.percent());
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: u32) -> DomainResult<()> {
        let _guard = self.in_flight.claim(EntityKey::Task(task_id))?;
        let snapshot = self.board().await;
        if snapshot.find_task(task_id).is_none() {
            return Err(DomainError::not_found(format!("task {}", task_id)));
        }

        if !snapshot.is_placeholder() {
            self.store.delete_task(task_id).await.map_err(|e| {
                log::warn!("failed to delete task {}: {}", task_id, e);
                e
            })?;
        }
        self.commit(|board| board.with_task_removed(task_id))
            .await?;
        log::info!("deleted task {}", task_id);
        Ok(())
    }

    // ========================
    // Edit sessions
    // ========================

    /// Open `editor` blank for a new task in `column_id`
    pub async fn new_task(&self, editor: &mut TaskEditor, column_id: u32) -> DomainResult<()> {
        self.board.lock().await.tasks_in(column_id)?;
        editor.open_new(column_id)
    }

    /// Open `editor` on an existing task
    pub async fn edit_task(&self, editor: &mut TaskEditor, task_id: u32) -> DomainResult<()> {
        let task = self
            .board
            .lock()
            .await
            .find_task(task_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("task {}", task_id)))?;
        editor.open_existing(&task)
    }

    /// Save the editor's buffer; the editor closes only if the store confirms
    pub async fn save_task(&self, editor: &mut TaskEditor) -> DomainResult<Task> {
        let result = match editor.begin_save()? {
            Submission::Create { column_id, task } => self.create_task(column_id, task).await,
            Submission::Update { task_id, patch } => self.update_task(task_id, patch).await,
        };
        editor.finish_save(&result);
        result
    }
}

fn column_of(board: &Board, column_id: u32) -> DomainResult<Column> {
    board
        .column(column_id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("column {}", column_id)))
}

/// The store may not echo checkpoints back; keep the ones that were sent
fn keep_checkpoints(mut confirmed: Task, expected: &Task) -> Task {
    if !confirmed.is_tracked() && expected.is_tracked() {
        confirmed.progress = expected.progress.clone();
    }
    confirmed
}
