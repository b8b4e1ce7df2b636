//! Board Controller Tests
//!
//! End-to-end flows against InMemoryBoardStore.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::board::BoardOrigin;
use crate::controller::{BoardController, EditorState, EntityKey, LoadOutcome, TaskEditor};
use crate::domain::checkpoint::DONE_LABEL;
use crate::domain::{
    Checkpoint, Column, ColumnFields, ColumnPatch, DomainError, DomainResult, NewColumn, NewTask,
    Rgb, Task, TaskPatch,
};
use crate::repository::{BoardStore, InMemoryBoardStore};

async fn setup() -> (Arc<InMemoryBoardStore>, BoardController) {
    let store = Arc::new(InMemoryBoardStore::new());
    let controller = BoardController::new(store.clone());
    controller.load().await.expect("Failed to load");
    (store, controller)
}

async fn setup_with_backlog() -> (Arc<InMemoryBoardStore>, BoardController, u32) {
    let (store, controller) = setup().await;
    let column = controller
        .create_column(NewColumn::titled("Backlog").with_color(Rgb::new(10, 10, 10)))
        .await
        .expect("Failed to create column");
    (store, controller, column.id)
}

#[tokio::test]
async fn test_load_reads_columns_with_tasks() {
    let store = Arc::new(InMemoryBoardStore::new());
    let seed = BoardController::new(store.clone());
    let column = seed.create_column(NewColumn::titled("Todo")).await.unwrap();
    seed.create_task(column.id, NewTask::new("a")).await.unwrap();

    let controller = BoardController::new(store);
    let board = controller.load().await.unwrap();
    assert_eq!(board.origin(), BoardOrigin::Remote);
    assert_eq!(board.tasks_in(column.id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_scenario_a_bootstrap_and_finish() {
    let (_store, controller, column_id) = setup_with_backlog().await;
    let column = controller.board().await.column(column_id).cloned().unwrap();
    assert_eq!(column.title, "Backlog");
    assert_eq!(column.color.to_string(), "10,10,10");

    let task = controller
        .create_task(column_id, NewTask::new("Write release notes").with_progress(0))
        .await
        .unwrap();
    assert!(!task.is_tracked());

    let mut editor = TaskEditor::new();
    controller.edit_task(&mut editor, task.id).await.unwrap();
    let flags: Vec<bool> = editor.checkpoints().iter().map(|cp| cp.checked).collect();
    assert_eq!(flags, vec![true, false]);

    editor.toggle_checkpoint(1).unwrap();
    assert_eq!(editor.progress(), 100);

    let saved = controller.save_task(&mut editor).await.unwrap();
    assert_eq!(saved.percent(), 100);
    assert_eq!(editor.state(), EditorState::Closed);
    assert_eq!(
        controller.board().await.find_task(task.id).unwrap().percent(),
        100
    );
}

#[tokio::test]
async fn test_scenario_b_intermediate_checkpoints() {
    let (_store, controller, column_id) = setup_with_backlog().await;
    let task = controller
        .create_task(column_id, NewTask::new("Build it"))
        .await
        .unwrap();

    let checkpoints = vec![
        Checkpoint::new("Start", true),
        Checkpoint::new("Design", true),
        Checkpoint::new("Build", false),
        Checkpoint::new(DONE_LABEL, false),
    ];
    let updated = controller
        .update_task(task.id, TaskPatch::checkpoints(checkpoints))
        .await
        .unwrap();

    assert_eq!(updated.percent(), 33);
    let mut editor = TaskEditor::new();
    controller.edit_task(&mut editor, task.id).await.unwrap();
    let percents: Vec<u8> = editor.rows().iter().map(|r| r.percent).collect();
    assert_eq!(percents, vec![0, 33, 67, 100]);
}

#[tokio::test]
async fn test_scenario_c_column_delete_cascades() {
    let (store, controller, column_id) = setup_with_backlog().await;
    let other = controller.create_column(NewColumn::default()).await.unwrap();
    for title in ["one", "two", "three"] {
        controller.create_task(column_id, NewTask::new(title)).await.unwrap();
    }
    controller.create_task(other.id, NewTask::new("stays")).await.unwrap();
    assert_eq!(controller.board().await.task_count(), 4);

    controller.delete_column(column_id).await.unwrap();

    let board = controller.board().await;
    assert!(board.column(column_id).is_none());
    assert_eq!(board.task_count(), 1);
    assert_eq!(store.columns().await.len(), 1);
}

#[tokio::test]
async fn test_scenario_d_failed_update_leaves_board() {
    let (store, controller, column_id) = setup_with_backlog().await;
    let task = controller
        .create_task(column_id, NewTask::new("Stable").with_description("before"))
        .await
        .unwrap();
    let before = controller.board().await;

    store
        .fail_next(DomainError::RemoteRejected {
            status: 500,
            message: "boom".to_string(),
        })
        .await;
    let err = controller
        .update_task(task.id, TaskPatch::title("After").with_description("after"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::RemoteRejected { status: 500, .. }));
    assert_eq!(controller.board().await, before);
    assert!(!controller.is_pending(EntityKey::Task(task.id)));
}

#[tokio::test]
async fn test_validation_never_reaches_store() {
    let (store, controller, column_id) = setup_with_backlog().await;
    let calls_before = store.calls().await.len();

    let err = controller
        .create_task(column_id, NewTask::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let err = controller
        .update_column(column_id, ColumnPatch::title(""))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    assert_eq!(store.calls().await.len(), calls_before);
}

#[tokio::test]
async fn test_column_defaults_and_update() {
    let (_store, controller) = setup().await;
    let first = controller.create_column(NewColumn::default()).await.unwrap();
    let second = controller.create_column(NewColumn::default()).await.unwrap();
    assert_eq!(first.title, "Column 1");
    assert_eq!(second.title, "Column 2");
    assert_eq!(first.color, Rgb::BLACK);

    controller.create_task(first.id, NewTask::new("kept")).await.unwrap();
    let updated = controller
        .update_column(first.id, ColumnPatch::color(Rgb::new(12, 200, 45)))
        .await
        .unwrap();
    assert_eq!(updated.title, "Column 1");
    assert_eq!(updated.color.to_string(), "12,200,45");
    // the store echoes no tasks; the local ones stay
    assert_eq!(updated.tasks.len(), 1);
}

#[tokio::test]
async fn test_failed_create_and_delete_change_nothing() {
    let (store, controller, column_id) = setup_with_backlog().await;
    let task = controller.create_task(column_id, NewTask::new("t")).await.unwrap();
    let before = controller.board().await;

    store.set_offline(true);
    assert!(controller.create_task(column_id, NewTask::new("u")).await.is_err());
    assert!(controller.create_column(NewColumn::default()).await.is_err());
    assert!(controller.delete_task(task.id).await.is_err());
    assert!(controller.delete_column(column_id).await.is_err());

    assert_eq!(controller.board().await, before);
}

#[tokio::test]
async fn test_same_task_mutations_are_serialized() {
    let (store, controller, column_id) = setup_with_backlog().await;
    let task = controller.create_task(column_id, NewTask::new("t")).await.unwrap();
    let other = controller.create_task(column_id, NewTask::new("o")).await.unwrap();

    let gate = store.hold_calls().await;
    let first = controller.update_task(task.id, TaskPatch::title("first"));
    let second = async {
        // first is now parked in the store
        tokio::task::yield_now().await;
        assert!(controller.is_pending(EntityKey::Task(task.id)));

        let rejected = controller
            .update_task(task.id, TaskPatch::title("second"))
            .await;
        assert!(matches!(rejected, Err(DomainError::Conflict(_))));

        // a different task is not blocked by the pending one
        gate.add_permits(2);
        controller
            .update_task(other.id, TaskPatch::title("other"))
            .await
    };

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap().title, "first");
    assert_eq!(second.unwrap().title, "other");

    let board = controller.board().await;
    assert_eq!(board.find_task(task.id).unwrap().title, "first");
    assert!(!controller.is_pending(EntityKey::Task(task.id)));
}

#[tokio::test]
async fn test_editing_bare_progress_on_tracked_task_is_rejected() {
    let (_store, controller, column_id) = setup_with_backlog().await;
    let task = controller
        .create_task(
            column_id,
            NewTask::new("tracked").with_checkpoints(vec![
                Checkpoint::new("Start", true),
                Checkpoint::new(DONE_LABEL, false),
            ]),
        )
        .await
        .unwrap();
    assert!(task.is_tracked());

    let err = controller
        .update_task(task.id, TaskPatch::progress(50))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[tokio::test]
async fn test_reload_column_replaces_tasks() {
    let (store, controller, column_id) = setup_with_backlog().await;
    controller.create_task(column_id, NewTask::new("mine")).await.unwrap();

    // a write that bypassed this controller
    store.create_task(column_id, &NewTask::new("theirs")).await.unwrap();

    let tasks = controller.reload_column(column_id).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(controller.tasks_in(column_id).await.unwrap().len(), 2);
}

/// Reads a column's tasks, then holds the answer until released
#[derive(Default)]
struct SlowListStore {
    inner: InMemoryBoardStore,
    listed: Notify,
    release: Notify,
}

#[async_trait]
impl BoardStore for SlowListStore {
    async fn list_columns(&self) -> DomainResult<Vec<Column>> {
        self.inner.list_columns().await
    }

    async fn create_column(&self, fields: &ColumnFields) -> DomainResult<Column> {
        self.inner.create_column(fields).await
    }

    async fn update_column(&self, id: u32, fields: &ColumnFields) -> DomainResult<Column> {
        self.inner.update_column(id, fields).await
    }

    async fn delete_column(&self, id: u32) -> DomainResult<()> {
        self.inner.delete_column(id).await
    }

    async fn list_tasks_by_column(&self, column_id: u32) -> DomainResult<Vec<Task>> {
        let tasks = self.inner.list_tasks_by_column(column_id).await?;
        self.listed.notify_one();
        self.release.notified().await;
        Ok(tasks)
    }

    async fn create_task(&self, column_id: u32, task: &NewTask) -> DomainResult<Task> {
        self.inner.create_task(column_id, task).await
    }

    async fn update_task(&self, id: u32, patch: &TaskPatch) -> DomainResult<Task> {
        self.inner.update_task(id, patch).await
    }

    async fn delete_task(&self, id: u32) -> DomainResult<()> {
        self.inner.delete_task(id).await
    }
}

#[tokio::test]
async fn test_reload_keeps_tasks_confirmed_during_fetch() {
    let store = Arc::new(SlowListStore::default());
    let controller = BoardController::new(store.clone());
    controller.load().await.unwrap();
    let column = controller.create_column(NewColumn::titled("Todo")).await.unwrap();
    let kept = controller.create_task(column.id, NewTask::new("kept")).await.unwrap();

    let reload = controller.reload_column(column.id);
    let meanwhile = async {
        store.listed.notified().await;
        let created = controller
            .create_task(column.id, NewTask::new("confirmed"))
            .await
            .unwrap();
        let renamed = controller
            .update_task(kept.id, TaskPatch::title("renamed"))
            .await
            .unwrap();
        store.release.notify_one();
        (created, renamed)
    };

    let (reloaded, (created, renamed)) = tokio::join!(reload, meanwhile);
    let reloaded = reloaded.unwrap();
    assert_eq!(reloaded.len(), 2);

    let board = controller.board().await;
    assert_eq!(board.find_task(created.id).unwrap().title, "confirmed");
    assert_eq!(board.find_task(renamed.id).unwrap().title, "renamed");
    assert!(store
        .inner
        .columns()
        .await
        .iter()
        .flat_map(|c| c.tasks.iter())
        .any(|t| t.id == created.id));
}

#[tokio::test]
async fn test_unreachable_store_falls_back_to_placeholder() {
    let store = Arc::new(InMemoryBoardStore::new());
    store.set_offline(true);
    let controller = BoardController::new(store.clone());

    let outcome = controller.load_or_placeholder().await.unwrap();
    let board = match outcome {
        LoadOutcome::Placeholder { board, cause } => {
            assert!(matches!(cause, DomainError::RemoteUnavailable(_)));
            board
        }
        LoadOutcome::Loaded(_) => panic!("store is offline"),
    };
    assert!(board.is_placeholder());
    assert!(matches!(controller.load().await, Err(DomainError::RemoteUnavailable(_))));
}

#[tokio::test]
async fn test_placeholder_edits_stay_local() {
    let store = Arc::new(InMemoryBoardStore::new());
    store.set_offline(true);
    let controller = BoardController::new(store.clone());
    controller.load_or_placeholder().await.unwrap();
    let calls_after_load = store.calls().await.len();

    let column = controller.create_column(NewColumn::default()).await.unwrap();
    assert_eq!(column.id, 2);
    assert_eq!(column.title, "Column 2");
    let task = controller.create_task(column.id, NewTask::new("demo")).await.unwrap();
    assert_eq!(task.id, 2);
    controller
        .update_task(task.id, TaskPatch::progress(100))
        .await
        .unwrap();
    controller.delete_column(1).await.unwrap();

    let board = controller.board().await;
    assert!(board.is_placeholder());
    assert_eq!(board.find_task(task.id).unwrap().percent(), 100);
    assert_eq!(store.calls().await.len(), calls_after_load);
    assert!(store.columns().await.is_empty());
}

#[tokio::test]
async fn test_rejected_save_reopens_editor() {
    let (store, controller, column_id) = setup_with_backlog().await;
    let mut editor = TaskEditor::new();
    controller.new_task(&mut editor, column_id).await.unwrap();
    editor.set_title("Retry me").unwrap();
    editor.add_checkpoint("Review").unwrap();

    store.set_offline(true);
    assert!(controller.save_task(&mut editor).await.is_err());
    assert!(editor.is_interactable());
    assert!(controller.board().await.tasks_in(column_id).unwrap().is_empty());

    store.set_offline(false);
    let task = controller.save_task(&mut editor).await.unwrap();
    assert_eq!(editor.state(), EditorState::Closed);
    assert_eq!(task.checkpoints().map(|cps| cps.len()), Some(3));
    assert_eq!(task.percent(), 0);
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let (_store, controller) = setup().await;
    assert!(matches!(
        controller.update_task(9, TaskPatch::title("x")).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        controller.create_task(9, NewTask::new("x")).await,
        Err(DomainError::NotFound(_))
    ));
    let mut editor = TaskEditor::new();
    assert!(controller.edit_task(&mut editor, 9).await.is_err());
    assert_eq!(editor.state(), EditorState::Closed);
}
