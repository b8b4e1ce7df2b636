//! Task Editor
//!
//! Edit session behind the task modal:
//!
//! ```text
//! Closed -> Open(New) | Open(Existing) -> Saving -> Closed   (saved)
//!                                               \-> Open     (save rejected, retry)
//! ```
//!
//! Only `Open` accepts edits. The editor works on its own checkpoint buffer;
//! nothing reaches the task until a save succeeds.

use serde::Serialize;

use crate::domain::checkpoint::{
    bootstrap_from_progress, derive_progress, insert_checkpoint, normalize_for_edit,
    toggle_checkpoint,
};
use crate::domain::{Checkpoint, DomainError, DomainResult, EditableCheckpoint, NewTask, Task, TaskPatch};

/// What a save will do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EditTarget {
    New { column_id: u32 },
    Existing { column_id: u32, task_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EditorState {
    #[default]
    Closed,
    Open(EditTarget),
    Saving(EditTarget),
}

/// Store call produced by a save
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create { column_id: u32, task: NewTask },
    Update { task_id: u32, patch: TaskPatch },
}

#[derive(Debug, Clone, Default)]
pub struct TaskEditor {
    state: EditorState,
    title: String,
    description: String,
    checkpoints: Vec<Checkpoint>,
    last_error: Option<DomainError>,
}

impl TaskEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Closed and Saving do not accept edits
    pub fn is_interactable(&self) -> bool {
        matches!(self.state, EditorState::Open(_))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Error of the last rejected save, cleared on reopen
    pub fn last_error(&self) -> Option<&DomainError> {
        self.last_error.as_ref()
    }

    /// Blank session for a task to be created in `column_id`
    pub fn open_new(&mut self, column_id: u32) -> DomainResult<()> {
        self.ensure_not_saving()?;
        self.title.clear();
        self.description.clear();
        self.checkpoints = bootstrap_from_progress(0);
        self.last_error = None;
        self.state = EditorState::Open(EditTarget::New { column_id });
        Ok(())
    }

    /// Session populated from `task`; missing checkpoints are bootstrapped
    pub fn open_existing(&mut self, task: &Task) -> DomainResult<()> {
        self.ensure_not_saving()?;
        self.title = task.title.clone();
        self.description = task.description.clone();
        self.checkpoints = task.editing_checkpoints();
        if let Some(start) = self.checkpoints.first_mut() {
            start.checked = true;
        }
        self.last_error = None;
        self.state = EditorState::Open(EditTarget::Existing {
            column_id: task.column_id,
            task_id: task.id,
        });
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> DomainResult<()> {
        self.ensure_open()?;
        self.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> DomainResult<()> {
        self.ensure_open()?;
        self.description = description.into();
        Ok(())
    }

    pub fn add_checkpoint(&mut self, label: &str) -> DomainResult<()> {
        self.ensure_open()?;
        insert_checkpoint(&mut self.checkpoints, label)
    }

    pub fn toggle_checkpoint(&mut self, index: usize) -> DomainResult<()> {
        self.ensure_open()?;
        toggle_checkpoint(&mut self.checkpoints, index)
    }

    pub fn rows(&self) -> Vec<EditableCheckpoint> {
        normalize_for_edit(&self.checkpoints)
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Progress the buffer would save with
    pub fn progress(&self) -> u8 {
        derive_progress(&self.checkpoints)
    }

    /// Leave `Open` for `Saving` and hand out the store call to make.
    ///
    /// A blank title keeps the editor open.
    pub fn begin_save(&mut self) -> DomainResult<Submission> {
        let target = self.ensure_open()?;
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::invalid("task title is required"));
        }

        let submission = match target {
            EditTarget::New { column_id } => Submission::Create {
                column_id,
                task: NewTask::new(title)
                    .with_description(self.description.clone())
                    .with_progress(self.progress())
                    .with_checkpoints(self.checkpoints.clone()),
            },
            EditTarget::Existing { task_id, .. } => Submission::Update {
                task_id,
                patch: TaskPatch {
                    title: Some(title.to_string()),
                    description: Some(self.description.clone()),
                    checkpoints: Some(self.checkpoints.clone()),
                    ..Default::default()
                },
            },
        };
        self.state = EditorState::Saving(target);
        Ok(submission)
    }

    /// Close on success; reopen with the error kept on failure
    pub fn finish_save<T>(&mut self, result: &DomainResult<T>) {
        let EditorState::Saving(target) = self.state else {
            return;
        };
        match result {
            Ok(_) => {
                self.state = EditorState::Closed;
                self.last_error = None;
            }
            Err(e) => {
                self.state = EditorState::Open(target);
                self.last_error = Some(e.clone());
            }
        }
    }

    /// Dismiss the session; ignored while saving
    pub fn close(&mut self) {
        if let EditorState::Open(_) = self.state {
            self.state = EditorState::Closed;
        }
    }

    fn ensure_open(&self) -> DomainResult<EditTarget> {
        match self.state {
            EditorState::Open(target) => Ok(target),
            EditorState::Closed => Err(DomainError::invalid("task editor is closed")),
            EditorState::Saving(_) => Err(DomainError::Conflict("task is being saved".to_string())),
        }
    }

    fn ensure_not_saving(&self) -> DomainResult<()> {
        match self.state {
            EditorState::Saving(_) => Err(DomainError::Conflict("task is being saved".to_string())),
            _ => Ok(()),
        }
    }
}
