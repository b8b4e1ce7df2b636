//! Task Entity
//!
//! A work item owned by exactly one column. Progress is either a plain
//! percentage or tracked through checkpoints, never both: when checkpoints
//! exist, the percentage is always derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checkpoint::{bootstrap_from_progress, derive_progress, Checkpoint};
use super::entity::{DomainError, DomainResult, Entity};

/// How a task's completion is represented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Two-point scale without milestones (0 = Start, 100 = Done)
    Simple(u8),
    /// Derived from an ordered checkpoint list
    Tracked(Vec<Checkpoint>),
}

impl Progress {
    /// Build from the wire fields; a non-empty checkpoint list wins over `progress`
    pub fn from_parts(progress: u8, checkpoints: Option<Vec<Checkpoint>>) -> Self {
        match checkpoints {
            Some(cps) if !cps.is_empty() => Progress::Tracked(cps),
            _ => Progress::Simple(progress.min(100)),
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            Progress::Simple(p) => *p,
            Progress::Tracked(cps) => derive_progress(cps),
        }
    }

    pub fn checkpoints(&self) -> Option<&[Checkpoint]> {
        match self {
            Progress::Simple(_) => None,
            Progress::Tracked(cps) => Some(cps.as_slice()),
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress::Simple(0)
    }
}

/// A task within a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub progress: Progress,
    /// Back-reference to the owning column
    pub column_id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u32, column_id: u32, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: String::new(),
            progress: Progress::default(),
            column_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Completion percentage, derived from checkpoints when present
    pub fn percent(&self) -> u8 {
        self.progress.percent()
    }

    pub fn checkpoints(&self) -> Option<&[Checkpoint]> {
        self.progress.checkpoints()
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self.progress, Progress::Tracked(_))
    }

    /// Checkpoints to edit: the stored list, or one bootstrapped from progress
    pub fn editing_checkpoints(&self) -> Vec<Checkpoint> {
        match &self.progress {
            Progress::Tracked(cps) => cps.clone(),
            Progress::Simple(p) => bootstrap_from_progress(*p),
        }
    }
}

impl Entity for Task {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Wire shape of a task: flat `progress` plus optional `checkpoints`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskRecord {
    id: u32,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checkpoints: Option<Vec<Checkpoint>>,
    column_id: u32,
    #[serde(default)]
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: DateTime<Utc>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        // stored progress is only a cache when checkpoints are present
        let progress = record.progress.clamp(0, 100) as u8;
        Task {
            id: record.id,
            title: record.title,
            description: record.description,
            progress: Progress::from_parts(progress, record.checkpoints),
            column_id: record.column_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let progress = i64::from(task.percent());
        let checkpoints = match task.progress {
            Progress::Tracked(cps) => Some(cps),
            Progress::Simple(_) => None,
        };
        TaskRecord {
            id: task.id,
            title: task.title,
            description: task.description,
            progress,
            checkpoints,
            column_id: task.column_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

fn require_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::invalid("task title is required"));
    }
    Ok(title.to_string())
}

fn require_checkpoints(checkpoints: &[Checkpoint]) -> DomainResult<()> {
    if checkpoints.is_empty() {
        return Err(DomainError::invalid("checkpoint list cannot be empty"));
    }
    Ok(())
}

/// Fields for a task that does not exist yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoints: Option<Vec<Checkpoint>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_checkpoints(mut self, checkpoints: Vec<Checkpoint>) -> Self {
        self.checkpoints = Some(checkpoints);
        self
    }

    /// Trimmed title, clamped progress, progress derived from checkpoints
    pub fn validated(self) -> DomainResult<NewTask> {
        let title = require_title(&self.title)?;
        if let Some(cps) = &self.checkpoints {
            require_checkpoints(cps)?;
        }
        let progress = match &self.checkpoints {
            Some(cps) => derive_progress(cps),
            None => self.progress.min(100),
        };
        Ok(NewTask {
            title,
            progress,
            ..self
        })
    }

    /// Materialize as a task with the given id, as a store would
    pub fn into_task(self, id: u32, column_id: u32) -> Task {
        let mut task = Task::new(id, column_id, self.title);
        task.description = self.description;
        task.progress = Progress::from_parts(self.progress, self.checkpoints);
        task
    }
}

/// Partial update of a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoints: Option<Vec<Checkpoint>>,
    /// Drop the checkpoint list and go back to simple progress
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_checkpoints: bool,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn checkpoints(checkpoints: Vec<Checkpoint>) -> Self {
        Self {
            checkpoints: Some(checkpoints),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate against `current` and fill in the final `progress`.
    ///
    /// The returned patch always carries `progress`, derived from the
    /// checkpoints it will leave on the task, so the two can never be
    /// persisted out of step.
    pub fn resolve(self, current: &Task) -> DomainResult<TaskPatch> {
        let title = self.title.as_deref().map(require_title).transpose()?;
        if let Some(cps) = &self.checkpoints {
            require_checkpoints(cps)?;
        }
        if matches!(self.progress, Some(p) if p > 100) {
            return Err(DomainError::invalid("progress must be between 0 and 100"));
        }

        let progress = match (&self.checkpoints, self.clear_checkpoints) {
            (Some(cps), _) => derive_progress(cps),
            (None, true) => self.progress.unwrap_or_else(|| current.percent()),
            (None, false) => match (&current.progress, self.progress) {
                (Progress::Tracked(_), Some(_)) => {
                    return Err(DomainError::invalid(
                        "progress of a checkpoint-tracked task is derived from its checkpoints",
                    ))
                }
                (_, Some(p)) => p,
                (_, None) => current.percent(),
            },
        };

        Ok(TaskPatch {
            title,
            progress: Some(progress),
            clear_checkpoints: self.clear_checkpoints && self.checkpoints.is_none(),
            ..self
        })
    }

    /// Apply to a local copy of `task`
    pub fn apply(&self, task: &Task) -> Task {
        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        updated.progress = match (&self.checkpoints, self.clear_checkpoints, &task.progress) {
            (Some(cps), _, _) => Progress::Tracked(cps.clone()),
            (None, true, _) => Progress::Simple(self.progress.unwrap_or_else(|| task.percent())),
            (None, false, Progress::Simple(p)) => Progress::Simple(self.progress.unwrap_or(*p)),
            (None, false, tracked) => tracked.clone(),
        };
        updated.updated_at = Utc::now();
        updated
    }
}
