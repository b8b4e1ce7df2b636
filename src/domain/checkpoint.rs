//! Checkpoint Engine
//!
//! Pure functions mapping an ordered checkpoint list to a 0..=100 progress
//! value and back. Checkpoints are evenly spaced: the first one ("Start") sits
//! at 0%, the last one ("Done") at 100%. Progress is the furthest reached
//! checked checkpoint, not a count of checked ones.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

pub const START_LABEL: &str = "Start";
pub const DONE_LABEL: &str = "Done";

/// A named milestone within a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub label: String,
    pub checked: bool,
}

impl Checkpoint {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
        }
    }
}

/// One row of the editing buffer shown by a task editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditableCheckpoint {
    pub label: String,
    pub checked: bool,
    /// Start row: always checked, cannot be toggled
    pub locked: bool,
    pub percent: u8,
}

/// Percentage assigned to position `index` in a list of `total` checkpoints.
///
/// Indexes past the end are treated as the last position.
pub fn percent_at(index: usize, total: usize) -> u8 {
    if total <= 1 {
        return 0;
    }
    let span = (total - 1) as u64;
    let index = index.min(total - 1) as u64;
    // round half up: (2 * index * 100 + span) / (2 * span)
    ((200 * index + span) / (2 * span)) as u8
}

/// Furthest checked checkpoint as a percentage, 0 if none is checked
pub fn derive_progress(checkpoints: &[Checkpoint]) -> u8 {
    let total = checkpoints.len();
    checkpoints
        .iter()
        .enumerate()
        .filter(|(_, cp)| cp.checked)
        .map(|(index, _)| percent_at(index, total))
        .max()
        .unwrap_or(0)
}

/// Editing rows for `checkpoints`; the first one is locked and checked
pub fn normalize_for_edit(checkpoints: &[Checkpoint]) -> Vec<EditableCheckpoint> {
    let total = checkpoints.len();
    checkpoints
        .iter()
        .enumerate()
        .map(|(index, cp)| EditableCheckpoint {
            label: cp.label.clone(),
            checked: cp.checked || index == 0,
            locked: index == 0,
            percent: percent_at(index, total),
        })
        .collect()
}

/// Canonical two-point list for a task that has no checkpoints yet
pub fn bootstrap_from_progress(progress: u8) -> Vec<Checkpoint> {
    vec![
        Checkpoint::new(START_LABEL, true),
        Checkpoint::new(DONE_LABEL, progress >= 100),
    ]
}

/// Insert an unchecked checkpoint right before the terminal one.
///
/// Lists shorter than two get the checkpoint appended, so Start stays first.
pub fn insert_checkpoint(checkpoints: &mut Vec<Checkpoint>, label: &str) -> DomainResult<()> {
    let label = label.trim();
    if label.is_empty() {
        return Err(DomainError::invalid("checkpoint label cannot be empty"));
    }

    let at = if checkpoints.len() < 2 {
        checkpoints.len()
    } else {
        checkpoints.len() - 1
    };
    checkpoints.insert(at, Checkpoint::new(label, false));
    Ok(())
}

/// Flip the checkpoint at `index`; Start (index 0) is immutable
pub fn toggle_checkpoint(checkpoints: &mut [Checkpoint], index: usize) -> DomainResult<()> {
    if index == 0 {
        return Err(DomainError::invalid("the start checkpoint cannot be toggled"));
    }
    let cp = checkpoints
        .get_mut(index)
        .ok_or_else(|| DomainError::invalid(format!("no checkpoint at index {}", index)))?;
    cp.checked = !cp.checked;
    Ok(())
}
