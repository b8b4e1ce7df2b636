//! Domain Layer - Core Entity Trait
//!
//! Basic contract for board entities, plus the error type shared by every
//! layer of the crate.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    /// Local pre-flight validation failed; nothing was sent to the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The entity is not part of the current board
    #[error("Not found: {0}")]
    NotFound(String),
    /// Another mutation of the same entity is still waiting for the store
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The store could not be reached (connect failure, timeout)
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),
    /// The store answered with an error
    #[error("Remote rejected ({status}): {message}")]
    RemoteRejected { status: u16, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    /// True for failures that happened before any remote call was made
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidInput(_) | DomainError::NotFound(_) | DomainError::Conflict(_)
        )
    }
}
