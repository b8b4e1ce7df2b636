//! In-Flight Tracking
//!
//! One pending mutation per entity. A second mutation of the same column or
//! task is rejected until the first one's store call has resolved; different
//! entities never block each other.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Column(u32),
    Task(u32),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Column(id) => write!(f, "column {}", id),
            EntityKey::Task(id) => write!(f, "task {}", id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    keys: Arc<Mutex<HashSet<EntityKey>>>,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashSet<EntityKey>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark `key` as pending until the returned guard is dropped
    pub fn claim(&self, key: EntityKey) -> DomainResult<InFlightGuard> {
        if !self.lock().insert(key) {
            return Err(DomainError::Conflict(format!(
                "{} has a pending change",
                key
            )));
        }
        Ok(InFlightGuard {
            keys: self.keys.clone(),
            key,
        })
    }

    pub fn is_pending(&self, key: EntityKey) -> bool {
        self.lock().contains(&key)
    }
}

/// Releases its entity when dropped, whichever way the operation ended
pub(crate) struct InFlightGuard {
    keys: Arc<Mutex<HashSet<EntityKey>>>,
    key: EntityKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}
