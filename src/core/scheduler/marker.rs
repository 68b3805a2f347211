//! Process-wide "currently executing" marker

use crate::domain::JobKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// The run holding the marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveRun {
    pub job: JobKind,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
}

/// Test-and-set marker shared by both cadences
///
/// At most one [`RunGuard`] exists at a time. Dropping the guard clears the
/// marker, including when the run panics.
#[derive(Debug, Clone, Default)]
pub struct ExecutionMarker {
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl ExecutionMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the marker for `job`, or `None` if another run holds it
    pub fn try_acquire(&self, job: JobKind, run_id: Uuid) -> Option<RunGuard> {
        let mut active = lock(&self.active);
        if active.is_some() {
            return None;
        }
        *active = Some(ActiveRun {
            job,
            run_id,
            started_at: Utc::now(),
        });
        Some(RunGuard {
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_running(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// The run currently holding the marker
    pub fn current(&self) -> Option<ActiveRun> {
        lock(&self.active).clone()
    }
}

/// Holds the marker until dropped
#[derive(Debug)]
pub struct RunGuard {
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        lock(&self.active).take();
    }
}

fn lock(active: &Mutex<Option<ActiveRun>>) -> MutexGuard<'_, Option<ActiveRun>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}
