//! Result of a single pipeline run

use super::fault::FaultClass;
use serde::Serialize;
use std::fmt;

/// Terminal status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Every chunk was read, processed and written
    Completed,
    /// The run stopped at a failure
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Why a run failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunFailure {
    /// Classification under the run's fault policy
    pub class: FaultClass,

    /// Zero-based index of the chunk that was abandoned
    pub chunk_index: usize,

    /// Error message
    pub message: String,
}

/// Counts and status of a finished pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Items pulled from the reader, including the one that failed
    pub items_read: usize,

    /// Items handed to the writer in committed chunks
    pub items_written: usize,

    /// Chunks written successfully
    pub chunks_committed: usize,

    /// Terminal status
    pub status: StepStatus,

    /// Failure details when `status` is `Failed`
    pub failure: Option<RunFailure>,
}

impl RunOutcome {
    pub(crate) fn started() -> Self {
        Self {
            items_read: 0,
            items_written: 0,
            chunks_committed: 0,
            status: StepStatus::Completed,
            failure: None,
        }
    }

    /// Whether the run completed
    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    /// Whether the run failed on a record-level problem
    pub fn failed_on_record(&self) -> bool {
        matches!(
            self.failure,
            Some(RunFailure {
                class: FaultClass::Skippable,
                ..
            })
        )
    }
}
