//! Run descriptor
//!
//! Created when a tick fires, completed after the post-run file transition
//! and handed to the after-run hooks.

use super::admission::VetoReason;
use crate::core::pipeline::RunOutcome;
use crate::domain::JobKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Terminal status of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum RunStatus {
    Succeeded,
    Failed,
    Skipped(VetoReason),
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

/// One tick of one cadence
#[derive(Debug, Clone, Serialize)]
pub struct RunDescriptor {
    pub job: JobKind,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub items_read: usize,
    pub items_written: usize,

    /// Why the run failed, when it did
    pub failure: Option<String>,
}

impl RunDescriptor {
    /// A descriptor for a run that has just been admitted
    pub fn started(job: JobKind, run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            job,
            run_id,
            started_at,
            finished_at: None,
            status: RunStatus::Failed,
            items_read: 0,
            items_written: 0,
            failure: None,
        }
    }

    /// A descriptor for a vetoed tick
    pub fn skipped(job: JobKind, run_id: Uuid, at: DateTime<Utc>, reason: VetoReason) -> Self {
        Self {
            status: RunStatus::Skipped(reason),
            finished_at: Some(at),
            ..Self::started(job, run_id, at)
        }
    }

    /// Copy counts and status from a pipeline outcome
    pub fn record_outcome(&mut self, outcome: &RunOutcome) {
        self.items_read = outcome.items_read;
        self.items_written = outcome.items_written;
        if outcome.is_completed() {
            self.status = RunStatus::Succeeded;
        } else {
            self.status = RunStatus::Failed;
            self.failure = outcome.failure.as_ref().map(|f| f.message.clone());
        }
    }

    /// Mark the run failed before or around the pipeline
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.failure = Some(message.into());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, RunStatus::Skipped(_))
    }

    /// Emit the descriptor as a structured log line
    pub fn log(&self) {
        let duration_ms = self.duration().map(|d| d.num_milliseconds()).unwrap_or(0);
        match self.status {
            RunStatus::Succeeded => tracing::info!(
                job = %self.job,
                run_id = %self.run_id,
                items_read = self.items_read,
                items_written = self.items_written,
                duration_ms,
                "Run succeeded"
            ),
            RunStatus::Failed => tracing::error!(
                job = %self.job,
                run_id = %self.run_id,
                items_read = self.items_read,
                items_written = self.items_written,
                duration_ms,
                failure = self.failure.as_deref().unwrap_or("unknown"),
                "Run failed"
            ),
            RunStatus::Skipped(reason) => tracing::debug!(
                job = %self.job,
                run_id = %self.run_id,
                reason = %reason,
                "Run skipped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::{FaultClass, RunFailure, StepStatus};

    #[test]
    fn test_record_completed_outcome() {
        let mut descriptor = RunDescriptor::started(JobKind::Export, Uuid::new_v4(), Utc::now());
        descriptor.record_outcome(&RunOutcome {
            items_read: 7,
            items_written: 7,
            chunks_committed: 2,
            status: StepStatus::Completed,
            failure: None,
        });
        descriptor.finish();

        assert_eq!(descriptor.status, RunStatus::Succeeded);
        assert_eq!(descriptor.items_written, 7);
        assert!(descriptor.duration().is_some());
    }

    #[test]
    fn test_record_failed_outcome() {
        let mut descriptor = RunDescriptor::started(JobKind::Ingest, Uuid::new_v4(), Utc::now());
        descriptor.record_outcome(&RunOutcome {
            items_read: 3,
            items_written: 0,
            chunks_committed: 0,
            status: StepStatus::Failed,
            failure: Some(RunFailure {
                class: FaultClass::Skippable,
                chunk_index: 0,
                message: "bad record".to_string(),
            }),
        });

        assert_eq!(descriptor.status, RunStatus::Failed);
        assert_eq!(descriptor.failure.as_deref(), Some("bad record"));
    }

    #[test]
    fn test_skipped_serializes_reason() {
        let descriptor = RunDescriptor::skipped(
            JobKind::Ingest,
            Uuid::new_v4(),
            Utc::now(),
            VetoReason::ErrorDirectoryNotEmpty,
        );
        assert!(descriptor.is_skipped());
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["status"]["status"], "skipped");
        assert_eq!(json["status"]["reason"], "error_directory_not_empty");
        assert_eq!(
            descriptor.status.to_string(),
            "skipped (error directory is not empty)"
        );
    }
}
