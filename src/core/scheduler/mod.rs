//! Scheduler
//!
//! Two cadences, one per job, each driven by its own tokio task. Every tick
//! goes through the same sequence:
//!
//! 1. take the execution marker, then the cross-process
//!    [run lock](crate::core::lifecycle::RunLock), and evaluate the
//!    [admission gate](admission)
//! 2. on veto, log and skip the tick
//! 3. claim the incoming file (ingest only)
//! 4. run the flow
//! 5. move files according to the outcome
//! 6. release the lock and the marker, fire the after-run hooks and log the
//!    descriptor
//!
//! A tick awaits its run, so a cadence never overlaps itself; the marker
//! keeps the two cadences from overlapping each other.

pub mod admission;
pub mod cadence;
pub mod descriptor;
pub mod hooks;
pub mod marker;

pub use admission::{decide, AdmitPlan, Admission, GateInputs, VetoReason};
pub use cadence::Cadence;
pub use descriptor::{RunDescriptor, RunStatus};
pub use hooks::RunHooks;
pub use marker::{ActiveRun, ExecutionMarker, RunGuard};

use crate::adapters::store::RecordStore;
use crate::config::schema::{FerryConfig, ScheduleConfig};
use crate::core::flows::{ExportFlow, ExportSettings, Flow, IngestFlow, IngestSettings};
use crate::core::lifecycle::{FileLifecycle, RunLock};
use crate::core::pipeline::RunOutcome;
use crate::core::validation::RecordValidator;
use crate::domain::{FerryError, JobKind, Result};
use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Drives the ingest and export flows
pub struct Scheduler {
    lifecycle: FileLifecycle,
    marker: ExecutionMarker,
    ingest: Arc<dyn Flow>,
    export: Arc<dyn Flow>,
    hooks: RunHooks,
    cadences: Vec<Cadence>,
    start_delay: Duration,
}

impl Scheduler {
    /// Create a scheduler for the two flows
    ///
    /// # Errors
    ///
    /// Returns an error if a cron expression is invalid or a flow is bound
    /// to the wrong job.
    pub fn new(
        lifecycle: FileLifecycle,
        ingest: Arc<dyn Flow>,
        export: Arc<dyn Flow>,
        schedule: &ScheduleConfig,
    ) -> Result<Self> {
        if ingest.job() != JobKind::Ingest || export.job() != JobKind::Export {
            return Err(FerryError::Schedule(format!(
                "Flows bound to the wrong jobs: got {} and {}",
                ingest.job(),
                export.job()
            )));
        }

        let cadences = vec![
            Cadence::parse(JobKind::Ingest, &schedule.ingest_cron)?,
            Cadence::parse(JobKind::Export, &schedule.export_cron)?,
        ];

        Ok(Self {
            lifecycle,
            marker: ExecutionMarker::new(),
            ingest,
            export,
            hooks: RunHooks::new(),
            cadences,
            start_delay: Duration::from_secs(schedule.start_delay_secs),
        })
    }

    /// Wire both flows against `store` from a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce a validator,
    /// lifecycle manager or cadence.
    pub fn from_config(config: &FerryConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        let delimiter = config
            .pipeline
            .delimiter_byte()
            .map_err(FerryError::Configuration)?;

        let ingest = IngestFlow::new(
            Arc::clone(&store),
            Arc::new(RecordValidator::new()?),
            IngestSettings {
                in_flight_file: config.paths.in_flight_file.clone(),
                chunk_size: config.pipeline.chunk_size,
                delimiter,
            },
        );
        let export = ExportFlow::new(
            store,
            ExportSettings {
                output_file: config.paths.output_file.clone(),
                chunk_size: config.pipeline.chunk_size,
            },
        );

        Self::new(
            FileLifecycle::new(&config.paths)?,
            Arc::new(ingest),
            Arc::new(export),
            &config.schedule,
        )
    }

    pub fn with_hooks(mut self, hooks: RunHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_start_delay(mut self, start_delay: Duration) -> Self {
        self.start_delay = start_delay;
        self
    }

    pub fn marker(&self) -> &ExecutionMarker {
        &self.marker
    }

    pub fn lifecycle(&self) -> &FileLifecycle {
        &self.lifecycle
    }

    pub fn cadences(&self) -> &[Cadence] {
        &self.cadences
    }

    fn flow(&self, job: JobKind) -> &Arc<dyn Flow> {
        match job {
            JobKind::Ingest => &self.ingest,
            JobKind::Export => &self.export,
        }
    }

    /// Run one tick of `job`
    ///
    /// Never fails: vetoes, flow failures and file-move failures all end up
    /// in the returned descriptor and the logs.
    pub async fn tick(&self, job: JobKind) -> RunDescriptor {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let guard = self.marker.try_acquire(job, run_id);

        // Locked before observing, so the snapshot cannot race another
        // process's claim or archive
        let lock = match guard {
            Some(_) => match self.lifecycle.try_lock_run() {
                Ok(Some(lock)) => Some(lock),
                Ok(None) => return self.skip(job, run_id, VetoReason::LockedByOtherProcess),
                Err(e) => {
                    tracing::error!(job = %job, error = %e, "Could not take the run lock");
                    return self.skip(job, run_id, VetoReason::RunLockUnavailable);
                }
            },
            None => None,
        };

        let inputs = GateInputs::observe(&self.lifecycle, guard.is_none());

        let (plan, guard, lock) = match (decide(job, &inputs), guard, lock) {
            (Admission::Admit(plan), Some(guard), Some(lock)) => (plan, guard, lock),
            (Admission::Veto(reason), _, _) => return self.skip(job, run_id, reason),
            (Admission::Admit(_), _, _) => {
                return self.skip(job, run_id, VetoReason::AlreadyRunning)
            }
        };

        tracing::info!(job = %job, run_id = %run_id, plan = ?plan, "Run admitted");
        self.hooks.fire_before(job);

        let mut descriptor = RunDescriptor::started(job, run_id, started_at);

        if plan == AdmitPlan::ClaimIncoming {
            if let Err(e) = self.lifecycle.claim_incoming() {
                tracing::error!(job = %job, error = %e, "Could not claim incoming file");
                descriptor.record_failure(e.to_string());
                return self.finish(guard, lock, descriptor);
            }
        } else if plan == AdmitPlan::ResumeInFlight {
            tracing::warn!(
                file = %self.lifecycle.in_flight_path().display(),
                "Resuming file left in flight by an earlier run"
            );
        }

        match self.flow(job).execute().await {
            Ok(outcome) => {
                descriptor.record_outcome(&outcome);
                self.after_outcome(job, &outcome);
            }
            Err(e) => {
                tracing::error!(
                    job = %job,
                    error = %e,
                    "Flow could not start; files left in place for the next tick"
                );
                descriptor.record_failure(e.to_string());
            }
        }

        self.finish(guard, lock, descriptor)
    }

    /// Post-run file transition keyed on the outcome
    ///
    /// Move failures are logged, not retried; a stuck in-flight file is
    /// picked up again by the next ingest tick.
    fn after_outcome(&self, job: JobKind, outcome: &RunOutcome) {
        let now = Local::now();
        let moved = match (job, outcome.is_completed()) {
            (JobKind::Ingest, true) => self.lifecycle.archive_in_flight(now).map(|_| ()),
            (JobKind::Ingest, false) => self.lifecycle.quarantine_in_flight(now).map(|_| ()),
            (JobKind::Export, true) => self.lifecycle.finalize_output(now).map(|_| ()),
            (JobKind::Export, false) => {
                tracing::warn!(
                    output = %self.lifecycle.output_path().display(),
                    "Export failed; output left in place and will be appended to on the next run"
                );
                Ok(())
            }
        };

        if let Err(e) = moved {
            tracing::error!(job = %job, error = %e, "Post-run file transition failed");
        }
    }

    fn finish(
        &self,
        guard: RunGuard,
        lock: RunLock,
        mut descriptor: RunDescriptor,
    ) -> RunDescriptor {
        descriptor.finish();
        drop(lock);
        drop(guard);
        self.hooks.fire_after(descriptor.job, &descriptor);
        descriptor.log();
        descriptor
    }

    fn skip(&self, job: JobKind, run_id: Uuid, reason: VetoReason) -> RunDescriptor {
        let descriptor = RunDescriptor::skipped(job, run_id, Utc::now(), reason);
        if reason == VetoReason::ErrorDirectoryNotEmpty {
            tracing::info!(
                job = %job,
                error_dir = %self.lifecycle.error_dir().display(),
                "Ingest blocked until the error directory is cleared"
            );
        }
        descriptor.log();
        descriptor
    }

    /// Drive both cadences until `shutdown` flips to `true`
    ///
    /// Waiting for the next fire time is interrupted by shutdown; a run in
    /// progress is allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if a cadence task could not be joined.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> Result<()> {
        let cadences: Vec<String> = self
            .cadences
            .iter()
            .map(|c| format!("{}={}", c.job(), c.expression()))
            .collect();
        tracing::info!(
            start_delay_secs = self.start_delay.as_secs(),
            cadences = ?cadences,
            "Scheduler started"
        );

        let handles: Vec<_> = self
            .cadences
            .iter()
            .cloned()
            .map(|cadence| {
                let scheduler = Arc::clone(&self);
                let shutdown = shutdown.clone();
                tokio::spawn(async move { scheduler.drive(cadence, shutdown).await })
            })
            .collect();

        for handle in handles {
            handle
                .await
                .map_err(|e| FerryError::Schedule(format!("Cadence task failed: {e}")))?;
        }

        tracing::info!("Scheduler stopped");
        Ok(())
    }

    async fn drive(self: Arc<Self>, cadence: Cadence, mut shutdown: watch::Receiver<bool>) {
        let job = cadence.job();
        if !wait_or_shutdown(self.start_delay, &mut shutdown).await {
            return;
        }

        loop {
            let now = Utc::now();
            let Some(next) = cadence.next_after(now) else {
                tracing::warn!(job = %job, "Cadence has no further fire times");
                return;
            };
            tracing::debug!(job = %job, next = %next, "Waiting for next tick");

            let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
            if !wait_or_shutdown(delay, &mut shutdown).await {
                return;
            }

            let scheduler = Arc::clone(&self);
            if let Err(e) = tokio::spawn(async move { scheduler.tick(job).await }).await {
                tracing::error!(job = %job, error = %e, "Run aborted unexpectedly");
            }
        }
    }
}

/// Sleep for `delay`; `false` if shutdown was requested first
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }

    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_completes_without_shutdown() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(wait_or_shutdown(Duration::from_millis(5), &mut rx).await);
    }

    #[tokio::test]
    async fn test_wait_interrupted_by_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let waiter =
            tokio::spawn(async move { wait_or_shutdown(Duration::from_secs(3600), &mut rx).await });
        tx.send(true).unwrap();
        assert!(!waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(!wait_or_shutdown(Duration::from_secs(3600), &mut rx).await);
    }
}
