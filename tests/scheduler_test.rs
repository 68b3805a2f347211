//! Scheduler behaviour with scripted flows: mutual exclusion, hooks, file
//! transitions keyed on the outcome, and the cadence loop.

use async_trait::async_trait;
use ferry::config::{PathsConfig, ScheduleConfig};
use ferry::core::flows::Flow;
use ferry::core::lifecycle::FileLifecycle;
use ferry::core::pipeline::{FaultClass, RunFailure, RunOutcome, StepStatus};
use ferry::core::scheduler::{RunHooks, RunStatus, Scheduler, VetoReason};
use ferry::domain::{FerryError, JobKind, Result, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

#[derive(Clone, Copy)]
enum Script {
    Complete,
    FailRun,
    FailSetup,
}

struct ScriptedFlow {
    job: JobKind,
    script: Script,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedFlow {
    fn new(job: JobKind, script: Script) -> Arc<Self> {
        Self::slow(job, script, Duration::ZERO)
    }

    fn slow(job: JobKind, script: Script, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            job,
            script,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Flow for ScriptedFlow {
    fn job(&self) -> JobKind {
        self.job
    }

    async fn execute(&self) -> Result<RunOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        match self.script {
            Script::Complete => Ok(RunOutcome {
                items_read: 3,
                items_written: 3,
                chunks_committed: 1,
                status: StepStatus::Completed,
                failure: None,
            }),
            Script::FailRun => Ok(RunOutcome {
                items_read: 2,
                items_written: 0,
                chunks_committed: 0,
                status: StepStatus::Failed,
                failure: Some(RunFailure {
                    class: FaultClass::Skippable,
                    chunk_index: 0,
                    message: "field1 rejected".to_string(),
                }),
            }),
            Script::FailSetup => Err(FerryError::Store(StoreError::ConnectionFailed(
                "store down".to_string(),
            ))),
        }
    }
}

fn paths(root: &Path) -> PathsConfig {
    PathsConfig {
        incoming_file: root.join("input.csv"),
        in_flight_file: root.join("processing.csv"),
        error_dir: root.join("error"),
        error_file_name: None,
        output_file: root.join("output.txt"),
    }
}

struct Harness {
    _dir: TempDir,
    root: PathBuf,
    ingest: Arc<ScriptedFlow>,
    export: Arc<ScriptedFlow>,
    scheduler: Scheduler,
}

fn harness(
    ingest: Arc<ScriptedFlow>,
    export: Arc<ScriptedFlow>,
    schedule: ScheduleConfig,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let lifecycle = FileLifecycle::new(&paths(&root)).unwrap();
    let scheduler = Scheduler::new(lifecycle, ingest.clone(), export.clone(), &schedule).unwrap();

    Harness {
        _dir: dir,
        root,
        ingest,
        export,
        scheduler,
    }
}

fn default_harness(ingest: Script, export: Script) -> Harness {
    harness(
        ScriptedFlow::new(JobKind::Ingest, ingest),
        ScriptedFlow::new(JobKind::Export, export),
        ScheduleConfig::default(),
    )
}

#[tokio::test]
async fn test_overlapping_ticks_run_once() {
    let h = harness(
        ScriptedFlow::slow(JobKind::Ingest, Script::Complete, Duration::from_millis(200)),
        ScriptedFlow::new(JobKind::Export, Script::Complete),
        ScheduleConfig::default(),
    );
    fs::write(h.root.join("input.csv"), "x").unwrap();

    let (first, second, export) = tokio::join!(
        h.scheduler.tick(JobKind::Ingest),
        h.scheduler.tick(JobKind::Ingest),
        h.scheduler.tick(JobKind::Export),
    );

    assert_eq!(first.status, RunStatus::Succeeded);
    assert_eq!(second.status, RunStatus::Skipped(VetoReason::AlreadyRunning));
    assert_eq!(export.status, RunStatus::Skipped(VetoReason::AlreadyRunning));
    assert_eq!(h.ingest.calls(), 1);
    assert_eq!(h.export.calls(), 0);
    assert!(!h.scheduler.marker().is_running());
}

#[cfg(unix)]
#[tokio::test]
async fn test_schedulers_sharing_files_exclude_each_other() {
    let h = harness(
        ScriptedFlow::slow(JobKind::Ingest, Script::Complete, Duration::from_millis(300)),
        ScriptedFlow::new(JobKind::Export, Script::Complete),
        ScheduleConfig::default(),
    );
    let other_ingest = ScriptedFlow::new(JobKind::Ingest, Script::Complete);
    let other_export = ScriptedFlow::new(JobKind::Export, Script::Complete);
    let other = Scheduler::new(
        FileLifecycle::new(&paths(&h.root)).unwrap(),
        other_ingest.clone(),
        other_export.clone(),
        &ScheduleConfig::default(),
    )
    .unwrap();
    fs::write(h.root.join("input.csv"), "x").unwrap();

    let (first, resumed, export) = tokio::join!(
        h.scheduler.tick(JobKind::Ingest),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            other.tick(JobKind::Ingest).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            other.tick(JobKind::Export).await
        },
    );

    assert_eq!(first.status, RunStatus::Succeeded);
    assert_eq!(
        resumed.status,
        RunStatus::Skipped(VetoReason::LockedByOtherProcess)
    );
    assert!(export.is_skipped());
    assert_eq!(other_ingest.calls(), 0);
    assert_eq!(other_export.calls(), 0);

    // Released once the first run has archived its file
    let after = other.tick(JobKind::Export).await;
    assert_eq!(after.status, RunStatus::Succeeded);
}

#[tokio::test]
async fn test_completed_ingest_archives_file() {
    let h = default_harness(Script::Complete, Script::Complete);
    fs::write(h.root.join("input.csv"), "x").unwrap();

    let descriptor = h.scheduler.tick(JobKind::Ingest).await;

    assert_eq!(descriptor.status, RunStatus::Succeeded);
    assert_eq!(descriptor.items_written, 3);
    assert!(descriptor.finished_at.is_some());
    assert!(!h.root.join("input.csv").exists());
    assert!(!h.root.join("processing.csv").exists());
    assert_eq!(h.scheduler.lifecycle().observe().archived_files, 1);
}

#[tokio::test]
async fn test_failed_ingest_quarantines_file_and_blocks_next_tick() {
    let h = default_harness(Script::FailRun, Script::Complete);
    fs::write(h.root.join("input.csv"), "x").unwrap();

    let descriptor = h.scheduler.tick(JobKind::Ingest).await;
    assert_eq!(descriptor.status, RunStatus::Failed);
    assert_eq!(descriptor.failure.as_deref(), Some("field1 rejected"));
    assert!(!h.root.join("processing.csv").exists());
    assert_eq!(fs::read_dir(h.root.join("error")).unwrap().count(), 1);

    fs::write(h.root.join("input.csv"), "y").unwrap();
    let next = h.scheduler.tick(JobKind::Ingest).await;
    assert_eq!(next.status, RunStatus::Skipped(VetoReason::ErrorDirectoryNotEmpty));
    assert_eq!(h.ingest.calls(), 1);
}

#[tokio::test]
async fn test_setup_failure_leaves_in_flight_file() {
    let h = default_harness(Script::FailSetup, Script::Complete);
    fs::write(h.root.join("input.csv"), "x").unwrap();

    let descriptor = h.scheduler.tick(JobKind::Ingest).await;
    assert_eq!(descriptor.status, RunStatus::Failed);
    assert!(descriptor.failure.unwrap().contains("store down"));
    assert!(h.root.join("processing.csv").exists());
    assert!(!h.root.join("error").exists());

    // The next tick resumes the in-flight file
    let retry = h.scheduler.tick(JobKind::Ingest).await;
    assert_eq!(retry.status, RunStatus::Failed);
    assert_eq!(h.ingest.calls(), 2);
}

#[tokio::test]
async fn test_failed_export_keeps_output() {
    let h = default_harness(Script::Complete, Script::FailRun);
    fs::write(h.root.join("output.txt"), "line\n").unwrap();

    let descriptor = h.scheduler.tick(JobKind::Export).await;
    assert_eq!(descriptor.status, RunStatus::Failed);
    assert_eq!(fs::read_to_string(h.root.join("output.txt")).unwrap(), "line\n");
}

#[tokio::test]
async fn test_completed_export_removes_empty_output() {
    let h = default_harness(Script::Complete, Script::Complete);
    fs::write(h.root.join("output.txt"), "").unwrap();

    let descriptor = h.scheduler.tick(JobKind::Export).await;
    assert_eq!(descriptor.status, RunStatus::Succeeded);
    assert!(!h.root.join("output.txt").exists());
}

#[tokio::test]
async fn test_hooks_fire_only_for_admitted_runs() {
    let before = Arc::new(AtomicUsize::new(0));
    let after: Arc<Mutex<Vec<(JobKind, RunStatus)>>> = Arc::new(Mutex::new(Vec::new()));

    let h = default_harness(Script::Complete, Script::Complete);
    let hooks = {
        let before = before.clone();
        let after = after.clone();
        RunHooks::new()
            .on_before_run(move |_| {
                before.fetch_add(1, Ordering::SeqCst);
            })
            .on_after_run(move |job, descriptor| {
                after.lock().unwrap().push((job, descriptor.status));
            })
    };
    let scheduler = h.scheduler.with_hooks(hooks);

    // No incoming file: vetoed, no hooks
    let skipped = scheduler.tick(JobKind::Ingest).await;
    assert!(skipped.is_skipped());
    assert_eq!(before.load(Ordering::SeqCst), 0);

    scheduler.tick(JobKind::Export).await;
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(
        *after.lock().unwrap(),
        vec![(JobKind::Export, RunStatus::Succeeded)]
    );
}

#[tokio::test]
async fn test_marker_released_before_after_hooks() {
    let h = default_harness(Script::Complete, Script::Complete);
    let marker = h.scheduler.marker().clone();
    let observed = Arc::new(Mutex::new(None));

    let hooks = {
        let observed = observed.clone();
        RunHooks::new().on_after_run(move |_, _| {
            *observed.lock().unwrap() = Some(marker.is_running());
        })
    };
    let scheduler = h.scheduler.with_hooks(hooks);

    scheduler.tick(JobKind::Export).await;
    assert_eq!(*observed.lock().unwrap(), Some(false));
}

#[test]
fn test_flows_bound_to_wrong_jobs_are_rejected() {
    let dir = TempDir::new().unwrap();

    let result = Scheduler::new(
        FileLifecycle::new(&paths(dir.path())).unwrap(),
        ScriptedFlow::new(JobKind::Export, Script::Complete),
        ScriptedFlow::new(JobKind::Ingest, Script::Complete),
        &ScheduleConfig::default(),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cadence_loop_ticks_and_stops_on_shutdown() {
    let schedule = ScheduleConfig {
        ingest_cron: "* * * * * *".to_string(),
        export_cron: "* * * * * *".to_string(),
        start_delay_secs: 0,
    };
    let h = harness(
        ScriptedFlow::new(JobKind::Ingest, Script::Complete),
        ScriptedFlow::new(JobKind::Export, Script::Complete),
        schedule,
    );
    let export = h.export.clone();
    let ingest = h.ingest.clone();
    let scheduler = Arc::new(h.scheduler);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(shutdown_rx));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
    assert!(result.is_ok());

    // Export ran at least once; ingest never had a file to claim
    assert!(export.calls() >= 1);
    assert_eq!(ingest.calls(), 0);
}
