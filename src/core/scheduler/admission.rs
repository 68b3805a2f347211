//! Run admission gate
//!
//! A pure decision over a snapshot of the marker and the file system, taken
//! immediately before a tick is allowed to launch its flow.

use crate::core::lifecycle::FileLifecycle;
use crate::domain::JobKind;
use serde::Serialize;
use std::fmt;

/// Why a tick was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoReason {
    /// Another run holds the execution marker
    AlreadyRunning,
    /// Another scheduler over the same files holds the run lock
    LockedByOtherProcess,
    /// The run lock file could not be created or locked
    RunLockUnavailable,
    /// The error directory holds files awaiting an operator
    ErrorDirectoryNotEmpty,
    /// The error directory exists but could not be read
    ErrorDirectoryUnreadable,
    /// Nothing at the incoming or in-flight location
    NoIncomingFile,
}

impl fmt::Display for VetoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VetoReason::AlreadyRunning => "another job is running",
            VetoReason::LockedByOtherProcess => "another ferry process is running a job",
            VetoReason::RunLockUnavailable => "run lock cannot be taken",
            VetoReason::ErrorDirectoryNotEmpty => "error directory is not empty",
            VetoReason::ErrorDirectoryUnreadable => "error directory cannot be read",
            VetoReason::NoIncomingFile => "no incoming file",
        };
        f.write_str(s)
    }
}

/// What an admitted run does before its flow starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmitPlan {
    /// Move the incoming file to the in-flight location, then ingest it
    ClaimIncoming,
    /// Re-read a file left in flight by an earlier run
    ResumeInFlight,
    /// Run the export flow
    Export,
}

/// Outcome of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    Admit(AdmitPlan),
    Veto(VetoReason),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admit(_))
    }
}

/// Everything the gate looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateInputs {
    /// Some job holds the execution marker
    pub job_running: bool,

    /// Error directory emptiness; `None` when it could not be read
    pub error_dir_empty: Option<bool>,

    /// A file waits at the incoming location
    pub incoming_present: bool,

    /// A file occupies the in-flight location
    pub in_flight_present: bool,
}

impl GateInputs {
    /// Snapshot the file system through `lifecycle`
    pub fn observe(lifecycle: &FileLifecycle, job_running: bool) -> Self {
        let error_dir_empty = match lifecycle.error_dir_is_empty() {
            Ok(empty) => Some(empty),
            Err(e) => {
                tracing::warn!(error = %e, "Error directory check failed");
                None
            }
        };

        Self {
            job_running,
            error_dir_empty,
            incoming_present: lifecycle.incoming_present(),
            in_flight_present: lifecycle.in_flight_present(),
        }
    }
}

/// Decide whether `job` may run
pub fn decide(job: JobKind, inputs: &GateInputs) -> Admission {
    if inputs.job_running {
        return Admission::Veto(VetoReason::AlreadyRunning);
    }

    match job {
        JobKind::Export => Admission::Admit(AdmitPlan::Export),
        JobKind::Ingest => match inputs.error_dir_empty {
            Some(false) => Admission::Veto(VetoReason::ErrorDirectoryNotEmpty),
            None => Admission::Veto(VetoReason::ErrorDirectoryUnreadable),
            Some(true) if inputs.in_flight_present => Admission::Admit(AdmitPlan::ResumeInFlight),
            Some(true) if inputs.incoming_present => Admission::Admit(AdmitPlan::ClaimIncoming),
            Some(true) => Admission::Veto(VetoReason::NoIncomingFile),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn inputs(
        running: bool,
        error_empty: Option<bool>,
        incoming: bool,
        in_flight: bool,
    ) -> GateInputs {
        GateInputs {
            job_running: running,
            error_dir_empty: error_empty,
            incoming_present: incoming,
            in_flight_present: in_flight,
        }
    }

    #[test_case(inputs(true, Some(true), true, false), Admission::Veto(VetoReason::AlreadyRunning) ; "running job vetoes")]
    #[test_case(inputs(false, Some(false), true, false), Admission::Veto(VetoReason::ErrorDirectoryNotEmpty) ; "populated error dir vetoes")]
    #[test_case(inputs(false, Some(false), true, true), Admission::Veto(VetoReason::ErrorDirectoryNotEmpty) ; "error dir beats in flight")]
    #[test_case(inputs(false, None, true, false), Admission::Veto(VetoReason::ErrorDirectoryUnreadable) ; "unreadable error dir vetoes")]
    #[test_case(inputs(false, Some(true), false, false), Admission::Veto(VetoReason::NoIncomingFile) ; "nothing to ingest")]
    #[test_case(inputs(false, Some(true), true, false), Admission::Admit(AdmitPlan::ClaimIncoming) ; "incoming file admitted")]
    #[test_case(inputs(false, Some(true), false, true), Admission::Admit(AdmitPlan::ResumeInFlight) ; "left over in flight resumed")]
    #[test_case(inputs(false, Some(true), true, true), Admission::Admit(AdmitPlan::ResumeInFlight) ; "in flight resumed before new claim")]
    fn test_ingest_gate(inputs: GateInputs, expected: Admission) {
        assert_eq!(decide(JobKind::Ingest, &inputs), expected);
    }

    #[test]
    fn test_export_only_vetoed_by_running_job() {
        let populated = inputs(false, Some(false), false, false);
        assert_eq!(
            decide(JobKind::Export, &populated),
            Admission::Admit(AdmitPlan::Export)
        );
        let running = inputs(true, Some(true), false, false);
        assert_eq!(
            decide(JobKind::Export, &running),
            Admission::Veto(VetoReason::AlreadyRunning)
        );
    }
}
