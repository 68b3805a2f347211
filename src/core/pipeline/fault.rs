//! Fault classification
//!
//! Every failure ends the run. The policy only decides which *kind* of
//! failure it was, so callers can tell malformed input (an operator has to
//! look at the file) from infrastructure trouble.

use crate::domain::FerryError;
use serde::Serialize;
use std::fmt;

/// How a failure is classified by a [`FaultPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    /// A record-level failure; the chunk holding it is abandoned and the run ends
    Skippable,
    /// Any other failure; the run ends immediately
    Fatal,
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultClass::Skippable => write!(f, "skippable"),
            FaultClass::Fatal => write!(f, "fatal"),
        }
    }
}

/// Classifies pipeline failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Record-level failures abort their chunk and end the run as failed;
    /// nothing is skipped and the rest of the source is left unread
    #[default]
    AbortOnRecordFailure,
    /// Every failure is fatal
    FailFast,
}

impl FaultPolicy {
    /// Classify `error` under this policy
    pub fn classify(&self, error: &FerryError) -> FaultClass {
        match self {
            FaultPolicy::AbortOnRecordFailure if error.is_record_level() => FaultClass::Skippable,
            _ => FaultClass::Fatal,
        }
    }
}
