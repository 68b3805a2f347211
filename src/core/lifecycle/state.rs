//! Input file states and the output file disposition

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where the input file currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// No input anywhere
    Absent,
    /// Waiting at the incoming location
    Incoming,
    /// Claimed by an ingest run that has not archived it yet
    InFlight,
    /// Renamed with a completion timestamp after a successful ingest
    Archived,
    /// Moved into the error directory; cleared only by an operator
    Errored,
}

impl FileState {
    /// Whether `self → next` is a transition the lifecycle manager performs
    pub fn can_transition_to(self, next: FileState) -> bool {
        matches!(
            (self, next),
            (FileState::Absent, FileState::Incoming)
                | (FileState::Archived, FileState::Incoming)
                | (FileState::Incoming, FileState::InFlight)
                | (FileState::InFlight, FileState::Archived)
                | (FileState::InFlight, FileState::Errored)
        )
    }

    /// Terminal for the current run
    pub fn is_terminal(self) -> bool {
        matches!(self, FileState::Archived | FileState::Errored)
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileState::Absent => "absent",
            FileState::Incoming => "incoming",
            FileState::InFlight => "in_flight",
            FileState::Archived => "archived",
            FileState::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// What happened to the output file after a completed export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputDisposition {
    /// Renamed with a timestamp suffix
    Rotated(PathBuf),
    /// Zero-length file deleted
    RemovedEmpty,
    /// No output file existed
    Absent,
}

/// Everything the lifecycle manager can see on disk
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleSnapshot {
    /// Derived state of the input file
    pub state: FileState,

    /// A file waits at the incoming location
    pub incoming_present: bool,

    /// A file occupies the in-flight location
    pub in_flight_present: bool,

    /// Entries in the error directory (`None` if it could not be read)
    pub error_entries: Option<usize>,

    /// Archived copies next to the in-flight location
    pub archived_files: usize,

    /// An output file is waiting to be rotated
    pub output_present: bool,
}
