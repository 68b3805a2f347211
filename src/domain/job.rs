//! Job identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two scheduled jobs
///
/// # Examples
///
/// ```
/// use ferry::domain::JobKind;
/// use std::str::FromStr;
///
/// assert_eq!(JobKind::from_str("ingest").unwrap(), JobKind::Ingest);
/// assert_eq!(JobKind::Export.to_string(), "export");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// Incoming file → store
    Ingest,
    /// Unprocessed store rows → output file
    Export,
}

impl JobKind {
    /// Both jobs, ingest first
    pub const ALL: [JobKind; 2] = [JobKind::Ingest, JobKind::Export];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Ingest => "ingest",
            JobKind::Export => "export",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ingest" => Ok(JobKind::Ingest),
            "export" => Ok(JobKind::Export),
            other => Err(format!(
                "Unknown job '{other}'. Must be 'ingest' or 'export'"
            )),
        }
    }
}
