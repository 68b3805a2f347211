//! The two flows the scheduler runs
//!
//! - [`ingest`] reads the in-flight file, validates and tags every record and
//!   inserts them into the store.
//! - [`export`] writes unprocessed rows to the output file and marks them
//!   processed.
//!
//! A flow returns `Err` only when it cannot start (store unreachable, input
//! unreadable). Once the pipeline is running every failure is reported in
//! the [`RunOutcome`].

pub mod export;
pub mod format;
pub mod ingest;

pub use export::{ExportFlow, ExportSettings, FormattedFileWriter, MarkProcessedWriter};
pub use format::format_line;
pub use ingest::{IngestFlow, IngestProcessor, IngestSettings, StoreInsertWriter, READ_TAG};

use crate::core::pipeline::RunOutcome;
use crate::domain::{JobKind, Result};
use async_trait::async_trait;

/// A runnable job
#[async_trait]
pub trait Flow: Send + Sync {
    /// Which job this flow implements
    fn job(&self) -> JobKind;

    /// Run the flow once
    ///
    /// # Errors
    ///
    /// Returns an error if the flow could not start. Failures after the
    /// pipeline has started are reported through the outcome.
    async fn execute(&self) -> Result<RunOutcome>;
}
