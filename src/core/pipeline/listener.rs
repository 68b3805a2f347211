//! Step listeners
//!
//! Listeners observe a run without taking part in it. All methods default to
//! no-ops so implementations override only what they need.

use super::outcome::{RunFailure, RunOutcome};

/// Observer of a pipeline run
pub trait StepListener: Send + Sync {
    /// Called once before the first read
    fn before_step(&self, _step: &str) {}

    /// Called after each chunk is written
    fn after_chunk(&self, _step: &str, _chunk_index: usize, _written: usize) {}

    /// Called once when the run fails
    fn on_failure(&self, _step: &str, _failure: &RunFailure) {}

    /// Called once with the final outcome
    fn after_step(&self, _step: &str, _outcome: &RunOutcome) {}
}

/// Logs when a completed step found nothing to read
#[derive(Debug, Default)]
pub struct ZeroReadListener;

impl StepListener for ZeroReadListener {
    fn after_step(&self, step: &str, outcome: &RunOutcome) {
        if outcome.is_completed() && outcome.items_read == 0 {
            tracing::info!(
                step = %step,
                "No records to process - no output file will be generated"
            );
        }
    }
}

/// Logs chunk progress at debug level
#[derive(Debug, Default)]
pub struct ChunkLoggingListener;

impl StepListener for ChunkLoggingListener {
    fn after_chunk(&self, step: &str, chunk_index: usize, written: usize) {
        tracing::debug!(step = %step, chunk_index, written, "Chunk committed");
    }

    fn on_failure(&self, step: &str, failure: &RunFailure) {
        tracing::error!(
            step = %step,
            chunk_index = failure.chunk_index,
            class = %failure.class,
            error = %failure.message,
            "Chunk abandoned"
        );
    }
}
