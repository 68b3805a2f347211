//! Chunked pipeline engine
//!
//! Generic reader → processor → writer engine used by both the ingest and
//! export flows.

pub mod composite;
pub mod engine;
pub mod fault;
pub mod listener;
pub mod outcome;
pub mod traits;

pub use composite::CompositeWriter;
pub use engine::{ChunkedPipeline, ChunkedPipelineBuilder};
pub use fault::{FaultClass, FaultPolicy};
pub use listener::{ChunkLoggingListener, StepListener, ZeroReadListener};
pub use outcome::{RunFailure, RunOutcome, StepStatus};
pub use traits::{ItemProcessor, ItemReader, ItemWriter, IterReader, PassThrough};
