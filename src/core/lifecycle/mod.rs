//! File lifecycle
//!
//! The presence of a file at the in-flight location is the durable signal
//! that an ingest run claimed it and has not yet archived it. It survives a
//! process restart; the in-memory execution marker does not. The
//! [run lock](lock) tells a live holder of that file apart from one left by
//! a crash.

pub mod lock;
pub mod manager;
pub mod state;

pub use lock::RunLock;
pub use manager::{FileLifecycle, TIMESTAMP_FORMAT};
pub use state::{FileState, LifecycleSnapshot, OutputDisposition};
