//! Core business logic for Ferry.
//!
//! # Modules
//!
//! - [`validation`] - Field constraints checked on every incoming record
//! - [`pipeline`] - Chunked reader → processor → writer engine
//! - [`flows`] - The ingest and export flows built on the engine
//! - [`lifecycle`] - Moves of the input and output files
//! - [`scheduler`] - Admission gate, execution marker and cron cadences
//!
//! # Ingest Workflow
//!
//! 1. **Admit**: no other job running, error directory empty, a file waiting
//! 2. **Claim**: move the incoming file to the in-flight location
//! 3. **Run**: read, validate, tag and insert in chunks
//! 4. **Settle**: archive the file on success, move it to the error
//!    directory on failure
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry::adapters::memory::InMemoryStore;
//! use ferry::config::load_config;
//! use ferry::core::scheduler::Scheduler;
//! use ferry::domain::JobKind;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//! let scheduler = Scheduler::from_config(&config, Arc::new(InMemoryStore::new()))?;
//!
//! let descriptor = scheduler.tick(JobKind::Ingest).await;
//! println!("{}: {}", descriptor.job, descriptor.status);
//! # Ok(())
//! # }
//! ```

pub mod flows;
pub mod lifecycle;
pub mod pipeline;
pub mod scheduler;
pub mod validation;
