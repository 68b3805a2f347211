// Ferry - scheduled file-to-store batch service
// Copyright (c) 2025 Ferry Contributors
// Licensed under the MIT License

//! # Ferry - scheduled file ⇄ store batch service
//!
//! Ferry periodically ingests a delimited file into a relational store and,
//! on a separate cadence, exports unprocessed rows back to a fixed-width file
//! while marking them processed.
//!
//! ## Overview
//!
//! - **Ingest** claims the incoming file, validates and tags every record and
//!   inserts them in chunks
//! - **Export** appends unprocessed rows to the output file and flags them
//!   processed in the same chunk
//! - **Scheduling** runs both on cron cadences, never more than one job at a
//!   time
//! - **Recovery** is visible on disk: a stuck in-flight file or a populated
//!   error directory tells the operator what happened
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline engine, flows, file lifecycle and scheduler
//! - [`adapters`] - Record stores (PostgreSQL, in-memory) and delimited files
//! - [`domain`] - Records, job identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferry::adapters::store::create_record_store;
//! use ferry::config::load_config;
//! use ferry::core::scheduler::Scheduler;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("ferry.toml")?;
//!     let store = create_record_store(&config).await?;
//!     store.ensure_schema().await?;
//!
//!     let scheduler = Arc::new(Scheduler::from_config(&config, store)?);
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     scheduler.run(shutdown_rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`] with a [`domain::FerryError`].
//! Record-level errors (validation, malformed lines) are kept apart from
//! infrastructure errors so a failed ingest can be told apart from a broken
//! store:
//!
//! ```rust
//! use ferry::domain::FerryError;
//!
//! let err = FerryError::Validation("field1:ab-->size must be between 3 and 30".to_string());
//! assert!(err.is_record_level());
//! ```
//!
//! ## Logging
//!
//! Ferry uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(job = "ingest", items_written = 5, "Run succeeded");
//! warn!(error_dir = "/data/error", "Ingest blocked until the error directory is cleared");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
