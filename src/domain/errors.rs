//! Domain error types
//!
//! This module defines the error hierarchy for Ferry. Errors are domain-specific
//! and don't expose third-party types; driver errors are converted to strings at
//! the adapter boundary.

use thiserror::Error;

/// Main Ferry error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum FerryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A record violated one or more field constraints
    #[error("Validation error: {0}")]
    Validation(String),

    /// A line of the incoming file could not be turned into a record
    #[error("Parse error: {0}")]
    Parse(String),

    /// File lifecycle (move/rename) errors
    #[error("File lifecycle error: {0}")]
    Lifecycle(String),

    /// Pipeline assembly or execution errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Scheduling errors (cron parsing, task failures)
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FerryError {
    /// Whether the error was caused by the content of a single record
    /// rather than by the infrastructure around it.
    pub fn is_record_level(&self) -> bool {
        matches!(self, FerryError::Validation(_) | FerryError::Parse(_))
    }
}

/// Store-specific errors
///
/// Errors raised by the relational store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Failed to create or verify the schema
    #[error("Failed to prepare schema: {0}")]
    SchemaFailed(String),

    /// Failed to insert rows
    #[error("Failed to insert records: {0}")]
    InsertFailed(String),

    /// Failed to query rows
    #[error("Failed to query records: {0}")]
    QueryFailed(String),

    /// Failed to update rows
    #[error("Failed to update records: {0}")]
    UpdateFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for FerryError {
    fn from(err: std::io::Error) -> Self {
        FerryError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FerryError {
    fn from(err: toml::de::Error) -> Self {
        FerryError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv reader errors
impl From<csv::Error> for FerryError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            FerryError::Io(err.to_string())
        } else {
            FerryError::Parse(err.to_string())
        }
    }
}

// Conversion from cron expression errors
impl From<cron::error::Error> for FerryError {
    fn from(err: cron::error::Error) -> Self {
        FerryError::Schedule(format!("Invalid cron expression: {err}"))
    }
}
