//! Record store abstraction
//!
//! The store is the only shared mutable resource of the service. Every
//! multi-row operation is one unit of work: it succeeds for all rows or for
//! none of them.

use crate::domain::{Record, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Row counts reported by [`RecordStore::count_records`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    /// All rows in the table
    pub total: u64,

    /// Rows whose `processed` flag is not true
    pub unprocessed: u64,
}

/// Relational store holding ingested records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name used in logs
    fn backend_name(&self) -> &'static str;

    /// Test that the store is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Create the records table if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert a single record with `processed = false`
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    async fn insert_record(&self, record: &Record) -> Result<()> {
        self.insert_records(std::slice::from_ref(record)).await
    }

    /// Insert a chunk of records with `processed = false`, all or nothing
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; no row of the chunk is kept.
    async fn insert_records(&self, records: &[Record]) -> Result<()>;

    /// Every row whose `processed` flag is not true, in store order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn query_unprocessed(&self) -> Result<Vec<Record>>;

    /// Set `processed = true` on every row keyed by `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    async fn mark_processed(&self, key: &str) -> Result<()> {
        self.mark_processed_all(&[key.to_string()]).await
    }

    /// Set `processed = true` for each key, all or nothing
    ///
    /// # Errors
    ///
    /// Returns an error if any update fails; no row is changed.
    async fn mark_processed_all(&self, keys: &[String]) -> Result<()>;

    /// Count all rows and unprocessed rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn count_records(&self) -> Result<StoreCounts>;
}
