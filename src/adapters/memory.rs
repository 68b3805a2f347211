//! In-memory record store
//!
//! Backs `store.backend = "memory"` and the test suites. Rows keep insertion
//! order, so exports read them back in the order they were ingested.

use crate::adapters::store::traits::{RecordStore, StoreCounts};
use crate::domain::{FerryError, Record, Result, StoreError};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// Record store kept in a vector behind a mutex
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<Record>>,
    fail_inserts: Mutex<bool>,
    fail_updates: Mutex<bool>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            rows: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Make every following insert fail
    pub fn fail_inserts(&self, fail: bool) {
        *lock(&self.fail_inserts) = fail;
    }

    /// Make every following processed-flag update fail
    pub fn fail_updates(&self, fail: bool) {
        *lock(&self.fail_updates) = fail;
    }

    /// Copy of every row, processed or not
    pub fn snapshot(&self) -> Vec<Record> {
        lock(&self.rows).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_records(&self, records: &[Record]) -> Result<()> {
        if *lock(&self.fail_inserts) {
            return Err(FerryError::Store(StoreError::InsertFailed(
                "store rejected the insert".to_string(),
            )));
        }

        let mut rows = lock(&self.rows);
        rows.extend(records.iter().cloned().map(|r| r.with_processed(false)));
        Ok(())
    }

    async fn query_unprocessed(&self) -> Result<Vec<Record>> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|r| !r.processed)
            .cloned()
            .collect())
    }

    async fn mark_processed_all(&self, keys: &[String]) -> Result<()> {
        if *lock(&self.fail_updates) {
            return Err(FerryError::Store(StoreError::UpdateFailed(
                "store rejected the update".to_string(),
            )));
        }

        let mut rows = lock(&self.rows);
        for row in rows.iter_mut() {
            if keys.iter().any(|k| k == &row.field1) {
                row.processed = true;
            }
        }
        Ok(())
    }

    async fn count_records(&self) -> Result<StoreCounts> {
        let rows = lock(&self.rows);
        Ok(StoreCounts {
            total: rows.len() as u64,
            unprocessed: rows.iter().filter(|r| !r.processed).count() as u64,
        })
    }
}
