//! PostgreSQL adapter implementing the record store trait
//!
//! Every chunk runs in its own transaction so a failed insert or update
//! leaves the table exactly as it was before the chunk.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::store::traits::{RecordStore, StoreCounts};
use crate::domain::{Record, Result, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

const INSERT_RECORD: &str =
    "INSERT INTO fields (field1, field2, field3, processed) VALUES ($1, $2, $3, false)";
const SELECT_UNPROCESSED: &str =
    "SELECT field1, field2, field3, processed FROM fields WHERE processed IS NOT TRUE";
const MARK_PROCESSED: &str = "UPDATE fields SET processed = true WHERE field1 = $1";
const COUNT_RECORDS: &str =
    "SELECT COUNT(*), COUNT(*) FILTER (WHERE processed IS NOT TRUE) FROM fields";

/// PostgreSQL implementation of [`RecordStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

fn row_to_record(row: &Row) -> std::result::Result<Record, tokio_postgres::Error> {
    let processed: Option<bool> = row.try_get(3)?;
    Ok(Record::new(
        row.try_get::<_, String>(0)?,
        row.try_get::<_, String>(1)?,
        row.try_get::<_, String>(2)?,
    )
    .with_processed(processed.unwrap_or(false)))
}

#[async_trait]
impl RecordStore for PostgreSQLAdapter {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn insert_records(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| StoreError::InsertFailed(format!("Failed to begin transaction: {e}")))?;

        let statement = tx
            .prepare(INSERT_RECORD)
            .await
            .map_err(|e| StoreError::InsertFailed(e.to_string()))?;

        for record in records {
            tx.execute(&statement, &[&record.field1, &record.field2, &record.field3])
                .await
                .map_err(|e| {
                    StoreError::InsertFailed(format!("field1 '{}': {e}", record.field1))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::InsertFailed(format!("Failed to commit: {e}")))?;

        tracing::debug!(count = records.len(), "Inserted records into PostgreSQL");
        Ok(())
    }

    async fn query_unprocessed(&self) -> Result<Vec<Record>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(SELECT_UNPROCESSED, &[])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::QueryFailed(format!("Unexpected row shape: {e}")))?;
        Ok(records)
    }

    async fn mark_processed_all(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| StoreError::UpdateFailed(format!("Failed to begin transaction: {e}")))?;

        let statement = tx
            .prepare(MARK_PROCESSED)
            .await
            .map_err(|e| StoreError::UpdateFailed(e.to_string()))?;

        for key in keys {
            tx.execute(&statement, &[key])
                .await
                .map_err(|e| StoreError::UpdateFailed(format!("field1 '{key}': {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::UpdateFailed(format!("Failed to commit: {e}")))?;

        tracing::debug!(count = keys.len(), "Marked records processed in PostgreSQL");
        Ok(())
    }

    async fn count_records(&self) -> Result<StoreCounts> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one(COUNT_RECORDS, &[])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let total: i64 = row
            .try_get(0)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        let unprocessed: i64 = row
            .try_get(1)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(StoreCounts {
            total: total.max(0) as u64,
            unprocessed: unprocessed.max(0) as u64,
        })
    }
}
