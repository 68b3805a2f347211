//! Record store factory
//!
//! Creates the store implementation selected by `store.backend`.

use crate::adapters::memory::InMemoryStore;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::store::traits::RecordStore;
use crate::config::schema::{FerryConfig, StoreBackend};
use crate::domain::{FerryError, Result};
use std::sync::Arc;

/// Create a record store based on the configuration
///
/// # Errors
///
/// Returns an error if the selected backend is not configured or its client
/// cannot be created.
pub async fn create_record_store(config: &FerryConfig) -> Result<Arc<dyn RecordStore>> {
    match config.store.backend {
        StoreBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                FerryError::Configuration(
                    "PostgreSQL configuration is required when store.backend = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL record store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn RecordStore>)
        }
        StoreBackend::Memory => {
            tracing::info!("Creating in-memory record store");
            Ok(Arc::new(InMemoryStore::new()) as Arc<dyn RecordStore>)
        }
    }
}
