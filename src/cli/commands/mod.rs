//! CLI command implementations
//!
//! Exit codes shared by every command: 0 success, 1 run failed,
//! 2 configuration error, 4 store connection error, 5 fatal error.

pub mod run;
pub mod status;
pub mod trigger;
pub mod validate;

use crate::adapters::store::{create_record_store, RecordStore};
use crate::config::FerryConfig;
use crate::domain::Result;
use std::sync::Arc;

pub const EXIT_OK: i32 = 0;
pub const EXIT_RUN_FAILED: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_STORE: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Create the configured store, check it answers and make sure the table exists
pub(crate) async fn connect_store(config: &FerryConfig) -> Result<Arc<dyn RecordStore>> {
    let store = create_record_store(config).await?;
    store.test_connection().await?;
    store.ensure_schema().await?;
    tracing::info!(backend = store.backend_name(), "Record store ready");
    Ok(store)
}
