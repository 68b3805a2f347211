//! External system integrations for Ferry.
//!
//! - [`store`] - Record store abstraction (trait + factory)
//! - [`postgresql`] - PostgreSQL implementation of the record store
//! - [`memory`] - In-memory record store for tests and local runs
//! - [`delimited`] - Delimited input reader and output line appender
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies.
//! Flows only see the [`store::RecordStore`] trait, so the same pipeline runs
//! against PostgreSQL in production and [`memory::InMemoryStore`] in tests:
//!
//! ```rust,no_run
//! use ferry::adapters::memory::InMemoryStore;
//! use ferry::adapters::store::RecordStore;
//! use ferry::domain::Record;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! store.insert_record(&Record::new("A - fieldC1", "bbb", "ccc")).await?;
//! assert_eq!(store.query_unprocessed().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod delimited;
pub mod memory;
pub mod postgresql;
pub mod store;
