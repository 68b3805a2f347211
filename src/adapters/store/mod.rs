//! Record store abstraction layer
//!
//! Trait-based access to the relational store so flows can run against
//! PostgreSQL in production and an in-memory table in tests.

pub mod factory;
pub mod traits;

pub use factory::create_record_store;
pub use traits::{RecordStore, StoreCounts};
