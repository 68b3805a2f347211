//! PostgreSQL store integration
//!
//! Stores records in the single `fields` table created by
//! `migrations/001_initial_schema.sql`.

pub mod adapter;
pub mod client;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
