//! Configuration management for Ferry.
//!
//! Ferry reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FERRY_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [paths]
//! incoming_file = "/srv/ferry/incoming/inputFile.csv"
//! in_flight_file = "/srv/ferry/process/inputFile.csv"
//! error_dir = "/srv/ferry/error"
//! output_file = "/srv/ferry/output/outputFile"
//!
//! [schedule]
//! ingest_cron = "0 * * * * *"
//! export_cron = "30 0/3 * * * *"
//!
//! [pipeline]
//! chunk_size = 5
//! delimiter = ","
//!
//! [postgresql]
//! connection_string = "${FERRY_DATABASE_URL}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, FerryConfig, LoggingConfig, PathsConfig, PipelineConfig,
    PostgreSQLConfig, ScheduleConfig, StoreBackend, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
