//! Domain models and types for Ferry.
//!
//! The domain layer provides:
//! - **Record model** ([`Record`], [`Violation`])
//! - **Job identifiers** ([`JobKind`])
//! - **Error types** ([`FerryError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//! - **Error context** ([`context::ResultExt`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FerryError>`]:
//!
//! ```rust
//! use ferry::domain::{FerryError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(FerryError::Validation("field1 too short".to_string()))
//! }
//! ```

pub mod context;
pub mod errors;
pub mod job;
pub mod record;
pub mod result;

pub use errors::{FerryError, StoreError};
pub use job::JobKind;
pub use record::{Record, Violation};
pub use result::Result;
