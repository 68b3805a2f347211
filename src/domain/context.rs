//! Error context extension trait
//!
//! Like `anyhow::Context`, but the error keeps its [`FerryError`] variant so
//! the fault policy can still tell record-level failures from
//! infrastructure ones after context has been added.
//!
//! # Examples
//!
//! ```rust
//! use ferry::domain::{FerryError, Result};
//! use ferry::domain::context::ResultExt;
//!
//! fn read_file(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::{FerryError, StoreError};
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Prefix the error message with `context`
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Prefix the error message with a lazily computed context
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FerryError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| e.into().prefixed(&context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().prefixed(&f()))
    }
}

impl FerryError {
    /// Same variant, message prefixed with `context`
    pub fn prefixed(self, context: &dyn Display) -> Self {
        let wrap = |msg: String| format!("{context}: {msg}");
        match self {
            FerryError::Configuration(m) => FerryError::Configuration(wrap(m)),
            FerryError::Store(e) => FerryError::Store(e.prefixed(context)),
            FerryError::Validation(m) => FerryError::Validation(wrap(m)),
            FerryError::Parse(m) => FerryError::Parse(wrap(m)),
            FerryError::Lifecycle(m) => FerryError::Lifecycle(wrap(m)),
            FerryError::Pipeline(m) => FerryError::Pipeline(wrap(m)),
            FerryError::Schedule(m) => FerryError::Schedule(wrap(m)),
            FerryError::Io(m) => FerryError::Io(wrap(m)),
            FerryError::Other(m) => FerryError::Other(wrap(m)),
        }
    }
}

impl StoreError {
    fn prefixed(self, context: &dyn Display) -> Self {
        let wrap = |msg: String| format!("{context}: {msg}");
        match self {
            StoreError::ConnectionFailed(m) => StoreError::ConnectionFailed(wrap(m)),
            StoreError::SchemaFailed(m) => StoreError::SchemaFailed(wrap(m)),
            StoreError::InsertFailed(m) => StoreError::InsertFailed(wrap(m)),
            StoreError::QueryFailed(m) => StoreError::QueryFailed(wrap(m)),
            StoreError::UpdateFailed(m) => StoreError::UpdateFailed(wrap(m)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_variant() {
        let result: Result<()> = Err(FerryError::Validation("field1 too short".to_string()));
        let err = result.context("Record 3").unwrap_err();

        assert!(err.is_record_level());
        assert_eq!(err.to_string(), "Validation error: Record 3: field1 too short");
    }

    #[test]
    fn test_context_on_io_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.context("Failed to open input").unwrap_err();
        assert!(matches!(err, FerryError::Io(ref m) if m.starts_with("Failed to open input")));
    }

    #[test]
    fn test_context_on_store_error() {
        let result: Result<()> = Err(StoreError::InsertFailed("duplicate".to_string()).into());
        let err = result.context("Chunk 2").unwrap_err();
        assert!(matches!(
            err,
            FerryError::Store(StoreError::InsertFailed(ref m)) if m == "Chunk 2: duplicate"
        ));
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let called = std::sync::atomic::AtomicBool::new(false);
        let result: Result<i32> = Ok(42);
        let value = result
            .with_context(|| {
                called.store(true, std::sync::atomic::Ordering::SeqCst);
                "never"
            })
            .unwrap();

        assert_eq!(value, 42);
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }
}
