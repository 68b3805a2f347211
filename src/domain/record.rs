//! Record model
//!
//! A record is three free-text fields plus a `processed` flag. Records are
//! built unvalidated by the file reader, checked by the validator, tagged by
//! the ingest processor and persisted with `processed = false`. The export
//! flow reads them back and flips the persisted flag keyed by `field1`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single row moving through the pipelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// First field; also the key used to mark the row processed
    pub field1: String,

    /// Second field
    pub field2: String,

    /// Third field
    pub field3: String,

    /// Whether the export flow has already emitted this row
    #[serde(default)]
    pub processed: bool,
}

impl Record {
    /// Creates an unprocessed record
    pub fn new(
        field1: impl Into<String>,
        field2: impl Into<String>,
        field3: impl Into<String>,
    ) -> Self {
        Self {
            field1: field1.into(),
            field2: field2.into(),
            field3: field3.into(),
            processed: false,
        }
    }

    /// Sets the processed flag
    pub fn with_processed(mut self, processed: bool) -> Self {
        self.processed = processed;
        self
    }

    /// The key the store uses to mark this record processed
    pub fn key(&self) -> &str {
        &self.field1
    }

    /// Returns the three fields in column order
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("field1", self.field1.as_str()),
            ("field2", self.field2.as_str()),
            ("field3", self.field3.as_str()),
        ]
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Field 1:{} Field 2:{} Field 3:{}{}",
            self.field1,
            self.field2,
            self.field3,
            if self.processed {
                " and has been processed"
            } else {
                " not yet processed"
            }
        )
    }
}

/// A single broken field constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Violation {
    /// Name of the offending field
    pub field: &'static str,

    /// The value that was rejected
    pub invalid_value: String,

    /// Human readable constraint description
    pub message: String,
}

impl Violation {
    /// Creates a new violation
    pub fn new(
        field: &'static str,
        invalid_value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            invalid_value: invalid_value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-->{}", self.field, self.invalid_value, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_unprocessed() {
        let record = Record::new("A - fieldC1", "bbb", "ccc");
        assert!(!record.processed);
        assert_eq!(record.key(), "A - fieldC1");
    }

    #[test]
    fn test_record_display() {
        let record = Record::new("a", "b", "c");
        assert_eq!(
            record.to_string(),
            "Field 1:a Field 2:b Field 3:c not yet processed"
        );

        let processed = record.with_processed(true);
        assert!(processed.to_string().ends_with("and has been processed"));
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::new("field2", "x", "size must be between 3 and 30");
        assert_eq!(
            violation.to_string(),
            "field2:x-->size must be between 3 and 30"
        );
    }

    #[test]
    fn test_fields_in_column_order() {
        let record = Record::new("one", "two", "three");
        let names: Vec<_> = record.fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["field1", "field2", "field3"]);
    }
}
