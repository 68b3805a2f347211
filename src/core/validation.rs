//! Field constraint validation
//!
//! The validator is a total function over a [`Record`]: it never fails, it
//! only reports [`Violation`]s. An empty result means the record may enter
//! the transform step.

use crate::domain::{FerryError, Record, Result, Violation};
use regex::Regex;

/// Substring every `field1` value must contain
pub const FIELD1_MARKER: &str = " - fieldC1";

/// Pattern the whole of `field1` must match: an uppercase first letter
/// followed by the marker, all on one line
pub const FIELD1_PATTERN: &str = r"^[A-Z].* - fieldC1.*$";

/// Inclusive lower bound on field length, in characters
pub const MIN_FIELD_LEN: usize = 3;

/// Inclusive upper bound on field length, in characters
pub const MAX_FIELD_LEN: usize = 30;

/// Validates records against the field constraints
#[derive(Debug, Clone)]
pub struct RecordValidator {
    field1_pattern: Regex,
}

impl RecordValidator {
    /// Create a validator with the standard field1 pattern
    pub fn new() -> Result<Self> {
        Self::with_pattern(FIELD1_PATTERN)
    }

    /// Create a validator with a custom field1 pattern
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let field1_pattern = Regex::new(pattern).map_err(|e| {
            FerryError::Configuration(format!("Invalid field1 pattern '{pattern}': {e}"))
        })?;
        Ok(Self { field1_pattern })
    }

    /// Check every constraint on `record`, returning all violations in field order
    pub fn validate(&self, record: &Record) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (name, value) in record.fields() {
            let len = value.chars().count();
            if !(MIN_FIELD_LEN..=MAX_FIELD_LEN).contains(&len) {
                violations.push(Violation::new(
                    name,
                    value,
                    format!("size must be between {MIN_FIELD_LEN} and {MAX_FIELD_LEN}"),
                ));
            }
        }

        if !self.field1_pattern.is_match(&record.field1) {
            violations.push(Violation::new(
                "field1",
                record.field1.as_str(),
                format!("must match \"{}\"", self.field1_pattern.as_str()),
            ));
        }

        violations.sort();
        violations
    }

    /// Validate and turn any violations into a single record-level error
    pub fn check(&self, record: &Record) -> Result<()> {
        let violations = self.validate(record);
        if violations.is_empty() {
            return Ok(());
        }

        let report = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Err(FerryError::Validation(report))
    }
}
