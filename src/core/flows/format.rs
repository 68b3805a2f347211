//! Fixed-width output line format
//!
//! `F1:<field1>*F2:<field2>*F3<field3>`, each field left-justified in a
//! ten-character column. Longer values are cut at ten characters so every
//! line has the same width.

use crate::domain::Record;

/// Width of every field column
pub const COLUMN_WIDTH: usize = 10;

/// Render `record` as one output line (without the trailing newline)
pub fn format_line(record: &Record) -> String {
    format!(
        "F1:{:<w$.w$}*F2:{:<w$.w$}*F3{:<w$.w$}",
        record.field1,
        record.field2,
        record.field3,
        w = COLUMN_WIDTH
    )
}
