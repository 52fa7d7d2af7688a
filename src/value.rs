//! Column value variants and their textual renderings

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default timestamp pattern: fixed microsecond precision with an explicit
/// zone offset suffix.
pub const DEFAULT_DATETIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

/// A single table cell value.
///
/// The diff engine treats values as opaque except for formatting. Keeping
/// the set of variants closed puts every formatting rule next to the type
/// it applies to instead of behind runtime type inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Null,
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<FixedOffset>),
    Bool(bool),
    Other(String),
}

impl ColumnValue {
    /// Generic textual representation.
    ///
    /// This is the projection the default comparator uses for equality and
    /// the fallback rendering everywhere a value is printed. Nulls render
    /// as `<NULL>`, integers as plain decimal digits, floats as fixed-point
    /// decimal, timestamps with their own offset; text keeps its content
    /// with embedded newlines escaped to the two-character sequence `\n`.
    pub fn format_plain(&self) -> String {
        match self {
            Self::Null => "<NULL>".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Uint(v) => v.to_string(),
            Self::Float(v) => format!("{:.6}", v),
            Self::Text(v) => escape_newlines(v),
            Self::Timestamp(v) => v.format(DEFAULT_DATETIME_PATTERN).to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Other(v) => escape_newlines(v),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_plain())
    }
}

fn escape_newlines(s: &str) -> String {
    s.replace('\n', "\\n")
}
