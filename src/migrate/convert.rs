//! Source-to-destination value conversion.
//!
//! Pure mapping from [`SourceValue`] to [`DestValue`]:
//!
//! | Source | Destination |
//! |--------|-------------|
//! | NULL | NULL |
//! | INTEGER, REAL | unchanged |
//! | timestamp | text `YYYY-MM-DD HH:MM:SS` |
//! | text `true` / `false` (any case) | integer `1` / `0` |
//! | other text | unchanged |
//! | BLOB | bytes |

use crate::models::{DestValue, SourceRow, SourceValue};

/// Layout MySQL accepts for `DATETIME` and `TIMESTAMP` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a single value.
pub fn convert_value(value: SourceValue) -> DestValue {
    match value {
        SourceValue::Null => DestValue::Null,
        SourceValue::Integer(v) => DestValue::Int(v),
        SourceValue::Real(v) => DestValue::Float(v),
        SourceValue::Timestamp(ts) => DestValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
        SourceValue::Text(text) => convert_text(text),
        SourceValue::Blob(bytes) => DestValue::Bytes(bytes),
    }
}

/// Convert every value of a row, keeping positions.
pub fn convert_row(row: SourceRow) -> Vec<DestValue> {
    row.into_iter().map(convert_value).collect()
}

fn convert_text(text: String) -> DestValue {
    if text.eq_ignore_ascii_case("true") {
        DestValue::Int(1)
    } else if text.eq_ignore_ascii_case("false") {
        DestValue::Int(0)
    } else {
        DestValue::Text(text)
    }
}
