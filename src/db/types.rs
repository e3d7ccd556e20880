//! SQLite row decoding.
//!
//! This module turns `SqliteRow`s into [`SourceValue`]s.
//!
//! # Architecture
//!
//! Decoding uses a two-phase approach:
//! 1. The runtime storage class of each value (`NULL`, `INTEGER`, `REAL`,
//!    `TEXT`, `BLOB`) picks the Rust type to decode into. SQLite's declared
//!    column types are advisory, so they are not trusted for this step.
//! 2. TEXT values in columns whose declared type is temporal are parsed into
//!    timestamps when they match one of the accepted layouts.

use crate::error::{MigrateError, MigrateResult};
use crate::models::{ColumnDescriptor, SourceRow, SourceValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Decode, Row, Sqlite, TypeInfo, ValueRef};

/// Layouts accepted for timestamps stored as text, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse text that holds a date or timestamp.
///
/// Values carrying a UTC offset are normalised to UTC; bare dates become midnight.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Decode one row positionally against the table's columns.
pub fn decode_row(
    table: &str,
    columns: &[ColumnDescriptor],
    row: &SqliteRow,
) -> MigrateResult<SourceRow> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let raw = row
                .try_get_raw(idx)
                .map_err(|e| MigrateError::decode(table, &column.name, e.to_string()))?;
            decode_value(raw, column)
                .map_err(|e| MigrateError::decode(table, &column.name, e.to_string()))
        })
        .collect()
}

fn decode_value(
    raw: SqliteValueRef<'_>,
    column: &ColumnDescriptor,
) -> Result<SourceValue, sqlx::error::BoxDynError> {
    if raw.is_null() {
        return Ok(SourceValue::Null);
    }

    let storage_class = raw.type_info().name().to_ascii_uppercase();
    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => SourceValue::Integer(<i64 as Decode<Sqlite>>::decode(raw)?),
        "REAL" | "NUMERIC" => SourceValue::Real(<f64 as Decode<Sqlite>>::decode(raw)?),
        "BLOB" => SourceValue::Blob(<Vec<u8> as Decode<Sqlite>>::decode(raw)?),
        _ => {
            let text = <String as Decode<Sqlite>>::decode(raw)?;
            match column.is_temporal().then(|| parse_timestamp(&text)).flatten() {
                Some(ts) => SourceValue::Timestamp(ts),
                None => SourceValue::Text(text),
            }
        }
    };
    Ok(value)
}
