//! Row value models.
//!
//! `SourceValue` is what the SQLite reader produces, `DestValue` is what the
//! MySQL writer binds. The mapping between them lives in `migrate::convert`.

use chrono::NaiveDateTime;

/// A scalar read from the source, tagged by its runtime storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Text recognised as a date/time in a temporal column
    Timestamp(NaiveDateTime),
    Blob(Vec<u8>),
}

/// A scalar in the encoding the destination expects, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub enum DestValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// One source row, positionally aligned with its table's columns.
pub type SourceRow = Vec<SourceValue>;
