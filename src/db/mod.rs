//! Database access layer.
//!
//! This module provides both ends of a migration:
//! - SQLite source: discovery, row counts and paginated reads
//! - Destination trait and its MySQL implementation
//! - SQL text builders with identifier quoting
//! - Row decoding and the definition-text fallback for column discovery

pub mod definition;
pub mod destination;
pub mod source;
pub mod sql;
pub mod types;

pub use destination::{Destination, MySqlDestination};
pub use source::{SqliteSource, is_system_table};
