//! Data models for the migrator.
//!
//! This module re-exports all model types used throughout the application.

pub mod schema;
pub mod value;

pub use schema::{ColumnDescriptor, TableDescriptor};
pub use value::{DestValue, SourceRow, SourceValue};
