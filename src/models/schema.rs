//! Schema-related data models.
//!
//! This module defines the table and column descriptors produced by source
//! discovery and consumed by the batch stage.

use serde::{Deserialize, Serialize};

/// A data column of a source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type as written in the table definition (may be empty in SQLite).
    pub declared_type: String,
}

impl ColumnDescriptor {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Whether the declared type names a date or time affinity
    /// (`DATE`, `DATETIME`, `TIMESTAMP`, `TIME`).
    pub fn is_temporal(&self) -> bool {
        let upper = self.declared_type.to_ascii_uppercase();
        upper.contains("DATE") || upper.contains("TIME")
    }
}

/// A source table and its data columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Create a table descriptor with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// A table without data columns cannot be migrated.
    pub fn is_migratable(&self) -> bool {
        !self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_declared_types() {
        assert!(ColumnDescriptor::new("a", "DATETIME").is_temporal());
        assert!(ColumnDescriptor::new("a", "timestamp").is_temporal());
        assert!(ColumnDescriptor::new("a", "Date").is_temporal());
        assert!(!ColumnDescriptor::new("a", "TEXT").is_temporal());
        assert!(!ColumnDescriptor::new("a", "").is_temporal());
    }

    #[test]
    fn test_table_descriptor_columns() {
        let table = TableDescriptor::new("accounts")
            .with_column(ColumnDescriptor::new("id", "INTEGER"))
            .with_column(ColumnDescriptor::new("email", "TEXT"));
        assert_eq!(table.column_names(), vec!["id", "email"]);
        assert!(table.is_migratable());
        assert!(!TableDescriptor::new("empty").is_migratable());
    }
}
