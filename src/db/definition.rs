//! Fallback column discovery from stored `CREATE TABLE` text.
//!
//! Used only when structured introspection returns nothing for a table.
//! Parsing goes through [sqlparser](https://docs.rs/sqlparser/) with the SQLite
//! dialect, so table-level constraints (`PRIMARY KEY (...)`, `FOREIGN KEY`,
//! `UNIQUE`, `CHECK`, `CONSTRAINT name ...`) land in the constraint list and
//! never show up as columns.

use crate::models::ColumnDescriptor;
use sqlparser::ast::{DataType, Statement};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::warn;

/// Extract data columns from a table definition.
///
/// Returns an empty list when the text does not parse as a single
/// `CREATE TABLE` statement; the caller treats that table as unmigratable.
pub fn columns_from_definition(table: &str, definition: &str) -> Vec<ColumnDescriptor> {
    let statements = match Parser::parse_sql(&SQLiteDialect {}, definition) {
        Ok(statements) => statements,
        Err(e) => {
            warn!(table = %table, error = %e, "Unparseable table definition");
            return Vec::new();
        }
    };

    match statements.as_slice() {
        [Statement::CreateTable(create)] => create
            .columns
            .iter()
            .map(|col| {
                let declared_type = match &col.data_type {
                    DataType::Unspecified => String::new(),
                    other => other.to_string(),
                };
                ColumnDescriptor::new(col.name.value.clone(), declared_type)
            })
            .collect(),
        _ => {
            warn!(table = %table, "Table definition is not a single CREATE TABLE statement");
            Vec::new()
        }
    }
}
