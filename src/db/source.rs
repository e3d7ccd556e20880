//! SQLite source access.
//!
//! The source is opened read-only through a single-connection pool and exposes
//! the three reads the migrator needs: schema discovery, row counts and
//! paginated row fetches. Every value is bound; only quoted identifiers are
//! interpolated into SQL text.

use crate::db::definition::columns_from_definition;
use crate::db::sql;
use crate::db::types::decode_row;
use crate::error::{MigrateError, MigrateResult};
use crate::models::{ColumnDescriptor, SourceRow, TableDescriptor};
use futures_util::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Names with this prefix belong to SQLite itself (`sqlite_sequence`, `sqlite_stat1`, ...).
pub const SYSTEM_TABLE_PREFIX: &str = "sqlite_";

mod queries {
    /// Catalogue order is creation order.
    pub const LIST_TABLES: &str = r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table'
        "#;

    pub const TABLE_DEFINITION: &str = r#"
        SELECT sql FROM sqlite_master
        WHERE type = 'table' AND name = ?
        "#;

    pub const TABLE_COLUMNS: &str = r#"
        SELECT name, type FROM pragma_table_info(?)
        ORDER BY cid
        "#;
}

/// Whether a table name belongs to the engine's internal namespace.
pub fn is_system_table(name: &str) -> bool {
    name.starts_with(SYSTEM_TABLE_PREFIX)
}

/// Read-only handle on the SQLite source database.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteSource {
    /// Open the source file read-only. Never creates a missing file.
    pub async fn open(path: impl AsRef<Path>, connect_timeout: Duration) -> MigrateResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MigrateError::source_not_found(path.display().to_string()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .acquire_timeout(connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                MigrateError::connection(
                    format!("Failed to open {}: {}", path.display(), e),
                    "Check that the file is a SQLite database and is readable",
                )
            })?;

        info!(path = %path.display(), "Opened source database");
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the source file in bytes, when it can be read.
    pub fn file_size(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!(path = %self.path.display(), "Closed source database");
    }

    /// List user tables in catalogue order, excluding the `sqlite_` namespace.
    pub async fn list_tables(&self) -> MigrateResult<Vec<String>> {
        let rows = sqlx::query(queries::LIST_TABLES)
            .fetch_all(&self.pool)
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("name")?;
            if !is_system_table(&name) {
                tables.push(name);
            }
        }

        debug!(count = tables.len(), "Listed source tables");
        Ok(tables)
    }

    /// Describe a table's data columns in declaration order.
    ///
    /// Uses `pragma_table_info` first and falls back to parsing the stored
    /// definition text. Never fails because of a bad definition: the result is
    /// then a descriptor with no columns.
    pub async fn describe_table(&self, table: &str) -> MigrateResult<TableDescriptor> {
        let mut columns = self.fetch_columns(table).await.unwrap_or_else(|e| {
            warn!(table = %table, error = %e, "Column introspection failed");
            Vec::new()
        });

        if columns.is_empty() {
            debug!(table = %table, "Falling back to definition text");
            columns = match self.fetch_definition(table).await? {
                Some(definition) => columns_from_definition(table, &definition),
                None => Vec::new(),
            };
        }

        Ok(TableDescriptor {
            name: table.to_string(),
            columns,
        })
    }

    async fn fetch_columns(&self, table: &str) -> MigrateResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::TABLE_COLUMNS)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> MigrateResult<ColumnDescriptor> {
                let name: String = row.try_get("name")?;
                let declared_type: Option<String> = row.try_get("type")?;
                Ok(ColumnDescriptor::new(name, declared_type.unwrap_or_default()))
            })
            .collect()
    }

    async fn fetch_definition(&self, table: &str) -> MigrateResult<Option<String>> {
        let row = sqlx::query(queries::TABLE_DEFINITION)
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.and_then(|r| r.try_get::<Option<String>, _>("sql").ok().flatten()))
    }

    /// Total number of rows in a table.
    pub async fn count_rows(&self, table: &str) -> MigrateResult<u64> {
        let count: i64 = sqlx::query_scalar(&sql::sqlite_count(table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Read one page of rows starting at `offset`.
    ///
    /// Each element is decoded independently so a single undecodable row does
    /// not discard the rest of the page.
    pub async fn fetch_page(
        &self,
        table: &TableDescriptor,
        limit: u64,
        offset: u64,
    ) -> MigrateResult<Vec<MigrateResult<SourceRow>>> {
        let query = sql::sqlite_page(&table.name, &table.column_names());
        let mut stream = sqlx::query(&query)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch(&self.pool);

        let mut page = Vec::with_capacity(limit.min(10_000) as usize);
        while let Some(row) = stream.try_next().await? {
            page.push(decode_row(&table.name, &table.columns, &row));
        }
        Ok(page)
    }
}
