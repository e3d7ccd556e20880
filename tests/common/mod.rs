//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sqlite_mysql_migrate::db::Destination;
use sqlite_mysql_migrate::error::{MigrateError, MigrateResult};
use sqlite_mysql_migrate::models::{DestValue, TableDescriptor};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::subscriber::{self, DefaultGuard};
use tracing_subscriber::{EnvFilter, fmt};

/// Create a SQLite file from a list of statements.
///
/// The directory must be kept alive for as long as the file is used.
pub async fn create_source(statements: &[&str]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for statement in statements {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    (dir, path)
}

/// `INSERT` statements for `count` numbered rows into `table (id, name)`.
pub fn numbered_rows(table: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("INSERT INTO {table} (id, name) VALUES ({i}, 'row {i}')"))
        .collect()
}

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's log events, as JSON lines, into a buffer.
pub fn capture_logs() -> (Arc<Mutex<Vec<u8>>>, DefaultGuard) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = buffer.clone();
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("sqlite_mysql_migrate=info"))
        .with_writer(move || BufferWriter(writer.clone()))
        .json()
        .finish();
    let guard = subscriber::set_default(subscriber);
    (buffer, guard)
}

/// Captured events at `level`, as parsed JSON objects.
pub fn logged_at(buffer: &Arc<Mutex<Vec<u8>>>, level: &str) -> Vec<serde_json::Value> {
    let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    text.lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|event| event["level"] == level)
        .collect()
}

/// In-memory destination.
///
/// Treats the first column of every table as a unique key, rejects any row
/// containing the text `REJECT`, and can simulate a lost connection.
#[derive(Debug, Default)]
pub struct RecordingDestination {
    /// Inserted rows in order, with their table.
    pub rows: Vec<(String, Vec<DestValue>)>,
    /// Session statements in order: `disable`, `enable`, `commit`.
    pub session: Vec<&'static str>,
    /// Rows already inserted, keyed by table and first value.
    keys: HashSet<(String, String)>,
    /// Fail with a connection error once this table has received this many inserts.
    pub fail_after: Option<(String, usize)>,
    /// Answer for `has_unique_key`.
    pub without_unique_keys: bool,
}

impl RecordingDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(table: &str, inserts: usize) -> Self {
        Self {
            fail_after: Some((table.to_string(), inserts)),
            ..Self::default()
        }
    }

    /// A destination whose tables report no unique index.
    pub fn without_unique_keys() -> Self {
        Self {
            without_unique_keys: true,
            ..Self::default()
        }
    }

    /// Rows written to one table.
    pub fn rows_for(&self, table: &str) -> Vec<&Vec<DestValue>> {
        self.rows
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, values)| values)
            .collect()
    }

    pub fn is_untouched(&self) -> bool {
        self.rows.is_empty() && self.session.is_empty()
    }
}

#[async_trait]
impl Destination for RecordingDestination {
    async fn disable_constraints(&mut self) -> MigrateResult<()> {
        self.session.push("disable");
        Ok(())
    }

    async fn enable_constraints(&mut self) -> MigrateResult<()> {
        self.session.push("enable");
        Ok(())
    }

    async fn insert_row(
        &mut self,
        table: &TableDescriptor,
        values: &[DestValue],
    ) -> MigrateResult<()> {
        if let Some((failing, limit)) = &self.fail_after {
            if failing == &table.name && self.rows_for(failing).len() >= *limit {
                return Err(MigrateError::connection(
                    "Lost connection to MySQL server during query",
                    "Reconnect",
                ));
            }
        }

        if values.contains(&DestValue::Text("REJECT".to_string())) {
            return Err(MigrateError::row_rejected(
                &table.name,
                "Incorrect string value",
                Some("HY000".to_string()),
            ));
        }

        let key = (table.name.clone(), format!("{:?}", values.first()));
        if !self.keys.insert(key) {
            return Err(MigrateError::duplicate_key(
                &table.name,
                "Duplicate entry for key 'PRIMARY'",
            ));
        }

        self.rows.push((table.name.clone(), values.to_vec()));
        Ok(())
    }

    async fn commit(&mut self) -> MigrateResult<()> {
        self.session.push("commit");
        Ok(())
    }

    async fn has_unique_key(&mut self, _table: &str) -> MigrateResult<bool> {
        Ok(!self.without_unique_keys)
    }
}
