//! Error types for the migrator.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Variants are split by how far they propagate: row-level failures are logged and
//! skipped by the batch stage, everything else ends the run.

use thiserror::Error;

/// MySQL error numbers reported for duplicate-key inserts.
const ER_DUP_ENTRY: u16 = 1062;
const ER_DUP_ENTRY_WITH_KEY_NAME: u16 = 1586;

/// MySQL error numbers that leave the session or its open transaction unusable.
const ER_SERVER_SHUTDOWN: u16 = 1053;
const ER_LOCK_DEADLOCK: u16 = 1213;
const ER_OPTION_PREVENTS_STATEMENT: u16 = 1290;
const ER_QUERY_INTERRUPTED: u16 = 1317;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Source database not found: {path}")]
    SourceNotFound { path: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Schema error: {message} (object: {object})")]
    Schema { message: String, object: String },

    #[error("Duplicate key in '{table}': {message}")]
    DuplicateKey { table: String, message: String },

    #[error("Row rejected by '{table}': {message}")]
    RowRejected {
        table: String,
        message: String,
        /// e.g., "22007" for an incorrect datetime value
        sql_state: Option<String>,
    },

    #[error("Failed to decode column '{column}' of '{table}': {message}")]
    Decode {
        table: String,
        column: String,
        message: String,
    },

    #[error("Migration cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MigrateError {
    /// Create a source-not-found error.
    pub fn source_not_found(path: impl Into<String>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            object: object.into(),
        }
    }

    /// Create a duplicate-key error.
    pub fn duplicate_key(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DuplicateKey {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a row rejection error with optional SQL state.
    pub fn row_rejected(
        table: impl Into<String>,
        message: impl Into<String>,
        sql_state: Option<String>,
    ) -> Self {
        Self::RowRejected {
            table: table.into(),
            message: message.into(),
            sql_state,
        }
    }

    /// Create a decode error.
    pub fn decode(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Decode {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::SourceNotFound { .. } => Some("Check --source / MIGRATE_SOURCE"),
            Self::Config { .. } => Some("Run with --help to see the accepted options"),
            _ => None,
        }
    }

    /// Failures confined to a single row; the batch stage skips the row and continues.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. } | Self::RowRejected { .. } | Self::Decode { .. }
        )
    }

    /// Failures that end the run.
    pub fn is_fatal(&self) -> bool {
        !self.is_row_level()
    }
}

/// Classify an error returned by a destination insert.
///
/// Database-reported errors are usually row-level (duplicate key or other
/// rejection). Server errors that abort the transaction or the session, and
/// anything at the transport or driver level, end the run.
pub fn classify_insert_error(table: &str, err: sqlx::Error) -> MigrateError {
    match err {
        sqlx::Error::Database(db_err) => {
            let number = db_err
                .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                .map(|e| e.number());
            classify_server_error(
                table,
                number,
                db_err.kind() == sqlx::error::ErrorKind::UniqueViolation,
                db_err.message(),
                db_err.code().map(|c| c.to_string()),
            )
        }
        sqlx::Error::Encode(e) => MigrateError::row_rejected(table, e.to_string(), None),
        other => MigrateError::from(other),
    }
}

/// Map a server-reported insert error to a row-level or fatal error.
fn classify_server_error(
    table: &str,
    number: Option<u16>,
    unique_violation: bool,
    message: &str,
    sql_state: Option<String>,
) -> MigrateError {
    match number {
        Some(n @ (ER_SERVER_SHUTDOWN | ER_QUERY_INTERRUPTED)) => MigrateError::connection(
            format!("{} (error {})", message, n),
            "The server stopped the session; rerun the migration once it is available",
        ),
        Some(ER_OPTION_PREVENTS_STATEMENT) => MigrateError::connection(
            format!("{} (error {})", message, ER_OPTION_PREVENTS_STATEMENT),
            "The destination refuses writes; check that it is not running read-only",
        ),
        Some(ER_LOCK_DEADLOCK) => MigrateError::connection(
            format!("{} (error {})", message, ER_LOCK_DEADLOCK),
            "The open transaction was rolled back; stop concurrent writers and rerun",
        ),
        Some(ER_DUP_ENTRY | ER_DUP_ENTRY_WITH_KEY_NAME) => {
            MigrateError::duplicate_key(table, message)
        }
        _ if unique_violation => MigrateError::duplicate_key(table, message),
        _ => MigrateError::row_rejected(table, message, sql_state),
    }
}

/// Convert sqlx errors to MigrateError.
impl From<sqlx::Error> for MigrateError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => MigrateError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => MigrateError::connection(
                format!(
                    "{}{}",
                    db_err.message(),
                    db_err
                        .code()
                        .map(|c| format!(" (SQLSTATE: {})", c))
                        .unwrap_or_default()
                ),
                "Check that the referenced objects exist and the account has access",
            ),
            sqlx::Error::PoolTimedOut => MigrateError::connection(
                "Timed out acquiring a connection",
                "Check that the database is reachable",
            ),
            sqlx::Error::PoolClosed => {
                MigrateError::connection("Connection pool is closed", "Restart the migration")
            }
            sqlx::Error::Io(io_err) => MigrateError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => MigrateError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => MigrateError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                MigrateError::schema(format!("Column not found: {}", col), col)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                MigrateError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                MigrateError::internal(format!("Decode error: {}", source))
            }
            sqlx::Error::WorkerCrashed => MigrateError::connection(
                "Database worker crashed",
                "Restart the migration",
            ),
            _ => MigrateError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrateError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = MigrateError::connection("refused", "Check the port");
        assert_eq!(err.suggestion(), Some("Check the port"));
        assert!(MigrateError::internal("x").suggestion().is_none());
    }

    #[test]
    fn test_row_level_classification() {
        assert!(MigrateError::duplicate_key("accounts", "Duplicate entry '1'").is_row_level());
        assert!(MigrateError::row_rejected("accounts", "bad date", None).is_row_level());
        assert!(MigrateError::decode("accounts", "created_at", "bad utf8").is_row_level());
        assert!(MigrateError::connection("lost", "retry").is_fatal());
        assert!(MigrateError::Cancelled.is_fatal());
        assert!(MigrateError::source_not_found("missing.db").is_fatal());
    }

    #[test]
    fn test_transport_errors_are_fatal_on_insert() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = classify_insert_error("accounts", sqlx::Error::Io(io));
        assert!(err.is_fatal());
        assert!(matches!(err, MigrateError::Connection { .. }));

        let err = classify_insert_error("accounts", sqlx::Error::PoolClosed);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_session_ending_server_errors_are_fatal() {
        for number in [1053, 1213, 1290, 1317] {
            let err = classify_server_error("accounts", Some(number), false, "aborted", None);
            assert!(matches!(err, MigrateError::Connection { .. }), "{number}: {err:?}");
            assert!(err.is_fatal());
            assert!(err.to_string().contains(&number.to_string()));
        }
    }

    #[test]
    fn test_row_scoped_server_errors() {
        let err = classify_server_error("accounts", Some(1062), false, "Duplicate entry '1'", None);
        assert!(matches!(err, MigrateError::DuplicateKey { .. }));

        let err = classify_server_error("accounts", None, true, "unique", None);
        assert!(matches!(err, MigrateError::DuplicateKey { .. }));

        let err = classify_server_error(
            "accounts",
            Some(1292),
            false,
            "Incorrect datetime value",
            Some("22007".to_string()),
        );
        match err {
            MigrateError::RowRejected { sql_state, .. } => {
                assert_eq!(sql_state.as_deref(), Some("22007"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_source_not_found_message() {
        let err = MigrateError::source_not_found("/tmp/nope.db");
        assert_eq!(err.to_string(), "Source database not found: /tmp/nope.db");
    }
}
