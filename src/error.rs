//! Error taxonomy for database bootstrap and query execution.

use std::path::PathBuf;

use thiserror::Error;

/// Why opening or configuring a connection failed.
#[derive(Debug, Error)]
pub enum ConnectionFailure {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// Foreign-key enforcement did not stick after the pragma ran.
    #[error("foreign key enforcement could not be enabled")]
    ForeignKeysDisabled,
    /// SQLite takes the busy timeout as an `i32` of milliseconds.
    #[error("busy timeout of {millis} ms exceeds the {} ms limit", i32::MAX)]
    BusyTimeoutTooLarge { millis: u128 },
}

/// Errors surfaced by every database operation in this crate.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be opened or configured for the session.
    #[error("cannot open or configure database at {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: ConnectionFailure,
    },
    /// The schema resource is missing or unreadable.
    #[error("cannot read schema resource {}: {source}", .path.display())]
    ResourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The schema batch failed to apply.
    #[error("failed to apply schema: {source}")]
    SchemaApply {
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or running a statement failed.
    #[error("query failed ({sql}): {source}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Result column metadata could not be read.
    #[error("cannot read name of column {index}: {source}")]
    ColumnIntrospection {
        index: usize,
        #[source]
        source: rusqlite::Error,
    },
    /// A value in a result row could not be captured.
    #[error("cannot decode column {column} of row {row}: {source}")]
    RowDecode {
        row: usize,
        column: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl DbError {
    pub(crate) fn connection(path: &str, failure: impl Into<ConnectionFailure>) -> Self {
        DbError::Connection {
            path: path.to_string(),
            source: failure.into(),
        }
    }

    pub(crate) fn query(sql: &str, source: rusqlite::Error) -> Self {
        DbError::Query {
            sql: sql.to_string(),
            source,
        }
    }

    /// True for failures that happen while opening or configuring the connection.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::Connection { .. })
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
