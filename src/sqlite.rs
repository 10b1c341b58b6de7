use std::path::Path;

use rusqlite::{Connection, Params};
use tracing::{debug, info};

use crate::config::SqliteConfig;
use crate::error::{ConnectionFailure, DbError, Result};
use crate::query::{self, Row};
use crate::schema::{self, SchemaOutcome};

/// Owned handle to the minitwit database.
///
/// The connection is closed when the handle is dropped, or explicitly via
/// [`Database::close`]. A `Database` is not meant to be shared: callers that
/// need it from several threads must wrap it in their own lock.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file named in `config` and
    /// configures the session: busy timeout and foreign-key enforcement.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let path = config.db_path.display().to_string();
        // rusqlite panics on timeouts that overflow an i32 of milliseconds.
        let millis = config.busy_timeout.as_millis();
        if millis > i32::MAX as u128 {
            return Err(DbError::connection(
                &path,
                ConnectionFailure::BusyTimeoutTooLarge { millis },
            ));
        }

        info!(path = %path, "opening sqlite database");
        let conn =
            Connection::open(&config.db_path).map_err(|e| DbError::connection(&path, e))?;
        conn.busy_timeout(config.busy_timeout)
            .map_err(|e| DbError::connection(&path, e))?;
        schema::enable_foreign_keys(&conn)?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database with foreign keys enabled.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::connection(":memory:", e))?;
        schema::enable_foreign_keys(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Applies the schema file at `schema_path` unless it was applied before.
    pub fn initialize_schema(&self, schema_path: impl AsRef<Path>) -> Result<SchemaOutcome> {
        schema::initialize_schema(&self.conn, schema_path)
    }

    pub fn initialize_schema_from_str(&self, sql: &str) -> Result<SchemaOutcome> {
        schema::initialize_schema_from_str(&self.conn, sql)
    }

    pub fn query_rows<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Row>> {
        query::query_rows(&self.conn, sql, params)
    }

    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        query::execute(&self.conn, sql, params)
    }

    pub fn user_id(&self, username: &str) -> Result<Option<i64>> {
        query::get_user_id(&self.conn, username)
    }

    /// Closes the connection, reporting any error SQLite raises while doing so.
    pub fn close(self) -> Result<()> {
        let path = self.conn.path().unwrap_or(":memory:").to_string();
        debug!(path = %path, "closing sqlite database");
        self.conn
            .close()
            .map_err(|(_, e)| DbError::connection(&path, e))
    }
}
