//! Schema bootstrap: foreign-key enforcement plus one-shot DDL application.
//!
//! The DDL resource is applied inside a single transaction together with a
//! marker written to `PRAGMA user_version`. A database carrying the marker is
//! left untouched on later runs, so initialization can run at every startup
//! even with DDL that is not written as `CREATE ... IF NOT EXISTS`. The flip
//! side is that later edits to the resource never reach a database that
//! already carries the marker; evolving an existing database needs its own
//! migration step.
//! Because of the enclosing transaction the resource must not issue its own
//! `BEGIN`/`COMMIT`.

use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{ConnectionFailure, DbError, Result};

/// Value stored in `PRAGMA user_version` once the schema has been applied.
pub const SCHEMA_MARKER: u32 = 1;

/// What `initialize_schema` did to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The DDL batch ran and the marker was recorded.
    Applied,
    /// The marker was already present; nothing was executed. Changes made to
    /// the schema resource since the first run are not applied.
    AlreadyInitialized,
}

/// Turns on foreign-key enforcement for this connection.
///
/// SQLite does not persist this setting in the file, so every new
/// connection has to run it.
pub fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    let path = conn.path().unwrap_or(":memory:");
    let connection_error = |source: rusqlite::Error| DbError::connection(path, source);
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(connection_error)?;
    // The pragma is silently ignored inside a transaction or on builds without FK support.
    let enabled: bool = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .map_err(connection_error)?;
    if !enabled {
        return Err(DbError::connection(path, ConnectionFailure::ForeignKeysDisabled));
    }
    debug!("foreign key enforcement enabled");
    Ok(())
}

/// Reads the DDL resource at `path`.
pub fn read_schema(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| DbError::ResourceRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Enables foreign keys and applies the schema file at `schema_path`.
///
/// The file is read before anything is sent to the database, so a missing
/// resource leaves the database exactly as it was.
pub fn initialize_schema(
    conn: &Connection,
    schema_path: impl AsRef<Path>,
) -> Result<SchemaOutcome> {
    let schema_path = schema_path.as_ref();
    let sql = read_schema(schema_path)?;
    debug!(path = %schema_path.display(), bytes = sql.len(), "loaded schema resource");
    initialize_schema_from_str(conn, &sql)
}

/// Same as [`initialize_schema`] for DDL that is already in memory.
pub fn initialize_schema_from_str(conn: &Connection, sql: &str) -> Result<SchemaOutcome> {
    enable_foreign_keys(conn)?;

    if schema_version(conn)? >= SCHEMA_MARKER {
        info!("schema already initialized, skipping resource");
        return Ok(SchemaOutcome::AlreadyInitialized);
    }

    let apply_error = |source| DbError::SchemaApply { source };
    // Rolled back on drop if anything below fails.
    let tx = conn.unchecked_transaction().map_err(apply_error)?;
    tx.execute_batch(sql).map_err(apply_error)?;
    tx.pragma_update(None, "user_version", SCHEMA_MARKER)
        .map_err(apply_error)?;
    tx.commit().map_err(apply_error)?;

    info!("schema applied");
    Ok(SchemaOutcome::Applied)
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|source| DbError::SchemaApply { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = "CREATE TABLE user (
        user_id INTEGER PRIMARY KEY,
        username TEXT NOT NULL
    );";

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn applies_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        let outcome = initialize_schema_from_str(&conn, USERS).unwrap();
        assert_eq!(outcome, SchemaOutcome::Applied);
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_MARKER);
        assert_eq!(table_count(&conn), 1);
    }

    #[test]
    fn second_run_is_skipped() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema_from_str(&conn, USERS).unwrap();
        conn.execute("INSERT INTO user (username) VALUES ('alice')", [])
            .unwrap();

        let outcome = initialize_schema_from_str(&conn, USERS).unwrap();
        assert_eq!(outcome, SchemaOutcome::AlreadyInitialized);
        let users: i64 = conn
            .query_row("SELECT count(*) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 1);
    }

    #[test]
    fn edited_schema_is_not_applied_to_initialized_db() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema_from_str(&conn, USERS).unwrap();

        let extended = format!("{USERS}\nCREATE TABLE message (message_id INTEGER PRIMARY KEY);");
        let outcome = initialize_schema_from_str(&conn, &extended).unwrap();
        assert_eq!(outcome, SchemaOutcome::AlreadyInitialized);
        assert_eq!(table_count(&conn), 1);
    }

    #[test]
    fn failing_batch_leaves_nothing_behind() {
        let conn = Connection::open_in_memory().unwrap();
        let broken = format!("{USERS}\nCREATE TABLE oops (;");
        let err = initialize_schema_from_str(&conn, &broken).unwrap_err();
        assert!(matches!(err, DbError::SchemaApply { .. }));
        assert_eq!(table_count(&conn), 0);
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema_from_str(
            &conn,
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (parent_id INTEGER REFERENCES parent(id));",
        )
        .unwrap();
        let result = conn.execute("INSERT INTO child (parent_id) VALUES (42)", []);
        assert!(result.is_err());
    }

    #[test]
    fn missing_resource_is_a_read_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = initialize_schema(&conn, "/nonexistent/schema.sql").unwrap_err();
        assert!(matches!(err, DbError::ResourceRead { .. }));
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }
}
