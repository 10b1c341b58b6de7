//! Ad-hoc query execution returning untyped rows, plus the user lookup.
//!
//! The SQL text is executed as given. Only the parameters are bound safely;
//! interpolating untrusted input into `sql` opens the door to injection.

use std::collections::HashMap;

use rusqlite::{Connection, Params, Statement};
use tracing::{debug, warn};

use crate::error::{DbError, Result};
use crate::value::Value;

/// One result row keyed by column name. A repeated column name keeps the
/// value of the right-most column.
pub type Row = HashMap<String, Value>;

const USER_ID_SQL: &str = "SELECT user_id FROM user WHERE username = ?1 LIMIT 2";

/// Runs `sql` with positional `params` and returns every row as a [`Row`].
///
/// Rows come back in the order SQLite produced them; no match yields an
/// empty vector.
pub fn query_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Row>> {
    debug!(sql, "running query");
    let mut stmt = conn.prepare(sql).map_err(|e| DbError::query(sql, e))?;
    let columns = column_names(&stmt)?;

    let mut rows = stmt.query(params).map_err(|e| DbError::query(sql, e))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(|e| DbError::query(sql, e))? {
        let index = result.len();
        result.push(decode_row(row, index, &columns)?);
    }
    debug!(rows = result.len(), "query finished");
    Ok(result)
}

/// Runs a data-modifying statement and returns the number of changed rows.
pub fn execute<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<usize> {
    debug!(sql, "executing statement");
    conn.execute(sql, params).map_err(|e| DbError::query(sql, e))
}

/// Looks up the id of the user named exactly `username`.
///
/// Returns `None` when no row matches, and also when the name is ambiguous.
pub fn get_user_id(conn: &Connection, username: &str) -> Result<Option<i64>> {
    let mut stmt = conn
        .prepare(USER_ID_SQL)
        .map_err(|e| DbError::query(USER_ID_SQL, e))?;
    let ids = stmt
        .query_map([username], |row| row.get::<_, i64>(0))
        .map_err(|e| DbError::query(USER_ID_SQL, e))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| DbError::query(USER_ID_SQL, e))?;

    match ids.as_slice() {
        [id] => Ok(Some(*id)),
        [] => Ok(None),
        _ => {
            warn!(username, "username matches more than one user");
            Ok(None)
        }
    }
}

fn column_names(stmt: &Statement<'_>) -> Result<Vec<String>> {
    (0..stmt.column_count())
        .map(|index| {
            stmt.column_name(index)
                .map(str::to_string)
                .map_err(|source| DbError::ColumnIntrospection { index, source })
        })
        .collect()
}

fn decode_row(row: &rusqlite::Row<'_>, index: usize, columns: &[String]) -> Result<Row> {
    let mut map = HashMap::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
        let value: Value = row.get(i).map_err(|source| DbError::RowDecode {
            row: index,
            column: name.clone(),
            source,
        })?;
        map.insert(name.clone(), value);
    }
    Ok(map)
}
