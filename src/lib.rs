//! SQLite bootstrap and ad-hoc query helpers for the minitwit feed.
//!
//! # Intention
//!
//! - Open the minitwit database with foreign keys enforced and apply its
//!   schema exactly once.
//! - Run arbitrary parameterized queries and hand back untyped rows.
//! - Resolve usernames to ids without overloading `0` as "not found".
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - The connection is always passed explicitly; there is no global handle.

pub mod config;
pub mod error;
pub mod query;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use config::SqliteConfig;
pub use error::{ConnectionFailure, DbError, Result};
pub use query::{execute, get_user_id, query_rows, Row};
pub use schema::{initialize_schema, initialize_schema_from_str, SchemaOutcome};
pub use sqlite::Database;
pub use value::Value;
