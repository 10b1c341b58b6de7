//! Connection and bootstrap settings.

use std::path::PathBuf;
use std::time::Duration;

/// Default location of the minitwit database file.
pub const DEFAULT_DB_PATH: &str = "/tmp/minitwit.db";
/// Default schema resource, resolved against the working directory.
pub const DEFAULT_SCHEMA_PATH: &str = "schema.sql";
/// How long a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite configuration for the minitwit database
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Path to the DDL resource applied at startup
    pub schema_path: PathBuf,
    pub busy_timeout: Duration,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl SqliteConfig {
    /// Create a config for the given database and schema paths
    pub fn new(db_path: impl Into<PathBuf>, schema_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            schema_path: schema_path.into(),
            ..Self::default()
        }
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_minitwit_files() {
        let config = SqliteConfig::default();
        assert_eq!(config.db_path, PathBuf::from("/tmp/minitwit.db"));
        assert_eq!(config.schema_path, PathBuf::from("schema.sql"));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = SqliteConfig::new("a.db", "a.sql")
            .with_db_path("b.db")
            .with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.db_path, PathBuf::from("b.db"));
        assert_eq!(config.schema_path, PathBuf::from("a.sql"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }
}
