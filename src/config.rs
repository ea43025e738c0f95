use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::OpenFlags;
use serde::Deserialize;

use crate::error::StoreError;

pub const DEFAULT_TABLE: &str = "parameters";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Parameter store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Open the file read-only; a missing file is then an open error
    #[serde(default)]
    pub read_only: bool,
    /// Create the file when it does not exist (ignored when `read_only`)
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
    /// How long a lookup waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Table holding the `key` and `value` columns
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_create_if_missing() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl StoreConfig {
    /// Create a config for `path` with SQLite's usual open-or-create behavior
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            read_only: false,
            create_if_missing: default_create_if_missing(),
            busy_timeout_ms: default_busy_timeout_ms(),
            table: default_table(),
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_busy_timeout_ms(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = millis;
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Check the config before any file is touched.
    ///
    /// The table name ends up inside the lookup statement, so it must be a
    /// bare identifier.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.path.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig(
                "database path must not be empty".to_string(),
            ));
        }
        if !is_identifier(&self.table) {
            return Err(StoreError::InvalidConfig(format!(
                "table name {:?} is not a plain identifier",
                self.table
            )));
        }
        Ok(())
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.read_only {
            base | OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if self.create_if_missing {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE
        }
    }

    pub(crate) fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub(crate) fn lookup_sql(&self) -> String {
        lookup_sql(&self.table)
    }
}

/// The cast hands back SQLite's own text form for INTEGER and REAL values;
/// NULL stays NULL.
pub(crate) fn lookup_sql(table: &str) -> String {
    format!("SELECT CAST(value AS TEXT) FROM {table} WHERE key = ?1 LIMIT 1;")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("params.db");
        assert_eq!(config.path, PathBuf::from("params.db"));
        assert!(!config.read_only);
        assert!(config.create_if_missing);
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.table, "parameters");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.lookup_sql(),
            "SELECT CAST(value AS TEXT) FROM parameters WHERE key = ?1 LIMIT 1;"
        );
    }

    #[test]
    fn test_open_flags() {
        let flags = StoreConfig::new("a.db").open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_WRITE));

        let flags = StoreConfig::new("a.db").with_read_only(true).open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));

        let flags = StoreConfig::new("a.db")
            .with_create_if_missing(false)
            .open_flags();
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
    }

    #[test]
    fn test_validate_rejects_bad_table() {
        for table in ["", "1params", "params; DROP TABLE x", "a-b", "\"quoted\""] {
            let config = StoreConfig::new("a.db").with_table(table);
            assert!(
                matches!(config.validate(), Err(StoreError::InvalidConfig(_))),
                "{table:?} should be rejected"
            );
        }
        assert!(StoreConfig::new("a.db").with_table("_cfg2").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        assert!(matches!(
            StoreConfig::new("").validate(),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: StoreConfig =
            toml::from_str(r#"path = "/var/lib/runar/params.db""#).unwrap();
        assert_eq!(config, StoreConfig::new("/var/lib/runar/params.db"));

        let config: StoreConfig = toml::from_str(
            r#"
            path = "params.db"
            read_only = true
            busy_timeout_ms = 250
            table = "settings"
            "#,
        )
        .unwrap();
        assert!(config.read_only);
        assert_eq!(config.busy_timeout_ms, 250);
        assert_eq!(config.table, "settings");
        assert!(config.create_if_missing);
    }
}
