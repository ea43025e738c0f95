use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, trace, warn};

use crate::config::{lookup_sql, StoreConfig, DEFAULT_TABLE};
use crate::error::{LookupError, StoreError};
use crate::value::ParamValue;

/// Owner of one open connection to a parameter database.
///
/// The handle is move-only. Moving it transfers the connection, and the
/// connection is closed exactly once: when the current owner is dropped,
/// overwritten, or passed to [`ParamStore::close`].
#[derive(Debug)]
pub struct ParamStore {
    conn: Connection,
    lookup_sql: String,
    path: Option<PathBuf>,
}

impl ParamStore {
    /// Open (or create) the database file at `path`.
    ///
    /// Fails if the file cannot be opened or is not an SQLite database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(&StoreConfig::new(path))
    }

    pub fn open_with_config(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let open_err = |source| StoreError::Open {
            path: config.path.clone(),
            source,
        };

        let conn =
            Connection::open_with_flags(&config.path, config.open_flags()).map_err(open_err)?;
        conn.busy_timeout(config.busy_timeout()).map_err(open_err)?;
        // SQLite defers reading the header until the first statement.
        ensure_database(&conn).map_err(open_err)?;

        debug!(path = %config.path.display(), table = %config.table, "opened parameter store");
        Ok(Self {
            conn,
            lookup_sql: config.lookup_sql(),
            path: Some(config.path.clone()),
        })
    }

    /// An empty in-memory store, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Adopt an already open connection that reads from `parameters`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            lookup_sql: lookup_sql(DEFAULT_TABLE),
            path: None,
        }
    }

    /// File backing this store, `None` for in-memory or adopted connections.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The underlying connection. The store itself never writes through it.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Raw text stored under `key`.
    ///
    /// Returns `None` when no row matches and also when the query could not
    /// be prepared or run; use [`ParamStore::lookup_raw`] to tell them apart.
    /// Text that is not valid UTF-8 counts as a failed query.
    pub fn query_raw_value(&self, key: &str) -> Option<String> {
        self.lookup_raw(key).ok()
    }

    pub fn lookup_raw(&self, key: &str) -> Result<String, LookupError> {
        let query_err = |source| LookupError::Query {
            key: key.to_string(),
            source,
        };

        // Statement is finalized on drop, whichever way this returns.
        let mut stmt = self.conn.prepare(&self.lookup_sql).map_err(query_err)?;
        let value = stmt
            .query_row([key], |row| row.get::<_, Option<String>>(0))
            .optional()
            .map_err(query_err)?;

        value.flatten().ok_or_else(|| LookupError::NotFound {
            key: key.to_string(),
        })
    }

    /// Value under `key` parsed as `T`.
    ///
    /// Missing keys, failed queries and text that does not parse cleanly
    /// into `T` all come back as `None`.
    pub fn get_value<T: ParamValue>(&self, key: &str) -> Option<T> {
        self.lookup(key).ok()
    }

    /// Like [`ParamStore::get_value`], but says why no value was produced.
    pub fn lookup<T: ParamValue>(&self, key: &str) -> Result<T, LookupError> {
        let result = self.lookup_raw(key).and_then(|raw| {
            T::from_param(&raw).ok_or_else(|| LookupError::Parse {
                key: key.to_string(),
                raw,
                target: T::KIND,
            })
        });
        if let Err(err) = &result {
            trace!(key, error = %err, "parameter unavailable");
        }
        result
    }

    /// Close the connection now and report any failure.
    ///
    /// Dropping the store closes it too, silently.
    pub fn close(self) -> Result<(), StoreError> {
        let path = self.path;
        match self.conn.close() {
            Ok(()) => {
                debug!(path = ?path, "closed parameter store");
                Ok(())
            }
            Err((_conn, err)) => {
                warn!(path = ?path, error = %err, "failed to close parameter store");
                Err(StoreError::Close(err))
            }
        }
    }
}

fn ensure_database(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}
