use std::path::PathBuf;

use thiserror::Error;

use crate::value::ParamKind;

/// Hard failures: the store could not be opened, configured or closed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open database {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("cannot close database: {0}")]
    Close(#[source] rusqlite::Error),
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
}

/// Why a lookup produced no value.
///
/// `ParamStore::get_value` folds all of these into `None`.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no parameter named {key:?}")]
    NotFound { key: String },
    #[error("query for parameter {key:?} failed: {source}")]
    Query {
        key: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("parameter {key:?} holds {raw:?}, which is not a valid {target}")]
    Parse {
        key: String,
        raw: String,
        target: ParamKind,
    },
}

impl LookupError {
    pub fn key(&self) -> &str {
        match self {
            LookupError::NotFound { key }
            | LookupError::Query { key, .. }
            | LookupError::Parse { key, .. } => key,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}
