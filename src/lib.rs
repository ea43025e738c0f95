//! Typed read-only access to SQLite-backed parameter tables for the Runar ecosystem.
//!
//! # Intention
//!
//! - Open one SQLite file holding a `parameters(key, value)` table.
//! - Return a single value per key, parsed into the type the caller asks for.
//!
//! # Architectural Boundaries
//!
//! - Only reading belongs here. Creating and populating the table is done by
//!   whatever tool produces the database file.
//! - Missing keys and unparseable values are `None`, never an error. The
//!   `lookup` family exposes the reason when a caller needs it.
//!
//! ```no_run
//! use param_store::ParamStore;
//!
//! # fn main() -> Result<(), param_store::StoreError> {
//! let store = ParamStore::open("params.db")?;
//! let retries = store.get_value::<i32>("max_retries").unwrap_or(3);
//! # let _ = retries;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod sqlite;
pub mod value;

pub use config::StoreConfig;
pub use error::{LookupError, StoreError};
pub use sqlite::ParamStore;
pub use value::{ParamKind, ParamValue};
