//! Engine-level error type.
//!
//! Only startup and materialization surface errors to callers; the
//! periodic tick bodies absorb and log their own failures so nothing
//! propagates into the host.

use crate::config::ConfigError;
use vanguard_db::DbError;

/// Errors that can occur while starting or running the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration failed to load or validate.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A record store operation failed.
    #[error("store error: {source}")]
    Db {
        /// The underlying data layer error.
        #[from]
        source: DbError,
    },

    /// Writing the whitelist artifact failed.
    #[error("whitelist I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
