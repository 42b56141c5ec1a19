//! Startup error type for the engine binary.

use vanguard_core::ConfigError;
use vanguard_db::DbError;

/// Errors that can abort engine startup.
///
/// Anything past startup is absorbed inside the periodic tasks; only
/// configuration and schema initialization are allowed to be fatal.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Configuration failed to load or validate.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// Connecting to or migrating the record store failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying data layer error.
        #[from]
        source: DbError,
    },

    /// The working directory could not be determined.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
