//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the
//! underlying [`sqlx`] errors with context about which class of
//! operation failed.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `SQLite` operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Schema migration failed at startup.
    #[error("SQLite migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error (bad database URL).
    #[error("Configuration error: {0}")]
    Config(String),
}
