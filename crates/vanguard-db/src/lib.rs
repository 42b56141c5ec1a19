//! Data layer for the Vanguard whitelist engine.
//!
//! `SQLite` holds one row per player ever observed leading a squad:
//! their accumulated score and the instant of their last accrual. The
//! store's contract is that every mutation is atomic per record, so
//! the independently scheduled accrual and decay tasks can interleave
//! freely without losing updates.
//!
//! # Modules
//!
//! - [`sqlite`] -- Connection pool wrapper and embedded migrations
//! - [`progress_store`] -- Atomic operations on the `progress` table
//! - [`error`] -- The [`DbError`] type

pub mod error;
pub mod progress_store;
pub mod sqlite;

pub use error::DbError;
pub use progress_store::{AccrualOutcome, ProgressStore};
pub use sqlite::{Database, DatabaseConfig};
