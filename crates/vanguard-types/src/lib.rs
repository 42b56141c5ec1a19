//! Shared type definitions for the Vanguard whitelist engine.
//!
//! This crate is the single source of truth for the schema shared
//! between the data layer, the engine, and the host adapter.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for host-supplied identifiers
//! - [`roster`] -- Roster snapshot schema with lock-flag normalization
//! - [`record`] -- The persisted per-player progress record

pub mod ids;
pub mod record;
pub mod roster;

// Re-export all public types at crate root for convenience.
pub use ids::{PlayerId, SquadId};
pub use record::ProgressRecord;
pub use roster::{LockFlag, QueryRequest, RosterEntry, RosterSnapshot, SquadRef};
