//! Persisted progress state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// One player's persisted progress toward the reserve whitelist.
///
/// Invariants maintained by the store:
///
/// - `score` is never negative (decay clamps at zero).
/// - Exactly one record exists per player; the first accrual creates it.
/// - `last_progressed_at` only moves forward, and only on accrual.
///   Decay and reads never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// The player this record belongs to.
    pub player_id: PlayerId,
    /// Accumulated progress. Fractional internally; compared against an
    /// integer threshold.
    pub score: f64,
    /// Instant of the most recent accrual event.
    pub last_progressed_at: DateTime<Utc>,
}
