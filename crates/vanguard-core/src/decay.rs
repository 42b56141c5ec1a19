//! Decay engine: erodes the score of players who stopped leading.
//!
//! Runs on its own cadence, independent of sampling. A decay tick is a
//! population-gated, idle-gated, clamped reduction:
//!
//! - if fewer than `min_players` are on the server, the whole tick is
//!   a no-op (seeding nights should not erase anyone's progress);
//! - only records whose last accrual is older than `after_hours` are
//!   touched;
//! - the reduction is hour-normalized (`decay_per_hour *
//!   interval_seconds / 3600`), clamps at zero, and never moves
//!   `last_progressed_at`.
//!
//! Decay may race with accrual on the same record; both sides are
//! atomic increments at the store, so interleaving is safe.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use vanguard_db::{Database, DbError, ProgressStore};

use crate::config::DecayConfig;

/// The decay engine. One instance lives for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct DecayEngine {
    db: Database,
    config: DecayConfig,
}

impl DecayEngine {
    /// Create a decay engine over the given store.
    pub const fn new(db: Database, config: DecayConfig) -> Self {
        Self { db, config }
    }

    /// Score removed from each stale record per decay tick.
    pub fn amount_per_tick(&self) -> f64 {
        self.config.decay_per_hour * f64::from(self.config.interval_seconds) / 3600.0
    }

    /// Process one decay tick. Returns the number of records reduced.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store update fails; the caller logs
    /// and waits for the next tick (no retry loop).
    pub async fn run_tick(
        &self,
        live_player_count: usize,
        now: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        if live_player_count < self.config.min_players {
            debug!(
                live_player_count,
                min_players = self.config.min_players,
                "Server below decay population gate; skipping decay tick"
            );
            return Ok(0);
        }

        let idle_window = Duration::seconds((self.config.after_hours * 3600.0) as i64);
        let cutoff = now - idle_window;

        let store = ProgressStore::new(self.db.pool());
        let decayed = store.decay_inactive(self.amount_per_tick(), cutoff).await?;

        debug!(decayed, "Decay tick complete");
        Ok(decayed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use vanguard_db::ProgressStore;
    use vanguard_types::PlayerId;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).single().unwrap()
    }

    fn config() -> DecayConfig {
        DecayConfig {
            decay_per_hour: 1.0,
            interval_seconds: 3600,
            after_hours: 72.0,
            min_players: 40,
        }
    }

    async fn engine_with_record(score: f64, accrued_at: DateTime<Utc>) -> DecayEngine {
        let db = Database::connect_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        ProgressStore::new(db.pool())
            .accrue(&PlayerId::new("idle"), score, accrued_at)
            .await
            .unwrap();
        DecayEngine::new(db, config())
    }

    async fn score_of(engine: &DecayEngine) -> f64 {
        ProgressStore::new(engine.db.pool())
            .get(&PlayerId::new("idle"))
            .await
            .unwrap()
            .unwrap()
            .score
    }

    #[tokio::test]
    async fn population_gate_blocks_decay_regardless_of_idle_time() {
        // Record is a week stale, but only 39 players are on.
        let engine = engine_with_record(50.0, at(1, 0)).await;
        let decayed = engine.run_tick(39, at(8, 0)).await.unwrap();

        assert_eq!(decayed, 0);
        assert!((score_of(&engine).await - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn fresh_record_is_not_decayed() {
        // 48h idle < 72h window.
        let engine = engine_with_record(50.0, at(1, 0)).await;
        let decayed = engine.run_tick(64, at(3, 0)).await.unwrap();

        assert_eq!(decayed, 0);
        assert!((score_of(&engine).await - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn stale_record_decays_by_hour_normalized_amount() {
        // 1.0/hour over a 3600s tick: exactly 1 point.
        let engine = engine_with_record(50.0, at(1, 0)).await;
        let decayed = engine.run_tick(64, at(8, 0)).await.unwrap();

        assert_eq!(decayed, 1);
        assert!((score_of(&engine).await - 49.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn decay_clamps_at_zero() {
        let engine = engine_with_record(0.3, at(1, 0)).await;
        engine.run_tick(64, at(8, 0)).await.unwrap();
        assert!(score_of(&engine).await.abs() < 1e-9);

        // Next tick finds the record at the floor and writes nothing.
        let decayed = engine.run_tick(64, at(8, 1)).await.unwrap();
        assert_eq!(decayed, 0);
    }

    #[tokio::test]
    async fn decay_leaves_timestamp_alone() {
        let engine = engine_with_record(50.0, at(1, 0)).await;
        engine.run_tick(64, at(8, 0)).await.unwrap();

        let record = ProgressStore::new(engine.db.pool())
            .get(&PlayerId::new("idle"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.last_progressed_at, at(1, 0));
    }
}
