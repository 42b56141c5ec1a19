//! Accrual engine: converts sampled leadership time into score.
//!
//! Invoked once per sampling tick with the current roster snapshot.
//! The award is hour-normalized and applied proportionally per tick
//! (`progress_per_hour * tick_seconds / 3600`); a skipped tick's
//! credit is simply lost, never backfilled from wall-clock gaps.
//!
//! Milestone notifications fire when an accrual moves a score across a
//! 10-point band boundary, and stop permanently once the player has
//! reached the threshold. The band is 10 points of score, not 10% of
//! the threshold; at non-default thresholds the cadence is therefore
//! not a clean percentage, which matches the reference behavior.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use vanguard_db::{AccrualOutcome, Database, ProgressStore};
use vanguard_types::RosterSnapshot;

use crate::config::ProgressConfig;
use crate::eligibility::eligible_leaders;
use crate::source::NotificationSink;

/// Width of one milestone band in score points.
const MILESTONE_BAND: f64 = 10.0;

/// Summary of one sampling tick's execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Leaders that passed the eligibility filter.
    pub eligible: usize,
    /// Leaders whose accrual was persisted.
    pub accrued: usize,
    /// Milestone notifications delivered.
    pub notified: usize,
}

/// The accrual engine. One instance lives for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct AccrualEngine {
    db: Database,
    config: ProgressConfig,
}

impl AccrualEngine {
    /// Create an accrual engine over the given store.
    pub const fn new(db: Database, config: ProgressConfig) -> Self {
        Self { db, config }
    }

    /// Score awarded to each eligible leader per sampling tick.
    pub fn delta_per_tick(&self) -> f64 {
        self.config.progress_per_hour * f64::from(self.config.sample_interval_seconds) / 3600.0
    }

    /// Process one sampling tick.
    ///
    /// Each eligible leader is handled independently: a store failure
    /// for one leader drops that leader's credit for this tick and is
    /// logged, but never aborts the rest. Notification failures are
    /// likewise absorbed.
    pub async fn run_tick<N: NotificationSink>(
        &self,
        snapshot: &RosterSnapshot,
        now: DateTime<Utc>,
        sink: &N,
    ) -> TickSummary {
        let leaders = eligible_leaders(snapshot, &self.config);
        let delta = self.delta_per_tick();
        let threshold = f64::from(self.config.threshold);

        let mut summary = TickSummary {
            eligible: leaders.len(),
            ..TickSummary::default()
        };

        let store = ProgressStore::new(self.db.pool());
        for leader in leaders {
            let outcome = match store.accrue(&leader.id, delta, now).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(
                        player = %leader.id,
                        %error,
                        "Accrual failed; dropping this tick's credit"
                    );
                    continue;
                }
            };
            summary.accrued += 1;

            let Some(message) = milestone_message(outcome, threshold) else {
                continue;
            };
            match sink.notify(&leader.id, &message).await {
                Ok(()) => summary.notified += 1,
                Err(error) => {
                    warn!(player = %leader.id, %error, "Milestone notification failed");
                }
            }
        }

        debug!(
            eligible = summary.eligible,
            accrued = summary.accrued,
            notified = summary.notified,
            "Sampling tick complete"
        );
        summary
    }
}

/// Milestone band index of a score.
fn band(score: f64) -> i64 {
    (score / MILESTONE_BAND).floor() as i64
}

/// Decide whether this accrual warrants a notification, and build it.
///
/// Fires only when the score crossed into a new 10-point band AND the
/// player had not already reached the threshold before this update.
/// Once qualified, players are never messaged again.
fn milestone_message(outcome: AccrualOutcome, threshold: f64) -> Option<String> {
    if outcome.old_score >= threshold {
        return None;
    }
    if band(outcome.old_score) == band(outcome.new_score) {
        return None;
    }

    if outcome.new_score >= threshold {
        Some("You are now on the reserve whitelist. Thanks for leading!".to_owned())
    } else {
        let percent = (100.0 * outcome.new_score / threshold).round();
        Some(format!(
            "Leadership progress: {percent:.0}% of the way to the reserve whitelist."
        ))
    }
}
