//! Query service: a player asks how far along they are.
//!
//! Strictly read-only; answering a query never moves a score or a
//! timestamp. The three reply cases are contractual (no record yet,
//! in progress, qualified with rank); the reply text itself is
//! presentation.

use std::cmp::Ordering;

use tracing::warn;
use vanguard_db::{Database, DbError, ProgressStore};
use vanguard_types::{PlayerId, ProgressRecord, QueryRequest};

use crate::source::NotificationSink;

/// Outcome of a progress query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressReply {
    /// The player has never accrued progress.
    NoProgress,
    /// Below the threshold.
    InProgress {
        /// Rounded percentage of the threshold reached.
        percent: u32,
    },
    /// At or above the threshold.
    Qualified {
        /// Rounded percentage of the threshold reached (can exceed 100).
        percent: u32,
        /// 1-based position among qualifying players, best score first.
        rank: usize,
        /// Total number of qualifying players.
        total: usize,
    },
}

/// The query service. One instance lives for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct QueryService {
    db: Database,
    threshold: f64,
}

impl QueryService {
    /// Create a query service over the given store.
    pub const fn new(db: Database, threshold: f64) -> Self {
        Self { db, threshold }
    }

    /// Look up one player's progress.
    ///
    /// Rank is the 1-based position when all qualifying records are
    /// sorted by descending score; the sort is stable, so ties keep
    /// the store's natural return order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store read fails.
    pub async fn progress_of(&self, player_id: &PlayerId) -> Result<ProgressReply, DbError> {
        let store = ProgressStore::new(self.db.pool());

        let Some(record) = store.get(player_id).await? else {
            return Ok(ProgressReply::NoProgress);
        };

        let percent = percent_of(record.score, self.threshold);
        if record.score < self.threshold {
            return Ok(ProgressReply::InProgress { percent });
        }

        let mut qualifying = store.qualifying(self.threshold).await?;
        qualifying.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
        });
        let total = qualifying.len();
        let rank = qualifying
            .iter()
            .position(|r: &ProgressRecord| r.player_id == record.player_id)
            .map_or(total, |index| index + 1);

        Ok(ProgressReply::Qualified {
            percent,
            rank,
            total,
        })
    }

    /// Answer a drained chat query through the sink.
    ///
    /// Internal failures are logged and swallowed: a player whose query
    /// fails sees nothing rather than an error dump.
    pub async fn answer<N: NotificationSink>(&self, request: &QueryRequest, sink: &N) {
        let reply = match self.progress_of(&request.player_id).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(player = %request.player_id, %error, "Progress query failed");
                return;
            }
        };

        let text = render_reply(&request.player_name, reply);
        if let Err(error) = sink.notify(&request.player_id, &text).await {
            warn!(player = %request.player_id, %error, "Progress reply delivery failed");
        }
    }
}

/// Rounded percentage of the threshold a score represents.
fn percent_of(score: f64, threshold: f64) -> u32 {
    (100.0 * score / threshold).round().max(0.0) as u32
}

/// Format the multi-line chat reply for a query outcome.
pub fn render_reply(player_name: &str, reply: ProgressReply) -> String {
    match reply {
        ProgressReply::NoProgress => format!(
            "{player_name}, you have no leadership progress yet.\n\
             Lead a full squad to start earning reserve whitelist time."
        ),
        ProgressReply::InProgress { percent } => format!(
            "{player_name}, your reserve whitelist progress:\n\
             Progress: {percent}%"
        ),
        ProgressReply::Qualified {
            percent,
            rank,
            total,
        } => format!(
            "{player_name}, you are on the reserve whitelist.\n\
             Progress: {percent}%\n\
             Rank: {rank} of {total}"
        ),
    }
}
