//! Progress record persistence.
//!
//! Every mutation here is a single atomic read-modify-write at the
//! store boundary: accrual is an upsert that increments in SQL, decay
//! is one clamped `UPDATE`. The accrual and decay tasks are scheduled
//! independently and may fire near-simultaneously on the same record;
//! because neither side ever writes a full record computed from a
//! stale read, no update can be silently lost.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use vanguard_types::{PlayerId, ProgressRecord};

use crate::error::DbError;

/// Result of one accrual applied to one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualOutcome {
    /// Score before this accrual (0 for a freshly created record).
    pub old_score: f64,
    /// Score after this accrual.
    pub new_score: f64,
}

/// Row shape returned by `SELECT` queries on the `progress` table.
#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    player_id: String,
    score: f64,
    last_progressed_at: DateTime<Utc>,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(row: ProgressRow) -> Self {
        Self {
            player_id: PlayerId::new(row.player_id),
            score: row.score,
            last_progressed_at: row.last_progressed_at,
        }
    }
}

/// Operations on the `progress` table.
pub struct ProgressStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProgressStore<'a> {
    /// Create a new progress store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `delta` to a player's score, creating the record on first
    /// accrual, and stamp `last_progressed_at`.
    ///
    /// The increment happens inside the upsert (`score = score +
    /// excluded.score`), and the preceding read of the old score shares
    /// the same transaction, so a concurrently firing decay tick can
    /// never be overwritten by a stale value.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the transaction fails.
    pub async fn accrue(
        &self,
        player_id: &PlayerId,
        delta: f64,
        now: DateTime<Utc>,
    ) -> Result<AccrualOutcome, DbError> {
        let mut tx = self.pool.begin().await?;

        let old_score: Option<f64> =
            sqlx::query_scalar(r"SELECT score FROM progress WHERE player_id = ?1")
                .bind(player_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        let old_score = old_score.unwrap_or(0.0);

        sqlx::query(
            r"INSERT INTO progress (player_id, score, last_progressed_at)
              VALUES (?1, ?2, ?3)
              ON CONFLICT (player_id) DO UPDATE SET
                score = score + excluded.score,
                last_progressed_at = excluded.last_progressed_at",
        )
        .bind(player_id.as_str())
        .bind(delta)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let outcome = AccrualOutcome {
            old_score,
            new_score: old_score + delta,
        };
        tracing::debug!(
            player = %player_id,
            old_score = outcome.old_score,
            new_score = outcome.new_score,
            "Accrued progress"
        );
        Ok(outcome)
    }

    /// Subtract `amount` (clamped at zero) from every record whose last
    /// accrual was strictly before `cutoff`. Returns the number of rows
    /// changed.
    ///
    /// Rows already at the floor are skipped entirely (no needless
    /// writes), and `last_progressed_at` is never touched by decay.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the update fails.
    pub async fn decay_inactive(
        &self,
        amount: f64,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE progress
              SET score = MAX(0, score - ?1)
              WHERE last_progressed_at < ?2 AND score > 0",
        )
        .bind(amount)
        .bind(cutoff)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fetch a single player's record, if one exists. Read-only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn get(&self, player_id: &PlayerId) -> Result<Option<ProgressRecord>, DbError> {
        let row = sqlx::query_as::<_, ProgressRow>(
            r"SELECT player_id, score, last_progressed_at
              FROM progress
              WHERE player_id = ?1",
        )
        .bind(player_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Fetch all records at or above `threshold` in the store's natural
    /// (insertion) return order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn qualifying(&self, threshold: f64) -> Result<Vec<ProgressRecord>, DbError> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            r"SELECT player_id, score, last_progressed_at
              FROM progress
              WHERE score >= ?1
              ORDER BY rowid",
        )
        .bind(threshold)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Total number of progress records (diagnostics only).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn count(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(r"SELECT COUNT(*) FROM progress")
            .fetch_one(self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
