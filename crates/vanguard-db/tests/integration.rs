//! Integration tests for the `vanguard-db` data layer.
//!
//! All tests run against an in-memory `SQLite` database, so no external
//! services are required.

// Test code panics on failure by design.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::missing_panics_doc
)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use vanguard_db::{Database, ProgressStore};
use vanguard_types::PlayerId;

/// Connect to a fresh in-memory database with the schema applied.
async fn setup() -> Database {
    let db = Database::connect_in_memory()
        .await
        .expect("in-memory connect failed");
    db.run_migrations().await.expect("migrations failed");
    db
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn accrue_creates_record_seeded_at_delta() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());
    let player = PlayerId::new("p1");

    let outcome = store.accrue(&player, 0.5, at(12, 0)).await.unwrap();
    assert_close(outcome.old_score, 0.0);
    assert_close(outcome.new_score, 0.5);

    let record = store.get(&player).await.unwrap().expect("record exists");
    assert_close(record.score, 0.5);
    assert_eq!(record.last_progressed_at, at(12, 0));
}

#[tokio::test]
async fn accrue_is_additive_and_advances_timestamp() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());
    let player = PlayerId::new("p1");

    store.accrue(&player, 1.0, at(12, 0)).await.unwrap();
    let outcome = store.accrue(&player, 2.5, at(12, 1)).await.unwrap();

    assert_close(outcome.old_score, 1.0);
    assert_close(outcome.new_score, 3.5);

    let record = store.get(&player).await.unwrap().unwrap();
    assert_close(record.score, 3.5);
    assert_eq!(record.last_progressed_at, at(12, 1));
}

#[tokio::test]
async fn concurrent_accruals_all_land() {
    let db = setup().await;
    let player = PlayerId::new("p1");

    // Fire several accruals at once; each is an atomic SQL increment,
    // so the total must be the exact sum regardless of interleaving.
    let store = ProgressStore::new(db.pool());
    let (a, b, c) = tokio::join!(
        store.accrue(&player, 0.25, at(12, 0)),
        store.accrue(&player, 0.25, at(12, 0)),
        store.accrue(&player, 0.25, at(12, 0)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let record = store.get(&player).await.unwrap().unwrap();
    assert_close(record.score, 0.75);
}

#[tokio::test]
async fn decay_reduces_only_stale_records() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());

    store
        .accrue(&PlayerId::new("stale"), 10.0, at(1, 0))
        .await
        .unwrap();
    store
        .accrue(&PlayerId::new("fresh"), 10.0, at(12, 0))
        .await
        .unwrap();

    let decayed = store.decay_inactive(2.0, at(6, 0)).await.unwrap();
    assert_eq!(decayed, 1);

    let stale = store.get(&PlayerId::new("stale")).await.unwrap().unwrap();
    assert_close(stale.score, 8.0);

    let fresh = store.get(&PlayerId::new("fresh")).await.unwrap().unwrap();
    assert_close(fresh.score, 10.0);
}

#[tokio::test]
async fn decay_skips_record_exactly_at_cutoff() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());
    let player = PlayerId::new("p1");

    store.accrue(&player, 10.0, at(6, 0)).await.unwrap();

    // Idle exactly equal to the decay window does not decay; the
    // comparison is strict.
    let decayed = store.decay_inactive(2.0, at(6, 0)).await.unwrap();
    assert_eq!(decayed, 0);

    let record = store.get(&player).await.unwrap().unwrap();
    assert_close(record.score, 10.0);
}

#[tokio::test]
async fn decay_clamps_at_zero_and_skips_floor() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());
    let player = PlayerId::new("p1");

    store.accrue(&player, 1.5, at(1, 0)).await.unwrap();

    // First pass clamps to the floor rather than going negative.
    let decayed = store.decay_inactive(5.0, at(12, 0)).await.unwrap();
    assert_eq!(decayed, 1);
    let record = store.get(&player).await.unwrap().unwrap();
    assert_close(record.score, 0.0);

    // Second pass finds nothing above the floor and writes nothing.
    let decayed = store.decay_inactive(5.0, at(13, 0)).await.unwrap();
    assert_eq!(decayed, 0);
}

#[tokio::test]
async fn decay_never_touches_last_progressed_at() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());
    let player = PlayerId::new("p1");

    store.accrue(&player, 10.0, at(1, 0)).await.unwrap();
    store.decay_inactive(2.0, at(12, 0)).await.unwrap();

    let record = store.get(&player).await.unwrap().unwrap();
    assert_eq!(record.last_progressed_at, at(1, 0));
}

#[tokio::test]
async fn interleaved_accrual_and_decay_lose_nothing() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());
    let player = PlayerId::new("p1");

    let start = at(1, 0);
    store.accrue(&player, 10.0, start).await.unwrap();

    // Decay fires against the stale timestamp, then accrual lands on
    // the decayed value. 10 - 2 + 0.5 = 8.5: the decay is not lost to
    // a stale overwrite.
    store
        .decay_inactive(2.0, start + Duration::hours(80))
        .await
        .unwrap();
    store
        .accrue(&player, 0.5, start + Duration::hours(81))
        .await
        .unwrap();

    let record = store.get(&player).await.unwrap().unwrap();
    assert_close(record.score, 8.5);
    assert_eq!(record.last_progressed_at, start + Duration::hours(81));
}

#[tokio::test]
async fn get_returns_none_for_unknown_player() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());

    let record = store.get(&PlayerId::new("nobody")).await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn qualifying_filters_by_threshold_in_insertion_order() {
    let db = setup().await;
    let store = ProgressStore::new(db.pool());

    store
        .accrue(&PlayerId::new("first"), 120.0, at(1, 0))
        .await
        .unwrap();
    store
        .accrue(&PlayerId::new("below"), 60.0, at(1, 0))
        .await
        .unwrap();
    store
        .accrue(&PlayerId::new("second"), 100.0, at(1, 0))
        .await
        .unwrap();

    let qualifying = store.qualifying(100.0).await.unwrap();
    let ids: Vec<&str> = qualifying.iter().map(|r| r.player_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);

    assert_eq!(store.count().await.unwrap(), 3);
}
