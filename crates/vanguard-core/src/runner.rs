//! Task runner: three independently scheduled periodic loops.
//!
//! [`start`] spawns the sampling, decay, and materialization tasks
//! against one shared record store and returns an [`EngineHandle`] for
//! clean teardown. Each loop sleeps its own interval *after* the work
//! completes, so overlapping invocations of the same task cannot
//! occur; a slow store operation only delays that task's own next
//! tick. The three different tasks run concurrently with each other,
//! which the store's atomic per-record mutations make safe.
//!
//! Shutdown uses a watch channel: once [`EngineHandle::shutdown`] is
//! called no new tick starts, in-flight work completes, and the tasks
//! are joined.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vanguard_db::Database;

use crate::accrual::AccrualEngine;
use crate::config::WhitelistConfig;
use crate::decay::DecayEngine;
use crate::query::QueryService;
use crate::source::{NotificationSink, RosterSource};
use crate::whitelist::Materializer;

/// Handle to a started engine. Dropping it without calling
/// [`shutdown`] also stops the tasks (the watch sender closes), but
/// without waiting for in-flight work.
///
/// [`shutdown`]: EngineHandle::shutdown
#[derive(Debug)]
pub struct EngineHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    /// Signal all tasks to stop and wait for them to finish.
    ///
    /// In-flight ticks complete; no new tick starts after this is
    /// called.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(error) = task.await {
                warn!(%error, "Engine task failed during shutdown");
            }
        }
        info!("Engine stopped");
    }
}

/// Start the engine: materialize once for mount, then spawn the three
/// periodic tasks.
///
/// `base_dir` is the directory relative output paths resolve against.
/// The mount-time materialization failing is logged, not fatal: the
/// prior artifact (if any) stays in place and the periodic task will
/// retry on its cadence.
pub async fn start<S, N>(
    db: Database,
    config: &WhitelistConfig,
    base_dir: &Path,
    source: S,
    sink: N,
) -> EngineHandle
where
    S: RosterSource + 'static,
    N: NotificationSink + 'static,
{
    let accrual = AccrualEngine::new(db.clone(), config.progress.clone());
    let decay = DecayEngine::new(db.clone(), config.decay.clone());
    let materializer = Materializer::new(db.clone(), base_dir, &config.whitelist, &config.progress);
    let query = QueryService::new(db, f64::from(config.progress.threshold));

    // The artifact must exist before the game server's config loader
    // reads it, even if no record does yet.
    match materializer.materialize().await {
        Ok(admins) => info!(admins, "Mount-time whitelist write complete"),
        Err(error) => warn!(%error, "Mount-time whitelist write failed"),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let source = Arc::new(source);

    let sample_interval = Duration::from_secs(u64::from(config.progress.sample_interval_seconds));
    let decay_interval = Duration::from_secs(u64::from(config.decay.interval_seconds));
    let materialize_interval = Duration::from_secs(u64::from(config.whitelist.update_minutes) * 60);

    let tasks = vec![
        tokio::spawn(sampling_loop(
            accrual,
            query,
            Arc::clone(&source),
            sink,
            sample_interval,
            shutdown_rx.clone(),
        )),
        tokio::spawn(decay_loop(
            decay,
            source,
            decay_interval,
            shutdown_rx.clone(),
        )),
        tokio::spawn(materialize_loop(
            materializer,
            materialize_interval,
            shutdown_rx,
        )),
    ];

    info!(
        sample_interval_s = sample_interval.as_secs(),
        decay_interval_s = decay_interval.as_secs(),
        materialize_interval_s = materialize_interval.as_secs(),
        "Engine started"
    );

    EngineHandle {
        shutdown: shutdown_tx,
        tasks,
    }
}

/// Wait out one interval, or return true if shutdown fired first.
async fn sleep_or_shutdown(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = shutdown.changed() => true,
        () = tokio::time::sleep(interval) => false,
    }
}

/// Sampling loop: pull the roster, accrue, then answer drained chat
/// queries. All failures are absorbed; the next tick retries
/// naturally.
async fn sampling_loop<S, N>(
    accrual: AccrualEngine,
    query: QueryService,
    source: Arc<S>,
    sink: N,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: RosterSource,
    N: NotificationSink,
{
    loop {
        if sleep_or_shutdown(interval, &mut shutdown).await {
            break;
        }

        match source.roster().await {
            Ok(snapshot) => {
                accrual.run_tick(&snapshot, Utc::now(), &sink).await;
            }
            Err(error) => {
                warn!(%error, "Roster pull failed; skipping sampling tick");
            }
        }

        match source.drain_queries().await {
            Ok(requests) => {
                for request in &requests {
                    query.answer(request, &sink).await;
                }
            }
            Err(error) => {
                warn!(%error, "Chat query drain failed");
            }
        }
    }
}

/// Decay loop: pull the live player count, then run the gated decay
/// pass.
async fn decay_loop<S>(
    decay: DecayEngine,
    source: Arc<S>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: RosterSource,
{
    loop {
        if sleep_or_shutdown(interval, &mut shutdown).await {
            break;
        }

        let live_player_count = match source.roster().await {
            Ok(snapshot) => snapshot.live_player_count(),
            Err(error) => {
                warn!(%error, "Roster pull failed; skipping decay tick");
                continue;
            }
        };

        if let Err(error) = decay.run_tick(live_player_count, Utc::now()).await {
            warn!(%error, "Decay tick failed");
        }
    }
}

/// Materialization loop: periodic full rewrite of the artifact.
async fn materialize_loop(
    materializer: Materializer,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if sleep_or_shutdown(interval, &mut shutdown).await {
            break;
        }

        if let Err(error) = materializer.materialize().await {
            warn!(%error, "Whitelist materialization failed; prior file kept");
        }
    }
}
