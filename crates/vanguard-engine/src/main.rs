//! Vanguard engine binary.
//!
//! Wires the whitelist engine to a real deployment: loads
//! configuration, connects and migrates the record store, builds the
//! HTTP host adapter, starts the periodic tasks, and tears everything
//! down cleanly on ctrl-c.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `vanguard-config.yaml` (or
//!    `VANGUARD_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `SQLite` and run migrations (failure here is fatal:
//!    the engine never starts its timers)
//! 4. Build the host bridge client
//! 5. Start the engine (mount-time whitelist write happens here)
//! 6. Wait for ctrl-c, then shut down gracefully

mod error;
mod host;

use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vanguard_core::{WhitelistConfig, runner};
use vanguard_db::Database;

use crate::error::LaunchError;
use crate::host::HostClient;

/// Default configuration file name, next to the working directory.
const DEFAULT_CONFIG_PATH: &str = "vanguard-config.yaml";

/// Application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config
    //    level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!("vanguard-engine starting");
    info!(
        threshold = config.progress.threshold,
        progress_per_hour = config.progress.progress_per_hour,
        sample_interval_seconds = config.progress.sample_interval_seconds,
        whitelist_path = config.whitelist.path,
        "Configuration loaded"
    );

    // 3. Connect to the record store and initialize the schema.
    let db = connect_store(&config).await?;

    // 4. Build the host bridge client. It serves as both the roster
    //    source and the notification sink.
    let host = HostClient::new(&config.infrastructure.host_url);
    info!(host_url = config.infrastructure.host_url, "Host bridge ready");

    // 5. Start the engine.
    let base_dir = std::env::current_dir().map_err(LaunchError::from)?;
    let handle = runner::start(db.clone(), &config, &base_dir, host.clone(), host).await;

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await.map_err(LaunchError::from)?;
    info!("Interrupt received; shutting down");

    handle.shutdown().await;
    db.close().await;

    info!("vanguard-engine stopped");
    Ok(())
}

/// Load configuration from `VANGUARD_CONFIG` or the default path.
///
/// A missing file yields the built-in defaults; a present-but-broken
/// file is fatal.
fn load_config() -> Result<WhitelistConfig, LaunchError> {
    let path = std::env::var("VANGUARD_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        Ok(WhitelistConfig::from_file(&path)?)
    } else {
        Ok(WhitelistConfig::default())
    }
}

/// Connect to the record store and run migrations.
///
/// Schema initialization failure is fatal to this subsystem only: the
/// caller exits without starting any timer, and the host keeps
/// running without a whitelist engine.
async fn connect_store(config: &WhitelistConfig) -> Result<Database, LaunchError> {
    let db = Database::connect_url(&config.infrastructure.database_url).await?;

    if let Err(error) = db.run_migrations().await {
        warn!(%error, "Schema initialization failed; engine will not start");
        return Err(error.into());
    }

    Ok(db)
}
