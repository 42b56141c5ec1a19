//! Progress accrual, decay, and whitelist materialization engine.
//!
//! Vanguard watches a live game server roster, awards progress to
//! squad leaders of real (sized, open) squads, erodes the progress of
//! players who stop leading, and keeps a flat admin-group file in sync
//! with everyone above the qualification threshold.
//!
//! # Modules
//!
//! - [`config`] -- Typed YAML configuration with validation
//! - [`eligibility`] -- Pure roster-to-eligible-leaders filter
//! - [`accrual`] -- Per-tick score awards and milestone notifications
//! - [`decay`] -- Population- and idle-gated score erosion
//! - [`whitelist`] -- Atomic full-rewrite artifact materialization
//! - [`query`] -- Player-initiated progress/rank lookups
//! - [`source`] -- Injected host capabilities (roster pull, messaging)
//! - [`runner`] -- The three periodic tasks and graceful shutdown
//! - [`error`] -- The [`EngineError`] type

pub mod accrual;
pub mod config;
pub mod decay;
pub mod eligibility;
pub mod error;
pub mod query;
pub mod runner;
pub mod source;
pub mod whitelist;

pub use accrual::{AccrualEngine, TickSummary};
pub use config::{
    ConfigError, DecayConfig, InfrastructureConfig, LoggingConfig, OutputConfig, ProgressConfig,
    WhitelistConfig,
};
pub use decay::DecayEngine;
pub use eligibility::eligible_leaders;
pub use error::EngineError;
pub use query::{ProgressReply, QueryService};
pub use runner::{EngineHandle, start};
pub use source::{
    FailingSink, NotificationSink, RecordingSink, RosterSource, SourceError, StubRosterSource,
};
pub use whitelist::Materializer;
