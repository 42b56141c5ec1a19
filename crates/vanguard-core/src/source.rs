//! Host capability traits: roster pull and notification push.
//!
//! The engine never reaches into the host process; it is handed two
//! injected capabilities instead. [`RosterSource`] pulls the current
//! roster (and pending chat queries) on the engine's own cadence, and
//! [`NotificationSink`] sends a text message to one player.
//!
//! Both traits use return-position `impl Future` so implementations
//! can be plain `async fn`s; they are consumed as generic bounds, not
//! trait objects, because async methods are not dyn-compatible.

use vanguard_types::{PlayerId, QueryRequest, RosterSnapshot};

/// Errors produced by a host capability.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The host could not be reached or replied with a failure.
    #[error("host transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The host replied with a payload the engine cannot decode.
    #[error("malformed host payload: {message}")]
    Malformed {
        /// Description of the decode failure.
        message: String,
    },
}

/// Pull-model supplier of roster snapshots and pending chat queries.
pub trait RosterSource: Send + Sync {
    /// Fetch the current roster snapshot.
    fn roster(&self)
    -> impl Future<Output = Result<RosterSnapshot, SourceError>> + Send;

    /// Drain pending player-initiated progress queries. Each request is
    /// returned at most once.
    fn drain_queries(&self)
    -> impl Future<Output = Result<Vec<QueryRequest>, SourceError>> + Send;
}

/// Sends a text message to a single player.
pub trait NotificationSink: Send + Sync {
    /// Deliver `message` to the player.
    fn notify(
        &self,
        player_id: &PlayerId,
        message: &str,
    ) -> impl Future<Output = Result<(), SourceError>> + Send;
}

impl<T: NotificationSink> NotificationSink for std::sync::Arc<T> {
    async fn notify(&self, player_id: &PlayerId, message: &str) -> Result<(), SourceError> {
        T::notify(self, player_id, message).await
    }
}

/// A roster source that always returns the same snapshot and no
/// queries. Used in tests to exercise the tick loop.
#[derive(Debug, Clone, Default)]
pub struct StubRosterSource {
    /// The snapshot returned by every pull.
    pub snapshot: RosterSnapshot,
}

impl StubRosterSource {
    /// Create a stub source that always serves `snapshot`.
    pub const fn new(snapshot: RosterSnapshot) -> Self {
        Self { snapshot }
    }
}

impl RosterSource for StubRosterSource {
    async fn roster(&self) -> Result<RosterSnapshot, SourceError> {
        Ok(self.snapshot.clone())
    }

    async fn drain_queries(&self) -> Result<Vec<QueryRequest>, SourceError> {
        Ok(Vec::new())
    }
}

/// A sink that records every message it is asked to deliver.
///
/// Used in tests to assert on notification behavior.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: std::sync::Mutex<Vec<(PlayerId, String)>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<(PlayerId, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    async fn notify(&self, player_id: &PlayerId, message: &str) -> Result<(), SourceError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((player_id.clone(), message.to_owned()));
        }
        Ok(())
    }
}

/// A sink that rejects every delivery, for failure-path tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSink;

impl NotificationSink for FailingSink {
    async fn notify(&self, _player_id: &PlayerId, _message: &str) -> Result<(), SourceError> {
        Err(SourceError::Transport {
            message: "sink unavailable".to_owned(),
        })
    }
}
