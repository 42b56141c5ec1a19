//! HTTP adapter for the host bridge.
//!
//! The game-server host exposes a small bridge: the current roster,
//! a drainable queue of player chat queries, and an endpoint that
//! relays a text message to one player (an RCON warn on the host
//! side). [`HostClient`] implements both engine capabilities against
//! it via [`reqwest`].
//!
//! A malformed or unreachable host fails only the tick that pulled
//! from it; the engine retries naturally on its next tick.

use serde::de::DeserializeOwned;
use tracing::debug;
use vanguard_core::source::{NotificationSink, RosterSource, SourceError};
use vanguard_types::{PlayerId, QueryRequest, RosterSnapshot};

/// HTTP client for the host bridge.
#[derive(Debug, Clone)]
pub struct HostClient {
    client: reqwest::Client,
    base_url: String,
}

impl HostClient {
    /// Create a client for the bridge at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl RosterSource for HostClient {
    async fn roster(&self) -> Result<RosterSnapshot, SourceError> {
        let response = self
            .client
            .get(self.url("/roster"))
            .send()
            .await
            .map_err(transport)?;
        let snapshot: RosterSnapshot = decode(response).await?;
        debug!(players = snapshot.live_player_count(), "Roster pulled");
        Ok(snapshot)
    }

    async fn drain_queries(&self) -> Result<Vec<QueryRequest>, SourceError> {
        let response = self
            .client
            .post(self.url("/queries/drain"))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}

impl NotificationSink for HostClient {
    async fn notify(&self, player_id: &PlayerId, message: &str) -> Result<(), SourceError> {
        let body = serde_json::json!({
            "playerId": player_id,
            "message": message,
        });

        let response = self
            .client
            .post(self.url("/notify"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SourceError::Transport {
                message: format!("host returned {status} for notify"),
            })
        }
    }
}

fn transport(error: reqwest::Error) -> SourceError {
    SourceError::Transport {
        message: error.to_string(),
    }
}

/// Check the status and decode a JSON response body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SourceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Transport {
            message: format!("host returned {status}"),
        });
    }

    response
        .json()
        .await
        .map_err(|error| SourceError::Malformed {
            message: error.to_string(),
        })
}
