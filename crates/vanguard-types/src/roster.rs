//! Roster snapshot schema and boundary normalization.
//!
//! A [`RosterSnapshot`] is the transient view of the live server the
//! host hands over on each sampling pull. It is consumed and discarded
//! within the tick; nothing in it is persisted.
//!
//! The host serializes squad lock state inconsistently (sometimes a
//! JSON bool, sometimes a string such as `"False"`), so [`LockFlag`]
//! normalizes it exactly once at the deserialization boundary. The
//! rest of the engine only ever sees a typed flag.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{PlayerId, SquadId};

/// Normalized squad lock state.
///
/// Any case-insensitive representation of `"false"` (or the JSON bool
/// `false`) means unlocked; every other value means locked. An absent
/// flag defaults to locked, which is the conservative reading when the
/// open-squads rule is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LockFlag {
    /// The squad is locked to new members.
    #[default]
    Locked,
    /// The squad accepts new members.
    Unlocked,
}

impl LockFlag {
    /// Whether the squad is locked.
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }

    /// Whether the squad is open to new members.
    pub const fn is_unlocked(self) -> bool {
        matches!(self, Self::Unlocked)
    }
}

/// Wire representation of the lock flag before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLockFlag {
    Bool(bool),
    Text(String),
}

impl<'de> Deserialize<'de> for LockFlag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawLockFlag::deserialize(deserializer)?;
        Ok(match raw {
            RawLockFlag::Bool(false) => Self::Unlocked,
            RawLockFlag::Bool(true) => Self::Locked,
            RawLockFlag::Text(text) if text.eq_ignore_ascii_case("false") => Self::Unlocked,
            RawLockFlag::Text(_) => Self::Locked,
        })
    }
}

/// Squad fields of a roster entry.
///
/// Member count is intentionally absent: it is derived by counting
/// entries in the same snapshot that share the squad id, so a snapshot
/// can never carry a count that disagrees with its own contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadRef {
    /// Squad identifier within this snapshot.
    pub id: SquadId,
    /// Normalized lock state; absent input means locked.
    #[serde(default)]
    pub locked: LockFlag,
}

/// One player descriptor within a roster snapshot.
///
/// Malformed or partial descriptors (no squad, missing flags) must
/// deserialize successfully and simply come out ineligible; a broken
/// entry never fails the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Stable player identifier.
    pub id: PlayerId,
    /// Display name, used only in chat replies.
    #[serde(default)]
    pub name: String,
    /// Squad membership, if any.
    #[serde(default)]
    pub squad: Option<SquadRef>,
    /// Whether the host flags this player as their squad's leader.
    #[serde(default)]
    pub is_leader: bool,
}

/// Transient view of the live server roster at one sampling instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Player descriptors in the host's order.
    pub players: Vec<RosterEntry>,
}

impl RosterSnapshot {
    /// Number of players currently on the server.
    pub fn live_player_count(&self) -> usize {
        self.players.len()
    }
}

/// A pending player-initiated progress query drained from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// The asking player's id.
    pub player_id: PlayerId,
    /// The asking player's display name.
    pub player_name: String,
}
