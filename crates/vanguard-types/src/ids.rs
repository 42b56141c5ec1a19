//! Type-safe identifier wrappers for host-supplied entity ids.
//!
//! Player and squad identifiers arrive from the game host as opaque
//! strings (EOS/Steam ids for players, per-team squad numbers rendered
//! as strings for squads). They are never parsed or generated on this
//! side; the newtypes exist to prevent accidental mixing at compile
//! time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an owned string identifier.
macro_rules! define_str_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_str_id! {
    /// Stable, never-reused identifier for a player.
    PlayerId
}

define_str_id! {
    /// Identifier for a squad within a single roster snapshot.
    ///
    /// Squad ids are only meaningful for grouping entries of the same
    /// snapshot; they are not stable across snapshots and are never
    /// persisted.
    SquadId
}
