//! Eligibility filter: which players are currently earning credit.
//!
//! A pure function over one roster snapshot. A player earns credit for
//! a tick iff all of the following hold:
//!
//! 1. the host flags them as their squad's leader,
//! 2. their squad has at least `min_squad_members` members in this
//!    snapshot (the count is derived from the snapshot itself),
//! 3. when `only_open_squads` is set, the squad is unlocked.
//!
//! Malformed descriptors (no squad, missing flags) are excluded, never
//! an error: one broken entry must not cost the rest of the roster its
//! tick.

use std::collections::HashMap;

use vanguard_types::{RosterEntry, RosterSnapshot};

use crate::config::ProgressConfig;

/// Select the squad leaders currently earning credit, in snapshot order.
pub fn eligible_leaders<'a>(
    snapshot: &'a RosterSnapshot,
    config: &ProgressConfig,
) -> Vec<&'a RosterEntry> {
    let mut squad_sizes: HashMap<&str, usize> = HashMap::new();
    for player in &snapshot.players {
        if let Some(squad) = &player.squad {
            *squad_sizes.entry(squad.id.as_str()).or_insert(0) += 1;
        }
    }

    snapshot
        .players
        .iter()
        .filter(|player| {
            if !player.is_leader {
                return false;
            }
            let Some(squad) = &player.squad else {
                return false;
            };
            let members = squad_sizes.get(squad.id.as_str()).copied().unwrap_or(0);
            if members < config.min_squad_members {
                return false;
            }
            if config.only_open_squads && squad.locked.is_locked() {
                return false;
            }
            true
        })
        .collect()
}
