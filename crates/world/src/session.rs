//! Per-player server-side session state.

use crate::discovery::DiscoverySet;
use serde::{Deserialize, Serialize};
use waystones_core::{PlayerId, SimTick, WaystonePos};

/// Server-side state for one connected player.
///
/// The discovery set is an owned field, not behavior attached to some
/// foreign entity type; everything the teleport rules need to know about a
/// player lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSession {
    /// Stable player identifier.
    pub player_id: PlayerId,
    /// Current position of the player entity.
    pub pos: WaystonePos,
    /// Experience levels available to spend on teleports.
    pub xp_levels: u32,
    /// Waystones this player has unlocked.
    pub discovery: DiscoverySet,
    /// Tick before which ordinary teleports are refused.
    pub cooldown_until: SimTick,
}

impl PlayerSession {
    /// Create a fresh session for a player spawning at `pos`.
    pub fn new(player_id: PlayerId, pos: WaystonePos) -> Self {
        Self {
            player_id,
            pos,
            xp_levels: 0,
            discovery: DiscoverySet::new(),
            cooldown_until: SimTick::ZERO,
        }
    }

    /// Attach a discovery set loaded from player-entity persistence.
    pub fn with_discovery(mut self, discovery: DiscoverySet) -> Self {
        self.discovery = discovery;
        self
    }

    /// Attach an XP level pool (teleport cost currency).
    pub fn with_xp_levels(mut self, xp_levels: u32) -> Self {
        self.xp_levels = xp_levels;
        self
    }
}
