//! Persisted state for a single placed waystone.

use serde::{Deserialize, Serialize};
use waystones_core::{compute_id, WaystoneId, WaystonePos};

/// One placed waystone, as stored on its owning block entity.
///
/// The record persists with the block entity through the host's save cycle;
/// there is no separate directory file. `id` is assigned at placement and
/// never changes; only `display_name` is mutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaystoneRecord {
    /// Stable identity hash, unique across the directory.
    pub id: WaystoneId,
    /// Player-visible label; renamed freely, never part of the identity.
    pub display_name: String,
    /// Anchor block location.
    pub pos: WaystonePos,
    /// Placement salt the id was derived from.
    pub salt: u64,
}

impl WaystoneRecord {
    /// Mint the record for a freshly placed waystone.
    ///
    /// The salt must come from [`waystones_core::random_salt`] at placement
    /// time so that re-placement at broken-waystone coordinates yields a new
    /// identity.
    pub fn place(pos: WaystonePos, salt: u64) -> Self {
        let id = compute_id(pos, salt);
        let display_name = default_display_name(&id, pos);
        Self {
            id,
            display_name,
            pos,
            salt,
        }
    }
}

/// Dimension-derived default label, disambiguated by a short id prefix.
fn default_display_name(id: &WaystoneId, pos: WaystonePos) -> String {
    format!(
        "{} Waystone {}",
        pos.dimension.display_name(),
        id.short_prefix()
    )
}
