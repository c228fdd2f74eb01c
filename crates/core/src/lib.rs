#![warn(missing_docs)]
//! Core primitives shared across the waystones workspace.

pub mod dimension;
pub mod id;
pub mod pos;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use dimension::DimensionId;
pub use id::{compute_id, random_salt, WaystoneId, WaystoneIdError, WAYSTONE_ID_LEN};
pub use pos::WaystonePos;

/// Server-assigned player identifier, stable for the lifetime of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct PlayerId(pub u64);

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Ticks remaining until `deadline`, zero if already past it.
    pub fn until(self, deadline: Self) -> u64 {
        deadline.0.saturating_sub(self.0)
    }
}
