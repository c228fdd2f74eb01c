//! Waystone identity hashing.
//!
//! A waystone's identifier is derived once, at placement time, from its
//! anchor position and a random salt. The salt is what keeps a waystone
//! placed at coordinates where an earlier one was broken from inheriting the
//! old identifier: position alone never determines identity. Renames never
//! touch the id.

use crate::pos::WaystonePos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Length in characters of the hex rendering of a waystone id.
pub const WAYSTONE_ID_LEN: usize = 32;

/// Error returned when parsing an invalid [`WaystoneId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaystoneIdError {
    /// The input was not exactly [`WAYSTONE_ID_LEN`] characters.
    #[error("waystone id must be {WAYSTONE_ID_LEN} characters, got {0}")]
    WrongLength(usize),
    /// The input contained a character outside `0-9a-f`.
    #[error("waystone id has invalid characters (allowed: 0-9a-f)")]
    InvalidCharacter,
}

/// Stable, collision-resistant waystone identifier.
///
/// Rendered as 32 lowercase hex characters (128 bits of a blake3 digest).
/// Ordering is lexical and stable across runs, so id-keyed maps iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaystoneId(String);

impl WaystoneId {
    /// Parse an id received from the wire or persistence.
    ///
    /// Ids are only ever minted by [`compute_id`]; anything else arriving
    /// here is stale or hostile input, rejected rather than trusted.
    pub fn parse(input: &str) -> Result<Self, WaystoneIdError> {
        if input.len() != WAYSTONE_ID_LEN {
            return Err(WaystoneIdError::WrongLength(input.len()));
        }
        if !input.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(WaystoneIdError::InvalidCharacter);
        }
        Ok(Self(input.to_string()))
    }

    /// Hex form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix used when seeding default display names.
    pub fn short_prefix(&self) -> &str {
        &self.0[..4]
    }
}

impl fmt::Display for WaystoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WaystoneId {
    type Err = WaystoneIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Derive the stable identifier for a waystone placed at `pos` with `salt`.
///
/// The digest input is a fixed little-endian layout of the dimension,
/// coordinates, and salt, so the value is reproducible across runs and
/// platforms. Equal inputs always hash equal; changing only the salt changes
/// the output with overwhelming probability.
pub fn compute_id(pos: WaystonePos, salt: u64) -> WaystoneId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[pos.dimension.as_u8()]);
    hasher.update(&pos.x.to_le_bytes());
    hasher.update(&pos.y.to_le_bytes());
    hasher.update(&pos.z.to_le_bytes());
    hasher.update(&salt.to_le_bytes());
    let hash = hasher.finalize();

    let mut hex = String::with_capacity(WAYSTONE_ID_LEN);
    for byte in &hash.as_bytes()[..WAYSTONE_ID_LEN / 2] {
        // 32 hex chars = 16 digest bytes.
        let _ = write!(hex, "{byte:02x}");
    }
    WaystoneId(hex)
}

/// Draw a fresh placement salt.
///
/// Called exactly once per physical placement; never derived from position.
pub fn random_salt() -> u64 {
    rand::random()
}
