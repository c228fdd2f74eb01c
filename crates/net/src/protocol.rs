//! Protocol message definitions for the waystone client-server boundary.
//!
//! All messages use postcard serialization for compact binary encoding. The
//! surrounding transport (streams, sessions, encryption) belongs to the host
//! engine; this crate only defines the payloads the waystone core consumes
//! and emits.

use serde::{Deserialize, Serialize};
use waystones_core::{WaystoneId, WaystonePos};
use waystones_world::{Denial, WaystoneRecord, WaystonesConfig};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u16 = 1;

/// Protocol magic bytes identifying the waystones protocol.
pub const PROTOCOL_MAGIC: &[u8; 8] = b"WAYS\x00\x01\x00\x00";

/// Maximum length of a waystone display name (characters).
pub const MAX_NAME_LEN: usize = 64;

/// Maximum number of entries in one waystone list sync.
pub const MAX_LIST_ENTRIES: usize = 4096;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMessage {
    /// Rename a waystone's display label.
    RenameWaystone {
        /// Target waystone.
        id: WaystoneId,
        /// Replacement label.
        new_name: String,
    },

    /// Drop a waystone from the sender's discovery set.
    ForgetWaystone {
        /// Target waystone.
        id: WaystoneId,
    },

    /// Request a teleport to a previously discovered waystone.
    TeleportRequest {
        /// Target waystone.
        id: WaystoneId,
        /// Set when initiated through an abyss watcher item.
        from_abyss_watcher: bool,
    },

    /// Ask the server to re-send the sender's waystone list.
    RequestSync,
}

impl ClientMessage {
    /// Verify message limits and validity.
    ///
    /// Called on every received message; anything failing here is dropped
    /// silently, which defends against version skew and hostile clients.
    pub fn verify(&self) -> Result<(), &'static str> {
        match self {
            ClientMessage::RenameWaystone { id, new_name } => {
                verify_id(id)?;
                if new_name.is_empty() {
                    return Err("Waystone name is empty");
                }
                if new_name.len() > MAX_NAME_LEN {
                    return Err("Waystone name too long");
                }
            }
            ClientMessage::ForgetWaystone { id } => verify_id(id)?,
            ClientMessage::TeleportRequest { id, .. } => verify_id(id)?,
            ClientMessage::RequestSync => {}
        }
        Ok(())
    }
}

fn verify_id(id: &WaystoneId) -> Result<(), &'static str> {
    // Serde happily produces a WaystoneId from any string; re-validate.
    WaystoneId::parse(id.as_str()).map_err(|_| "Malformed waystone id")?;
    Ok(())
}

/// One waystone as presented in a client selection list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaystoneEntry {
    /// Identity hash.
    pub id: WaystoneId,
    /// Current display label.
    pub display_name: String,
    /// Anchor position, shown for distance/dimension hints.
    pub pos: WaystonePos,
}

impl From<&WaystoneRecord> for WaystoneEntry {
    fn from(record: &WaystoneRecord) -> Self {
        Self {
            id: record.id.clone(),
            display_name: record.display_name.clone(),
            pos: record.pos,
        }
    }
}

/// Client-relevant subset of the server rules, pushed on join and reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSummary {
    /// Whether discovery is global.
    pub global_discovery: bool,
    /// Base teleport cost in levels.
    pub teleport_cost_levels: u32,
    /// Teleport cooldown in ticks.
    pub cooldown_ticks: u64,
}

impl From<&WaystonesConfig> for ConfigSummary {
    fn from(config: &WaystonesConfig) -> Self {
        Self {
            global_discovery: config.global_discovery,
            teleport_cost_levels: config.teleport_cost_levels,
            cooldown_ticks: config.cooldown_ticks,
        }
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServerMessage {
    /// Refreshed snapshot of the waystones visible to the recipient: the
    /// full directory under global discovery, else their known subset.
    WaystoneList {
        /// Visible waystones, id-ordered.
        entries: Vec<WaystoneEntry>,
    },

    /// Current rules, pushed on join and after a config reload.
    ConfigUpdate(ConfigSummary),

    /// A teleport request was refused.
    TeleportDenied {
        /// Why it was refused.
        reason: Denial,
    },

    /// A teleport committed; the client should snap to this position.
    Teleported {
        /// Landing position.
        pos: WaystonePos,
    },
}

impl ServerMessage {
    /// Verify message limits before sending.
    pub fn verify(&self) -> Result<(), &'static str> {
        if let ServerMessage::WaystoneList { entries } = self {
            if entries.len() > MAX_LIST_ENTRIES {
                return Err("Waystone list too large");
            }
            for entry in entries {
                verify_id(&entry.id)?;
                if entry.display_name.len() > MAX_NAME_LEN {
                    return Err("Waystone name too long");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waystones_core::{compute_id, DimensionId};

    fn valid_id() -> WaystoneId {
        compute_id(WaystonePos::new(DimensionId::Overworld, 1, 64, 1), 5)
    }

    #[test]
    fn rename_limits_are_enforced() {
        let ok = ClientMessage::RenameWaystone {
            id: valid_id(),
            new_name: "Home".to_string(),
        };
        assert!(ok.verify().is_ok());

        let too_long = ClientMessage::RenameWaystone {
            id: valid_id(),
            new_name: "x".repeat(MAX_NAME_LEN + 1),
        };
        assert!(too_long.verify().is_err());

        let empty = ClientMessage::RenameWaystone {
            id: valid_id(),
            new_name: String::new(),
        };
        assert!(empty.verify().is_err());
    }

    #[test]
    fn malformed_ids_fail_verification() {
        // Deserialization alone does not validate ids; verify() must.
        let bytes = postcard::to_allocvec("not-a-hash").unwrap();
        let bad: WaystoneId = postcard::from_bytes(&bytes).unwrap();
        let msg = ClientMessage::ForgetWaystone { id: bad };
        assert!(msg.verify().is_err());
    }

    #[test]
    fn oversized_list_fails_verification() {
        let entry = WaystoneEntry {
            id: valid_id(),
            display_name: "Home".to_string(),
            pos: WaystonePos::new(DimensionId::Overworld, 1, 64, 1),
        };
        let msg = ServerMessage::WaystoneList {
            entries: vec![entry; MAX_LIST_ENTRIES + 1],
        };
        assert!(msg.verify().is_err());
    }
}
