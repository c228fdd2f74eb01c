//! Message encoding and decoding with framing.
//!
//! Provides length-prefixed encoding so the host transport can carry
//! waystone messages over any reliable stream.
//!
//! Frame format: `[length: u32 LE][message_type: u8][postcard payload]`,
//! where `length` counts the type tag plus the payload.

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_MAGIC, PROTOCOL_VERSION};
use anyhow::{Context, Result};
use blake3::Hash;

/// Compute schema hash from protocol definitions.
///
/// Used to reject clients built against an incompatible protocol before any
/// waystone message is interpreted.
pub fn compute_schema_hash() -> u64 {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&PROTOCOL_VERSION.to_le_bytes());
    hasher.update(PROTOCOL_MAGIC);

    // Message type names, in a fixed order.
    hasher.update(b"ClientMessage");
    hasher.update(b"ServerMessage");
    hasher.update(b"WaystoneEntry");
    hasher.update(b"ConfigSummary");

    let hash: Hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[0..8].try_into().unwrap())
}

/// Encode a client message with length prefix.
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(msg).context("Failed to serialize client message")?;
    Ok(frame(client_message_type_tag(msg), &payload))
}

/// Encode a server message with length prefix.
pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(msg).context("Failed to serialize server message")?;
    Ok(frame(server_message_type_tag(msg), &payload))
}

/// Decode a client message from frame data.
///
/// Expects data to start with the length prefix. Never panics on arbitrary
/// input; malformed frames return an error the caller is expected to drop.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage> {
    let payload = unframe(data)?;
    postcard::from_bytes(payload).context("Failed to deserialize client message")
}

/// Decode a server message from frame data.
pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage> {
    let payload = unframe(data)?;
    postcard::from_bytes(payload).context("Failed to deserialize server message")
}

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(4 + 1 + payload.len());
    let length = (1 + payload.len()) as u32;
    frame.extend_from_slice(&length.to_le_bytes());
    frame.push(tag);
    frame.extend_from_slice(payload);
    frame
}

fn unframe(data: &[u8]) -> Result<&[u8]> {
    if data.len() < 5 {
        anyhow::bail!("Frame too short: {} bytes (minimum 5)", data.len());
    }

    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if length == 0 {
        anyhow::bail!("Empty frame");
    }
    if data.len() < 4 + length {
        anyhow::bail!(
            "Incomplete frame: expected {} bytes, got {}",
            4 + length,
            data.len()
        );
    }

    // data[4] is the message type tag, kept for stream multiplexing.
    Ok(&data[5..4 + length])
}

fn client_message_type_tag(msg: &ClientMessage) -> u8 {
    match msg {
        ClientMessage::RenameWaystone { .. } => 0,
        ClientMessage::ForgetWaystone { .. } => 1,
        ClientMessage::TeleportRequest { .. } => 2,
        ClientMessage::RequestSync => 3,
    }
}

fn server_message_type_tag(msg: &ServerMessage) -> u8 {
    match msg {
        ServerMessage::WaystoneList { .. } => 0,
        ServerMessage::ConfigUpdate(_) => 1,
        ServerMessage::TeleportDenied { .. } => 2,
        ServerMessage::Teleported { .. } => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_roundtrip() {
        let msg = ClientMessage::RequestSync;
        let encoded = encode_client_message(&msg).unwrap();
        assert_eq!(decode_client_message(&encoded).unwrap(), msg);
    }

    #[test]
    fn truncated_frames_are_rejected() {
        let msg = ClientMessage::RequestSync;
        let encoded = encode_client_message(&msg).unwrap();
        assert!(decode_client_message(&encoded[..encoded.len() - 1]).is_err());
        assert!(decode_client_message(&[]).is_err());
    }

    #[test]
    fn schema_hash_is_stable_within_a_build() {
        assert_eq!(compute_schema_hash(), compute_schema_hash());
    }
}
