#![warn(missing_docs)]
//! Wire protocol for the waystone client-server boundary.

mod codec;
mod protocol;

pub use codec::{
    compute_schema_hash, decode_client_message, decode_server_message, encode_client_message,
    encode_server_message,
};
pub use protocol::{
    ClientMessage, ConfigSummary, ServerMessage, WaystoneEntry, MAX_LIST_ENTRIES, MAX_NAME_LEN,
    PROTOCOL_MAGIC, PROTOCOL_VERSION,
};
