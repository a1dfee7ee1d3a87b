//! Wire messages and channel framing.

pub mod codec;
pub mod messages;

pub use codec::{decode_packet, encode_event, EnginePacket, ProtocolError, SocketPacket};
pub use messages::*;
