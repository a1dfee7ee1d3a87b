//! Text framing for the low-latency channel.
//!
//! The channel is a WebSocket carrying Engine.IO v4 packets, with Socket.IO v5
//! packets nested inside Engine.IO `message` packets.  Only the default
//! namespace and text packets are supported; binary attachments are rejected.
//!
//! # Frame layout
//!
//! ```text
//! Engine.IO:  <type digit><payload>
//!             0 open (JSON handshake)   1 close   2 ping   3 pong
//!             4 message                 5 upgrade 6 noop
//!
//! Socket.IO (inside an Engine.IO message):
//!             <type digit>[/namespace,][ack id]<JSON>
//!             0 connect   1 disconnect   2 event   3 ack   4 connect_error
//! ```
//!
//! So emitting the `scroll` event looks like this on the wire:
//!
//! ```text
//! 42["scroll",{"scrollX":0.0,"scrollY":-30.0}]
//! ```

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur while framing or parsing channel packets.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty packet")]
    Empty,

    #[error("unknown engine packet type: {0:?}")]
    UnknownPacketType(char),

    #[error("unknown socket packet type: {0:?}")]
    UnknownSocketPacketType(char),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Packet types ──────────────────────────────────────────────────────────────

/// Handshake data sent by the server in the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// A decoded Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// A decoded Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect acknowledgement, with the optional `{sid}` payload.
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, args: Vec<Value> },
    Ack(Vec<Value>),
    ConnectError(Value),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Namespace connect request for the default namespace.
pub fn encode_connect() -> &'static str {
    "40"
}

/// Reply to a server ping, echoing its payload.
pub fn encode_pong(payload: &str) -> String {
    format!("3{payload}")
}

/// Frames `event` with a single JSON argument.
pub fn encode_event(event: &str, body: &Value) -> Result<String, ProtocolError> {
    let args = serde_json::to_string(&(event, body))?;
    Ok(format!("42{args}"))
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Parses one WebSocket text frame.
pub fn decode_packet(frame: &str) -> Result<EnginePacket, ProtocolError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(ProtocolError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => Ok(EnginePacket::Open(serde_json::from_str(rest)?)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest.to_owned())),
        '3' => Ok(EnginePacket::Pong(rest.to_owned())),
        '4' => Ok(EnginePacket::Message(decode_socket_packet(rest)?)),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(ProtocolError::UnknownPacketType(other)),
    }
}

fn decode_socket_packet(body: &str) -> Result<SocketPacket, ProtocolError> {
    let mut chars = body.chars();
    let kind = chars.next().ok_or(ProtocolError::Empty)?;
    let rest = strip_ack_id(strip_namespace(chars.as_str()));

    match kind {
        '0' => {
            if rest.is_empty() {
                Ok(SocketPacket::Connect(None))
            } else {
                Ok(SocketPacket::Connect(Some(serde_json::from_str(rest)?)))
            }
        }
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            let mut args: Vec<Value> = serde_json::from_str(rest)?;
            if args.is_empty() {
                return Err(ProtocolError::MalformedPayload("event without a name".into()));
            }
            match args.remove(0) {
                Value::String(name) => Ok(SocketPacket::Event { name, args }),
                other => Err(ProtocolError::MalformedPayload(format!(
                    "event name must be a string, got {other}"
                ))),
            }
        }
        '3' => Ok(SocketPacket::Ack(serde_json::from_str(rest)?)),
        '4' => Ok(SocketPacket::ConnectError(serde_json::from_str(rest)?)),
        other => Err(ProtocolError::UnknownSocketPacketType(other)),
    }
}

/// Drops a leading `/namespace,` prefix.
fn strip_namespace(s: &str) -> &str {
    if s.starts_with('/') {
        match s.find(',') {
            Some(i) => &s[i + 1..],
            None => "",
        }
    } else {
        s
    }
}

/// Drops a leading numeric ack id.
fn strip_ack_id(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_digit())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
