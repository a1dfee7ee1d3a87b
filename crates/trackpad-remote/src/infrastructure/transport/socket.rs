//! Low-latency channel: a WebSocket speaking Engine.IO v4 / Socket.IO v5.
//!
//! # Lifecycle
//!
//! [`SocketChannel::spawn`] starts one background task that owns the
//! WebSocket.  The task connects, performs the handshake (`0{…}` open packet
//! from the server, `40` from us, `40{…}` back), then pumps outbound frames
//! and answers server pings until the connection drops.  After a drop it
//! reconnects; once `reconnect_attempts` consecutive attempts have failed it
//! gives up for good and the HTTP fallback carries everything.
//!
//! The rest of the program only sees the `connected` flag and an unbounded
//! queue of already-framed text packets, so [`Transport::deliver`] never
//! blocks and never awaits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, trace, warn};
use trackpad_core::protocol::codec::{decode_packet, encode_connect, encode_event, encode_pong};
use trackpad_core::protocol::{EnginePacket, SocketPacket};
use trackpad_core::{Envelope, ProtocolError};

use crate::application::dispatch::{Transport, TransportError};
use crate::infrastructure::transport::health::HealthReporter;
use crate::infrastructure::transport::DEFAULT_EXECUTOR_URL;

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Maps an executor base URL to its channel endpoint.
///
/// `http` becomes `ws` and `https` becomes `wss`; `ws`/`wss` URLs are kept.
pub fn channel_url(base: &str) -> Result<String, TransportError> {
    let base = base.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        return Err(TransportError::InvalidUrl(base.to_string()));
    };
    Ok(format!("{ws}{SOCKET_IO_PATH}"))
}

#[derive(Debug, Clone)]
pub struct SocketChannelConfig {
    /// Executor base URL (`http(s)://` or `ws(s)://`).
    pub url: String,
    /// Bound on TCP connect plus handshake.
    pub connect_timeout: Duration,
    /// Consecutive failed attempts tolerated before giving up.
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl Default for SocketChannelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EXECUTOR_URL.to_string(),
            connect_timeout: Duration::from_secs(2),
            reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
enum ChannelError {
    #[error("timed out")]
    Timeout,
    #[error("socket closed")]
    Closed,
    #[error("handshake rejected: {0}")]
    Handshake(String),
    #[error("websocket error: {0}")]
    Ws(#[from] WsError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Why the pump loop returned.
enum PumpExit {
    /// Every sender is gone; the task should end.
    Shutdown,
    Lost(String),
}

/// Handle to the channel task.
pub struct SocketChannel {
    connected: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<String>,
}

impl SocketChannel {
    /// Starts the connection task on the current runtime.
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidUrl`] for an unsupported URL scheme and
    /// [`TransportError::NoRuntime`] outside a Tokio runtime.
    pub fn spawn(config: SocketChannelConfig, health: HealthReporter) -> Result<Self, TransportError> {
        let url = channel_url(&config.url)?;
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        runtime.spawn(run_lifecycle(url, config, Arc::clone(&connected), health, rx));

        Ok(Self {
            connected,
            outbound: tx,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Transport for SocketChannel {
    fn is_available(&self) -> bool {
        self.is_connected()
    }

    fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Unavailable);
        }
        let frame = encode_event(envelope.event, &envelope.channel_body)?;
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::SendFailed("channel task has stopped".into()))
    }
}

// ── Connection task ──────────────────────────────────────────────────────────

async fn run_lifecycle(
    url: String,
    config: SocketChannelConfig,
    connected: Arc<AtomicBool>,
    health: HealthReporter,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let mut failures: u32 = 0;

    loop {
        match connect(&url, config.connect_timeout).await {
            Ok(ws) => {
                failures = 0;
                connected.store(true, Ordering::Release);
                health.channel_up();
                info!("channel connected to {url}");

                let exit = pump(ws, &mut outbound).await;

                connected.store(false, Ordering::Release);
                health.channel_down();
                // Frames queued while the socket was dying are stale.
                while outbound.try_recv().is_ok() {}

                match exit {
                    PumpExit::Shutdown => {
                        debug!("channel task stopping");
                        return;
                    }
                    PumpExit::Lost(reason) => warn!("channel lost: {reason}"),
                }
            }
            Err(e) => {
                failures += 1;
                debug!(attempt = failures, "channel connect to {url} failed: {e}");
            }
        }

        if retries_exhausted(failures, config.reconnect_attempts) {
            warn!(
                "channel unreachable after {failures} attempts; continuing with HTTP fallback only"
            );
            return;
        }

        let backoff = time::sleep(config.reconnect_delay);
        tokio::pin!(backoff);
        loop {
            tokio::select! {
                _ = &mut backoff => break,
                frame = outbound.recv() => {
                    if frame.is_none() {
                        return;
                    }
                }
            }
        }
    }
}

/// `attempts` consecutive failures end the lifecycle.
fn retries_exhausted(failures: u32, attempts: u32) -> bool {
    failures >= attempts
}

async fn connect(url: &str, timeout: Duration) -> Result<WsStream, ChannelError> {
    time::timeout(timeout, async {
        let (mut ws, _response) = connect_async(url).await?;
        handshake(&mut ws).await?;
        Ok::<_, ChannelError>(ws)
    })
    .await
    .map_err(|_| ChannelError::Timeout)?
}

async fn handshake(ws: &mut WsStream) -> Result<(), ChannelError> {
    match next_packet(ws).await? {
        EnginePacket::Open(info) => {
            debug!(sid = %info.sid, ping_interval = info.ping_interval, "engine session opened")
        }
        other => {
            return Err(ChannelError::Handshake(format!(
                "expected open packet, got {other:?}"
            )))
        }
    }

    ws.send(WsMessage::Text(encode_connect().to_string())).await?;

    loop {
        match next_packet(ws).await? {
            EnginePacket::Message(SocketPacket::Connect(_)) => return Ok(()),
            EnginePacket::Message(SocketPacket::ConnectError(reason)) => {
                return Err(ChannelError::Handshake(reason.to_string()))
            }
            EnginePacket::Ping(payload) => ws.send(WsMessage::Text(encode_pong(&payload))).await?,
            EnginePacket::Close => return Err(ChannelError::Closed),
            _ => {}
        }
    }
}

async fn next_packet(ws: &mut WsStream) -> Result<EnginePacket, ChannelError> {
    loop {
        match ws.next().await {
            Some(Ok(WsMessage::Text(text))) => return Ok(decode_packet(&text)?),
            Some(Ok(WsMessage::Close(_))) | None => return Err(ChannelError::Closed),
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

async fn pump(ws: WsStream, outbound: &mut mpsc::UnboundedReceiver<String>) -> PumpExit {
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sink.send(WsMessage::Text(frame)).await {
                        return PumpExit::Lost(e.to_string());
                    }
                }
                None => {
                    let _ = sink.send(WsMessage::Close(None)).await;
                    return PumpExit::Shutdown;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => match decode_packet(&text) {
                    Ok(EnginePacket::Ping(payload)) => {
                        if let Err(e) = sink.send(WsMessage::Text(encode_pong(&payload))).await {
                            return PumpExit::Lost(e.to_string());
                        }
                    }
                    Ok(EnginePacket::Close) => {
                        return PumpExit::Lost("server closed the session".into())
                    }
                    Ok(EnginePacket::Message(SocketPacket::Disconnect)) => {
                        return PumpExit::Lost("server disconnected the namespace".into())
                    }
                    Ok(EnginePacket::Message(SocketPacket::Event { name, .. })) => {
                        trace!(%name, "ignoring server event")
                    }
                    Ok(_) => {}
                    Err(e) => debug!("undecodable channel frame: {e}"),
                },
                Some(Ok(WsMessage::Close(_))) | None => {
                    return PumpExit::Lost("socket closed".into())
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return PumpExit::Lost(e.to_string()),
            },
        }
    }
}
