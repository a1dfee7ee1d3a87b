//! trackpad-remote library crate.
//!
//! Delivers the gestures recognised by `trackpad-core` to a remote executor.
//! A persistent WebSocket channel is preferred; when it is down every message
//! falls back to a fire-and-forget HTTP `POST`.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! JSON input lines (stdin / file)
//!         ↓
//! [trackpad-remote]
//!   ├── domain/           Input-line protocol, input mode, connectivity health
//!   ├── application/      TrackpadSession → CommandDispatcher → Transport trait
//!   └── infrastructure/
//!         ├── transport/     SocketChannel, HttpFallback, FailoverTransport
//!         ├── storage/       TOML configuration file
//!         └── input_source/  JSON-lines reader
//!         ↓
//! remote executor (Socket.IO channel or HTTP endpoints)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async runtime.
//! - `application` depends on `domain` and `trackpad-core` only; transports are
//!   reached through the [`application::dispatch::Transport`] trait.
//! - `infrastructure` depends on all other layers plus `tokio`,
//!   `tokio-tungstenite` and `reqwest`.

/// Domain layer: input lines, input mode and connectivity health.
pub mod domain;

/// Application layer: the trackpad session and the command dispatcher.
pub mod application;

/// Infrastructure layer: transports, config file and input reader.
pub mod infrastructure;
