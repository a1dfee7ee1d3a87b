//! Application layer use cases for the trackpad remote.
//!
//! - **`dispatch`** – Maps every classified gesture or discrete action to a
//!   [`trackpad_core::WireMessage`] and hands its envelope to a [`dispatch::Transport`].
//!   Delivery is fire-and-forget: failures are logged at `debug` and dropped.
//!
//! - **`session`** – Owns the gesture engine and the raw streamer and routes
//!   every input line through the right one, depending on the input mode.

pub mod dispatch;
pub mod session;
