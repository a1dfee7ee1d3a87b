//! # trackpad-core
//!
//! Gesture interpretation for a phone-as-trackpad remote control.
//!
//! The crate turns touch and pointer input from a mobile browser into remote
//! control commands (relative pointer moves, clicks, scrolling, key presses,
//! media and presentation actions).  It has no dependency on a network stack
//! or an async runtime; delivering the resulting [`WireMessage`]s is the job
//! of the caller.
//!
//! # Architecture overview
//!
//! ```text
//! PointerEvent / TouchEvent ──► ContactSample ──► GestureEngine ──► Gesture ──► WireMessage
//!                                     │                 │
//!                                     │                 ├─ ContactTracker  (per-finger state)
//!                                     │                 ├─ classifier      (move / scroll / tap / swipe)
//!                                     │                 └─ policy          (throttle, scroll batching)
//!                                     │
//!                                     └──────────────► RawStreamer ──────────────► WireMessage
//! ```
//!
//! - **`domain`** holds the state machines and tunables.
//! - **`protocol`** defines the wire messages and the text framing used on the
//!   low-latency channel.

pub mod domain;
pub mod protocol;

pub use domain::config::{GestureConfig, GestureSetting};
pub use domain::contact::{Contact, ContactId, ContactTracker};
pub use domain::engine::{Gesture, GestureEngine};
pub use domain::input::{ContactPhase, ContactSample, ContactSource, PointerEvent, PointerKind, TouchEvent};
pub use domain::raw_stream::RawStreamer;
pub use protocol::codec::ProtocolError;
pub use protocol::messages::{Envelope, WireMessage};
