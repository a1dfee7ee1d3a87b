//! CommandDispatcher: turns intents into wire messages and delivers them.
//!
//! The dispatcher does not know which transport is in use.  It builds the
//! [`Envelope`] for a message (event name, HTTP path, both bodies, admission
//! category) and passes it to a [`Transport`] trait object.  Channel selection
//! lives in the infrastructure layer (`FailoverTransport`).

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};
use trackpad_core::domain::actions::{MediaAction, PresentationAction};
use trackpad_core::protocol::messages::{
    AppLaunch, Category, Click, KeyInput, KeyboardShortcut, MediaCommand, MouseButton, MoveDelta,
    PresentationCommand, ScrollDelta, SystemCommand,
};
use trackpad_core::{Envelope, Gesture, ProtocolError, WireMessage};

/// Why a message was not delivered.
///
/// None of these ever reach the user; the dispatcher logs them and moves on.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport unavailable")]
    Unavailable,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("admission rejected: {in_flight} {category} requests in flight")]
    AdmissionRejected { category: Category, in_flight: usize },
    #[error("no async runtime to run the request on")]
    NoRuntime,
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// A way of getting an envelope to the remote executor.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Whether a `deliver` call has a chance of succeeding right now.
    fn is_available(&self) -> bool;

    /// Starts delivery of `envelope`.  Must not block; completion is never
    /// reported back.
    fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError>;
}

/// The Command Dispatcher use case.
pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Delivers `message`, reporting the outcome.
    pub fn try_send(&self, message: &WireMessage) -> Result<(), TransportError> {
        let envelope = message.envelope()?;
        trace!(event = envelope.event, "dispatching");
        self.transport.deliver(&envelope)
    }

    /// Delivers `message`; a failure is logged and the message dropped.
    pub fn send(&self, message: WireMessage) {
        if let Err(e) = self.try_send(&message) {
            debug!(event = message.channel_event(), "dropped: {e}");
        }
    }

    pub fn gesture(&self, gesture: Gesture) {
        self.send(gesture.into());
    }

    pub fn move_delta(&self, delta_x: f64, delta_y: f64) {
        self.send(WireMessage::Move(MoveDelta { delta_x, delta_y }));
    }

    pub fn scroll(&self, scroll_x: f64, scroll_y: f64) {
        self.send(WireMessage::Scroll(ScrollDelta { scroll_x, scroll_y }));
    }

    pub fn click(&self, button: MouseButton) {
        self.send(WireMessage::Click(Click { button }));
    }

    pub fn key(&self, input: KeyInput) {
        self.send(WireMessage::Key(input));
    }

    pub fn char(&self, c: char) {
        self.key(KeyInput::char(c));
    }

    /// Sends `text` as one `char` message per character, in order.
    pub fn text(&self, text: &str) {
        for c in text.chars() {
            self.char(c);
        }
    }

    pub fn media(&self, action: MediaAction) {
        self.send(WireMessage::Media(MediaCommand { action }));
    }

    pub fn presentation(&self, action: PresentationAction) {
        self.send(WireMessage::Presentation(PresentationCommand { action }));
    }

    pub fn app(&self, app: impl Into<String>) {
        self.send(WireMessage::App(AppLaunch { app: app.into() }));
    }

    pub fn system(&self, action: impl Into<String>) {
        self.send(WireMessage::System(SystemCommand {
            action: action.into(),
        }));
    }

    pub fn keyboard(&self, key: impl Into<String>) {
        self.send(WireMessage::Keyboard(KeyboardShortcut { key: key.into() }));
    }
}
