//! TrackpadSession: the per-surface use case.
//!
//! One session corresponds to one trackpad surface.  It lowers pointer and
//! touch events to contact samples, runs them through either the
//! [`GestureEngine`] (gestures mode) or the [`RawStreamer`] (raw mode), and
//! hands every resulting message to the [`CommandDispatcher`].  Discrete UI
//! actions and keyboard input bypass classification entirely.
//!
//! All methods are synchronous and take `&mut self`: input is handled strictly
//! in arrival order and nothing here awaits the network.

use std::time::Instant;

use tracing::{debug, info};
use trackpad_core::protocol::messages::KeyInput;
use trackpad_core::{ContactSample, ContactSource, GestureConfig, GestureEngine, GestureSetting, RawStreamer};

use crate::application::dispatch::CommandDispatcher;
use crate::domain::{InputLine, InputMode};

/// Milliseconds since the session started.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}

pub struct TrackpadSession {
    engine: GestureEngine,
    streamer: RawStreamer,
    dispatcher: CommandDispatcher,
    mode: InputMode,
    clock: SessionClock,
}

impl TrackpadSession {
    pub fn new(config: GestureConfig, mode: InputMode, dispatcher: CommandDispatcher) -> Self {
        Self {
            engine: GestureEngine::new(config),
            streamer: RawStreamer::new(),
            dispatcher,
            mode,
            clock: SessionClock::start(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        self.engine.config()
    }

    /// Handles one input line.
    pub fn handle_line(&mut self, line: InputLine) {
        match line {
            InputLine::Pointer(ev) => self.handle_source(&ev),
            InputLine::Touch(ev) => self.handle_source(&ev),
            InputLine::Key {
                key,
                code,
                alt_key,
                ctrl_key,
                shift_key,
                meta_key,
            } => self.dispatcher.key(KeyInput::Key {
                key,
                code,
                alt_key,
                ctrl_key,
                shift_key,
                meta_key,
            }),
            InputLine::Char { value } | InputLine::Text { value } => self.dispatcher.text(&value),
            InputLine::Media { action } => self.dispatcher.media(action),
            InputLine::Presentation { action } => self.dispatcher.presentation(action),
            InputLine::App { app } => self.dispatcher.app(app),
            InputLine::System { action } => self.dispatcher.system(action),
            InputLine::Keyboard { key } => self.dispatcher.keyboard(key),
            InputLine::Configure { setting, value } => {
                self.apply_setting(setting, value);
            }
        }
    }

    /// Lowers `source` to samples with the configured coordinate scale and
    /// handles them.
    pub fn handle_source(&mut self, source: &dyn ContactSource) {
        let samples = source.samples(self.engine.config().coordinate_scale, self.clock.now_ms());
        self.handle_samples(&samples);
    }

    pub fn handle_samples(&mut self, samples: &[ContactSample]) {
        if samples.is_empty() {
            return;
        }
        match self.mode {
            InputMode::Gestures => {
                for gesture in self.engine.handle(samples) {
                    self.dispatcher.gesture(gesture);
                }
            }
            InputMode::Raw => {
                if let Some(message) = self.streamer.handle(samples) {
                    self.dispatcher.send(message);
                }
            }
        }
    }

    /// One frame of the raw streaming loop.  Returns `false` once streaming
    /// has stopped.
    pub fn stream_tick(&mut self) -> bool {
        match self.streamer.tick(self.clock.now_ms()) {
            Some(snapshot) => {
                self.dispatcher.send(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.mode == InputMode::Raw && self.streamer.is_streaming()
    }

    /// Adjusts one tunable and returns the value actually applied.
    pub fn apply_setting(&mut self, setting: GestureSetting, value: f64) -> f64 {
        let applied = self.engine.apply_setting(setting, value);
        if applied == value {
            info!(?setting, applied, "gesture setting updated");
        } else {
            debug!(?setting, requested = value, applied, "gesture setting clamped");
        }
        applied
    }
}
