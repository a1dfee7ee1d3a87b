//! Discrete remote-control actions triggered by buttons rather than gestures.
//!
//! Media and presentation controls have a fixed vocabulary shared with the
//! remote executor, so they are enums.  App launch targets, system actions and
//! keyboard shortcuts are open-ended tokens that the executor interprets, so
//! they travel as plain strings.

use serde::{Deserialize, Serialize};

/// Media transport controls.  Serialized in `snake_case`, e.g. `"play_pause"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaAction {
    PlayPause,
    VolumeUp,
    VolumeDown,
    Next,
    Prev,
    Mute,
}

/// Slide-deck controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationAction {
    Next,
    Prev,
    Start,
    End,
    /// Blank the screen to black.
    Black,
    /// Blank the screen to white.
    White,
}
