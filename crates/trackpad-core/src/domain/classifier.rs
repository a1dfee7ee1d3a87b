//! Gesture Classifier: turns contact motion into move, scroll, tap and swipe
//! intents.
//!
//! The classifier is a set of pure decisions.  It never touches the contact
//! tracker or the rate policy; the [`GestureEngine`](crate::domain::engine::GestureEngine)
//! feeds it the numbers and decides what to do with the answers.
//!
//! | Live contacts | Interpretation                                  |
//! |---------------|-------------------------------------------------|
//! | 1             | relative pointer move                           |
//! | 2             | vertical scroll (natural direction)             |
//! | 3             | vertical swipe (task view / exit task view)     |
//! | 0, 4+         | nothing                                         |
//!
//! Taps are judged separately, when a contact ends.

use crate::domain::config::GestureConfig;
use crate::domain::contact::Contact;
use crate::protocol::messages::MouseButton;

/// Scales a single-finger delta by the sensitivity and applies the move
/// threshold.
///
/// Returns `None` when both scaled components are within the threshold.
/// Sub-threshold motion is discarded, not carried into the next sample.
pub fn classify_move(delta_x: f64, delta_y: f64, config: &GestureConfig) -> Option<(f64, f64)> {
    let dx = delta_x * config.sensitivity;
    let dy = delta_y * config.sensitivity;
    if dx.abs() > config.move_threshold || dy.abs() > config.move_threshold {
        Some((dx, dy))
    } else {
        None
    }
}

/// Two-finger scroll increment from the averaged per-contact delta.
///
/// Both axes are inverted so content follows the fingers.  The horizontal
/// component is returned for the accumulator but never emitted.
pub fn scroll_increment(avg_dx: f64, avg_dy: f64, config: &GestureConfig) -> (f64, f64) {
    (
        -avg_dx * config.scroll_sensitivity,
        -avg_dy * config.scroll_sensitivity,
    )
}

/// Judges whether an ended contact was a tap and which button it clicks.
///
/// `concurrent` is the number of live contacts at release, including this
/// one.  A tap needs `has_moved == false` and a hold time strictly below the
/// tap timeout.  Four or more fingers never click.
pub fn tap_button(
    contact: &Contact,
    now: u64,
    concurrent: usize,
    config: &GestureConfig,
) -> Option<MouseButton> {
    if contact.has_moved {
        return None;
    }
    let held = now.saturating_sub(contact.start_time);
    if held >= config.tap_timeout_ms {
        return None;
    }
    match concurrent {
        1 => Some(MouseButton::Left),
        2 => Some(MouseButton::Right),
        3 => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Direction of a completed three-finger swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Fingers moved up the screen.
    Up,
    /// Fingers moved down the screen.
    Down,
}

/// Accumulated three-finger vertical travel.
///
/// Each direction fires at most once per gesture; [`SwipeTracker::reset`] is
/// called when fewer than three fingers remain.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    travel: f64,
    fired_up: bool,
    fired_down: bool,
}

impl SwipeTracker {
    /// Adds one averaged vertical delta (screen coordinates, down positive).
    pub fn add(&mut self, avg_dy: f64, distance: f64) -> Option<SwipeDirection> {
        self.travel -= avg_dy;
        if self.travel >= distance && !self.fired_up {
            self.fired_up = true;
            Some(SwipeDirection::Up)
        } else if self.travel <= -distance && !self.fired_down {
            self.fired_down = true;
            Some(SwipeDirection::Down)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn travel(&self) -> f64 {
        self.travel
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
