//! Gesture tunables.
//!
//! [`GestureConfig`] is the single source of truth for every threshold,
//! multiplier and rate limit used by the gesture pipeline.  It is owned by the
//! [`GestureEngine`](crate::domain::engine::GestureEngine) and can be adjusted
//! while a session is running through the clamping `set_*` methods or the
//! generic [`GestureConfig::apply`] entry point.
//!
//! # Clamping
//!
//! Every setter clamps its input into a documented range and ignores
//! non-finite input (`NaN`, `±inf`), keeping the previous value.  This means a
//! bad value from a settings slider can degrade responsiveness but can never
//! produce a negative threshold or a zero sensitivity.
//!
//! | Tunable                  | Default | Range          |
//! |--------------------------|---------|----------------|
//! | `sensitivity`            | 6.0     | 0.1 – 100      |
//! | `move_threshold`         | 0.35    | 0 – 100        |
//! | `scroll_sensitivity`     | 30.0    | 0.1 – 1000     |
//! | `scroll_batch_threshold` | 0.02    | 0 – 1000       |
//! | `tap_distance`           | 6.0 px  | 0 – 200        |
//! | `tap_timeout_ms`         | 200     | 0 – 5000       |
//! | `move_throttle_ms`       | 5       | 0 – 1000       |
//! | `swipe_distance`         | 12.0 px | 1 – 1000       |
//! | `coordinate_scale`       | 1.0     | 0.1 – 10       |
//! | `double_tap_interval_ms` | 200     | 0 – 5000       |
//! | `drag_hold_ms`           | 200     | 0 – 5000       |

use serde::{Deserialize, Serialize};

const SENSITIVITY_RANGE: (f64, f64) = (0.1, 100.0);
const MOVE_THRESHOLD_RANGE: (f64, f64) = (0.0, 100.0);
const SCROLL_SENSITIVITY_RANGE: (f64, f64) = (0.1, 1000.0);
const SCROLL_BATCH_RANGE: (f64, f64) = (0.0, 1000.0);
const TAP_DISTANCE_RANGE: (f64, f64) = (0.0, 200.0);
const TAP_TIMEOUT_MAX_MS: u64 = 5000;
const MOVE_THROTTLE_MAX_MS: u64 = 1000;
const SWIPE_DISTANCE_RANGE: (f64, f64) = (1.0, 1000.0);
const COORDINATE_SCALE_RANGE: (f64, f64) = (0.1, 10.0);
const DOUBLE_TAP_MAX_MS: u64 = 5000;

/// All tunables of the gesture pipeline.
///
/// Deserializes with per-field defaults, so a partially written `[gesture]`
/// section in a config file is valid.
///
/// # Example
///
/// ```rust
/// use trackpad_core::domain::config::GestureConfig;
///
/// let mut cfg = GestureConfig::default();
/// assert_eq!(cfg.sensitivity, 6.0);
///
/// // Out-of-range input is clamped, not rejected.
/// cfg.set_sensitivity(-3.0);
/// assert_eq!(cfg.sensitivity, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Multiplier applied to single-finger deltas before thresholding.
    pub sensitivity: f64,
    /// A scaled move is emitted only when `|dx|` or `|dy|` exceeds this.
    pub move_threshold: f64,
    /// Multiplier applied to the averaged two-finger vertical delta.
    pub scroll_sensitivity: f64,
    /// The scroll accumulator flushes once `|accum_y|` reaches this.
    pub scroll_batch_threshold: f64,
    /// Cumulative travel (px) after which a contact can no longer be a tap.
    pub tap_distance: f64,
    /// A contact held this long (ms) or longer is not a tap.
    pub tap_timeout_ms: u64,
    /// Minimum interval (ms) between two processed move batches.
    pub move_throttle_ms: u64,
    /// Three-finger vertical travel (px) that triggers a task-view swipe.
    pub swipe_distance: f64,
    /// Factor applied to raw page coordinates (device pixel ratio).
    pub coordinate_scale: f64,
    /// A touch-down this soon (ms) after a one-finger tap arms a drag.
    pub double_tap_interval_ms: u64,
    /// How long (ms) the armed second touch must stay down before the button
    /// is pressed.
    pub drag_hold_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            sensitivity: 6.0,
            move_threshold: 0.35,
            scroll_sensitivity: 30.0,
            scroll_batch_threshold: 0.02,
            tap_distance: 6.0,
            tap_timeout_ms: 200,
            move_throttle_ms: 5,
            swipe_distance: 12.0,
            coordinate_scale: 1.0,
            double_tap_interval_ms: 200,
            drag_hold_ms: 200,
        }
    }
}

/// Names a single tunable for runtime adjustment.
///
/// Serialized in `snake_case`, e.g. `"scroll_sensitivity"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureSetting {
    Sensitivity,
    MoveThreshold,
    ScrollSensitivity,
    ScrollBatchThreshold,
    TapDistance,
    TapTimeoutMs,
    MoveThrottleMs,
    SwipeDistance,
    CoordinateScale,
    DoubleTapIntervalMs,
    DragHoldMs,
}

/// Clamps `value` into `range`, or returns `current` when `value` is not finite.
fn clamp_or_keep(current: f64, value: f64, range: (f64, f64)) -> f64 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        current
    }
}

impl GestureConfig {
    /// Sets the single-finger move multiplier.  Returns the applied value.
    pub fn set_sensitivity(&mut self, value: f64) -> f64 {
        self.sensitivity = clamp_or_keep(self.sensitivity, value, SENSITIVITY_RANGE);
        self.sensitivity
    }

    /// Sets the minimum scaled delta for a move to be emitted.
    pub fn set_move_threshold(&mut self, value: f64) -> f64 {
        self.move_threshold = clamp_or_keep(self.move_threshold, value, MOVE_THRESHOLD_RANGE);
        self.move_threshold
    }

    /// Sets the two-finger scroll multiplier.
    pub fn set_scroll_sensitivity(&mut self, value: f64) -> f64 {
        self.scroll_sensitivity =
            clamp_or_keep(self.scroll_sensitivity, value, SCROLL_SENSITIVITY_RANGE);
        self.scroll_sensitivity
    }

    /// Sets the accumulated scroll magnitude required for a flush.
    pub fn set_scroll_batch_threshold(&mut self, value: f64) -> f64 {
        self.scroll_batch_threshold =
            clamp_or_keep(self.scroll_batch_threshold, value, SCROLL_BATCH_RANGE);
        self.scroll_batch_threshold
    }

    /// Sets the travel distance that disqualifies a contact from being a tap.
    pub fn set_tap_distance(&mut self, value: f64) -> f64 {
        self.tap_distance = clamp_or_keep(self.tap_distance, value, TAP_DISTANCE_RANGE);
        self.tap_distance
    }

    /// Sets the tap time window in milliseconds.
    pub fn set_tap_timeout_ms(&mut self, value: u64) -> u64 {
        self.tap_timeout_ms = value.min(TAP_TIMEOUT_MAX_MS);
        self.tap_timeout_ms
    }

    /// Sets the move throttle interval in milliseconds.
    pub fn set_move_throttle_ms(&mut self, value: u64) -> u64 {
        self.move_throttle_ms = value.min(MOVE_THROTTLE_MAX_MS);
        self.move_throttle_ms
    }

    /// Sets the three-finger swipe trigger distance.
    pub fn set_swipe_distance(&mut self, value: f64) -> f64 {
        self.swipe_distance = clamp_or_keep(self.swipe_distance, value, SWIPE_DISTANCE_RANGE);
        self.swipe_distance
    }

    /// Sets the coordinate scale (device pixel ratio) applied to raw input.
    pub fn set_coordinate_scale(&mut self, value: f64) -> f64 {
        self.coordinate_scale =
            clamp_or_keep(self.coordinate_scale, value, COORDINATE_SCALE_RANGE);
        self.coordinate_scale
    }

    pub fn set_double_tap_interval_ms(&mut self, value: u64) -> u64 {
        self.double_tap_interval_ms = value.min(DOUBLE_TAP_MAX_MS);
        self.double_tap_interval_ms
    }

    pub fn set_drag_hold_ms(&mut self, value: u64) -> u64 {
        self.drag_hold_ms = value.min(DOUBLE_TAP_MAX_MS);
        self.drag_hold_ms
    }

    /// Applies `value` to the named tunable through its clamping setter.
    ///
    /// Millisecond tunables round to the nearest integer; negative or
    /// non-finite values leave them unchanged.  Returns the value actually
    /// stored.
    pub fn apply(&mut self, setting: GestureSetting, value: f64) -> f64 {
        match setting {
            GestureSetting::Sensitivity => self.set_sensitivity(value),
            GestureSetting::MoveThreshold => self.set_move_threshold(value),
            GestureSetting::ScrollSensitivity => self.set_scroll_sensitivity(value),
            GestureSetting::ScrollBatchThreshold => self.set_scroll_batch_threshold(value),
            GestureSetting::TapDistance => self.set_tap_distance(value),
            GestureSetting::TapTimeoutMs => match millis(value) {
                Some(ms) => self.set_tap_timeout_ms(ms) as f64,
                None => self.tap_timeout_ms as f64,
            },
            GestureSetting::MoveThrottleMs => match millis(value) {
                Some(ms) => self.set_move_throttle_ms(ms) as f64,
                None => self.move_throttle_ms as f64,
            },
            GestureSetting::SwipeDistance => self.set_swipe_distance(value),
            GestureSetting::CoordinateScale => self.set_coordinate_scale(value),
            GestureSetting::DoubleTapIntervalMs => match millis(value) {
                Some(ms) => self.set_double_tap_interval_ms(ms) as f64,
                None => self.double_tap_interval_ms as f64,
            },
            GestureSetting::DragHoldMs => match millis(value) {
                Some(ms) => self.set_drag_hold_ms(ms) as f64,
                None => self.drag_hold_ms as f64,
            },
        }
    }
}

fn millis(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = GestureConfig::default();
        assert_eq!(cfg.sensitivity, 6.0);
        assert_eq!(cfg.move_threshold, 0.35);
        assert_eq!(cfg.scroll_sensitivity, 30.0);
        assert_eq!(cfg.scroll_batch_threshold, 0.02);
        assert_eq!(cfg.tap_distance, 6.0);
        assert_eq!(cfg.tap_timeout_ms, 200);
        assert_eq!(cfg.move_throttle_ms, 5);
        assert_eq!(cfg.swipe_distance, 12.0);
        assert_eq!(cfg.coordinate_scale, 1.0);
        assert_eq!(cfg.double_tap_interval_ms, 200);
        assert_eq!(cfg.drag_hold_ms, 200);
    }

    #[test]
    fn test_set_sensitivity_clamps_to_range() {
        let mut cfg = GestureConfig::default();
        assert_eq!(cfg.set_sensitivity(0.0), 0.1);
        assert_eq!(cfg.set_sensitivity(500.0), 100.0);
        assert_eq!(cfg.set_sensitivity(8.0), 8.0);
    }

    #[test]
    fn test_non_finite_input_keeps_previous_value() {
        // Arrange
        let mut cfg = GestureConfig::default();
        cfg.set_move_threshold(0.5);

        // Act
        let applied = cfg.set_move_threshold(f64::NAN);
        cfg.set_scroll_sensitivity(f64::INFINITY);

        // Assert
        assert_eq!(applied, 0.5);
        assert_eq!(cfg.scroll_sensitivity, 30.0);
    }

    #[test]
    fn test_negative_thresholds_clamp_to_zero() {
        let mut cfg = GestureConfig::default();
        assert_eq!(cfg.set_move_threshold(-1.0), 0.0);
        assert_eq!(cfg.set_scroll_batch_threshold(-1.0), 0.0);
        assert_eq!(cfg.set_tap_distance(-1.0), 0.0);
    }

    #[test]
    fn test_millisecond_setters_cap_at_maximum() {
        let mut cfg = GestureConfig::default();
        assert_eq!(cfg.set_tap_timeout_ms(60_000), 5000);
        assert_eq!(cfg.set_move_throttle_ms(60_000), 1000);
        assert_eq!(cfg.set_double_tap_interval_ms(60_000), 5000);
        assert_eq!(cfg.set_drag_hold_ms(60_000), 5000);
    }

    #[test]
    fn test_apply_routes_to_named_setter() {
        // Arrange
        let mut cfg = GestureConfig::default();

        // Act
        cfg.apply(GestureSetting::ScrollSensitivity, 45.0);
        cfg.apply(GestureSetting::TapTimeoutMs, 250.4);
        cfg.apply(GestureSetting::MoveThrottleMs, -5.0);

        // Assert
        assert_eq!(cfg.scroll_sensitivity, 45.0);
        assert_eq!(cfg.tap_timeout_ms, 250);
        assert_eq!(cfg.move_throttle_ms, 5, "negative ms input is ignored");
    }

    #[test]
    fn test_partial_toml_like_json_uses_field_defaults() {
        // serde(default) lets a config file name only the tunables it changes.
        let cfg: GestureConfig = serde_json::from_str(r#"{"sensitivity": 4.5}"#).unwrap();
        assert_eq!(cfg.sensitivity, 4.5);
        assert_eq!(cfg.move_threshold, 0.35);
    }

    #[test]
    fn test_setting_names_are_snake_case() {
        let s: GestureSetting = serde_json::from_str(r#""scroll_batch_threshold""#).unwrap();
        assert_eq!(s, GestureSetting::ScrollBatchThreshold);
    }
}
