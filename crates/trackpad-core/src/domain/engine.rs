//! Gesture engine: contact samples in, gestures out.
//!
//! [`GestureEngine`] owns the contact tracker, the rate/threshold policy and
//! the gesture-level latches, and applies the classifier to every batch of
//! samples produced by one input event.
//!
//! # Pipeline
//!
//! ```text
//! ContactSample batch
//!   │
//!   ├─ start ──► tracker.start()                       (new gesture if none live)
//!   │
//!   ├─ move ───► tracker.update() for every sample     (always, even if throttled)
//!   │            throttle gate ──► count 1: classify_move
//!   │                              count 2: scroll_increment ► accumulator
//!   │                              count 3: swipe tracker
//!   │
//!   └─ end ────► tracker.end() ──► first release of the gesture may tap
//!                                  count < 2: flush scroll residual
//!                                  count < 3: reset swipe
//!                                  count 0: gesture over
//! ```
//!
//! # Tap latches
//!
//! Only the first release of a gesture is judged as a tap, using the live
//! count just before that release.  A two-finger tap therefore yields a single
//! right click no matter how the lifts are reported, and a four-finger tap
//! yields nothing at all.  A gesture in which any contact has moved beyond the
//! tap distance never taps.
//!
//! # Double-tap drag
//!
//! A one-finger tap followed within `double_tap_interval_ms` by a new
//! one-finger touch arms a drag.  Once that touch has been down for
//! `drag_hold_ms` its next move presses the left button
//! ([`Gesture::DragStart`]); moves keep flowing as usual and the last lift
//! releases the button ([`Gesture::DragEnd`]).  Lifting the armed touch
//! quickly instead is an ordinary left tap, which the host sees as the second
//! half of a double click; it does not arm another drag.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::domain::classifier::{
    classify_move, scroll_increment, tap_button, SwipeDirection, SwipeTracker,
};
use crate::domain::config::{GestureConfig, GestureSetting};
use crate::domain::contact::{ContactId, ContactTracker};
use crate::domain::input::{ContactPhase, ContactSample};
use crate::domain::policy::{MoveThrottle, ScrollAccumulator, RESIDUAL_FLUSH_FLOOR};
use crate::protocol::messages::{Click, MouseButton, MoveDelta, ScrollDelta, WireMessage};

/// A classified intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Move { delta_x: f64, delta_y: f64 },
    /// `scroll_x` is always `0.0`; scrolling is vertical-only.
    Scroll { scroll_x: f64, scroll_y: f64 },
    Tap { button: MouseButton },
    Swipe(SwipeDirection),
    /// Left button pressed for a double-tap drag.
    DragStart,
    /// Left button released at the end of a double-tap drag.
    DragEnd,
}

impl From<Gesture> for WireMessage {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Move { delta_x, delta_y } => WireMessage::Move(MoveDelta { delta_x, delta_y }),
            Gesture::Scroll { scroll_x, scroll_y } => {
                WireMessage::Scroll(ScrollDelta { scroll_x, scroll_y })
            }
            Gesture::Tap { button } => WireMessage::Click(Click { button }),
            Gesture::Swipe(SwipeDirection::Up) => WireMessage::TaskView,
            Gesture::Swipe(SwipeDirection::Down) => WireMessage::TaskViewExit,
            Gesture::DragStart => WireMessage::MouseDown,
            Gesture::DragEnd => WireMessage::MouseUp,
        }
    }
}

/// Stateful gesture interpreter for one trackpad surface.
#[derive(Debug, Clone)]
pub struct GestureEngine {
    config: GestureConfig,
    tracker: ContactTracker,
    throttle: MoveThrottle,
    scroll: ScrollAccumulator,
    swipe: SwipeTracker,
    /// The first release of the current gesture has been judged.
    release_judged: bool,
    /// Some contact of the current gesture crossed the tap distance.
    gesture_moved: bool,
    /// Release time of the last one-finger tap that may start a double tap.
    last_tap: Option<u64>,
    /// Touch-down time of a second tap that becomes a drag if held.
    drag_armed: Option<u64>,
    /// The left button is held for a double-tap drag.
    dragging: bool,
}

impl GestureEngine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            tracker: ContactTracker::new(config.tap_distance),
            throttle: MoveThrottle::new(config.move_throttle_ms),
            scroll: ScrollAccumulator::new(),
            swipe: SwipeTracker::default(),
            release_judged: false,
            gesture_moved: false,
            last_tap: None,
            drag_armed: None,
            dragging: false,
            config,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Adjusts one tunable at runtime and returns the value actually applied.
    pub fn apply_setting(&mut self, setting: GestureSetting, value: f64) -> f64 {
        let applied = self.config.apply(setting, value);
        self.tracker.set_tap_distance(self.config.tap_distance);
        self.throttle.set_interval_ms(self.config.move_throttle_ms);
        debug!(?setting, requested = value, applied, "gesture setting changed");
        applied
    }

    /// Number of contacts currently on the surface.
    pub fn live_count(&self) -> usize {
        self.tracker.count()
    }

    pub fn tracker(&self) -> &ContactTracker {
        &self.tracker
    }

    /// Drops every contact and all buffered state.
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.throttle.reset();
        self.scroll.reset();
        self.swipe.reset();
        self.release_judged = false;
        self.gesture_moved = false;
        self.last_tap = None;
        self.drag_armed = None;
        self.dragging = false;
    }

    /// Processes the samples of one input event.
    ///
    /// Consecutive samples with the same phase are handled as one batch; a
    /// typical event carries a single phase.
    pub fn handle(&mut self, samples: &[ContactSample]) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        let mut rest = samples;
        while let Some(first) = rest.first() {
            let run = rest
                .iter()
                .position(|s| s.phase != first.phase)
                .unwrap_or(rest.len());
            let (batch, tail) = rest.split_at(run);
            match first.phase {
                ContactPhase::Start => self.on_start(batch),
                ContactPhase::Move => self.on_move(batch, &mut gestures),
                ContactPhase::End => self.on_release(batch, false, &mut gestures),
                ContactPhase::Cancel => self.on_release(batch, true, &mut gestures),
            }
            rest = tail;
        }
        gestures
    }

    fn on_start(&mut self, batch: &[ContactSample]) {
        if self.tracker.count() == 0 {
            self.release_judged = false;
            self.gesture_moved = false;
            if let (Some(tapped), [first]) = (self.last_tap.take(), batch) {
                let quick = first
                    .time
                    .checked_sub(tapped)
                    .is_some_and(|dt| dt <= self.config.double_tap_interval_ms);
                if quick {
                    trace!(at = first.time, "double-tap drag armed");
                    self.drag_armed = Some(first.time);
                }
            }
        } else {
            // A second finger turns the armed touch into a multi-finger gesture.
            self.drag_armed = None;
        }
        for s in batch {
            self.tracker.start(s.id, s.x, s.y, s.time, s.pointer_type);
        }
        trace!(live = self.tracker.count(), "contact start");
    }

    fn on_move(&mut self, batch: &[ContactSample], out: &mut Vec<Gesture>) {
        // Bookkeeping happens for every sample, throttled or not.
        let mut deltas: BTreeMap<ContactId, (f64, f64)> = BTreeMap::new();
        for s in batch {
            if let Some(step) = self.tracker.update(s.id, s.x, s.y) {
                let entry = deltas.entry(s.id).or_insert((0.0, 0.0));
                entry.0 += step.delta_x;
                entry.1 += step.delta_y;
            }
        }
        if self.tracker.any_moved() {
            self.gesture_moved = true;
        }
        if deltas.is_empty() {
            return;
        }

        let now = batch.iter().map(|s| s.time).max().unwrap_or_default();
        if let Some(armed_at) = self.drag_armed {
            if now.saturating_sub(armed_at) >= self.config.drag_hold_ms {
                self.drag_armed = None;
                self.dragging = true;
                debug!("double-tap drag started");
                out.push(Gesture::DragStart);
            }
        }

        if !self.throttle.admit(now) {
            trace!(now, "move batch throttled");
            return;
        }

        let count = self.tracker.count();
        let (sum_x, sum_y) = deltas
            .values()
            .fold((0.0, 0.0), |(ax, ay), (dx, dy)| (ax + dx, ay + dy));
        let avg_x = sum_x / count as f64;
        let avg_y = sum_y / count as f64;

        match count {
            1 => {
                if let Some((delta_x, delta_y)) = classify_move(avg_x, avg_y, &self.config) {
                    out.push(Gesture::Move { delta_x, delta_y });
                }
            }
            2 => {
                let (sx, sy) = scroll_increment(avg_x, avg_y, &self.config);
                if let Some(scroll_y) = self.scroll.add(sx, sy, self.config.scroll_batch_threshold)
                {
                    out.push(Gesture::Scroll {
                        scroll_x: 0.0,
                        scroll_y,
                    });
                }
            }
            3 => {
                if let Some(direction) = self.swipe.add(avg_y, self.config.swipe_distance) {
                    debug!(?direction, "three-finger swipe");
                    out.push(Gesture::Swipe(direction));
                }
            }
            _ => {}
        }
    }

    fn on_release(&mut self, batch: &[ContactSample], cancelled: bool, out: &mut Vec<Gesture>) {
        let concurrent = self.tracker.count();

        for s in batch {
            // The release position still counts toward travel.
            self.tracker.update(s.id, s.x, s.y);
            let Some(contact) = self.tracker.end(s.id) else {
                continue;
            };
            if contact.has_moved {
                self.gesture_moved = true;
            }
            if self.release_judged {
                continue;
            }
            self.release_judged = true;

            if cancelled || self.gesture_moved || self.dragging {
                continue;
            }
            match tap_button(&contact, s.time, concurrent, &self.config) {
                Some(MouseButton::Left) => {
                    out.push(Gesture::Tap {
                        button: MouseButton::Left,
                    });
                    // The second tap of a double click never arms another drag.
                    if self.drag_armed.take().is_none() {
                        self.last_tap = Some(s.time);
                    }
                }
                Some(button) => out.push(Gesture::Tap { button }),
                None if concurrent >= 4 => {
                    debug!(fingers = concurrent, "tap with four or more fingers ignored");
                }
                None => {}
            }
        }

        let remaining = self.tracker.count();
        if remaining < 2 {
            if let Some(scroll_y) = self.scroll.finish(RESIDUAL_FLUSH_FLOOR) {
                out.push(Gesture::Scroll {
                    scroll_x: 0.0,
                    scroll_y,
                });
            }
        }
        if remaining < 3 {
            self.swipe.reset();
        }
        if remaining == 0 {
            self.drag_armed = None;
            if self.dragging {
                self.dragging = false;
                debug!("double-tap drag released");
                out.push(Gesture::DragEnd);
            }
        }
        trace!(live = remaining, cancelled, "contact release");
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
