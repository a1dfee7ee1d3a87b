//! Rate/Threshold Policy: how often moves are processed and when scrolls flush.
//!
//! Two small state machines bound the outbound message rate:
//!
//! - [`MoveThrottle`] admits at most one move batch per interval.  It is one
//!   global gate for the whole surface, not one per contact.  A rejected batch
//!   is dropped, not queued (the contact tracker still records it).
//! - [`ScrollAccumulator`] buffers small two-finger scroll increments and
//!   releases them once their magnitude reaches the batch threshold.

/// Residual vertical scroll above this is still emitted when a two-finger
/// gesture ends.
pub const RESIDUAL_FLUSH_FLOOR: f64 = 0.02;

/// Wall-clock gate for move batches.
#[derive(Debug, Clone)]
pub struct MoveThrottle {
    interval_ms: u64,
    last: Option<u64>,
}

impl MoveThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last: None,
        }
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Returns `true` and records `now` if a batch at `now` may be processed.
    ///
    /// The first batch is always admitted.  A clock that runs backwards is
    /// treated as "interval not elapsed".
    pub fn admit(&mut self, now: u64) -> bool {
        let open = match self.last {
            None => true,
            Some(last) => now.checked_sub(last).is_some_and(|dt| dt >= self.interval_ms),
        };
        if open {
            self.last = Some(now);
        }
        open
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Buffered sub-threshold scroll magnitude.
///
/// Only the vertical counter is ever flushed; the horizontal counter is kept
/// so both can be reset together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollAccumulator {
    accum_x: f64,
    accum_y: f64,
}

impl ScrollAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one scroll increment.  Returns the vertical amount to emit when
    /// `|accum_y| >= threshold`, resetting the vertical counter to zero.
    pub fn add(&mut self, scroll_x: f64, scroll_y: f64, threshold: f64) -> Option<f64> {
        self.accum_x += scroll_x;
        self.accum_y += scroll_y;
        if self.accum_y.abs() >= threshold {
            let flushed = self.accum_y;
            self.accum_y = 0.0;
            Some(flushed)
        } else {
            None
        }
    }

    /// Ends the two-finger gesture.
    ///
    /// Returns the residual vertical amount if `|accum_y| > floor`; both
    /// counters are zeroed either way.
    pub fn finish(&mut self, floor: f64) -> Option<f64> {
        let residual = self.accum_y;
        self.reset();
        (residual.abs() > floor).then_some(residual)
    }

    pub fn reset(&mut self) {
        self.accum_x = 0.0;
        self.accum_y = 0.0;
    }

    pub fn accum_x(&self) -> f64 {
        self.accum_x
    }

    pub fn accum_y(&self) -> f64 {
        self.accum_y
    }
}
