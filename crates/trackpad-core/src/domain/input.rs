//! Contact sources: pointer events and touch events lowered to one shape.
//!
//! Browsers report finger input through two different event families:
//!
//! - **Pointer events** (`pointerdown`, `pointermove`, `pointerrawupdate`,
//!   `pointerup`, `pointercancel`): one event per pointer, optionally with a
//!   list of coalesced samples that arrived within the same frame.
//! - **Touch events** (`touchstart`, `touchmove`, `touchend`, `touchcancel`):
//!   one event per change, listing every touch that changed in
//!   `changedTouches`.
//!
//! Both are lowered by the [`ContactSource`] trait into a list of
//! [`ContactSample`]s that share a single [`ContactPhase`].  Everything
//! downstream (tracker, classifier, raw streamer) only ever sees samples, so
//! the two families never need separate gesture logic.
//!
//! # Coordinate scale
//!
//! Page coordinates are multiplied by a scale factor (normally the device
//! pixel ratio) so that tiny finger motions on high-density screens are not
//! rounded away.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::contact::ContactId;

/// Which kind of device produced a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Touch,
    Pen,
    Mouse,
}

impl PointerKind {
    /// Only fingers and styluses drive the trackpad; a mouse pointer over the
    /// page is ignored.
    pub fn drives_trackpad(self) -> bool {
        matches!(self, PointerKind::Touch | PointerKind::Pen)
    }
}

/// Lifecycle phase shared by every sample produced from one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One position report for one contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSample {
    pub phase: ContactPhase,
    pub id: ContactId,
    /// Scaled X coordinate.
    pub x: f64,
    /// Scaled Y coordinate.
    pub y: f64,
    pub pointer_type: PointerKind,
    /// Milliseconds on the session clock.
    pub time: u64,
}

/// Anything that can be lowered into contact samples.
pub trait ContactSource {
    /// Returns the samples this event contributes.
    ///
    /// `scale` multiplies every coordinate; `now` is used when the event does
    /// not carry its own timestamp.  An empty vector means the event is
    /// irrelevant to the trackpad.
    fn samples(&self, scale: f64, now: u64) -> Vec<ContactSample>;
}

/// `Event.timeStamp` is a fractional millisecond count.  Non-finite values
/// are dropped and negatives clamp to zero.
fn dom_time_stamp<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|t| t.is_finite()).map(|t| t.max(0.0) as u64))
}

// ── Pointer events ────────────────────────────────────────────────────────────

/// DOM pointer event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    PointerDown,
    PointerMove,
    PointerRawUpdate,
    PointerUp,
    PointerCancel,
}

/// A page position inside a coalesced pointer event list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePoint {
    pub page_x: f64,
    pub page_y: f64,
}

/// A pointer event as acquired from the page.
///
/// ```json
/// {"type":"pointermove","pointerId":3,"pointerType":"touch","pageX":10,"pageY":20,
///  "coalesced":[{"pageX":9,"pageY":19},{"pageX":10,"pageY":20}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    #[serde(rename = "type")]
    pub kind: PointerEventKind,
    pub pointer_id: ContactId,
    pub pointer_type: PointerKind,
    pub page_x: f64,
    pub page_y: f64,
    /// Coalesced samples (`getCoalescedEvents()`); empty when unavailable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coalesced: Vec<PagePoint>,
    #[serde(
        default,
        deserialize_with = "dom_time_stamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_stamp: Option<u64>,
}

impl ContactSource for PointerEvent {
    fn samples(&self, scale: f64, now: u64) -> Vec<ContactSample> {
        if !self.pointer_type.drives_trackpad() {
            return Vec::new();
        }

        let phase = match self.kind {
            PointerEventKind::PointerDown => ContactPhase::Start,
            PointerEventKind::PointerMove | PointerEventKind::PointerRawUpdate => {
                ContactPhase::Move
            }
            PointerEventKind::PointerUp => ContactPhase::End,
            PointerEventKind::PointerCancel => ContactPhase::Cancel,
        };
        let time = self.time_stamp.unwrap_or(now);
        let sample = |x: f64, y: f64| ContactSample {
            phase,
            id: self.pointer_id,
            x: x * scale,
            y: y * scale,
            pointer_type: self.pointer_type,
            time,
        };

        // Only move events carry meaningful coalesced lists.
        if phase == ContactPhase::Move && !self.coalesced.is_empty() {
            self.coalesced
                .iter()
                .map(|p| sample(p.page_x, p.page_y))
                .collect()
        } else {
            vec![sample(self.page_x, self.page_y)]
        }
    }
}

// ── Touch events ──────────────────────────────────────────────────────────────

/// DOM touch event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchEventKind {
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

/// One entry of `changedTouches`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    pub identifier: ContactId,
    pub page_x: f64,
    pub page_y: f64,
}

/// A touch event as acquired from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchEvent {
    #[serde(rename = "type")]
    pub kind: TouchEventKind,
    pub changed_touches: Vec<TouchPoint>,
    #[serde(
        default,
        deserialize_with = "dom_time_stamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_stamp: Option<u64>,
}

impl ContactSource for TouchEvent {
    fn samples(&self, scale: f64, now: u64) -> Vec<ContactSample> {
        let phase = match self.kind {
            TouchEventKind::TouchStart => ContactPhase::Start,
            TouchEventKind::TouchMove => ContactPhase::Move,
            TouchEventKind::TouchEnd => ContactPhase::End,
            TouchEventKind::TouchCancel => ContactPhase::Cancel,
        };
        let time = self.time_stamp.unwrap_or(now);

        self.changed_touches
            .iter()
            .map(|t| ContactSample {
                phase,
                id: t.identifier,
                x: t.page_x * scale,
                y: t.page_y * scale,
                pointer_type: PointerKind::Touch,
                time,
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(kind: PointerEventKind, pointer_type: PointerKind) -> PointerEvent {
        PointerEvent {
            kind,
            pointer_id: 7,
            pointer_type,
            page_x: 10.0,
            page_y: 20.0,
            coalesced: Vec::new(),
            time_stamp: None,
        }
    }

    #[test]
    fn test_pointer_down_lowers_to_single_start_sample() {
        // Arrange
        let ev = pointer(PointerEventKind::PointerDown, PointerKind::Touch);

        // Act
        let samples = ev.samples(1.0, 42);

        // Assert
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].phase, ContactPhase::Start);
        assert_eq!(samples[0].id, 7);
        assert_eq!((samples[0].x, samples[0].y), (10.0, 20.0));
        assert_eq!(samples[0].time, 42);
    }

    #[test]
    fn test_mouse_pointer_is_ignored() {
        let ev = pointer(PointerEventKind::PointerDown, PointerKind::Mouse);
        assert!(ev.samples(1.0, 0).is_empty());
    }

    #[test]
    fn test_pen_pointer_drives_trackpad() {
        let ev = pointer(PointerEventKind::PointerUp, PointerKind::Pen);
        let samples = ev.samples(1.0, 0);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].phase, ContactPhase::End);
    }

    #[test]
    fn test_coalesced_move_expands_to_every_sample() {
        // Arrange
        let mut ev = pointer(PointerEventKind::PointerRawUpdate, PointerKind::Touch);
        ev.coalesced = vec![
            PagePoint { page_x: 1.0, page_y: 1.0 },
            PagePoint { page_x: 2.0, page_y: 3.0 },
        ];

        // Act
        let samples = ev.samples(2.0, 0);

        // Assert: scale applies to each coalesced sample
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.phase == ContactPhase::Move));
        assert_eq!((samples[1].x, samples[1].y), (4.0, 6.0));
    }

    #[test]
    fn test_event_timestamp_wins_over_clock() {
        let mut ev = pointer(PointerEventKind::PointerMove, PointerKind::Touch);
        ev.time_stamp = Some(900);
        assert_eq!(ev.samples(1.0, 5)[0].time, 900);
    }

    #[test]
    fn test_touch_end_lowers_every_changed_touch() {
        // Arrange
        let ev = TouchEvent {
            kind: TouchEventKind::TouchEnd,
            changed_touches: vec![
                TouchPoint { identifier: 0, page_x: 5.0, page_y: 5.0 },
                TouchPoint { identifier: 1, page_x: 9.0, page_y: 9.0 },
            ],
            time_stamp: Some(10),
        };

        // Act
        let samples = ev.samples(1.0, 0);

        // Assert
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.phase == ContactPhase::End));
        assert_eq!(samples[1].id, 1);
        assert_eq!(samples[1].pointer_type, PointerKind::Touch);
    }

    #[test]
    fn test_pointer_event_deserializes_from_dom_shape() {
        let json = r#"{"type":"pointercancel","pointerId":2,"pointerType":"pen","pageX":1.5,"pageY":2.5}"#;
        let ev: PointerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.kind, PointerEventKind::PointerCancel);
        assert_eq!(ev.pointer_type, PointerKind::Pen);
        assert!(ev.coalesced.is_empty());
    }

    #[test]
    fn test_fractional_time_stamp_truncates_to_whole_millis() {
        // Arrange
        let json = r#"{"type":"pointerup","pointerId":1,"pointerType":"touch","pageX":0,"pageY":0,"timeStamp":150.75}"#;

        // Act
        let ev: PointerEvent = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(ev.time_stamp, Some(150));
        assert_eq!(ev.samples(1.0, 0)[0].time, 150);
    }

    #[test]
    fn test_negative_time_stamp_clamps_to_zero() {
        let json = r#"{"type":"touchend","changedTouches":[],"timeStamp":-3.5}"#;
        let ev: TouchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.time_stamp, Some(0));
    }

    #[test]
    fn test_null_time_stamp_falls_back_to_clock() {
        let json = r#"{"type":"touchstart","changedTouches":[{"identifier":0,"pageX":1,"pageY":1}],"timeStamp":null}"#;
        let ev: TouchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.time_stamp, None);
        assert_eq!(ev.samples(1.0, 77)[0].time, 77);
    }

    #[test]
    fn test_touch_event_deserializes_from_dom_shape() {
        let json = r#"{"type":"touchmove","changedTouches":[{"identifier":4,"pageX":3,"pageY":4}]}"#;
        let ev: TouchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.kind, TouchEventKind::TouchMove);
        assert_eq!(ev.changed_touches[0].identifier, 4);
    }
}
