//! Raw pointer streaming.
//!
//! In raw mode no gesture is classified on this side.  Every contact sample is
//! forwarded to the executor as a raw pointer event, and while at least one
//! contact is down a periodic snapshot of every live contact's latest
//! position is sent as well.  The caller drives the snapshot with
//! [`RawStreamer::tick`] at frame rate; the stream stops by itself once the
//! last contact lifts.

use std::collections::BTreeMap;

use crate::domain::contact::ContactId;
use crate::domain::input::{ContactPhase, ContactSample};
use crate::protocol::messages::{RawPhase, RawPointerEvent, WireMessage};

/// Latest known position of every live contact.
#[derive(Debug, Clone, Default)]
pub struct RawStreamer {
    latest: BTreeMap<ContactId, RawPointerEvent>,
    streaming: bool,
}

impl RawStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the samples of one input event and returns the message that
    /// forwards them: a single `raw.<phase>` event, or `raw.batch` when the
    /// event carried several samples.
    pub fn handle(&mut self, samples: &[ContactSample]) -> Option<WireMessage> {
        let mut events: Vec<RawPointerEvent> = samples
            .iter()
            .map(|s| {
                let phase = match s.phase {
                    ContactPhase::Start => RawPhase::Down,
                    ContactPhase::Move => RawPhase::Move,
                    ContactPhase::End | ContactPhase::Cancel => RawPhase::Up,
                };
                let event = RawPointerEvent {
                    phase,
                    id: s.id,
                    x: s.x,
                    y: s.y,
                    pointer_type: s.pointer_type,
                    time: s.time,
                };
                match phase {
                    RawPhase::Up => {
                        self.latest.remove(&s.id);
                    }
                    RawPhase::Down => {
                        self.latest.insert(s.id, event.clone());
                    }
                    // Only a down makes a contact live.
                    RawPhase::Move => {
                        if let Some(slot) = self.latest.get_mut(&s.id) {
                            *slot = event.clone();
                        }
                    }
                }
                event
            })
            .collect();

        self.streaming = !self.latest.is_empty();

        match events.len() {
            0 => None,
            1 => events.pop().map(WireMessage::Raw),
            _ => Some(WireMessage::RawBatch(events)),
        }
    }

    /// One frame of the streaming loop: a `raw.batch` snapshot of every live
    /// contact stamped with `now`.
    ///
    /// Returns `None`, and stops streaming, when no contact is live.
    pub fn tick(&mut self, now: u64) -> Option<WireMessage> {
        if !self.streaming {
            return None;
        }
        if self.latest.is_empty() {
            self.streaming = false;
            return None;
        }
        let snapshot = self
            .latest
            .values()
            .map(|ev| RawPointerEvent {
                phase: RawPhase::Move,
                time: now,
                ..ev.clone()
            })
            .collect();
        Some(WireMessage::RawBatch(snapshot))
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn live_count(&self) -> usize {
        self.latest.len()
    }

    pub fn reset(&mut self) {
        self.latest.clear();
        self.streaming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::PointerKind;

    fn sample(phase: ContactPhase, id: ContactId, x: f64, time: u64) -> ContactSample {
        ContactSample {
            phase,
            id,
            x,
            y: 0.0,
            pointer_type: PointerKind::Touch,
            time,
        }
    }

    #[test]
    fn test_single_down_is_forwarded_as_raw_down_and_starts_stream() {
        // Arrange
        let mut streamer = RawStreamer::new();

        // Act
        let msg = streamer.handle(&[sample(ContactPhase::Start, 1, 5.0, 10)]);

        // Assert
        assert_eq!(msg.unwrap().channel_event(), "raw.down");
        assert!(streamer.is_streaming());
    }

    #[test]
    fn test_multi_sample_event_is_one_batch() {
        let mut streamer = RawStreamer::new();
        let msg = streamer.handle(&[
            sample(ContactPhase::Start, 1, 0.0, 0),
            sample(ContactPhase::Start, 2, 9.0, 0),
        ]);
        match msg {
            Some(WireMessage::RawBatch(events)) => assert_eq!(events.len(), 2),
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn test_tick_snapshots_latest_positions_with_current_time() {
        // Arrange
        let mut streamer = RawStreamer::new();
        streamer.handle(&[sample(ContactPhase::Start, 1, 0.0, 0)]);
        streamer.handle(&[sample(ContactPhase::Move, 1, 7.5, 8)]);

        // Act
        let msg = streamer.tick(16);

        // Assert
        match msg {
            Some(WireMessage::RawBatch(events)) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].x, 7.5);
                assert_eq!(events[0].time, 16);
                assert_eq!(events[0].phase, RawPhase::Move);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_stream_stops_when_last_contact_lifts() {
        let mut streamer = RawStreamer::new();
        streamer.handle(&[sample(ContactPhase::Start, 1, 0.0, 0)]);

        let up = streamer.handle(&[sample(ContactPhase::Cancel, 1, 0.0, 5)]);

        assert_eq!(up.unwrap().channel_event(), "raw.up");
        assert!(!streamer.is_streaming());
        assert!(streamer.tick(16).is_none());
    }

    #[test]
    fn test_move_for_unknown_contact_is_forwarded_but_never_streams() {
        // Arrange
        let mut streamer = RawStreamer::new();

        // Act
        let msg = streamer.handle(&[sample(ContactPhase::Move, 9, 3.0, 4)]);

        // Assert
        assert_eq!(msg.unwrap().channel_event(), "raw.move");
        assert!(!streamer.is_streaming());
        assert_eq!(streamer.live_count(), 0);
        assert!(streamer.tick(16).is_none());
    }

    #[test]
    fn test_tick_without_contacts_is_none() {
        let mut streamer = RawStreamer::new();
        assert!(streamer.tick(0).is_none());
        assert!(!streamer.is_streaming());
    }
}
