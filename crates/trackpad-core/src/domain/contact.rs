//! Contact Tracker: per-finger state from touch-down to touch-up.
//!
//! Every finger (or stylus) on the trackpad surface is a [`Contact`].  The
//! tracker creates one on contact-start, updates it on every raw sample
//! (including samples the move throttle later drops) and hands back a final
//! snapshot on contact-end so the classifier can judge whether it was a tap.
//!
//! # Invariants
//!
//! 1. At most one live contact per [`ContactId`]; starting an id that is
//!    already tracked replaces it.
//! 2. `total_distance` never decreases and equals the sum of the Euclidean
//!    lengths of every update step.
//! 3. Once `has_moved` is set it stays set for the contact's lifetime, even if
//!    the finger returns to where it started.

use std::collections::HashMap;

use crate::domain::input::PointerKind;

/// Identifier of a contact, unique among simultaneously live contacts.
///
/// Pointer events supply `pointerId`; touch events supply `identifier`.
pub type ContactId = i64;

/// One tracked finger or pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub pointer_type: PointerKind,
    pub start_x: f64,
    pub start_y: f64,
    pub last_x: f64,
    pub last_y: f64,
    /// Milliseconds on the session clock.
    pub start_time: u64,
    /// Set once `total_distance` exceeds the tap distance.
    pub has_moved: bool,
    /// Accumulated Euclidean travel since start.
    pub total_distance: f64,
}

/// Result of applying one position sample to a tracked contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactStep {
    pub delta_x: f64,
    pub delta_y: f64,
    /// Euclidean length of the step.
    pub distance: f64,
}

/// Owns every live [`Contact`].
#[derive(Debug, Clone)]
pub struct ContactTracker {
    contacts: HashMap<ContactId, Contact>,
    tap_distance: f64,
}

impl ContactTracker {
    /// Creates an empty tracker; contacts that travel further than
    /// `tap_distance` pixels are marked as moved.
    pub fn new(tap_distance: f64) -> Self {
        Self {
            contacts: HashMap::new(),
            tap_distance,
        }
    }

    /// Changes the movement threshold for subsequent updates.
    ///
    /// Contacts already marked as moved stay moved.
    pub fn set_tap_distance(&mut self, tap_distance: f64) {
        self.tap_distance = tap_distance;
    }

    /// Begins tracking a contact at `(x, y)`.
    ///
    /// An existing contact with the same id is silently overwritten.
    pub fn start(&mut self, id: ContactId, x: f64, y: f64, time: u64, pointer_type: PointerKind) {
        self.contacts.insert(
            id,
            Contact {
                id,
                pointer_type,
                start_x: x,
                start_y: y,
                last_x: x,
                last_y: y,
                start_time: time,
                has_moved: false,
                total_distance: 0.0,
            },
        );
    }

    /// Moves a contact to `(x, y)` and returns the step taken.
    ///
    /// Returns `None` (and changes nothing) when `id` is not tracked.
    pub fn update(&mut self, id: ContactId, x: f64, y: f64) -> Option<ContactStep> {
        let contact = self.contacts.get_mut(&id)?;

        let delta_x = x - contact.last_x;
        let delta_y = y - contact.last_y;
        let distance = delta_x.hypot(delta_y);

        contact.last_x = x;
        contact.last_y = y;
        contact.total_distance += distance;
        if contact.total_distance > self.tap_distance {
            contact.has_moved = true;
        }

        Some(ContactStep {
            delta_x,
            delta_y,
            distance,
        })
    }

    /// Stops tracking a contact and returns its final state.
    ///
    /// Idempotent: a second call for the same id returns `None`.
    pub fn end(&mut self, id: ContactId) -> Option<Contact> {
        self.contacts.remove(&id)
    }

    /// Number of live contacts.
    pub fn count(&self) -> usize {
        self.contacts.len()
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// Live contacts ordered by id, so per-gesture math is deterministic.
    pub fn contacts(&self) -> Vec<&Contact> {
        let mut live: Vec<&Contact> = self.contacts.values().collect();
        live.sort_by_key(|c| c.id);
        live
    }

    /// `true` if any live contact has crossed the tap distance.
    pub fn any_moved(&self) -> bool {
        self.contacts.values().any(|c| c.has_moved)
    }

    /// Forgets every contact.
    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new(6.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(id: ContactId, x: f64, y: f64) -> ContactTracker {
        let mut t = ContactTracker::new(6.0);
        t.start(id, x, y, 1_000, PointerKind::Touch);
        t
    }

    #[test]
    fn test_start_initialises_start_and_last_to_same_point() {
        // Arrange / Act
        let t = tracker_with(1, 10.0, 20.0);

        // Assert
        let c = t.get(1).unwrap();
        assert_eq!((c.start_x, c.start_y), (10.0, 20.0));
        assert_eq!((c.last_x, c.last_y), (10.0, 20.0));
        assert_eq!(c.start_time, 1_000);
        assert!(!c.has_moved);
        assert_eq!(c.total_distance, 0.0);
    }

    #[test]
    fn test_start_with_existing_id_overwrites() {
        let mut t = tracker_with(1, 0.0, 0.0);
        t.update(1, 50.0, 0.0);

        t.start(1, 5.0, 5.0, 2_000, PointerKind::Pen);

        let c = t.get(1).unwrap();
        assert_eq!(t.count(), 1);
        assert_eq!(c.total_distance, 0.0);
        assert_eq!(c.pointer_type, PointerKind::Pen);
    }

    #[test]
    fn test_update_returns_step_and_accumulates_distance() {
        // Arrange
        let mut t = tracker_with(1, 0.0, 0.0);

        // Act
        let step = t.update(1, 3.0, 4.0).unwrap();

        // Assert
        assert_eq!(step.delta_x, 3.0);
        assert_eq!(step.delta_y, 4.0);
        assert_eq!(step.distance, 5.0);
        assert_eq!(t.get(1).unwrap().total_distance, 5.0);
        assert!(!t.get(1).unwrap().has_moved, "5px is within the 6px tap distance");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut t = tracker_with(1, 0.0, 0.0);
        assert!(t.update(99, 1.0, 1.0).is_none());
        assert_eq!(t.count(), 1);
    }

    #[test]
    fn test_has_moved_latches_even_after_returning_to_start() {
        // Arrange
        let mut t = tracker_with(1, 0.0, 0.0);

        // Act: travel 8px out and come straight back
        t.update(1, 8.0, 0.0);
        t.update(1, 0.0, 0.0);

        // Assert
        let c = t.get(1).unwrap();
        assert!(c.has_moved);
        assert_eq!(c.total_distance, 16.0);
        assert_eq!((c.last_x, c.last_y), (c.start_x, c.start_y));
    }

    #[test]
    fn test_total_distance_is_monotonic_sum_of_steps() {
        // Arrange
        let mut t = tracker_with(1, 0.0, 0.0);
        let path = [(1.0, 1.0), (0.5, 2.0), (-3.0, 2.0), (-3.0, -4.0), (0.0, 0.0)];

        // Act
        let mut expected = 0.0;
        let mut previous = 0.0;
        for (x, y) in path {
            expected += t.update(1, x, y).unwrap().distance;
            let now = t.get(1).unwrap().total_distance;
            assert!(now >= previous, "total distance must never decrease");
            previous = now;
        }

        // Assert
        assert!((t.get(1).unwrap().total_distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_end_returns_snapshot_and_is_idempotent() {
        let mut t = tracker_with(1, 0.0, 0.0);

        let first = t.end(1);
        let second = t.end(1);

        assert_eq!(first.map(|c| c.id), Some(1));
        assert!(second.is_none());
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn test_contacts_are_sorted_by_id() {
        let mut t = ContactTracker::default();
        t.start(5, 0.0, 0.0, 0, PointerKind::Touch);
        t.start(2, 0.0, 0.0, 0, PointerKind::Touch);
        t.start(9, 0.0, 0.0, 0, PointerKind::Touch);

        let ids: Vec<ContactId> = t.contacts().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
