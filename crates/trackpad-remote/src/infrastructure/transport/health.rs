//! Publishes the last-known [`ConnectivityHealth`] on a `watch` channel.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::ConnectivityHealth;

#[derive(Debug, Clone)]
pub struct HealthReporter {
    tx: Arc<watch::Sender<ConnectivityHealth>>,
}

impl HealthReporter {
    pub fn new() -> (Self, watch::Receiver<ConnectivityHealth>) {
        let (tx, rx) = watch::channel(ConnectivityHealth::Unknown);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn channel_up(&self) {
        self.tx.send_replace(ConnectivityHealth::Channel);
    }

    pub fn channel_down(&self) {
        self.tx.send_replace(ConnectivityHealth::Unknown);
    }

    /// Records the outcome of a fallback request.  Ignored while the channel
    /// is connected.
    pub fn fallback_result(&self, reachable: bool) {
        let next = if reachable {
            ConnectivityHealth::Fallback
        } else {
            ConnectivityHealth::Unreachable
        };
        self.tx.send_if_modified(|current| {
            if *current == ConnectivityHealth::Channel || *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    pub fn current(&self) -> ConnectivityHealth {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unknown() {
        let (reporter, rx) = HealthReporter::new();
        assert_eq!(reporter.current(), ConnectivityHealth::Unknown);
        assert_eq!(*rx.borrow(), ConnectivityHealth::Unknown);
    }

    #[test]
    fn test_fallback_result_does_not_override_connected_channel() {
        // Arrange
        let (reporter, _rx) = HealthReporter::new();
        reporter.channel_up();

        // Act
        reporter.fallback_result(false);

        // Assert
        assert_eq!(reporter.current(), ConnectivityHealth::Channel);
    }

    #[test]
    fn test_fallback_results_track_reachability_after_channel_drop() {
        let (reporter, mut rx) = HealthReporter::new();
        reporter.channel_up();
        reporter.channel_down();

        reporter.fallback_result(true);
        assert_eq!(reporter.current(), ConnectivityHealth::Fallback);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        reporter.fallback_result(true);
        assert!(!rx.has_changed().unwrap(), "same state is not re-published");

        reporter.fallback_result(false);
        assert_eq!(*rx.borrow_and_update(), ConnectivityHealth::Unreachable);
    }
}
