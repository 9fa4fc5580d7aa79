//! Read side of the published telemetry.
//!
//! The poller publishes a complete [`Telemetry`] value through a tokio watch
//! channel after every applied cycle. A `TelemetryFeed` wraps the receiving
//! end so consumers (the TUI, tests) can poll it without blocking.

use tokio::sync::watch;

use crate::data::Telemetry;

/// A read-only view of the latest telemetry.
///
/// Readers always observe a whole value: either the view before a cycle was
/// applied or the view after it, never a mix.
///
/// # Example
///
/// ```
/// use blockwatch::TelemetryFeed;
///
/// let (tx, mut feed) = TelemetryFeed::create("test");
/// assert!(feed.poll().is_some());
/// assert!(feed.poll().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryFeed {
    receiver: watch::Receiver<Telemetry>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl TelemetryFeed {
    /// Create a feed from the receiving end of a watch channel.
    pub fn new(receiver: watch::Receiver<Telemetry>, source_description: &str) -> Self {
        Self {
            receiver,
            description: source_description.to_string(),
            initial_returned: false,
        }
    }

    /// Create a channel pair for publishing telemetry to a feed.
    pub fn create(source_description: &str) -> (watch::Sender<Telemetry>, Self) {
        let (tx, rx) = watch::channel(Telemetry::default());
        (tx, Self::new(rx, source_description))
    }

    /// Poll for a newer view.
    ///
    /// Returns the initial value on the first call, then `Some` only when the
    /// publisher has sent something new since the previous call.
    pub fn poll(&mut self) -> Option<Telemetry> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// Wait until the publisher sends a new view.
    ///
    /// Returns `false` once the publisher is gone (the poller was stopped).
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Clone the current view without marking it as seen.
    pub fn latest(&self) -> Telemetry {
        self.receiver.borrow().clone()
    }

    /// Returns a human-readable description of where the data comes from.
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;

    #[test]
    fn test_feed_poll() {
        let (tx, mut feed) = TelemetryFeed::create("test");

        // Initially returns the default (unloaded) view
        let telemetry = feed.poll().unwrap();
        assert_eq!(telemetry.snapshot.height, Field::Unloaded);

        // No change, so poll returns None
        assert!(feed.poll().is_none());

        let mut next = Telemetry::default();
        next.snapshot.height = Field::Loaded(42);
        tx.send(next).unwrap();

        let telemetry = feed.poll().unwrap();
        assert_eq!(telemetry.snapshot.height, Field::Loaded(42));
        assert!(feed.poll().is_none());
    }

    #[tokio::test]
    async fn test_changed_reports_closed_publisher() {
        let (tx, mut feed) = TelemetryFeed::create("test");
        drop(tx);
        assert!(!feed.changed().await);
    }
}
