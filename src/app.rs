//! Application state for the TUI.

use std::time::Duration;

use tokio::time::Instant;

use crate::data::Telemetry;
use crate::poller::DEFAULT_INTERVAL;
use crate::source::TelemetryFeed;
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data feed
    feed: TelemetryFeed,
    pub telemetry: Telemetry,
    /// Whether the validator count is being polled.
    pub validators_enabled: bool,
    /// Time between history samples.
    pub sample_interval: Duration,
    /// Pulse generation the UI last reacted to.
    seen_pulse: u64,
    /// New blocks observed since start.
    pub blocks_seen: u64,
    refresh_requested: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from the given feed.
    pub fn new(feed: TelemetryFeed, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            feed,
            telemetry: Telemetry::default(),
            validators_enabled: true,
            sample_interval: DEFAULT_INTERVAL,
            seen_pulse: 0,
            blocks_seen: 0,
            refresh_requested: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.feed.description()
    }

    /// Pull the latest telemetry from the feed.
    ///
    /// Returns true if a new view was received.
    pub fn reload_data(&mut self) -> bool {
        let Some(telemetry) = self.feed.poll() else {
            return false;
        };

        let pulse = telemetry.pulse;
        if pulse.fired_since(self.seen_pulse) {
            self.blocks_seen += pulse.generation() - self.seen_pulse;
            self.seen_pulse = pulse.generation();
        }

        self.telemetry = telemetry;
        true
    }

    /// Whether the new-block highlight should be drawn right now.
    pub fn pulse_active(&self) -> bool {
        self.telemetry.pulse.is_active(Instant::now())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Ask the poller for an immediate cycle.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
        self.set_status_message("Refreshing...".to_string());
    }

    /// Returns and clears a pending refresh request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}
