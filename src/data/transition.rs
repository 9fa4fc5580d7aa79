//! New-block detection and the one-shot pulse signal.

use std::time::Duration;

use tokio::time::Instant;

use super::field::Field;
use super::snapshot::Snapshot;

/// Text shown before any previous block time is known.
pub const WAITING: &str = "waiting";

/// How long a pulse stays active after a transition.
pub const PULSE_DURATION: Duration = Duration::from_secs(1);

/// The block time that was displayed before the latest transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionRecord {
    pub previous_block_time: Field<String>,
}

impl TransitionRecord {
    /// Display text for the previous block time.
    pub fn previous_block_time_label(&self) -> String {
        self.previous_block_time.display_with(WAITING, |time| time.clone())
    }
}

/// Result of comparing an incoming snapshot with the displayed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub snapshot: Snapshot,
    pub transition: TransitionRecord,
    /// True when the block time changed on this cycle.
    pub pulsed: bool,
}

/// Compare block times and archive the previous one on change.
///
/// The comparison is on the formatted display value. Starting from an
/// unloaded snapshot, the first real block time counts as a transition.
pub fn detect(previous: &Snapshot, incoming: Snapshot, record: &TransitionRecord) -> Detection {
    if incoming.block_time != previous.block_time {
        Detection {
            transition: TransitionRecord {
                previous_block_time: previous.block_time.clone(),
            },
            snapshot: incoming,
            pulsed: true,
        }
    } else {
        Detection {
            snapshot: incoming,
            transition: record.clone(),
            pulsed: false,
        }
    }
}

/// One-shot visual cue fired on every transition.
///
/// The pulse is active for [`PULSE_DURATION`] after it fires and then clears
/// itself. `generation` counts transitions so a consumer can react exactly
/// once per pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulse {
    generation: u64,
    deadline: Option<Instant>,
}

impl Pulse {
    /// Fire the pulse, restarting the deadline if one is already running.
    pub fn trigger(&mut self, now: Instant) {
        self.generation += 1;
        self.deadline = Some(now + PULSE_DURATION);
    }

    /// Whether the pulse should still be rendered at `now`.
    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Number of pulses fired so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if a pulse fired after the consumer last saw `generation`.
    pub fn fired_since(&self, generation: u64) -> bool {
        self.generation > generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_time(time: Field<String>) -> Snapshot {
        Snapshot {
            block_time: time,
            ..Snapshot::default()
        }
    }

    fn loaded(s: &str) -> Field<String> {
        Field::Loaded(s.to_string())
    }

    #[test]
    fn changed_block_time_archives_previous_and_pulses() {
        let previous = with_time(loaded("T1"));
        let incoming = with_time(loaded("T2"));

        let detection = detect(&previous, incoming.clone(), &TransitionRecord::default());

        assert!(detection.pulsed);
        assert_eq!(detection.transition.previous_block_time, loaded("T1"));
        assert_eq!(detection.snapshot, incoming);
    }

    #[test]
    fn same_block_time_leaves_record_untouched() {
        let record = TransitionRecord {
            previous_block_time: loaded("T0"),
        };
        let previous = with_time(loaded("T1"));

        let detection = detect(&previous, with_time(loaded("T1")), &record);

        assert!(!detection.pulsed);
        assert_eq!(detection.transition, record);
    }

    #[test]
    fn first_load_is_one_transition() {
        let record = TransitionRecord::default();
        let detection = detect(&Snapshot::default(), with_time(loaded("T1")), &record);

        assert!(detection.pulsed);
        // The archived value is still the placeholder
        assert_eq!(detection.transition.previous_block_time_label(), "waiting");

        let again = detect(&detection.snapshot, with_time(loaded("T1")), &detection.transition);
        assert!(!again.pulsed);
    }

    #[test]
    fn both_unloaded_is_not_a_transition() {
        let detection = detect(
            &Snapshot::default(),
            Snapshot::default(),
            &TransitionRecord::default(),
        );
        assert!(!detection.pulsed);
    }

    #[test]
    fn pulse_clears_after_duration() {
        let start = Instant::now();
        let mut pulse = Pulse::default();
        assert!(!pulse.is_active(start));

        pulse.trigger(start);
        assert_eq!(pulse.generation(), 1);
        assert!(pulse.is_active(start));
        assert!(pulse.is_active(start + Duration::from_millis(999)));
        assert!(!pulse.is_active(start + PULSE_DURATION));
    }

    #[test]
    fn pulse_fired_since_tracks_generations() {
        let mut pulse = Pulse::default();
        assert!(!pulse.fired_since(0));

        pulse.trigger(Instant::now());
        assert!(pulse.fired_since(0));
        assert!(!pulse.fired_since(pulse.generation()));
    }
}
