//! The aggregation pipeline: merge, detect, record.

use tokio::time::Instant;
use tracing::{debug, info};

use super::history::History;
use super::snapshot::Snapshot;
use super::transition::{detect, Pulse, TransitionRecord};
use crate::source::CycleResult;

/// Everything the presentation layer reads, published as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Telemetry {
    pub snapshot: Snapshot,
    pub transition: TransitionRecord,
    pub pulse: Pulse,
    pub history: History,
    /// Sequence number of the last applied cycle.
    pub last_applied_seq: Option<u64>,
    /// Number of cycles applied so far.
    pub cycles_applied: u64,
    /// When the last cycle was applied.
    pub last_updated: Option<Instant>,
}

/// What happened to a cycle handed to [`Aggregator::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The cycle was merged into the view.
    Applied { pulsed: bool },
    /// A newer cycle had already been applied; the results were dropped.
    Stale { seq: u64, last_applied: u64 },
}

/// Owns the telemetry state and applies cycles in start order.
///
/// A cycle is applied only if its sequence number is higher than the last
/// applied one, so a slow cycle finishing late can never overwrite data from
/// a cycle that started after it.
#[derive(Debug, Default)]
pub struct Aggregator {
    telemetry: Telemetry,
    discarded: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Number of cycles dropped as stale.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Run merge, transition detection and history recording for one cycle.
    pub fn apply(&mut self, result: &CycleResult, now: Instant) -> ApplyOutcome {
        if let Some(last_applied) = self.telemetry.last_applied_seq {
            if result.seq <= last_applied {
                self.discarded += 1;
                debug!(seq = result.seq, last_applied, "discarding stale cycle");
                return ApplyOutcome::Stale {
                    seq: result.seq,
                    last_applied,
                };
            }
        }

        let current = &self.telemetry;
        let merged = current.snapshot.merge(result);
        let detection = detect(&current.snapshot, merged, &current.transition);

        let mut pulse = current.pulse;
        if detection.pulsed {
            pulse.trigger(now);
            info!(
                height = %detection.snapshot.height,
                block_time = %detection.snapshot.block_time,
                "new block"
            );
        }

        let history = current.history.record(&detection.snapshot);

        self.telemetry = Telemetry {
            snapshot: detection.snapshot,
            transition: detection.transition,
            pulse,
            history,
            last_applied_seq: Some(result.seq),
            cycles_applied: current.cycles_applied + 1,
            last_updated: Some(now),
        };

        ApplyOutcome::Applied {
            pulsed: detection.pulsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;
    use crate::source::{BlockHeader, MempoolStats, MetricValue};

    fn cycle(seq: u64, height: u64, time: &str, txs: u64) -> CycleResult {
        CycleResult::new(seq)
            .with(Ok(MetricValue::Header(BlockHeader {
                height,
                time: time.to_string(),
            })))
            .with(Ok(MetricValue::Mempool(MempoolStats {
                count: txs,
                bytes: txs * 100,
            })))
    }

    #[test]
    fn first_cycle_loads_and_pulses_once() {
        let mut agg = Aggregator::new();
        let now = Instant::now();

        let outcome = agg.apply(&cycle(1, 100, "2024-01-01T00:00:00Z", 0), now);
        assert_eq!(outcome, ApplyOutcome::Applied { pulsed: true });

        let t = agg.telemetry();
        assert_eq!(t.snapshot.height.to_string(), "100");
        assert_eq!(t.snapshot.block_time, Field::Loaded("1/1/2024, 00:00:00".to_string()));
        assert_eq!(t.transition.previous_block_time, Field::Unloaded);
        assert_eq!(t.pulse.generation(), 1);
        assert!(t.pulse.is_active(now));

        // Same block again: no second pulse
        let outcome = agg.apply(&cycle(2, 100, "2024-01-01T00:00:00Z", 0), now);
        assert_eq!(outcome, ApplyOutcome::Applied { pulsed: false });
        assert_eq!(agg.telemetry().pulse.generation(), 1);
    }

    #[test]
    fn new_block_archives_previous_time() {
        let mut agg = Aggregator::new();
        let now = Instant::now();
        agg.apply(&cycle(1, 100, "2024-01-01T00:00:00Z", 0), now);
        agg.apply(&cycle(2, 101, "2024-01-01T00:00:12Z", 0), now);

        let t = agg.telemetry();
        assert_eq!(t.snapshot.height, Field::Loaded(101));
        assert_eq!(
            t.transition.previous_block_time,
            Field::Loaded("1/1/2024, 00:00:00".to_string())
        );
        assert_eq!(t.pulse.generation(), 2);
    }

    #[test]
    fn stale_cycle_is_discarded() {
        let mut agg = Aggregator::new();
        let now = Instant::now();

        // Cycle 2 finishes before cycle 1
        agg.apply(&cycle(2, 200, "2024-01-01T00:01:00Z", 5), now);
        let before = agg.telemetry().clone();

        let outcome = agg.apply(&cycle(1, 100, "2024-01-01T00:00:00Z", 1), now);
        assert_eq!(
            outcome,
            ApplyOutcome::Stale {
                seq: 1,
                last_applied: 2
            }
        );
        assert_eq!(agg.telemetry(), &before);
        assert_eq!(agg.telemetry().snapshot.height, Field::Loaded(200));
        assert_eq!(agg.discarded(), 1);
    }

    #[test]
    fn every_applied_cycle_pushes_history() {
        let mut agg = Aggregator::new();
        let now = Instant::now();
        for seq in 1..=3 {
            agg.apply(&cycle(seq, 100, "2024-01-01T00:00:00Z", seq * 2), now);
        }

        let t = agg.telemetry();
        assert_eq!(t.cycles_applied, 3);
        assert_eq!(t.last_applied_seq, Some(3));
        assert_eq!(&t.history.tx_count.as_slice()[..3], &[6, 4, 2]);
        assert_eq!(&t.history.tx_bytes.as_slice()[..3], &[600, 400, 200]);
    }

    #[test]
    fn all_failure_cycle_still_advances_window() {
        let mut agg = Aggregator::new();
        let now = Instant::now();
        agg.apply(&cycle(1, 100, "2024-01-01T00:00:00Z", 4), now);
        agg.apply(&CycleResult::new(2), now);

        let t = agg.telemetry();
        // Carried-forward value is sampled again
        assert_eq!(&t.history.tx_count.as_slice()[..2], &[4, 4]);
        assert_eq!(t.snapshot.height, Field::Loaded(100));
    }
}
