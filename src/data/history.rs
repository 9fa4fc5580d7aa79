//! Fixed-length sample history for the mempool charts.

use std::sync::Arc;

use super::snapshot::Snapshot;

/// Number of samples each window retains.
pub const WINDOW_CAPACITY: usize = 60;

/// A fixed-capacity, newest-first history of one metric.
///
/// The window always holds exactly [`WINDOW_CAPACITY`] samples (zero padded
/// at start). Index 0 is the latest sample. `push` never mutates the window
/// it is called on; readers holding a clone keep seeing a complete window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindow {
    samples: Arc<[u64]>,
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindow {
    /// Create a window filled with zeros.
    pub fn new() -> Self {
        Self {
            samples: Arc::from(vec![0; WINDOW_CAPACITY]),
        }
    }

    /// Return a new window with `sample` in front and the oldest sample dropped.
    pub fn push(&self, sample: u64) -> SlidingWindow {
        let mut samples = Vec::with_capacity(WINDOW_CAPACITY);
        samples.push(sample);
        samples.extend_from_slice(&self.samples[..WINDOW_CAPACITY - 1]);
        Self {
            samples: samples.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent sample.
    pub fn latest(&self) -> u64 {
        self.samples[0]
    }

    /// Samples ordered newest first.
    pub fn as_slice(&self) -> &[u64] {
        &self.samples
    }

    pub fn max(&self) -> u64 {
        self.samples.iter().copied().max().unwrap_or(0)
    }

    /// Chart points with time running left to right (oldest at x = 0).
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| ((WINDOW_CAPACITY - 1 - i) as f64, v as f64))
            .collect()
    }
}

/// Label for a window position: `0 -> "now"`, `i -> "i seconds ago"`.
pub fn label(index: usize) -> String {
    if index == 0 {
        "now".to_string()
    } else {
        format!("{} seconds ago", index)
    }
}

/// Labels for every window position, recomputed on each call.
pub fn labels() -> Vec<String> {
    (0..WINDOW_CAPACITY).map(label).collect()
}

/// Paired history of pending transaction count and bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    pub tx_count: SlidingWindow,
    pub tx_bytes: SlidingWindow,
}

impl History {
    /// Create a new zero-filled history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the mempool values of a merged snapshot.
    ///
    /// Unloaded values are sampled as zero.
    pub fn record(&self, snapshot: &Snapshot) -> History {
        History {
            tx_count: self.tx_count.push(snapshot.unconfirmed_count.value_or_default()),
            tx_bytes: self.tx_bytes.push(snapshot.unconfirmed_bytes.value_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;

    #[test]
    fn new_window_is_zero_padded() {
        let w = SlidingWindow::new();
        assert_eq!(w.len(), WINDOW_CAPACITY);
        assert!(w.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn push_prepends_and_keeps_length() {
        let mut w = SlidingWindow::new();
        for i in 1..=75 {
            w = w.push(i);
            assert_eq!(w.len(), WINDOW_CAPACITY);
            assert_eq!(w.latest(), i);
        }

        // Oldest retained sample is 59 pushes back
        assert_eq!(w.as_slice()[WINDOW_CAPACITY - 1], 75 - 59);
    }

    #[test]
    fn push_does_not_mutate_input() {
        let w = SlidingWindow::new().push(5);
        let before = w.clone();
        let _ = w.push(9);
        assert_eq!(w, before);
        assert_eq!(w.latest(), 5);
    }

    #[test]
    fn points_put_latest_on_the_right() {
        let w = SlidingWindow::new().push(3).push(8);
        let points = w.points();
        assert_eq!(points.len(), WINDOW_CAPACITY);
        assert_eq!(points[0], (59.0, 8.0));
        assert_eq!(points[1], (58.0, 3.0));
        assert_eq!(w.max(), 8);
    }

    #[test]
    fn labels_follow_position() {
        let labels = labels();
        assert_eq!(labels.len(), WINDOW_CAPACITY);
        assert_eq!(labels[0], "now");
        assert_eq!(labels[1], "1 seconds ago");
        assert_eq!(labels[59], "59 seconds ago");
    }

    #[test]
    fn record_samples_both_windows() {
        let snapshot = Snapshot {
            unconfirmed_count: Field::Loaded(12),
            unconfirmed_bytes: Field::Loaded(3400),
            ..Snapshot::default()
        };

        let h = History::new().record(&snapshot);
        assert_eq!(h.tx_count.latest(), 12);
        assert_eq!(h.tx_bytes.latest(), 3400);

        // Unloaded mempool samples as zero
        let h = h.record(&Snapshot::default());
        assert_eq!(h.tx_count.latest(), 0);
        assert_eq!(h.tx_count.as_slice()[1], 12);
    }
}
