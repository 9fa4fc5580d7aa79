//! Fixed-interval polling of a node source.
//!
//! The poller owns the repetition timer and is the only writer of the
//! telemetry view. Each tick starts a cycle: all enabled metrics are fetched
//! concurrently and the cycle completes once every fetch has settled.
//!
//! Cycles are numbered when they start. They run as independent tasks, so a
//! slow cycle does not delay the next one; when results arrive the
//! [`Aggregator`] applies only cycles newer than the last applied one and
//! drops the rest. Once a cycle is applied, older cycles still running are
//! aborted, and at most [`MAX_PENDING_CYCLES`] run at once; ticks that find
//! the limit reached are skipped. Applying a cycle is synchronous and the new
//! view is published as a whole through a watch channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use blockwatch::{Poller, RpcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RpcClient::builder().endpoint("http://localhost:26657").build()?;
//!
//!     let handle = Poller::builder(Arc::new(client))
//!         .interval(Duration::from_millis(1000))
//!         .build()
//!         .start();
//!
//!     let mut feed = handle.feed();
//!     feed.changed().await;
//!     println!("height: {}", feed.latest().snapshot.height);
//!
//!     handle.stop().await;
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::data::{Aggregator, ApplyOutcome, Telemetry};
use crate::source::{CycleResult, Metric, NodeSource, TelemetryFeed};

/// Default polling period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2500);

/// Most cycles allowed in flight at once; ticks are skipped past this.
pub const MAX_PENDING_CYCLES: usize = 4;

/// Polls a [`NodeSource`] on a fixed period.
#[derive(Debug)]
pub struct Poller {
    source: Arc<dyn NodeSource>,
    interval: Duration,
    metrics: Arc<[Metric]>,
}

impl Poller {
    /// Create a builder for the given source.
    pub fn builder(source: Arc<dyn NodeSource>) -> PollerBuilder {
        PollerBuilder::new(source)
    }

    /// Metrics fetched on every cycle.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling in a background task.
    ///
    /// The first cycle starts immediately, then one every interval. Must be
    /// called from within a tokio runtime.
    pub fn start(self) -> PollHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(Telemetry::default());
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let description = self.source.description().to_string();

        info!(
            source = %description,
            interval_ms = self.interval.as_millis() as u64,
            metrics = self.metrics.len(),
            "starting poller"
        );

        let task = tokio::spawn(self.run(state_tx, stop_rx, refresh_rx));

        PollHandle {
            stop_tx,
            refresh_tx,
            state_rx,
            description,
            task: Some(task),
        }
    }

    /// Start the next numbered cycle unless too many are still pending.
    fn spawn_cycle(
        &self,
        in_flight: &mut JoinSet<CycleResult>,
        pending: &mut BTreeMap<u64, AbortHandle>,
        next_seq: &mut u64,
    ) {
        if in_flight.len() >= MAX_PENDING_CYCLES {
            warn!(
                pending = in_flight.len(),
                "node is not keeping up, skipping poll cycle"
            );
            return;
        }

        *next_seq += 1;
        let seq = *next_seq;
        let handle = in_flight.spawn(run_cycle(self.source.clone(), self.metrics.clone(), seq));
        pending.insert(seq, handle);
    }

    async fn run(
        self,
        state_tx: watch::Sender<Telemetry>,
        mut stop_rx: watch::Receiver<bool>,
        mut refresh_rx: mpsc::Receiver<()>,
    ) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut aggregator = Aggregator::new();
        let mut in_flight: JoinSet<CycleResult> = JoinSet::new();
        let mut pending: BTreeMap<u64, AbortHandle> = BTreeMap::new();
        let mut next_seq: u64 = 0;

        loop {
            tokio::select! {
                // Stop wins over everything else that is ready.
                biased;

                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    match joined {
                        Ok(result) => {
                            pending.remove(&result.seq);
                            let outcome = aggregator.apply(&result, Instant::now());
                            if let ApplyOutcome::Applied { .. } = outcome {
                                cancel_older(&mut pending, result.seq);
                                state_tx.send_replace(aggregator.telemetry().clone());
                            }
                        }
                        Err(e) if e.is_panic() => {
                            error!("poll cycle panicked: {}", e);
                            pending.retain(|_, handle| !handle.is_finished());
                        }
                        Err(_) => {}
                    }
                }
                _ = timer.tick() => {
                    self.spawn_cycle(&mut in_flight, &mut pending, &mut next_seq);
                }
                Some(()) = refresh_rx.recv() => {
                    debug!(seq = next_seq + 1, "manual refresh");
                    self.spawn_cycle(&mut in_flight, &mut pending, &mut next_seq);
                }
            }
        }

        in_flight.abort_all();
        info!(
            applied = aggregator.telemetry().cycles_applied,
            discarded = aggregator.discarded(),
            "poller stopped"
        );
    }
}

/// Abort every pending cycle numbered below `applied`.
///
/// Their results would be discarded as stale once they settle.
fn cancel_older(pending: &mut BTreeMap<u64, AbortHandle>, applied: u64) {
    let newer = pending.split_off(&applied);
    for (seq, handle) in std::mem::replace(pending, newer) {
        debug!(seq, applied, "cancelling superseded cycle");
        handle.abort();
    }
}

/// Fetch every metric concurrently and collect the outcomes.
async fn run_cycle(source: Arc<dyn NodeSource>, metrics: Arc<[Metric]>, seq: u64) -> CycleResult {
    let started = Instant::now();
    let outcomes = join_all(metrics.iter().map(|&metric| source.fetch(metric))).await;
    let result = CycleResult { seq, outcomes };

    debug!(
        seq,
        ok = result.success_count(),
        failed = result.outcomes.len() - result.success_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "cycle settled"
    );
    result
}

/// Builder for configuring a Poller.
#[derive(Debug)]
pub struct PollerBuilder {
    source: Arc<dyn NodeSource>,
    interval: Option<Duration>,
    validators: bool,
}

impl PollerBuilder {
    fn new(source: Arc<dyn NodeSource>) -> Self {
        Self {
            source,
            interval: None,
            validators: true,
        }
    }

    /// Set the polling period.
    ///
    /// Defaults to 2.5 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Whether to poll the (legacy) validator set size. Defaults to true.
    pub fn validators(mut self, enabled: bool) -> Self {
        self.validators = enabled;
        self
    }

    /// Build the poller.
    pub fn build(self) -> Poller {
        let mut metrics = Metric::REQUIRED.to_vec();
        if self.validators {
            metrics.push(Metric::Validators);
        }

        Poller {
            source: self.source,
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            metrics: metrics.into(),
        }
    }
}

/// Handle to a running poller.
///
/// Only [`Poller::start`] creates one, and [`PollHandle::stop`] consumes it,
/// so a poller can't be stopped twice or stopped without being started.
/// Dropping the handle aborts the poller.
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    refresh_tx: mpsc::Sender<()>,
    state_rx: watch::Receiver<Telemetry>,
    description: String,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// A feed of the published telemetry.
    pub fn feed(&self) -> TelemetryFeed {
        TelemetryFeed::new(self.state_rx.clone(), &self.description)
    }

    /// Start an extra cycle now, outside the regular schedule.
    ///
    /// Requests made while one is already queued are ignored.
    pub fn refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Stop polling.
    ///
    /// Once this returns the telemetry view will not change again, even if
    /// fetches from an earlier cycle were still pending.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
