//! Metric identifiers and the typed values adapters produce.

use std::fmt;

use super::FetchError;

/// One logical metric exposed by the node's RPC interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Latest block header (height and timestamp).
    Header,
    /// Consensus parameters (maximum block size).
    ConsensusParams,
    /// ABCI application name and version.
    NodeInfo,
    /// Mempool size (pending transaction count and bytes).
    UnconfirmedTxs,
    /// Validator set size. Legacy, may be disabled.
    Validators,
}

impl Metric {
    /// Metrics every poll cycle fetches.
    pub const REQUIRED: [Metric; 4] = [
        Metric::Header,
        Metric::ConsensusParams,
        Metric::NodeInfo,
        Metric::UnconfirmedTxs,
    ];

    /// Returns the RPC path for this metric, relative to the node URL.
    pub fn path(self) -> &'static str {
        match self {
            Metric::Header => "/header",
            Metric::ConsensusParams => "/consensus_params",
            Metric::NodeInfo => "/abci_info",
            Metric::UnconfirmedTxs => "/unconfirmed_txs",
            Metric::Validators => "/validators",
        }
    }

    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Header => "header",
            Metric::ConsensusParams => "consensus_params",
            Metric::NodeInfo => "abci_info",
            Metric::UnconfirmedTxs => "unconfirmed_txs",
            Metric::Validators => "validators",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Latest block header as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    /// Raw block timestamp (RFC 3339), formatted during merge.
    pub time: String,
}

/// Name and version of the node's application binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub version: String,
}

/// Pending transaction pool statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MempoolStats {
    pub count: u64,
    pub bytes: u64,
}

/// A successfully parsed metric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    Header(BlockHeader),
    MaxBytes(u64),
    NodeInfo(NodeInfo),
    Mempool(MempoolStats),
    Validators(u64),
}

impl MetricValue {
    /// The metric this value answers.
    pub fn metric(&self) -> Metric {
        match self {
            MetricValue::Header(_) => Metric::Header,
            MetricValue::MaxBytes(_) => Metric::ConsensusParams,
            MetricValue::NodeInfo(_) => Metric::NodeInfo,
            MetricValue::Mempool(_) => Metric::UnconfirmedTxs,
            MetricValue::Validators(_) => Metric::Validators,
        }
    }
}

/// Outcome of a single adapter call.
pub type MetricOutcome = Result<MetricValue, FetchError>;

/// Everything one poll cycle produced.
///
/// Cycles are numbered in the order they were started; the aggregator uses
/// `seq` to drop results that finish after a newer cycle was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleResult {
    pub seq: u64,
    pub outcomes: Vec<MetricOutcome>,
}

impl CycleResult {
    /// Create an empty result for the given cycle number.
    pub fn new(seq: u64) -> Self {
        Self {
            seq,
            outcomes: Vec::new(),
        }
    }

    /// Builder-style helper to append an outcome.
    pub fn with(mut self, outcome: MetricOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    /// Iterate over the failures in this cycle.
    pub fn failures(&self) -> impl Iterator<Item = &FetchError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Number of adapters that succeeded.
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FetchErrorKind;

    #[test]
    fn value_reports_its_metric() {
        assert_eq!(MetricValue::MaxBytes(1).metric(), Metric::ConsensusParams);
        assert_eq!(
            MetricValue::Mempool(MempoolStats { count: 1, bytes: 2 }).metric(),
            Metric::UnconfirmedTxs
        );
    }

    #[test]
    fn required_metrics_exclude_validators() {
        assert!(!Metric::REQUIRED.contains(&Metric::Validators));
        assert_eq!(Metric::REQUIRED.len(), 4);
    }

    #[test]
    fn cycle_counts_successes_and_failures() {
        let cycle = CycleResult::new(3)
            .with(Ok(MetricValue::Validators(100)))
            .with(Err(FetchError::new(
                Metric::Header,
                FetchErrorKind::Transport("refused".to_string()),
            )));

        assert_eq!(cycle.success_count(), 1);
        let failed: Vec<Metric> = cycle.failures().map(|e| e.metric).collect();
        assert_eq!(failed, vec![Metric::Header]);
    }
}
