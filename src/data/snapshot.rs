//! The merged, most-recently-known-good view of the node.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::field::Field;
use crate::source::{CycleResult, FetchError, FetchErrorKind, Metric, MetricValue};

/// Display format for block times: numeric date and time, seconds precision, UTC.
pub const BLOCK_TIME_FORMAT: &str = "%-d/%-m/%Y, %H:%M:%S";

/// Latest known value of every telemetry field.
///
/// Each field is owned by exactly one metric and only changes when that
/// metric is fetched successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub height: Field<u64>,
    /// Block time, already formatted with [`BLOCK_TIME_FORMAT`].
    pub block_time: Field<String>,
    pub max_bytes: Field<u64>,
    pub binary_name: Field<String>,
    pub binary_version: Field<String>,
    pub total_validators: Field<u64>,
    pub unconfirmed_count: Field<u64>,
    pub unconfirmed_bytes: Field<u64>,
}

impl Snapshot {
    /// Merge one cycle's results into a new snapshot.
    ///
    /// Successful metrics overwrite their slots; failed metrics leave the
    /// previous values in place. Slots are independent of one another, so
    /// the order of outcomes does not matter.
    pub fn merge(&self, results: &CycleResult) -> Snapshot {
        let mut next = self.clone();

        for outcome in &results.outcomes {
            let applied = match outcome {
                Ok(value) => next.apply(value),
                Err(err) => Err(err.clone()),
            };

            if let Err(err) = applied {
                warn!(
                    seq = results.seq,
                    metric = %err.metric,
                    error = %err.kind,
                    "fetch failed, keeping previous value"
                );
            }
        }

        next
    }

    fn apply(&mut self, value: &MetricValue) -> Result<(), FetchError> {
        match value {
            MetricValue::Header(header) => {
                // Height and time move together: a bad timestamp rejects both.
                let time = format_block_time(&header.time)
                    .map_err(|kind| FetchError::new(Metric::Header, kind))?;
                self.height = Field::Loaded(header.height);
                self.block_time = Field::Loaded(time);
            }
            MetricValue::MaxBytes(max_bytes) => {
                self.max_bytes = Field::Loaded(*max_bytes);
            }
            MetricValue::NodeInfo(info) => {
                self.binary_name = Field::Loaded(info.name.clone());
                self.binary_version = Field::Loaded(info.version.clone());
            }
            MetricValue::Mempool(stats) => {
                self.unconfirmed_count = Field::Loaded(stats.count);
                self.unconfirmed_bytes = Field::Loaded(stats.bytes);
            }
            MetricValue::Validators(total) => {
                self.total_validators = Field::Loaded(*total);
            }
        }
        Ok(())
    }
}

/// Parse an RFC 3339 block timestamp and format it for display.
///
/// Fractional seconds (CometBFT reports nanoseconds) are dropped.
///
/// ```
/// use blockwatch::data::format_block_time;
///
/// assert_eq!(
///     format_block_time("2024-03-05T14:07:09.52Z").unwrap(),
///     "5/3/2024, 14:07:09"
/// );
/// ```
pub fn format_block_time(raw: &str) -> Result<String, FetchErrorKind> {
    let parsed =
        DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| FetchErrorKind::Timestamp {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;

    Ok(parsed.with_timezone(&Utc).format(BLOCK_TIME_FORMAT).to_string())
}
