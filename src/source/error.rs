//! Error types for data source adapters.

use thiserror::Error;

use super::Metric;

/// A failed fetch of a single metric.
///
/// Every adapter failure is captured as a value tagged with the metric it
/// belongs to, so the merger can carry the previous value forward for that
/// metric only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{metric}: {kind}")]
pub struct FetchError {
    /// The metric whose fetch failed.
    pub metric: Metric,
    /// What went wrong.
    pub kind: FetchErrorKind,
}

impl FetchError {
    /// Create a new error for the given metric.
    pub fn new(metric: Metric, kind: FetchErrorKind) -> Self {
        Self { metric, kind }
    }
}

/// The cause of a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    /// Network unreachable, connection refused or timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a non-success status code.
    #[error("node returned status {0}")]
    Response(u16),

    /// Malformed JSON or a missing/unexpected field in the `result` envelope.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The block time could not be parsed as a timestamp.
    #[error("invalid block time {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
}

impl From<reqwest::Error> for FetchErrorKind {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchErrorKind::Transport("request timed out".to_string())
        } else if let Some(status) = err.status() {
            FetchErrorKind::Response(status.as_u16())
        } else if err.is_decode() {
            FetchErrorKind::Parse(err.to_string())
        } else {
            FetchErrorKind::Transport(err.to_string())
        }
    }
}
