//! Data source abstraction for fetching node telemetry.
//!
//! This module provides a trait-based abstraction over the node being
//! observed. Each call fetches one logical metric and reports failure as a
//! value, so a broken endpoint never takes the others down with it.

mod error;
mod feed;
mod metric;
mod rpc;

pub use error::{FetchError, FetchErrorKind};
pub use feed::TelemetryFeed;
pub use metric::{
    BlockHeader, CycleResult, MempoolStats, Metric, MetricOutcome, MetricValue, NodeInfo,
};
pub use rpc::{RpcClient, RpcClientBuilder, DEFAULT_ENDPOINT};

use std::fmt::Debug;

use async_trait::async_trait;

/// Trait for fetching metrics from a node.
///
/// Implementations must not retry internally: the next poll cycle is the
/// retry. All failures are returned as [`FetchError`] values.
///
/// # Example
///
/// ```no_run
/// use blockwatch::source::{Metric, NodeSource, RpcClient};
///
/// # tokio_test::block_on(async {
/// let client = RpcClient::builder().build().unwrap();
/// match client.fetch(Metric::UnconfirmedTxs).await {
///     Ok(value) => println!("{:?}", value),
///     Err(e) => eprintln!("{}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait NodeSource: Send + Sync + Debug {
    /// Fetch and parse a single metric.
    async fn fetch(&self, metric: Metric) -> Result<MetricValue, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
