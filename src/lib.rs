//! # blockwatch
//!
//! A live terminal panel and library for watching a Tendermint/CometBFT node.
//!
//! The node's RPC interface is polled on a fixed period. Each poll cycle
//! fetches a handful of independent metrics concurrently, merges whatever
//! succeeded into the last known values, detects new blocks, and records
//! mempool size into 60-sample sliding windows for charting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//! │  │ poller  │───▶│   data   │───▶│   app    │───▶│   ui    │  │
//! │  │ (timer) │    │(aggregate)    │ (state)  │    │(ratatui)│  │
//! │  └────┬────┘    └──────────┘    └──────────┘    └─────────┘  │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ┌─────────┐                                                 │
//! │  │ source  │◀── RpcClient (HTTP) | any NodeSource            │
//! │  │ (fetch) │                                                 │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`NodeSource`] trait, the HTTP [`RpcClient`], and the
//!   [`TelemetryFeed`] readers use to observe published state
//! - **[`data`]**: Snapshot merging with carry-forward, new-block detection,
//!   and the sliding-window history
//! - **[`poller`]**: The fixed-interval scheduler that drives poll cycles
//! - **[`config`]**: Layered settings (defaults, file, environment, CLI)
//! - **[`app`]** / **[`ui`]**: Terminal state and rendering
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the default public endpoint
//! blockwatch
//!
//! # Watch a local node every second
//! blockwatch --rpc http://localhost:26657 --interval-ms 1000
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use blockwatch::{Poller, RpcClient};
//!
//! # tokio_test::block_on(async {
//! let client = RpcClient::builder().build().unwrap();
//! let handle = Poller::builder(Arc::new(client)).build().start();
//!
//! let mut feed = handle.feed();
//! while feed.changed().await {
//!     let telemetry = feed.latest();
//!     println!("{} pending", telemetry.snapshot.unconfirmed_count);
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod poller;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{Overrides, Settings};
pub use data::{Aggregator, Field, History, SlidingWindow, Snapshot, Telemetry};
pub use poller::{PollHandle, Poller, PollerBuilder};
pub use source::{
    CycleResult, FetchError, FetchErrorKind, Metric, MetricValue, NodeSource, RpcClient,
    TelemetryFeed,
};
