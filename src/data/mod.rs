//! Aggregation of polled metrics into a displayable view.
//!
//! This module turns each poll cycle's raw results into the telemetry the
//! presentation layer reads.
//!
//! ## Submodules
//!
//! - [`field`]: `Field<T>`, a slot that is either unloaded or holds the last good value
//! - [`snapshot`]: The merged [`Snapshot`] and the carry-forward merge
//! - [`transition`]: New-block detection and the one-shot [`Pulse`]
//! - [`history`]: Fixed-length [`SlidingWindow`]s for the mempool charts
//! - [`telemetry`]: The [`Aggregator`] that runs the pipeline in cycle order
//!
//! ## Data Flow
//!
//! ```text
//! CycleResult (per-metric outcomes)
//!        │
//!        ▼
//! Snapshot::merge()          failed metrics keep their previous value
//!        │
//!        ▼
//! transition::detect()       block time changed? archive it, fire Pulse
//!        │
//!        ▼
//! History::record()          push mempool count/bytes into the windows
//!        │
//!        ▼
//! Telemetry (published)
//! ```

pub mod field;
pub mod history;
pub mod snapshot;
pub mod telemetry;
pub mod transition;

pub use field::Field;
pub use history::{History, SlidingWindow, WINDOW_CAPACITY};
pub use snapshot::{format_block_time, Snapshot};
pub use telemetry::{Aggregator, ApplyOutcome, Telemetry};
pub use transition::{detect, Detection, Pulse, TransitionRecord, PULSE_DURATION};
