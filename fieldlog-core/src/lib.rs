//! Fieldlog Core - Quota-Managed Field Data Log Engine
//!
//! A buffered, week-partitioned log store for long-running environmental
//! monitoring on small storage budgets:
//! - Batched writes (one flash append per full buffer, not per sample)
//! - Week-keyed CSV segments that stay downloadable as plain files
//! - Automatic retention: oldest weeks are evicted when the capacity
//!   ceiling is reached, so the logger can run unattended indefinitely
//!
//! # Architecture
//!
//! One [`LogEngine`] instance coordinates the write path:
//!
//! - **TimeGate**: rejects readings stamped before the clock was set
//! - **MeasurementBuffer**: in-memory batch awaiting the next flush
//! - **SegmentStore**: exclusive owner of the on-disk week files,
//!   enforcing the capacity policy on every append

pub mod store;

mod buffer;
mod clock;
mod engine;
mod error;
mod gate;
mod sensor;
mod types;
mod week;

pub use buffer::MeasurementBuffer;
pub use clock::{SystemClock, TimeSource};
pub use engine::{EngineConfig, FlushOutcome, LogEngine, RecordOutcome};
pub use error::{LogError, Result};
pub use gate::TimeGate;
pub use sensor::{SensorReading, SensorSource};
pub use types::*;
pub use week::WeekKey;

/// Fieldlog version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Measurements held in memory before a batched write
    pub const DEFAULT_BUFFER_CAPACITY: usize = 10;

    /// Usable share of the capacity budget, in percent
    pub const DEFAULT_THRESHOLD_PERCENT: u64 = 85;

    /// Per-row size estimate used when admitting a write
    pub const DEFAULT_WRITE_BYTES_PER_ROW: u64 = 40;

    /// Per-row size estimate used for retention planning
    pub const DEFAULT_PLAN_BYTES_PER_ROW: u64 = 30;

    /// Earliest calendar year a trusted clock can report
    pub const DEFAULT_FLOOR_YEAR: i32 = 2020;

    /// Capacity budget of the storage medium (4MB)
    pub const DEFAULT_TOTAL_BYTES: u64 = 4 * 1024 * 1024;

    /// Minutes in one week, for retention planning
    pub const MINUTES_PER_WEEK: u64 = 10_080;
}
