//! Durable segment storage
//!
//! One file per calendar week, semicolon-delimited rows, bounded by a
//! capacity budget: when a write would push usage past the retention
//! ceiling, the oldest weeks are evicted first.

mod capacity;
mod segments;

pub use capacity::CapacityPolicy;
pub use segments::SegmentStore;

use std::path::PathBuf;

/// Segment store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Segment directory
    pub dir: PathBuf,
    /// Capacity policy applied to writes
    pub policy: CapacityPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            policy: CapacityPolicy::default(),
        }
    }
}
