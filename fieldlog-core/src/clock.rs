//! Time source seam
//!
//! The engine never reads a clock itself; timestamps arrive with each
//! `record` call. This trait is the boundary for whoever stamps the
//! samples (the sampling task in the server). How the time was obtained
//! (network-synchronized or a local fallback) is outside the core; only
//! the gate judges whether it is usable.

use crate::Timestamp;

/// Source of the current time
pub trait TimeSource: Send {
    /// Current time in whole seconds since the Unix epoch
    fn now(&self) -> Timestamp;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock() {
        // Running hosts are assumed to have a sane clock
        assert!(SystemClock.now() > 1577836800);
    }
}
