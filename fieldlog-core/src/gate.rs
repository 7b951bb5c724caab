//! Time-validity gate
//!
//! Devices boot with an unset clock and report timestamps near the epoch
//! until a network time source is established. Writing those into the
//! store would create segments keyed to bogus weeks that sort before all
//! real data and confuse retention, so the gate rejects them up front.

use crate::Timestamp;
use chrono::{DateTime, Datelike, Utc};

/// Gate that classifies a candidate timestamp as trustworthy or not
///
/// Pure predicate, no side effects. In strict mode a timestamp is
/// trustworthy only when its UTC calendar year reaches the floor year;
/// with strict mode off every timestamp passes.
#[derive(Debug, Clone, Copy)]
pub struct TimeGate {
    strict: bool,
    floor_year: i32,
}

impl TimeGate {
    /// Create a gate with the default floor year
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            floor_year: crate::config::DEFAULT_FLOOR_YEAR,
        }
    }

    /// Override the floor year
    pub fn with_floor_year(mut self, floor_year: i32) -> Self {
        self.floor_year = floor_year;
        self
    }

    /// Whether strict mode is enabled
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Classify a timestamp
    ///
    /// Timestamps that cannot be mapped to a UTC calendar date count as
    /// untrustworthy even with strict mode off.
    pub fn is_trustworthy(&self, ts: Timestamp) -> bool {
        let Some(datetime) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            return false;
        };
        !self.strict || datetime.year() >= self.floor_year
    }
}

impl Default for TimeGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2019-06-01 and 2021-06-01, both 12:00 UTC
    const TS_2019: Timestamp = 1559390400;
    const TS_2021: Timestamp = 1622548800;

    #[test]
    fn test_strict_mode() {
        let gate = TimeGate::new(true);
        assert!(!gate.is_trustworthy(TS_2019));
        assert!(gate.is_trustworthy(TS_2021));
    }

    #[test]
    fn test_relaxed_mode() {
        let gate = TimeGate::new(false);
        assert!(gate.is_trustworthy(TS_2019));
        assert!(gate.is_trustworthy(0));
    }

    #[test]
    fn test_unrepresentable_timestamp() {
        assert!(!TimeGate::new(true).is_trustworthy(i64::MAX));
        assert!(!TimeGate::new(false).is_trustworthy(i64::MAX));
    }

    #[test]
    fn test_floor_year_override() {
        let gate = TimeGate::new(true).with_floor_year(2022);
        assert!(!gate.is_trustworthy(TS_2021));
    }
}
