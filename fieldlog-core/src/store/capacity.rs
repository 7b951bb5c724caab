//! Capacity policy - the arithmetic behind eviction and planning
//!
//! Stateless: every decision is derived from a fresh usage snapshot plus
//! these numbers. The store drives the actual eviction loop.

use crate::config;

/// Capacity budget and estimation parameters
///
/// The retention ceiling is `threshold_percent` of `total_bytes`; the
/// rest is headroom for filesystem metadata and write amplification.
/// Writes are admitted against an upfront estimate
/// (`rows * write_bytes_per_row`) rather than measured after the fact,
/// so a segment can land slightly under or over the ceiling by at most
/// one batch's estimate gap.
#[derive(Debug, Clone, Copy)]
pub struct CapacityPolicy {
    /// Capacity budget of the storage medium in bytes
    pub total_bytes: u64,
    /// Retention ceiling as a percentage of the total
    pub threshold_percent: u64,
    /// Estimated bytes per row for write admission
    pub write_bytes_per_row: u64,
    /// Estimated bytes per row for history planning
    pub plan_bytes_per_row: u64,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            total_bytes: config::DEFAULT_TOTAL_BYTES,
            threshold_percent: config::DEFAULT_THRESHOLD_PERCENT,
            write_bytes_per_row: config::DEFAULT_WRITE_BYTES_PER_ROW,
            plan_bytes_per_row: config::DEFAULT_PLAN_BYTES_PER_ROW,
        }
    }
}

impl CapacityPolicy {
    /// The retention ceiling in bytes
    pub fn threshold(&self) -> u64 {
        self.total_bytes * self.threshold_percent / 100
    }

    /// Estimated on-disk size of a batch of `rows` measurements
    pub fn estimate(&self, rows: usize) -> u64 {
        rows as u64 * self.write_bytes_per_row
    }

    /// Whether `extra` more bytes on top of `used` stay within the ceiling
    pub fn fits(&self, used: u64, extra: u64) -> bool {
        used.saturating_add(extra) <= self.threshold()
    }

    /// Weeks of history the full budget can hold at a sampling interval
    ///
    /// `interval_minutes` is the gap between samples; a week has 10080
    /// minutes. Uses the planning estimate, not the write estimate.
    pub fn weeks_at_interval(&self, interval_minutes: u64) -> u64 {
        if interval_minutes == 0 {
            return 0;
        }
        let rows_per_week = config::MINUTES_PER_WEEK as f64 / interval_minutes as f64;
        let bytes_per_week = (rows_per_week * self.plan_bytes_per_row as f64).max(1.0);
        (self.total_bytes as f64 / bytes_per_week) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(total: u64) -> CapacityPolicy {
        CapacityPolicy {
            total_bytes: total,
            ..CapacityPolicy::default()
        }
    }

    #[test]
    fn test_threshold() {
        assert_eq!(policy(1000).threshold(), 850);
        assert_eq!(policy(0).threshold(), 0);
    }

    #[test]
    fn test_estimate() {
        assert_eq!(policy(1000).estimate(10), 400);
        assert_eq!(policy(1000).estimate(0), 0);
    }

    #[test]
    fn test_fits_boundary() {
        let p = policy(1000);
        assert!(p.fits(450, 400));
        assert!(!p.fits(451, 400));
    }

    #[test]
    fn test_weeks_at_interval() {
        // 60 min interval: 168 rows/week * 30 B = 5040 B/week
        let p = policy(50_400);
        assert_eq!(p.weeks_at_interval(60), 10);
        // 1 min interval: 10080 rows/week * 30 B = 302400 B/week
        assert_eq!(p.weeks_at_interval(1), 0);
        assert_eq!(p.weeks_at_interval(0), 0);
    }
}
