//! Core types for fieldlog

use crate::{LogError, Result};
use serde::{Deserialize, Serialize};

/// Timestamp in whole seconds since the Unix epoch
pub type Timestamp = i64;

/// A single environmental reading
///
/// Immutable once created: produced by the sensor collaborator, carried
/// through the buffer and written out as one segment row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Capture time in seconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Temperature in degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent
    pub humidity: f32,
}

impl Measurement {
    /// Create a new measurement
    pub fn new(timestamp: Timestamp, temperature: f32, humidity: f32) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
        }
    }

    /// Render the measurement as one segment row, trailing newline included.
    ///
    /// Format: `timestamp;temperature;humidity\n` with both values at two
    /// decimals. This is the on-disk compatibility contract; existing
    /// segment files must keep parsing after upgrades.
    pub fn to_row(&self) -> String {
        format!(
            "{};{:.2};{:.2}\n",
            self.timestamp, self.temperature, self.humidity
        )
    }

    /// Parse one segment row (without the trailing newline)
    pub fn parse_row(line: &str) -> Result<Self> {
        let mut parts = line.trim_end().split(';');
        let (ts, temp, hum) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(ts), Some(temp), Some(hum), None) => (ts, temp, hum),
            _ => {
                return Err(LogError::InvalidFormat(format!(
                    "expected 3 fields in row: {line:?}"
                )))
            }
        };

        let timestamp = ts
            .parse::<Timestamp>()
            .map_err(|_| LogError::InvalidFormat(format!("bad timestamp in row: {ts:?}")))?;
        let temperature = temp
            .parse::<f32>()
            .map_err(|_| LogError::InvalidFormat(format!("bad temperature in row: {temp:?}")))?;
        let humidity = hum
            .parse::<f32>()
            .map_err(|_| LogError::InvalidFormat(format!("bad humidity in row: {hum:?}")))?;

        Ok(Self {
            timestamp,
            temperature,
            humidity,
        })
    }
}

/// Filesystem usage snapshot
///
/// Queried from the storage medium on demand and never cached: eviction
/// decisions must observe the state after each deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FsUsage {
    /// Bytes currently occupied by stored files
    pub used_bytes: u64,
    /// Capacity budget of the medium
    pub total_bytes: u64,
}

impl FsUsage {
    /// Used capacity as an integer percentage (0 when the total is zero)
    ///
    /// Exceeds 100 when the directory has outgrown the configured budget,
    /// e.g. after the budget was shrunk below the existing data.
    pub fn percent(&self) -> u64 {
        if self.total_bytes == 0 {
            return 0;
        }
        self.used_bytes.saturating_mul(100) / self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_format() {
        let m = Measurement::new(1700000000, 21.5, 44.25);
        assert_eq!(m.to_row(), "1700000000;21.50;44.25\n");
    }

    #[test]
    fn test_row_round_trip() {
        let m = Measurement::new(1700000000, -3.75, 99.9);
        let parsed = Measurement::parse_row(m.to_row().trim_end()).unwrap();

        assert_eq!(parsed.timestamp, m.timestamp);
        assert!((parsed.temperature - m.temperature).abs() < 0.01);
        assert!((parsed.humidity - m.humidity).abs() < 0.01);
    }

    #[test]
    fn test_row_parse_trailing_newline() {
        let parsed = Measurement::parse_row("1700000000;20.00;50.00\n").unwrap();
        assert_eq!(parsed.timestamp, 1700000000);
    }

    #[test]
    fn test_row_parse_malformed() {
        assert!(Measurement::parse_row("").is_err());
        assert!(Measurement::parse_row("1700000000;20.00").is_err());
        assert!(Measurement::parse_row("1700000000;20.00;50.00;extra").is_err());
        assert!(Measurement::parse_row("soon;20.00;50.00").is_err());
        assert!(Measurement::parse_row("1700000000;warm;50.00").is_err());
    }

    #[test]
    fn test_usage_percent() {
        let usage = FsUsage {
            used_bytes: 850,
            total_bytes: 1000,
        };
        assert_eq!(usage.percent(), 85);

        let empty = FsUsage {
            used_bytes: 0,
            total_bytes: 0,
        };
        assert_eq!(empty.percent(), 0);
    }

    #[test]
    fn test_usage_percent_over_budget() {
        // Foreign files or a shrunk budget can push usage past the total
        let over = FsUsage {
            used_bytes: 12_000_000,
            total_bytes: 4_194_304,
        };
        assert_eq!(over.percent(), 286);
    }
}
