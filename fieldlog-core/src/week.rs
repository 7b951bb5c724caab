//! Week keys - the partition identifier for segments
//!
//! Every measurement maps to the calendar week of its timestamp, and all
//! measurements of one week share one segment file. The key renders as
//! `YYYY-Wnn`; because both components are zero-padded, the lexicographic
//! order of the rendered keys equals their chronological order, which the
//! retention logic relies on.

use crate::{LogError, Result, Timestamp};
use chrono::{DateTime, Datelike, Utc};
use std::fmt;
use std::str::FromStr;

/// Identifier of one calendar-week segment
///
/// The week number is not ISO 8601: it is `floor(day_of_year / 7) + 1`
/// with a zero-based day of year, giving weeks 1..=53 anchored at
/// January 1st. Late-December days always stay in their own year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    /// Derive the key for a timestamp
    ///
    /// Fails for timestamps outside the representable UTC calendar range.
    pub fn from_timestamp(ts: Timestamp) -> Result<Self> {
        let datetime =
            DateTime::<Utc>::from_timestamp(ts, 0).ok_or(LogError::InvalidTime(ts))?;
        Ok(Self {
            year: datetime.year(),
            week: datetime.ordinal0() / 7 + 1,
        })
    }

    /// Calendar year component
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Week-of-year component (1..=53)
    pub fn week(&self) -> u32 {
        self.week
    }

    /// File name of the segment holding this week, `YYYY-Wnn.csv`
    pub fn file_name(&self) -> String {
        format!("{self}.csv")
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || LogError::InvalidFormat(format!("bad week key: {s:?}"));

        let (year, week) = s.split_once("-W").ok_or_else(bad)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(bad());
        }
        let year = year.parse::<i32>().map_err(|_| bad())?;
        let week = week.parse::<u32>().map_err(|_| bad())?;
        if !(1..=53).contains(&week) {
            return Err(bad());
        }

        Ok(Self { year, week })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_key_derivation() {
        // Jan 1..7 is week 1, Jan 8 starts week 2
        assert_eq!(
            WeekKey::from_timestamp(ts(2024, 1, 1)).unwrap().to_string(),
            "2024-W01"
        );
        assert_eq!(
            WeekKey::from_timestamp(ts(2024, 1, 7)).unwrap().to_string(),
            "2024-W01"
        );
        assert_eq!(
            WeekKey::from_timestamp(ts(2024, 1, 8)).unwrap().to_string(),
            "2024-W02"
        );
        // Dec 31 of a leap year is day 365 (zero-based), week 53
        assert_eq!(
            WeekKey::from_timestamp(ts(2024, 12, 31)).unwrap().to_string(),
            "2024-W53"
        );
    }

    #[test]
    fn test_key_unrepresentable_timestamp() {
        assert!(WeekKey::from_timestamp(i64::MAX).is_err());
    }

    #[test]
    fn test_key_ordering() {
        let keys = [
            WeekKey::from_timestamp(ts(2024, 12, 10)).unwrap(),
            WeekKey::from_timestamp(ts(2025, 1, 2)).unwrap(),
            WeekKey::from_timestamp(ts(2024, 2, 1)).unwrap(),
            WeekKey::from_timestamp(ts(2025, 6, 15)).unwrap(),
        ];

        let mut by_key = keys;
        by_key.sort();
        let mut by_string: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        by_string.sort();

        let rendered: Vec<String> = by_key.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, by_string);
    }

    #[test]
    fn test_parse_round_trip() {
        let key = WeekKey::from_timestamp(ts(2025, 3, 3)).unwrap();
        let parsed: WeekKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_parse_malformed() {
        assert!("2025-03".parse::<WeekKey>().is_err());
        assert!("2025-W3".parse::<WeekKey>().is_err());
        assert!("25-W03".parse::<WeekKey>().is_err());
        assert!("2025-W00".parse::<WeekKey>().is_err());
        assert!("2025-W54".parse::<WeekKey>().is_err());
        assert!("2025-Wxx".parse::<WeekKey>().is_err());
    }

    #[test]
    fn test_file_name() {
        let key: WeekKey = "2025-W03".parse().unwrap();
        assert_eq!(key.file_name(), "2025-W03.csv");
    }
}
