use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::PegelError;

/// A positive sampling interval with whole-second resolution.
///
/// `Every` is used both as the frequency tag of a regular series and as the
/// aggregation window of a store query, so the same value that windows a
/// query can later validate the spacing of the frame it produced.
///
/// Values render to and parse from compact duration notation with a single
/// unit suffix (`s`, `m`, `h`, `d`, `w`):
///
/// ```
/// use pegel_core::Every;
///
/// let every: Every = "15m".parse().unwrap();
/// assert_eq!(every.as_secs(), 900);
/// assert_eq!(every.to_string(), "15m");
///
/// // Display picks the largest unit that divides evenly.
/// assert_eq!(Every::seconds(5400).unwrap().to_string(), "90m");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Every {
    secs: i64,
}

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_WEEK: i64 = 604_800;

impl Every {
    /// One minute.
    pub const MINUTE: Self = Self {
        secs: SECS_PER_MINUTE,
    };
    /// One hour.
    pub const HOUR: Self = Self {
        secs: SECS_PER_HOUR,
    };
    /// One day.
    pub const DAY: Self = Self { secs: SECS_PER_DAY };

    fn new(n: u32, unit_secs: i64, unit: &str) -> Result<Self, PegelError> {
        if n == 0 {
            return Err(PegelError::invalid_arg(format!(
                "interval must be positive, got 0{unit}"
            )));
        }
        Ok(Self {
            secs: i64::from(n) * unit_secs,
        })
    }

    /// Build an interval of `n` seconds.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `n` is zero.
    pub fn seconds(n: u32) -> Result<Self, PegelError> {
        Self::new(n, 1, "s")
    }

    /// Build an interval of `n` minutes.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `n` is zero.
    pub fn minutes(n: u32) -> Result<Self, PegelError> {
        Self::new(n, SECS_PER_MINUTE, "m")
    }

    /// Build an interval of `n` hours.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `n` is zero.
    pub fn hours(n: u32) -> Result<Self, PegelError> {
        Self::new(n, SECS_PER_HOUR, "h")
    }

    /// Build an interval of `n` days.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `n` is zero.
    pub fn days(n: u32) -> Result<Self, PegelError> {
        Self::new(n, SECS_PER_DAY, "d")
    }

    /// Build an interval of `n` weeks.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `n` is zero.
    pub fn weeks(n: u32) -> Result<Self, PegelError> {
        Self::new(n, SECS_PER_WEEK, "w")
    }

    /// Length of the interval in whole seconds. Always positive.
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.secs
    }

    /// The interval as a [`chrono::TimeDelta`].
    #[must_use]
    pub const fn to_delta(self) -> TimeDelta {
        TimeDelta::seconds(self.secs)
    }
}

impl fmt::Display for Every {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = if self.secs % SECS_PER_WEEK == 0 {
            (self.secs / SECS_PER_WEEK, "w")
        } else if self.secs % SECS_PER_DAY == 0 {
            (self.secs / SECS_PER_DAY, "d")
        } else if self.secs % SECS_PER_HOUR == 0 {
            (self.secs / SECS_PER_HOUR, "h")
        } else if self.secs % SECS_PER_MINUTE == 0 {
            (self.secs / SECS_PER_MINUTE, "m")
        } else {
            (self.secs, "s")
        };
        write!(f, "{value}{unit}")
    }
}

impl FromStr for Every {
    type Err = PegelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || PegelError::invalid_arg(format!("invalid duration literal '{s}'"));
        if s.len() < 2 || !s.is_ascii() {
            return Err(bad());
        }
        let (digits, unit) = s.split_at(s.len() - 1);
        let unit_secs = match unit {
            "s" => 1,
            "m" => SECS_PER_MINUTE,
            "h" => SECS_PER_HOUR,
            "d" => SECS_PER_DAY,
            "w" => SECS_PER_WEEK,
            _ => return Err(bad()),
        };
        let n: i64 = digits.parse().map_err(|_| bad())?;
        if n <= 0 {
            return Err(PegelError::invalid_arg(format!(
                "interval must be positive, got '{s}'"
            )));
        }
        let secs = n.checked_mul(unit_secs).ok_or_else(bad)?;
        Ok(Self { secs })
    }
}

impl TryFrom<String> for Every {
    type Error = PegelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Every> for String {
    fn from(every: Every) -> Self {
        every.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Every;

    #[test]
    fn constructors_reject_zero() {
        assert!(Every::seconds(0).is_err());
        assert!(Every::hours(0).is_err());
        assert_eq!(Every::minutes(5).unwrap().as_secs(), 300);
    }

    #[test]
    fn parse_and_render_round_trip() {
        for raw in ["30s", "5m", "90m", "1h", "6h", "1d", "2w"] {
            let every: Every = raw.parse().unwrap();
            assert_eq!(every.to_string(), raw);
        }
    }

    #[test]
    fn display_picks_largest_clean_unit() {
        assert_eq!(Every::seconds(90).unwrap().to_string(), "90s");
        assert_eq!(Every::seconds(120).unwrap().to_string(), "2m");
        assert_eq!(Every::hours(24).unwrap().to_string(), "1d");
        assert_eq!(Every::days(7).unwrap().to_string(), "1w");
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["", "h", "1", "0m", "-5m", "5x", "1.5h", "m5", "5 m"] {
            assert!(raw.parse::<Every>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn serde_uses_duration_notation() {
        let every = Every::HOUR;
        assert_eq!(serde_json::to_string(&every).unwrap(), "\"1h\"");
        let back: Every = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(back, Every::minutes(15).unwrap());
        assert!(serde_json::from_str::<Every>("\"0m\"").is_err());
    }
}
