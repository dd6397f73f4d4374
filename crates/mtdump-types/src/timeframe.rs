//! OHLCV timeframe definitions.

use std::str::FromStr;

/// OHLCV bar timeframe.
///
/// The set is fixed at the seven bucket sizes the exporter downloads; it is
/// not discovered from the terminal at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    /// Daily bars.
    Day1,
    /// 4-hour bars.
    Hour4,
    /// 1-hour bars.
    Hour1,
    /// 30-minute bars.
    Minute30,
    /// 15-minute bars.
    Minute15,
    /// 5-minute bars.
    Minute5,
    /// 1-minute bars.
    Minute1,
}

impl Timeframe {
    /// Returns the timeframe as a string identifier.
    ///
    /// The identifier doubles as the per-timeframe output subdirectory name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day1 => "d1",
            Self::Hour4 => "h4",
            Self::Hour1 => "h1",
            Self::Minute30 => "m30",
            Self::Minute15 => "m15",
            Self::Minute5 => "m5",
            Self::Minute1 => "m1",
        }
    }

    /// Returns the vendor API's numeric code for this timeframe.
    ///
    /// Minute buckets are encoded as their length in minutes; hour and day
    /// buckets carry the vendor's high flag bit.
    #[must_use]
    pub const fn vendor_code(&self) -> i32 {
        match self {
            Self::Day1 => 16408,
            Self::Hour4 => 16388,
            Self::Hour1 => 16385,
            Self::Minute30 => 30,
            Self::Minute15 => 15,
            Self::Minute5 => 5,
            Self::Minute1 => 1,
        }
    }

    /// Returns the bucket duration in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Day1 => 86400,
            Self::Hour4 => 14400,
            Self::Hour1 => 3600,
            Self::Minute30 => 1800,
            Self::Minute15 => 900,
            Self::Minute5 => 300,
            Self::Minute1 => 60,
        }
    }

    /// Returns all timeframes in export order (largest bucket first).
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Day1,
            Self::Hour4,
            Self::Hour1,
            Self::Minute30,
            Self::Minute15,
            Self::Minute5,
            Self::Minute1,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d1" | "1d" | "day" | "daily" => Ok(Self::Day1),
            "h4" | "4h" => Ok(Self::Hour4),
            "h1" | "1h" | "hour" => Ok(Self::Hour1),
            "m30" | "30m" => Ok(Self::Minute30),
            "m15" | "15m" => Ok(Self::Minute15),
            "m5" | "5m" => Ok(Self::Minute5),
            "m1" | "1m" | "minute" => Ok(Self::Minute1),
            _ => Err(TimeframeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid timeframe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeParseError(String);

impl std::fmt::Display for TimeframeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timeframe '{}', expected one of: d1, h4, h1, m30, m15, m5, m1",
            self.0
        )
    }
}

impl std::error::Error for TimeframeParseError {}
