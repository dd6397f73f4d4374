//! OHLCV bar rows and table validation.

use chrono::{DateTime, NaiveDateTime};

use crate::error::RowError;

/// A single OHLCV row as returned by the vendor terminal, before validation.
///
/// `time` is the bar open time in epoch seconds on the vendor's clock
/// (server/exchange time); `volume` is the vendor's tick volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    /// Bar open time in epoch seconds.
    pub time: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar.
    pub high: f64,
    /// Lowest price during the bar.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Tick volume.
    pub volume: f64,
}

impl RawBar {
    /// Creates a new raw bar.
    #[must_use]
    pub const fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Validates the row, converting the epoch-second timestamp to a
    /// date/time value.
    ///
    /// No timezone conversion is applied: the timestamp is rendered on
    /// whatever clock the vendor reported it.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::InvalidValue`] if `time` is not representable as a
    /// timestamp.
    pub fn validate(self) -> Result<Bar, RowError> {
        let timestamp = DateTime::from_timestamp(self.time, 0)
            .ok_or(RowError::InvalidValue {
                field: "time",
                value: self.time,
            })?
            .naive_utc();

        Ok(Bar {
            timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// A validated OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Bar open time, as reported by the vendor.
    pub timestamp: NaiveDateTime,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar.
    pub high: f64,
    /// Lowest price during the bar.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Tick volume.
    pub volume: f64,
}

/// Validated bar rows for one (symbol, timeframe) pair, oldest first.
///
/// A table is produced once per pair, written to storage immediately, and
/// dropped, so peak memory stays bounded to a single table regardless of the
/// lookback size.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTable {
    rows: Vec<Bar>,
}

impl BarTable {
    /// Validates a sequence of vendor rows into a table.
    ///
    /// Row order is preserved; the vendor returns bars oldest to newest.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::MissingField`] if `raw` is empty (the vendor had
    /// no rows, so the result carries no timestamp field), or
    /// [`RowError::InvalidValue`] for the first row whose timestamp cannot be
    /// interpreted.
    pub fn try_from_raw(raw: Vec<RawBar>) -> Result<Self, RowError> {
        if raw.is_empty() {
            return Err(RowError::MissingField { field: "time" });
        }

        let mut rows = Vec::with_capacity(raw.len());
        for bar in raw {
            rows.push(bar.validate()?);
        }

        Ok(Self { rows })
    }

    /// Returns the validated rows, oldest first.
    #[must_use]
    pub fn rows(&self) -> &[Bar] {
        &self.rows
    }

    /// Returns the number of rows in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    ///
    /// A table built through [`Self::try_from_raw`] is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time: i64) -> RawBar {
        RawBar::new(time, 1.1000, 1.1050, 1.0980, 1.1020, 250.0)
    }

    #[test]
    fn test_validate_converts_epoch_seconds() {
        let bar = raw(1_000_000).validate().unwrap();
        assert_eq!(
            bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            "1970-01-12 13:46:40"
        );
        assert!((bar.open - 1.1000).abs() < 1e-10);
        assert!((bar.volume - 250.0).abs() < 1e-10);
    }

    #[test]
    fn test_validate_rejects_out_of_range_time() {
        let err = raw(i64::MAX).validate().unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidValue {
                field: "time",
                value: i64::MAX,
            }
        );
    }

    #[test]
    fn test_table_preserves_order() {
        let rows: Vec<RawBar> = (0..10).map(|i| raw(1_000_000 + i * 60)).collect();
        let table = BarTable::try_from_raw(rows).unwrap();

        assert_eq!(table.len(), 10);
        assert!(
            table
                .rows()
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp)
        );
    }

    #[test]
    fn test_empty_result_is_missing_field() {
        let err = BarTable::try_from_raw(Vec::new()).unwrap_err();
        assert_eq!(err, RowError::MissingField { field: "time" });
    }

    #[test]
    fn test_table_fails_on_first_bad_row() {
        let rows = vec![raw(1_000_000), raw(i64::MIN), raw(1_000_120)];
        let err = BarTable::try_from_raw(rows).unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidValue {
                field: "time",
                value: i64::MIN,
            }
        );
    }
}
