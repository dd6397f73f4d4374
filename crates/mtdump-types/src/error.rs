//! Row validation errors.

use thiserror::Error;

/// Errors produced while validating a vendor bar row.
///
/// Both variants are recoverable at the export-loop level: the offending
/// (symbol, timeframe) pair is logged and skipped, and the run continues with
/// the next instrument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The vendor result lacks an expected field, typically because the
    /// instrument has no data for the requested timeframe.
    #[error("missing expected field '{field}'")]
    MissingField {
        /// The absent field name.
        field: &'static str,
    },

    /// A field value cannot be interpreted, e.g. a timestamp outside the
    /// representable epoch-seconds range.
    #[error("invalid value {value} for field '{field}'")]
    InvalidValue {
        /// The offending field name.
        field: &'static str,
        /// The raw value as returned by the vendor.
        value: i64,
    },
}
