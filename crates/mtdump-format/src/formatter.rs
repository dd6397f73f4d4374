//! Output format abstraction.

use std::io::Write;

use mtdump_types::BarTable;
use thiserror::Error;

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for output formatters.
pub trait Formatter {
    /// Writes a bar table to the output, oldest row first.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_bars<W: Write>(&self, table: &BarTable, writer: W) -> Result<(), FormatError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}
