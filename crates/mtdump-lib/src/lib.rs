//! Facade crate for the mtdump OHLCV exporter.
//!
//! Re-exports the workspace crates for convenient access:
//!
//! ```
//! use mtdump_lib::prelude::*;
//!
//! let filter = SymbolFilter::parse("*, !*.*");
//! assert!(filter.matches("EURUSD"));
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use mtdump_types::*;

// Re-export the terminal session layer
#[cfg(feature = "mt5")]
pub use mtdump_terminal::Mt5Terminal;
pub use mtdump_terminal::{Session, Terminal, TerminalError, TerminalInfo};

// Re-export formatters
pub use mtdump_format::{CsvFormatter, FormatError, Formatter};

// Re-export the layout manager and export loop
pub use mtdump_export::{
    ExportError, ExportReport, LayoutError, OutputLayout, SkippedInstrument, run_export,
};

/// Prelude module for convenient imports.
///
/// ```
/// use mtdump_lib::prelude::*;
/// ```
pub mod prelude {
    pub use mtdump_export::{ExportError, ExportReport, OutputLayout, run_export};
    pub use mtdump_format::{CsvFormatter, Formatter};
    #[cfg(feature = "mt5")]
    pub use mtdump_terminal::Mt5Terminal;
    pub use mtdump_terminal::{Session, Terminal, TerminalError, TerminalInfo};
    pub use mtdump_types::{
        Bar, BarTable, ExportConfig, RawBar, RowError, SymbolFilter, Timeframe,
    };
}
