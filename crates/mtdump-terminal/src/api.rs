//! Vendor terminal abstraction.

use std::path::PathBuf;

use mtdump_types::{RawBar, SymbolFilter, Timeframe};
use thiserror::Error;

/// Errors raised by a vendor terminal backend.
#[derive(Error, Debug)]
pub enum TerminalError {
    /// The terminal rejected the connection attempt.
    #[error("failed to connect to terminal at '{}'", path.display())]
    ConnectFailed {
        /// The terminal executable that was targeted.
        path: PathBuf,
    },

    /// The vendor API reported an error.
    #[error("terminal API error: {0}")]
    Vendor(String),
}

/// Identity reported by the terminal after a successful connection.
///
/// Read-only; used for the startup diagnostic banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalInfo {
    /// Terminal product name.
    pub name: String,
    /// Terminal installation path.
    pub path: String,
    /// Server name of the connected account.
    pub server: String,
}

/// The vendor terminal capability consumed by the export pipeline.
///
/// Every call is blocking with no timeout of its own; the vendor's behavior
/// governs latency. Implementations wrap a concrete vendor API and surface
/// its failures as [`TerminalError`].
pub trait Terminal {
    /// Lists tradable symbol names passing `filter`, in vendor order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor enumeration call fails.
    fn instruments(&mut self, filter: &SymbolFilter) -> Result<Vec<String>, TerminalError>;

    /// Fetches up to `count` most-recent bars for (symbol, timeframe),
    /// counted backward from the newest available bar.
    ///
    /// Returns `Ok(None)` when the vendor has no data for the pair; that is
    /// an ordinary per-instrument condition, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor call itself fails.
    fn fetch_bars(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> Result<Option<Vec<RawBar>>, TerminalError>;

    /// Releases the vendor connection.
    ///
    /// Invoked at most once by [`Session`](crate::Session); must not fail on
    /// the exit path.
    fn shutdown(&mut self);
}
