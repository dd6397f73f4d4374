//! Export run configuration.

use std::path::PathBuf;

use crate::{SymbolFilter, Timeframe};

/// Immutable configuration for one export run.
///
/// The binary constructs this once from compile-time constants and passes it
/// down; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Path to the terminal executable to attach to.
    pub terminal_path: PathBuf,
    /// Directory under which the output tree is created.
    pub working_root: PathBuf,
    /// Maximum number of most-recent bars per (symbol, timeframe).
    pub lookback: u32,
    /// Timeframes to export, in export order.
    pub timeframes: Vec<Timeframe>,
    /// Symbol inclusion/exclusion pattern.
    pub symbol_filter: SymbolFilter,
}

impl ExportConfig {
    /// Returns the output root directory, `<working_root>/data`.
    #[must_use]
    pub fn data_root(&self) -> PathBuf {
        self.working_root.join("data")
    }
}
