//! Bridge to the MetaTrader 5 terminal via the vendor's Python package.
//!
//! The terminal exposes its local API only through the `MetaTrader5` Python
//! package (Windows, attached to a running terminal process), so this backend
//! embeds a Python interpreter and drives the package directly. The package
//! must be importable from the interpreter pyo3 initializes.

use std::path::Path;

use mtdump_types::{RawBar, SymbolFilter, Timeframe};
use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::api::{Terminal, TerminalError, TerminalInfo};
use crate::session::Session;

/// Terminal backend backed by the vendor's `MetaTrader5` Python package.
#[derive(Debug)]
pub struct Mt5Terminal {
    module: Py<PyModule>,
}

impl Mt5Terminal {
    /// Connects to the terminal installed at `terminal_path` and returns a
    /// ready [`Session`].
    ///
    /// On a rejected connection the vendor's `shutdown()` is still invoked,
    /// so a half-initialized IPC channel is never leaked.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::ConnectFailed`] if the terminal refuses the
    /// connection, or [`TerminalError::Vendor`] if the vendor package cannot
    /// be imported or queried for identity.
    pub fn connect(terminal_path: &Path) -> Result<Session<Self>, TerminalError> {
        Python::with_gil(|py| {
            let mt5 = py.import("MetaTrader5").map_err(to_vendor)?;

            let initialized: bool = mt5
                .call_method1("initialize", (terminal_path.display().to_string(),))
                .and_then(|r| r.extract())
                .map_err(to_vendor)?;
            if !initialized {
                let _ = mt5.call_method0("shutdown");
                return Err(TerminalError::ConnectFailed {
                    path: terminal_path.to_path_buf(),
                });
            }

            let info = query_info(&mt5).map_err(to_vendor)?;
            Ok(Session::new(
                Self {
                    module: mt5.unbind(),
                },
                info,
            ))
        })
    }
}

impl Terminal for Mt5Terminal {
    fn instruments(&mut self, filter: &SymbolFilter) -> Result<Vec<String>, TerminalError> {
        Python::with_gil(|py| {
            let mt5 = self.module.bind(py);
            let symbols = mt5.call_method0("symbols_get").map_err(to_vendor)?;

            let mut names = Vec::new();
            for symbol in symbols.try_iter().map_err(to_vendor)? {
                let name: String = symbol
                    .and_then(|s| s.getattr("name")?.extract())
                    .map_err(to_vendor)?;
                if filter.matches(&name) {
                    names.push(name);
                }
            }
            Ok(names)
        })
    }

    fn fetch_bars(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> Result<Option<Vec<RawBar>>, TerminalError> {
        Python::with_gil(|py| {
            let mt5 = self.module.bind(py);
            let rates = mt5
                .call_method1(
                    "copy_rates_from_pos",
                    (symbol, timeframe.vendor_code(), 0u32, count),
                )
                .map_err(to_vendor)?;

            // The vendor returns None instead of raising when a pair has no
            // history at all.
            if rates.is_none() {
                return Ok(None);
            }

            let mut rows = Vec::new();
            for rate in rates.try_iter().map_err(to_vendor)? {
                let rate = rate.map_err(to_vendor)?;
                rows.push(extract_row(&rate).map_err(to_vendor)?);
            }
            Ok(Some(rows))
        })
    }

    fn shutdown(&mut self) {
        Python::with_gil(|py| {
            // Teardown must not raise on the exit path.
            let _ = self.module.bind(py).call_method0("shutdown");
        });
    }
}

/// Reads the diagnostic identity from a freshly initialized connection.
fn query_info(mt5: &Bound<'_, PyModule>) -> PyResult<TerminalInfo> {
    let terminal = mt5.call_method0("terminal_info")?;
    let account = mt5.call_method0("account_info")?;

    Ok(TerminalInfo {
        name: terminal.getattr("name")?.extract()?,
        path: terminal.getattr("path")?.extract()?,
        server: account.getattr("server")?.extract()?,
    })
}

/// Pulls one row out of the vendor's structured rates array.
fn extract_row(rate: &Bound<'_, PyAny>) -> PyResult<RawBar> {
    Ok(RawBar::new(
        rate.get_item("time")?.extract()?,
        rate.get_item("open")?.extract()?,
        rate.get_item("high")?.extract()?,
        rate.get_item("low")?.extract()?,
        rate.get_item("close")?.extract()?,
        rate.get_item("tick_volume")?.extract()?,
    ))
}

fn to_vendor(err: PyErr) -> TerminalError {
    TerminalError::Vendor(err.to_string())
}
