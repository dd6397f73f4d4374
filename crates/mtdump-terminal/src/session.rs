//! Scoped terminal session with guaranteed teardown.

use mtdump_types::{RawBar, SymbolFilter, Timeframe};

use crate::api::{Terminal, TerminalError, TerminalInfo};

/// A connected terminal session.
///
/// Owns the terminal backend for the duration of the run and releases the
/// connection exactly once, on every exit path: normal completion, early
/// return after a setup failure, an observed interrupt, and unwinding.
/// [`Session::disconnect`] is idempotent; `Drop` covers whichever paths did
/// not call it explicitly.
#[derive(Debug)]
pub struct Session<T: Terminal> {
    terminal: T,
    info: TerminalInfo,
    connected: bool,
}

impl<T: Terminal> Session<T> {
    /// Wraps an already-connected terminal backend.
    #[must_use]
    pub const fn new(terminal: T, info: TerminalInfo) -> Self {
        Self {
            terminal,
            info,
            connected: true,
        }
    }

    /// Returns the identity the terminal reported at connect time.
    #[must_use]
    pub const fn info(&self) -> &TerminalInfo {
        &self.info
    }

    /// Lists tradable symbol names passing `filter`, in vendor order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor enumeration call fails.
    pub fn instruments(&mut self, filter: &SymbolFilter) -> Result<Vec<String>, TerminalError> {
        self.terminal.instruments(filter)
    }

    /// Fetches up to `count` most-recent bars for (symbol, timeframe).
    ///
    /// `Ok(None)` means the vendor has no data for the pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor call fails.
    pub fn fetch_bars(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        count: u32,
    ) -> Result<Option<Vec<RawBar>>, TerminalError> {
        self.terminal.fetch_bars(symbol, timeframe, count)
    }

    /// Releases the terminal connection. Idempotent.
    pub fn disconnect(&mut self) {
        if self.connected {
            self.terminal.shutdown();
            self.connected = false;
        }
    }
}

impl<T: Terminal> Drop for Session<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct CountingTerminal {
        shutdowns: Arc<AtomicUsize>,
    }

    impl Terminal for CountingTerminal {
        fn instruments(&mut self, _filter: &SymbolFilter) -> Result<Vec<String>, TerminalError> {
            Ok(vec!["EURUSD".to_string()])
        }

        fn fetch_bars(
            &mut self,
            _symbol: &str,
            _timeframe: Timeframe,
            _count: u32,
        ) -> Result<Option<Vec<RawBar>>, TerminalError> {
            Ok(None)
        }

        fn shutdown(&mut self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_info() -> TerminalInfo {
        TerminalInfo {
            name: "Terminal".to_string(),
            path: "/opt/terminal".to_string(),
            server: "Demo-Server".to_string(),
        }
    }

    fn counting_session() -> (Session<CountingTerminal>, Arc<AtomicUsize>) {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let terminal = CountingTerminal {
            shutdowns: Arc::clone(&shutdowns),
        };
        (Session::new(terminal, test_info()), shutdowns)
    }

    #[test]
    fn test_drop_disconnects() {
        let (session, shutdowns) = counting_session();
        drop(session);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (mut session, shutdowns) = counting_session();
        session.disconnect();
        session.disconnect();
        drop(session);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_on_early_return() {
        let (shutdowns, result) = {
            let (mut session, shutdowns) = counting_session();
            let result: Result<(), TerminalError> = (|| {
                let bars = session.fetch_bars("EURUSD", Timeframe::Minute1, 10)?;
                assert!(bars.is_none());
                // Simulated setup failure: bail out before the export loop.
                Err(TerminalError::Vendor("setup failed".to_string()))
            })();
            (shutdowns, result)
        };

        assert!(result.is_err());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_info_accessor() {
        let (session, _shutdowns) = counting_session();
        assert_eq!(session.info().server, "Demo-Server");
    }
}
