//! The export loop: timeframes × instruments to CSV files.

use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use mtdump_format::{CsvFormatter, FormatError, Formatter};
use mtdump_terminal::{Session, Terminal, TerminalError};
use mtdump_types::{BarTable, ExportConfig, RowError, Timeframe};
use thiserror::Error;

use crate::layout::OutputLayout;

/// Errors that abort an export run.
///
/// Per-instrument conditions ([`RowError`]) never surface here; they are
/// collected in the [`ExportReport`] instead.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The vendor terminal failed.
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    /// A produced table could not be written.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An interrupt was observed between downloads.
    #[error("interrupted")]
    Interrupted,
}

/// One (symbol, timeframe) pair skipped during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInstrument {
    /// The symbol that was skipped.
    pub symbol: String,
    /// The timeframe being exported when the skip occurred.
    pub timeframe: Timeframe,
    /// Why the pair produced no file.
    pub reason: RowError,
}

/// Summary of a completed export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Number of files written.
    pub files_written: usize,
    /// Pairs skipped for per-instrument reasons.
    pub skipped: Vec<SkippedInstrument>,
    /// Number of timeframes fully processed.
    pub timeframes_completed: usize,
    /// True if a timeframe subdirectory could not be created and the
    /// remaining timeframes were abandoned.
    pub stopped_early: bool,
}

/// Runs the export loop over every configured timeframe and symbol.
///
/// For each timeframe (in configuration order) a subdirectory is created,
/// then every symbol's most-recent `lookback` bars are fetched, validated,
/// and written as one CSV file. A symbol with no usable data is logged and
/// skipped; the rest of the timeframe proceeds. A timeframe subdirectory
/// that cannot be created stops the remaining timeframes but keeps what is
/// already on disk.
///
/// `interrupted` is polled between blocking calls; once observed the run
/// stops with [`ExportError::Interrupted`]. Session teardown is the caller's
/// scope's concern and happens on every return path.
///
/// # Errors
///
/// Returns [`ExportError::Terminal`] or [`ExportError::Format`] on the first
/// fatal vendor or write failure, and [`ExportError::Interrupted`] when the
/// interrupt flag is set.
pub fn run_export<T: Terminal>(
    session: &mut Session<T>,
    config: &ExportConfig,
    layout: &OutputLayout,
    symbols: &[String],
    interrupted: &AtomicBool,
) -> Result<ExportReport, ExportError> {
    let formatter = CsvFormatter::new();
    let mut report = ExportReport::default();

    for &timeframe in &config.timeframes {
        if interrupted.load(Ordering::SeqCst) {
            return Err(ExportError::Interrupted);
        }

        let dir = match layout.timeframe_dir(timeframe) {
            Ok(dir) => dir,
            Err(err) => {
                // Earlier timeframes are already on disk; keep them and stop.
                eprintln!("{err}");
                report.stopped_early = true;
                break;
            }
        };

        let progress = ProgressBar::new(symbols.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid progress template")
                .progress_chars("=>-"),
        );
        progress.set_prefix(format!("{:>3}", timeframe.as_str()));

        for symbol in symbols {
            if interrupted.load(Ordering::SeqCst) {
                progress.abandon();
                return Err(ExportError::Interrupted);
            }

            match fetch_table(session, symbol, timeframe, config.lookback)? {
                Ok(table) => {
                    let path = dir.join(format!("{symbol}.{}", formatter.extension()));
                    let file = File::create(&path).map_err(FormatError::Io)?;
                    formatter.write_bars(&table, BufWriter::new(file))?;
                    report.files_written += 1;
                }
                Err(reason) => {
                    progress.println(format!("{reason} on {symbol}"));
                    report.skipped.push(SkippedInstrument {
                        symbol: symbol.clone(),
                        timeframe,
                        reason,
                    });
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        println!("Finished downloading for {timeframe}");
        report.timeframes_completed += 1;
    }

    Ok(report)
}

/// Fetch-and-convert step for one (symbol, timeframe) pair.
///
/// The outer `Result` carries fatal failures; the inner one distinguishes a
/// usable table from a per-instrument skip.
fn fetch_table<T: Terminal>(
    session: &mut Session<T>,
    symbol: &str,
    timeframe: Timeframe,
    lookback: u32,
) -> Result<Result<BarTable, RowError>, ExportError> {
    let Some(rows) = session.fetch_bars(symbol, timeframe, lookback)? else {
        return Ok(Err(RowError::MissingField { field: "time" }));
    };
    Ok(BarTable::try_from_raw(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtdump_terminal::TerminalInfo;
    use mtdump_types::{RawBar, SymbolFilter};
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// In-memory terminal: per-symbol bar series shared by every timeframe.
    #[derive(Debug, Default)]
    struct FakeTerminal {
        symbols: Vec<String>,
        series: HashMap<String, Vec<RawBar>>,
        shutdowns: Arc<AtomicUsize>,
    }

    impl FakeTerminal {
        fn with_symbols(symbols: &[&str]) -> Self {
            Self {
                symbols: symbols.iter().map(ToString::to_string).collect(),
                ..Self::default()
            }
        }

        fn with_series(mut self, symbol: &str, series: Vec<RawBar>) -> Self {
            self.series.insert(symbol.to_string(), series);
            self
        }
    }

    impl Terminal for FakeTerminal {
        fn instruments(&mut self, filter: &SymbolFilter) -> Result<Vec<String>, TerminalError> {
            Ok(self
                .symbols
                .iter()
                .filter(|s| filter.matches(s))
                .cloned()
                .collect())
        }

        fn fetch_bars(
            &mut self,
            symbol: &str,
            _timeframe: Timeframe,
            count: u32,
        ) -> Result<Option<Vec<RawBar>>, TerminalError> {
            Ok(self.series.get(symbol).map(|series| {
                let keep = (count as usize).min(series.len());
                series[series.len() - keep..].to_vec()
            }))
        }

        fn shutdown(&mut self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn minute_series(start_epoch: i64, count: i64) -> Vec<RawBar> {
        (0..count)
            .map(|i| {
                let time = start_epoch + i * 60;
                RawBar::new(time, 1.10, 1.11, 1.09, 1.105, 100.0 + i as f64)
            })
            .collect()
    }

    fn test_config(working_root: &Path, timeframes: Vec<Timeframe>) -> ExportConfig {
        ExportConfig {
            terminal_path: PathBuf::from("/opt/terminal/terminal64.exe"),
            working_root: working_root.to_path_buf(),
            lookback: 10,
            timeframes,
            symbol_filter: SymbolFilter::parse("*, !*.*"),
        }
    }

    fn test_info() -> TerminalInfo {
        TerminalInfo {
            name: "Terminal".to_string(),
            path: "/opt/terminal".to_string(),
            server: "Demo-Server".to_string(),
        }
    }

    fn run_started() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 15)
            .unwrap()
    }

    fn idle() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn test_writes_one_file_per_symbol_and_timeframe() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path(), vec![Timeframe::Day1, Timeframe::Minute1]);
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();

        let terminal = FakeTerminal::with_symbols(&["EURUSD", "GBPUSD"])
            .with_series("EURUSD", minute_series(1_000_000, 10))
            .with_series("GBPUSD", minute_series(1_000_000, 4));
        let mut session = Session::new(terminal, test_info());
        let symbols = session.instruments(&config.symbol_filter).unwrap();

        let report = run_export(&mut session, &config, &layout, &symbols, &idle()).unwrap();

        assert_eq!(report.files_written, 4);
        assert_eq!(report.timeframes_completed, 2);
        assert!(report.skipped.is_empty());
        assert!(!report.stopped_early);
        for tf in ["d1", "m1"] {
            for symbol in ["EURUSD", "GBPUSD"] {
                assert!(layout.root().join(tf).join(format!("{symbol}.csv")).is_file());
            }
        }
    }

    #[test]
    fn test_file_contents_for_minute_series() {
        // lookback = 10, 1-minute bars at epochs 1_000_000..=1_000_540
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path(), vec![Timeframe::Minute1]);
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();

        let terminal = FakeTerminal::with_symbols(&["EURUSD"])
            .with_series("EURUSD", minute_series(1_000_000, 10));
        let mut session = Session::new(terminal, test_info());
        let symbols = session.instruments(&config.symbol_filter).unwrap();

        run_export(&mut session, &config, &layout, &symbols, &idle()).unwrap();

        let content = fs::read_to_string(layout.root().join("m1/EURUSD.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
        assert_eq!(lines.len(), 11);
        assert!(lines[1].starts_with("1970-01-12 13:46:40,"));
        assert!(lines[10].starts_with("1970-01-12 13:55:40,"));

        // Dates are non-decreasing down the file
        let dates: Vec<&str> = lines[1..]
            .iter()
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_lookback_caps_row_count() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path(), vec![Timeframe::Minute1]);
        config.lookback = 3;
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();

        let terminal = FakeTerminal::with_symbols(&["EURUSD"])
            .with_series("EURUSD", minute_series(1_000_000, 10));
        let mut session = Session::new(terminal, test_info());
        let symbols = session.instruments(&config.symbol_filter).unwrap();

        run_export(&mut session, &config, &layout, &symbols, &idle()).unwrap();

        let content = fs::read_to_string(layout.root().join("m1/EURUSD.csv")).unwrap();
        // Header plus the 3 most recent bars
        assert_eq!(content.lines().count(), 4);
        assert!(content.lines().nth(1).unwrap().starts_with("1970-01-12 13:53:40,"));
    }

    #[test]
    fn test_missing_data_symbol_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path(), vec![Timeframe::Minute1]);
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();

        // GHOST has no series at all: the vendor reports None for it
        let terminal = FakeTerminal::with_symbols(&["EURUSD", "GHOST"])
            .with_series("EURUSD", minute_series(1_000_000, 10));
        let mut session = Session::new(terminal, test_info());
        let symbols = session.instruments(&config.symbol_filter).unwrap();

        let report = run_export(&mut session, &config, &layout, &symbols, &idle()).unwrap();

        assert!(layout.root().join("m1/EURUSD.csv").is_file());
        assert!(!layout.root().join("m1/GHOST.csv").exists());
        // The timeframe still completes
        assert_eq!(report.timeframes_completed, 1);
        assert_eq!(
            report.skipped,
            vec![SkippedInstrument {
                symbol: "GHOST".to_string(),
                timeframe: Timeframe::Minute1,
                reason: RowError::MissingField { field: "time" },
            }]
        );
    }

    #[test]
    fn test_invalid_timestamp_symbol_is_skipped() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path(), vec![Timeframe::Minute1]);
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();

        let terminal = FakeTerminal::with_symbols(&["EURUSD", "BROKEN"])
            .with_series("EURUSD", minute_series(1_000_000, 10))
            .with_series("BROKEN", vec![RawBar::new(i64::MAX, 1.0, 1.0, 1.0, 1.0, 1.0)]);
        let mut session = Session::new(terminal, test_info());
        let symbols = session.instruments(&config.symbol_filter).unwrap();

        let report = run_export(&mut session, &config, &layout, &symbols, &idle()).unwrap();

        assert!(!layout.root().join("m1/BROKEN.csv").exists());
        assert_eq!(report.files_written, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].reason,
            RowError::InvalidValue {
                field: "time",
                value: i64::MAX,
            }
        );
    }

    #[test]
    fn test_blocked_timeframe_dir_stops_remaining_timeframes() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path(), vec![Timeframe::Day1, Timeframe::Hour4]);
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();
        // Occupy the h4 name so its create_dir fails
        fs::write(layout.root().join("h4"), b"occupied").unwrap();

        let terminal = FakeTerminal::with_symbols(&["EURUSD"])
            .with_series("EURUSD", minute_series(1_000_000, 10));
        let mut session = Session::new(terminal, test_info());
        let symbols = session.instruments(&config.symbol_filter).unwrap();

        let report = run_export(&mut session, &config, &layout, &symbols, &idle()).unwrap();

        // d1 written, h4 abandoned, run still returns a report
        assert!(layout.root().join("d1/EURUSD.csv").is_file());
        assert_eq!(report.timeframes_completed, 1);
        assert!(report.stopped_early);
    }

    #[test]
    fn test_interrupt_stops_run_and_session_still_closes() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path(), vec![Timeframe::Minute1]);
        let layout = OutputLayout::prepare(&config.data_root(), run_started()).unwrap();

        let shutdowns = Arc::new(AtomicUsize::new(0));
        let mut terminal = FakeTerminal::with_symbols(&["EURUSD"])
            .with_series("EURUSD", minute_series(1_000_000, 10));
        terminal.shutdowns = Arc::clone(&shutdowns);

        {
            let mut session = Session::new(terminal, test_info());
            let symbols = session.instruments(&config.symbol_filter).unwrap();

            let interrupted = AtomicBool::new(true);
            let err = run_export(&mut session, &config, &layout, &symbols, &interrupted)
                .unwrap_err();
            assert!(matches!(err, ExportError::Interrupted));
        }

        // Drop released the connection despite the aborted run
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        assert!(!layout.root().join("m1/EURUSD.csv").exists());
    }

    #[test]
    fn test_enumeration_applies_pattern() {
        let terminal = FakeTerminal::with_symbols(&["EURUSD", "AB.CD"]);
        let mut session = Session::new(terminal, test_info());

        let symbols = session
            .instruments(&SymbolFilter::parse("*, !*.*"))
            .unwrap();
        assert_eq!(symbols, vec!["EURUSD".to_string()]);
    }
}
