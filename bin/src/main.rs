//! mtdump - bulk OHLCV history exporter for a running MetaTrader 5 terminal.
//!
//! One-shot batch tool: it takes no arguments, connects to the terminal,
//! rotates any previous `data/` tree aside, and downloads every tradable
//! symbol for the seven configured timeframes as CSV files. All parameters
//! are fixed at build time below.

#[cfg(feature = "mt5")]
fn main() {
    app::main()
}

#[cfg(not(feature = "mt5"))]
fn main() {
    eprintln!("mtdump was built without the vendor terminal bridge; rebuild with --features mt5");
    std::process::exit(2);
}

#[cfg(feature = "mt5")]
mod app {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::{Context, Result};
    use chrono::Local;
    use mtdump_lib::prelude::*;

    /// Terminal installation to attach to.
    const TERMINAL_PATH: &str = "C:/Program Files/MetaTrader 5/terminal64.exe";
    /// Directory under which the `data/` tree is written.
    const WORKING_ROOT: &str = ".";
    /// Most-recent bars to request per (symbol, timeframe).
    const LOOKBACK: u32 = 1_000_000;
    /// Every symbol, excluding dotted composite listings.
    const SYMBOL_PATTERN: &str = "*, !*.*";

    /// Set by the ctrl-c handler, polled by the export loop between
    /// blocking calls.
    static INTERRUPTED: AtomicBool = AtomicBool::new(false);

    pub(crate) fn main() {
        let code = match run() {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("{err:#}");
                exit_code(&err)
            }
        };
        // The session is dropped inside run() on every path, so exiting
        // here cannot leak the terminal connection.
        std::process::exit(code);
    }

    fn exit_code(err: &anyhow::Error) -> i32 {
        match err.downcast_ref::<ExportError>() {
            Some(ExportError::Interrupted) => 130,
            _ => 1,
        }
    }

    fn run() -> Result<()> {
        ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
            .context("failed to install interrupt handler")?;

        let config = ExportConfig {
            terminal_path: PathBuf::from(TERMINAL_PATH),
            working_root: PathBuf::from(WORKING_ROOT),
            lookback: LOOKBACK,
            timeframes: Timeframe::all().to_vec(),
            symbol_filter: SymbolFilter::parse(SYMBOL_PATTERN),
        };
        let run_started = Local::now().naive_local();

        let mut session = Mt5Terminal::connect(&config.terminal_path)?;
        let info = session.info();
        println!(
            "Connected to {} at {} with server {}",
            info.name, info.path, info.server
        );
        println!("Run started at {}", run_started.format("%Y-%m-%d %H:%M:%S"));

        // Teardown is guaranteed by the session's scope on every path below.
        let layout = OutputLayout::prepare(&config.data_root(), run_started)?;
        if let Some(backup) = layout.backup() {
            println!("Previous output moved to {}", backup.display());
        }

        let symbols = session.instruments(&config.symbol_filter)?;
        println!("Exporting {} symbols", symbols.len());

        let report = run_export(&mut session, &config, &layout, &symbols, &INTERRUPTED)?;
        session.disconnect();

        println!();
        println!("Export complete:");
        println!("  Files written: {}", report.files_written);
        if report.stopped_early {
            println!(
                "  Timeframes completed: {} of {}",
                report.timeframes_completed,
                config.timeframes.len()
            );
        }
        if !report.skipped.is_empty() {
            println!("  Skipped: {}", report.skipped.len());
            for skip in &report.skipped {
                println!("    {} {}: {}", skip.timeframe, skip.symbol, skip.reason);
            }
        }

        Ok(())
    }
}
