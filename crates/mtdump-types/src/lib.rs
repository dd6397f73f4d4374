//! Core types for the mtdump OHLCV exporter.
//!
//! This crate provides the fundamental data structures used throughout mtdump:
//!
//! - [`Timeframe`] - the fixed set of OHLCV bucket sizes and their vendor codes
//! - [`RawBar`] - a vendor bar row before timestamp validation
//! - [`Bar`] / [`BarTable`] - validated rows for one (symbol, timeframe) pair
//! - [`SymbolFilter`] - the symbol inclusion/exclusion pattern
//! - [`ExportConfig`] - the immutable configuration for one export run

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod config;
mod error;
mod filter;
mod timeframe;

pub use bar::{Bar, BarTable, RawBar};
pub use config::ExportConfig;
pub use error::RowError;
pub use filter::SymbolFilter;
pub use timeframe::{Timeframe, TimeframeParseError};
