//! Vendor terminal session layer for mtdump.
//!
//! - [`Terminal`] - the opaque vendor capability the export pipeline consumes
//! - [`Session`] - scoped acquisition with guaranteed teardown
//! - [`Mt5Terminal`] - bridge to the MetaTrader 5 Python package (feature `mt5`)

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
#[cfg(feature = "mt5")]
mod mt5;
mod session;

pub use api::{Terminal, TerminalError, TerminalInfo};
#[cfg(feature = "mt5")]
pub use mt5::Mt5Terminal;
pub use session::Session;
