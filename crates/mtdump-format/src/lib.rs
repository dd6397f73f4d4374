//! Output formatting for mtdump bar tables.

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;

pub use csv::CsvFormatter;
pub use formatter::{FormatError, Formatter};
