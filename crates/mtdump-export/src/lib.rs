//! Output tree lifecycle and the export loop.

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod layout;
mod run;

pub use layout::{LayoutError, OutputLayout};
pub use run::{ExportError, ExportReport, SkippedInstrument, run_export};
