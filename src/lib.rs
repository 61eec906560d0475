//! Site indicator report for HDSS surveillance data.
//!
//! Flat `(site, year, indicator, value)` rows are pivoted into one row per
//! indicator with a column per year, each row indented by what kind of
//! indicator it is, and exported as a spreadsheet.
//!
//! - `source`, `loader`: where the rows come from
//! - `pivot`: rows → one record per indicator
//! - `classify`: indentation and spacer rules
//! - `reports`: the renderable `ReportTable`
//! - `export`, `output`: spreadsheet, CSV and terminal renditions
//! - `session`: loading a site and holding the latest result
//! - `pyramid`: per-year age pyramids

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod output;
pub mod pivot;
pub mod pyramid;
pub mod reports;
pub mod session;
pub mod source;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use types::*;
