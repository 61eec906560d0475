//! Error types for the site report pipeline.

use std::path::PathBuf;

use crate::types::SiteId;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReportError {
    /// No usable site identifier; nothing was fetched.
    #[error("No site selected. Please choose a site first.")]
    NoSiteSelected,

    /// The row source could not deliver the site's rows.
    #[error("Failed to load site report for site {site_id}: {message}")]
    Fetch { site_id: SiteId, message: String },

    /// A single report was fed observations from more than one site.
    #[error("Observations for site {expected} mixed with rows from site {found}")]
    MixedSites { expected: SiteId, found: SiteId },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: Some(path.into()),
            source,
        }
    }

    pub fn fetch(site_id: SiteId, message: impl Into<String>) -> Self {
        ReportError::Fetch {
            site_id,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(source: std::io::Error) -> Self {
        ReportError::Io { path: None, source }
    }
}
