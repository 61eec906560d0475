use crate::error::{ReportError, Result};
use crate::loader::{load_csv, load_json, LoadReport};
use crate::types::{IndicatorObservation, SiteId};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;

/// Supplies the aggregated indicator rows of one site.
pub trait RowSource {
    fn fetch_aggregated_report(
        &self,
        site_id: SiteId,
    ) -> impl Future<Output = Result<Vec<IndicatorObservation>>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Json,
}

/// Reads rows from an aggregated export on disk (`.csv` or `.json`). The
/// file is re-read on every fetch.
#[derive(Debug, Clone)]
pub struct FileRowSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => FileFormat::Csv,
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => {
                return Err(ReportError::Config {
                    message: format!("{} is neither .csv nor .json", path.display()),
                })
            }
        };
        Ok(FileRowSource { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self, site_id: SiteId) -> Result<(Vec<IndicatorObservation>, LoadReport)> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ReportError::io(&self.path, e))?;
        match self.format {
            FileFormat::Csv => load_csv(text.as_bytes(), site_id),
            FileFormat::Json => load_json(&text, site_id),
        }
    }
}

impl RowSource for FileRowSource {
    async fn fetch_aggregated_report(&self, site_id: SiteId) -> Result<Vec<IndicatorObservation>> {
        let (rows, report) = self
            .read(site_id)
            .await
            .map_err(|e| ReportError::fetch(site_id, e.to_string()))?;
        info!(
            site = %site_id,
            total = report.total_rows,
            kept = report.site_rows,
            parse_errors = report.parse_errors,
            blank_values = report.blank_values,
            "read aggregated rows"
        );
        Ok(rows)
    }
}
