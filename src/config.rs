use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::path::Path;

/// Layout settings for the spreadsheet export. Built once per export and
/// passed by reference; nothing here is global.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Width of the indicator name column, in characters.
    pub name_column_width: f64,
    /// Width of every year column, in characters.
    pub year_column_width: f64,
    /// RGB fill of the year header row.
    pub header_fill: u32,
    /// Year header text; `{year}` is replaced by the column's year.
    pub header_label: String,
    /// File name prefix, see `export::export_file_name`.
    pub file_prefix: String,
    /// Blank rows between the metadata block and the year header.
    pub blank_rows_after_metadata: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            name_column_width: 55.0,
            year_column_width: 15.0,
            header_fill: 0xD9D9D9,
            header_label: "DSS Annual Report\n(Year of {year})".to_string(),
            file_prefix: "HDSS_Site".to_string(),
            blank_rows_after_metadata: 2,
        }
    }
}

impl ExportConfig {
    pub fn header_text(&self, year: i32) -> String {
        self.header_label.replace("{year}", &year.to_string())
    }

    fn validate(self) -> Result<Self> {
        if !(1.0..=255.0).contains(&self.name_column_width)
            || !(1.0..=255.0).contains(&self.year_column_width)
        {
            return Err(ReportError::Config {
                message: "column widths must be between 1 and 255".to_string(),
            });
        }
        if self.header_fill > 0xFFFFFF {
            return Err(ReportError::Config {
                message: format!("header_fill {:#x} is not an RGB colour", self.header_fill),
            });
        }
        Ok(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ExportConfig = toml::from_str(s).map_err(|e| ReportError::Config {
            message: e.to_string(),
        })?;
        cfg.validate()
    }

    /// Load overrides from a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_toml_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ExportConfig::from_toml_str("name_column_width = 60\nfile_prefix = \"CHAMPS_HDSS_Site\"").unwrap();
        assert_eq!(cfg.name_column_width, 60.0);
        assert_eq!(cfg.year_column_width, 15.0);
        assert_eq!(cfg.file_prefix, "CHAMPS_HDSS_Site");
    }

    #[test]
    fn rejects_bad_widths() {
        let err = ExportConfig::from_toml_str("year_column_width = 0").unwrap_err();
        assert!(matches!(err, ReportError::Config { .. }));
    }

    #[test]
    fn header_label_substitutes_year() {
        let cfg = ExportConfig::default();
        assert_eq!(cfg.header_text(2021), "DSS Annual Report\n(Year of 2021)");
    }
}
