use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a surveillance site. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(u32);

impl SiteId {
    /// Returns `None` for zero, which the reporting API never hands out.
    pub fn new(id: u32) -> Option<Self> {
        if id == 0 {
            None
        } else {
            Some(SiteId(id))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the aggregated indicator CSV export. Every field is kept as
/// text so that a single bad cell doesn't fail the whole file.
#[derive(Debug, Deserialize)]
pub struct RawObservationRow {
    #[serde(rename = "siteId")]
    pub site_id: Option<String>,
    #[serde(rename = "siteName")]
    pub site_name: Option<String>,
    #[serde(rename = "countryName")]
    pub country_name: Option<String>,
    #[serde(rename = "dataYear")]
    pub data_year: Option<String>,
    #[serde(rename = "indicatorCode")]
    pub indicator_code: Option<String>,
    #[serde(rename = "indicatorName")]
    pub indicator_name: Option<String>,
    #[serde(rename = "dataType")]
    pub data_type: Option<String>,
    #[serde(rename = "lastEntryDate")]
    pub last_entry_date: Option<String>,
    #[serde(rename = "indicatorValue")]
    pub indicator_value: Option<String>,
}

/// The same row as served by the reporting API in JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiObservationRow {
    pub site_id: u32,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub country_name: String,
    pub data_year: i32,
    pub indicator_code: String,
    #[serde(default)]
    pub indicator_name: String,
    #[serde(default)]
    pub data_type: String,
    pub last_entry_date: Option<String>,
    pub indicator_value: Option<f64>,
}

/// A single `(site, year, indicator, value)` observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorObservation {
    pub site_id: SiteId,
    pub site_name: String,
    pub country_name: String,
    pub data_year: i32,
    pub indicator_code: String,
    pub indicator_name: String,
    pub data_type: String,
    pub last_entry_date: Option<NaiveDate>,
    pub indicator_value: Option<f64>,
}

/// Presentation depth of a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndentLevel {
    /// Summary rows and section headers.
    Top,
    /// Sub-counts of a total.
    Light,
    /// Leaf breakdowns: age bands, places, outcomes.
    Deep,
}

impl IndentLevel {
    pub fn depth(self) -> u8 {
        match self {
            IndentLevel::Top => 0,
            IndentLevel::Light => 1,
            IndentLevel::Deep => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresentationDecision {
    pub indent_level: IndentLevel,
    pub preceded_by_spacer: bool,
}

/// One indicator with its values keyed by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub indicator_code: String,
    pub indicator_name: String,
    pub values: BTreeMap<i32, Option<f64>>,
}

/// A `(code, year)` pair that was observed more than once. The replacement
/// value is the one kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateKey {
    pub indicator_code: String,
    pub data_year: i32,
    pub previous: Option<f64>,
    pub replacement: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub site_id: SiteId,
    pub country_name: String,
    pub site_name: String,
    pub generated_at: NaiveDateTime,
    pub last_upload_date: Option<NaiveDate>,
}

/// A value cell of the report. `Blank` is never rendered as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Cell {
    Blank,
    Number(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetadataField {
    Country,
    Site,
    GeneratedAt,
    UploadDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyRow {
    pub indicator_code: String,
    pub name: String,
    pub indent_level: IndentLevel,
    pub preceded_by_spacer: bool,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReportRow {
    Metadata { field: MetadataField, text: String },
    YearHeader { years: Vec<i32> },
    Body(BodyRow),
}

/// The renderable report. Shared by the terminal view and the exporters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub header: ReportHeader,
    pub years: Vec<i32>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn body_rows(&self) -> impl Iterator<Item = &BodyRow> {
        self.rows.iter().filter_map(|r| match r {
            ReportRow::Body(b) => Some(b),
            _ => None,
        })
    }

    pub fn metadata(&self) -> impl Iterator<Item = (MetadataField, &str)> {
        self.rows.iter().filter_map(|r| match r {
            ReportRow::Metadata { field, text } => Some((*field, text.as_str())),
            _ => None,
        })
    }

    pub fn has_data(&self) -> bool {
        self.body_rows().next().is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub site_id: u32,
    pub site_name: String,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub total_indicators: usize,
    pub total_cells: usize,
    pub blank_cells: usize,
    pub duplicate_keys: usize,
}
