//! Spreadsheet export of a report table.
//!
//! The table is first laid out as a grid of cells (`SheetLayout`), which is
//! where the export contract lives: which rows are emphasised, where blanks
//! stay blank, how wide the columns are. The grid is then handed to
//! `rust_xlsxwriter` for encoding, or written out as CSV.

use crate::config::ExportConfig;
use crate::error::{ReportError, Result};
use crate::types::{Cell, ReportRow, ReportTable, SiteId};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Empty,
    Text { text: String, indent: u8 },
    Number(f64),
}

impl SheetCell {
    fn text(s: impl Into<String>) -> Self {
        SheetCell::Text {
            text: s.into(),
            indent: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Plain,
    /// Bold.
    Metadata,
    /// Bold, centred, wrapped and shaded.
    YearHeader,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub style: RowStyle,
    pub cells: Vec<SheetCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub column_widths: Vec<f64>,
    pub rows: Vec<SheetRow>,
}

impl SheetLayout {
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }
}

pub fn layout(table: &ReportTable, cfg: &ExportConfig) -> SheetLayout {
    let mut rows: Vec<SheetRow> = Vec::new();
    for row in &table.rows {
        match row {
            ReportRow::Metadata { text, .. } => rows.push(SheetRow {
                style: RowStyle::Metadata,
                cells: vec![SheetCell::text(text.clone())],
            }),
            ReportRow::YearHeader { years } => {
                for _ in 0..cfg.blank_rows_after_metadata {
                    rows.push(SheetRow {
                        style: RowStyle::Plain,
                        cells: Vec::new(),
                    });
                }
                let mut cells = vec![SheetCell::Empty];
                cells.extend(years.iter().map(|y| SheetCell::text(cfg.header_text(*y))));
                rows.push(SheetRow {
                    style: RowStyle::YearHeader,
                    cells,
                });
            }
            ReportRow::Body(body) => {
                let mut cells = vec![SheetCell::Text {
                    text: body.name.clone(),
                    indent: body.indent_level.depth(),
                }];
                cells.extend(body.cells.iter().map(|c| match c {
                    Cell::Blank => SheetCell::Empty,
                    Cell::Number(v) => SheetCell::Number(*v),
                }));
                rows.push(SheetRow {
                    style: RowStyle::Plain,
                    cells,
                });
            }
        }
    }

    let mut column_widths = vec![cfg.name_column_width];
    column_widths.extend(table.years.iter().map(|_| cfg.year_column_width));

    SheetLayout {
        sheet_name: format!("Site-{}", table.header.site_id),
        column_widths,
        rows,
    }
}

struct SheetFormats {
    metadata: Format,
    year_header: Format,
    indents: [Format; 3],
}

impl SheetFormats {
    fn new(cfg: &ExportConfig) -> Self {
        SheetFormats {
            metadata: Format::new().set_bold(),
            year_header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_text_wrap()
                .set_background_color(Color::RGB(cfg.header_fill)),
            indents: [
                Format::new(),
                Format::new().set_indent(1),
                Format::new().set_indent(2),
            ],
        }
    }
}

/// Encode the table as an XLSX workbook.
pub fn encode(table: &ReportTable, cfg: &ExportConfig) -> Result<Vec<u8>> {
    let sheet_layout = layout(table, cfg);
    let formats = SheetFormats::new(cfg);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&sheet_layout.sheet_name)?;

    for (col, width) in sheet_layout.column_widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    for (r, row) in sheet_layout.rows.iter().enumerate() {
        let r = r as u32;
        for (c, cell) in row.cells.iter().enumerate() {
            let c = c as u16;
            match (cell, row.style) {
                (SheetCell::Empty, _) => {}
                (SheetCell::Text { text, .. }, RowStyle::Metadata) => {
                    sheet.write_string_with_format(r, c, text, &formats.metadata)?;
                }
                (SheetCell::Text { text, .. }, RowStyle::YearHeader) => {
                    sheet.write_string_with_format(r, c, text, &formats.year_header)?;
                }
                (SheetCell::Text { text, indent }, RowStyle::Plain) => {
                    let fmt = &formats.indents[usize::from(*indent).min(2)];
                    sheet.write_string_with_format(r, c, text, fmt)?;
                }
                (SheetCell::Number(v), _) => {
                    sheet.write_number(r, c, *v)?;
                }
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    debug!(bytes = buffer.len(), rows = sheet_layout.rows.len(), "encoded workbook");
    Ok(buffer)
}

/// Suggested download name, e.g. `HDSS_Site_7_2025.xlsx`.
pub fn export_file_name(cfg: &ExportConfig, site_id: SiteId, year: i32) -> String {
    format!("{}_{}_{}.xlsx", cfg.file_prefix, site_id, year)
}

pub fn write_xlsx(path: &Path, table: &ReportTable, cfg: &ExportConfig) -> Result<()> {
    let bytes = encode(table, cfg)?;
    std::fs::write(path, bytes).map_err(|e| ReportError::io(path, e))
}

/// The same grid as CSV. Indentation becomes leading spaces; rows are padded
/// to the full column count.
pub fn write_csv_layout(path: &Path, table: &ReportTable, cfg: &ExportConfig) -> Result<()> {
    let sheet_layout = layout(table, cfg);
    let width = sheet_layout.column_count();
    let mut wtr = csv::Writer::from_path(path)?;
    for row in &sheet_layout.rows {
        let mut record: Vec<String> = row
            .cells
            .iter()
            .map(|c| match c {
                SheetCell::Empty => String::new(),
                SheetCell::Text { text, indent } => {
                    format!("{}{}", "  ".repeat(usize::from(*indent)), text)
                }
                SheetCell::Number(v) => v.to_string(),
            })
            .collect();
        record.resize(width.max(record.len()), String::new());
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::tests::obs;
    use crate::reports::generate_site_report;
    use chrono::NaiveDate;

    fn table() -> ReportTable {
        let at = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let rows = vec![
            obs("POP", "Total population", 2020, Some(1000.0)),
            obs("POP", "Total population", 2021, Some(1050.0)),
            obs("M2024", "Male 20-24 years", 2021, Some(40.0)),
        ];
        generate_site_report(SiteId::new(7).unwrap(), &rows, at)
            .unwrap()
            .0
    }

    #[test]
    fn layout_follows_export_contract() {
        let l = layout(&table(), &ExportConfig::default());
        assert_eq!(l.sheet_name, "Site-7");
        assert_eq!(l.column_widths, vec![55.0, 15.0, 15.0]);
        // 4 metadata, 2 blank, header, 2 indicators
        assert_eq!(l.rows.len(), 9);
        assert!(l.rows[..4].iter().all(|r| r.style == RowStyle::Metadata));
        assert!(l.rows[4].cells.is_empty() && l.rows[5].cells.is_empty());
        assert_eq!(l.rows[6].style, RowStyle::YearHeader);
        assert_eq!(l.rows[6].cells[0], SheetCell::Empty);
        assert_eq!(
            l.rows[6].cells[1],
            SheetCell::text("DSS Annual Report\n(Year of 2020)")
        );
        assert_eq!(
            l.rows[7].cells,
            vec![
                SheetCell::text("Total population"),
                SheetCell::Number(1000.0),
                SheetCell::Number(1050.0),
            ]
        );
        assert_eq!(
            l.rows[8].cells,
            vec![
                SheetCell::Text { text: "Male 20-24 years".into(), indent: 2 },
                SheetCell::Empty,
                SheetCell::Number(40.0),
            ]
        );
    }

    #[test]
    fn encodes_a_zip_container() {
        let bytes = encode(&table(), &ExportConfig::default()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn file_name_uses_prefix_site_and_year() {
        let name = export_file_name(&ExportConfig::default(), SiteId::new(12).unwrap(), 2025);
        assert_eq!(name, "HDSS_Site_12_2025.xlsx");
    }

    #[test]
    fn csv_layout_keeps_blanks_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_csv_layout(&path, &table(), &ExportConfig::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("    Male 20-24 years,,40\n"));
        assert!(text.contains("Total population,1000,1050\n"));
        assert!(!text.contains("NaN"));
    }
}
