use crate::classify::classify;
use crate::error::{ReportError, Result};
use crate::pivot::Pivot;
use crate::types::{
    BodyRow, Cell, IndicatorObservation, MetadataField, PivotRow, ReportHeader, ReportRow,
    ReportTable, SiteId, SummaryStats,
};
use chrono::NaiveDateTime;

/// Build the report header from the first observation.
///
/// Every observation must belong to the same site; a mixed result set is
/// rejected rather than labelled with whichever site came first. An empty
/// result set yields a header carrying only the site id.
pub fn build_header(
    site_id: SiteId,
    rows: &[IndicatorObservation],
    generated_at: NaiveDateTime,
) -> Result<ReportHeader> {
    let Some(first) = rows.first() else {
        return Ok(ReportHeader {
            site_id,
            country_name: String::new(),
            site_name: String::new(),
            generated_at,
            last_upload_date: None,
        });
    };
    if let Some(stray) = rows.iter().find(|r| r.site_id != site_id) {
        return Err(ReportError::MixedSites {
            expected: site_id,
            found: stray.site_id,
        });
    }
    Ok(ReportHeader {
        site_id,
        country_name: first.country_name.clone(),
        site_name: first.site_name.clone(),
        generated_at,
        last_upload_date: first.last_entry_date,
    })
}

fn metadata_rows(header: &ReportHeader) -> Vec<ReportRow> {
    let site = if header.site_name.is_empty() {
        header.site_id.to_string()
    } else {
        header.site_name.clone()
    };
    let upload = header
        .last_upload_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    vec![
        ReportRow::Metadata {
            field: MetadataField::Country,
            text: format!("Country name: {}", header.country_name),
        },
        ReportRow::Metadata {
            field: MetadataField::Site,
            text: format!("Site name: {}", site),
        },
        ReportRow::Metadata {
            field: MetadataField::GeneratedAt,
            text: format!("Data download on: {}", header.generated_at.format("%Y-%m-%d %H:%M:%S")),
        },
        ReportRow::Metadata {
            field: MetadataField::UploadDate,
            text: format!("Data upload date: {} (last entry date recorded for this site)", upload),
        },
    ]
}

fn body_row(years: &[i32], row: &PivotRow) -> BodyRow {
    let decision = classify(&row.indicator_name);
    let cells = years
        .iter()
        .map(|y| match row.values.get(y) {
            Some(Some(v)) if v.is_finite() => Cell::Number(*v),
            _ => Cell::Blank,
        })
        .collect();
    BodyRow {
        indicator_code: row.indicator_code.clone(),
        name: row.indicator_name.trim().to_string(),
        indent_level: decision.indent_level,
        preceded_by_spacer: decision.preceded_by_spacer,
        cells,
    }
}

/// Lay out the report: metadata, the year header, then one row per
/// indicator with a cell for every year.
pub fn assemble(header: ReportHeader, years: &[i32], pivot_rows: &[PivotRow]) -> ReportTable {
    let mut rows = metadata_rows(&header);
    if !years.is_empty() || !pivot_rows.is_empty() {
        rows.push(ReportRow::YearHeader {
            years: years.to_vec(),
        });
        rows.extend(pivot_rows.iter().map(|r| ReportRow::Body(body_row(years, r))));
    }
    ReportTable {
        header,
        years: years.to_vec(),
        rows,
    }
}

/// Header + pivot + assembly for one site's rows.
pub fn generate_site_report(
    site_id: SiteId,
    rows: &[IndicatorObservation],
    generated_at: NaiveDateTime,
) -> Result<(ReportTable, Pivot)> {
    let header = build_header(site_id, rows, generated_at)?;
    let pivot = crate::pivot::build_pivot(rows);
    let table = assemble(header, &pivot.years, &pivot.rows);
    Ok((table, pivot))
}

pub fn summarize(table: &ReportTable, duplicate_keys: usize) -> SummaryStats {
    let (total_cells, blank_cells) = table.body_rows().fold((0, 0), |(total, blank), row| {
        (
            total + row.cells.len(),
            blank + row.cells.iter().filter(|c| c.is_blank()).count(),
        )
    });
    SummaryStats {
        site_id: table.header.site_id.get(),
        site_name: table.header.site_name.clone(),
        first_year: table.years.first().copied(),
        last_year: table.years.last().copied(),
        total_indicators: table.body_rows().count(),
        total_cells,
        blank_cells,
        duplicate_keys,
    }
}
