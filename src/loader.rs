use crate::error::Result;
use crate::types::{ApiObservationRow, IndicatorObservation, RawObservationRow, SiteId};
use crate::util::{parse_date_safe, parse_f64_safe, parse_i32_safe, parse_u32_safe, text_or};
use csv::ReaderBuilder;
use std::io::Read;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub site_rows: usize,
    pub parse_errors: usize,
    pub blank_values: usize,
}

/// Read aggregated indicator rows from CSV, keeping only `site_id`'s rows
/// in file order.
///
/// Rows without a site, year or indicator code are counted as parse errors
/// and skipped. A missing or unparseable value is kept as `None` so the
/// year still shows up on the axis but renders blank.
pub fn load_csv<R: Read>(
    reader: R,
    site_id: SiteId,
) -> Result<(Vec<IndicatorObservation>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(reader);
    let mut report = LoadReport::default();
    let mut out: Vec<IndicatorObservation> = Vec::new();

    for result in rdr.deserialize::<RawObservationRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => { report.parse_errors += 1; continue; }
        };

        let row_site = match parse_u32_safe(row.site_id.as_deref()).and_then(SiteId::new) {
            Some(s) => s,
            None => { report.parse_errors += 1; continue; }
        };
        if row_site != site_id {
            continue;
        }
        let data_year = match parse_i32_safe(row.data_year.as_deref()) { Some(y) => y, None => { report.parse_errors += 1; continue; } };
        let indicator_code = match row.indicator_code.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => { report.parse_errors += 1; continue; }
        };

        let indicator_value = parse_f64_safe(row.indicator_value.as_deref());
        if indicator_value.is_none() {
            report.blank_values += 1;
        }

        out.push(IndicatorObservation {
            site_id: row_site,
            site_name: text_or(row.site_name, ""),
            country_name: text_or(row.country_name, ""),
            data_year,
            indicator_name: text_or(row.indicator_name, &indicator_code),
            indicator_code,
            data_type: text_or(row.data_type, ""),
            last_entry_date: parse_date_safe(row.last_entry_date.as_deref()),
            indicator_value,
        });
    }

    report.site_rows = out.len();
    Ok((out, report))
}

/// Parse the reporting API's JSON array, keeping only `site_id`'s rows.
pub fn load_json(text: &str, site_id: SiteId) -> Result<(Vec<IndicatorObservation>, LoadReport)> {
    let rows: Vec<ApiObservationRow> = serde_json::from_str(text)?;
    let mut report = LoadReport {
        total_rows: rows.len(),
        ..LoadReport::default()
    };
    let mut out: Vec<IndicatorObservation> = Vec::new();
    for row in rows {
        let Some(row_site) = SiteId::new(row.site_id) else {
            report.parse_errors += 1;
            continue;
        };
        if row_site != site_id {
            continue;
        }
        let indicator_value = row.indicator_value.filter(|v| v.is_finite());
        if indicator_value.is_none() {
            report.blank_values += 1;
        }
        let indicator_name = if row.indicator_name.trim().is_empty() {
            row.indicator_code.clone()
        } else {
            row.indicator_name.trim().to_string()
        };
        out.push(IndicatorObservation {
            site_id: row_site,
            site_name: row.site_name.trim().to_string(),
            country_name: row.country_name.trim().to_string(),
            data_year: row.data_year,
            indicator_code: row.indicator_code.trim().to_string(),
            indicator_name,
            data_type: row.data_type,
            last_entry_date: parse_date_safe(row.last_entry_date.as_deref()),
            indicator_value,
        });
    }
    report.site_rows = out.len();
    Ok((out, report))
}
