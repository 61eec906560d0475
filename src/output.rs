use crate::error::{ReportError, Result};
use crate::pyramid::Pyramid;
use crate::types::{Cell, ReportTable};
use crate::util::{format_number, format_value};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

/// Render the report for the terminal: metadata lines, then a markdown
/// table with indented names, a blank row before section-closing rows and
/// empty cells where a year has no value.
pub fn render_table(table: &ReportTable, max_rows: Option<usize>) -> String {
    let mut out = String::new();
    for (_, text) in table.metadata() {
        out.push_str(text);
        out.push('\n');
    }
    out.push('\n');

    if !table.has_data() {
        out.push_str("(no data for this site)\n");
        return out;
    }

    let mut builder = Builder::default();
    let blank_row = || vec![String::new(); table.years.len() + 1];
    let limit = max_rows.unwrap_or(usize::MAX);
    let mut header = vec!["Indicator".to_string()];
    header.extend(table.years.iter().map(|y| y.to_string()));
    builder.push_record(header);
    for body in table.body_rows().take(limit) {
        if body.preceded_by_spacer {
            builder.push_record(blank_row());
        }
        let mut record = vec![format!(
            "{}{}",
            "  ".repeat(usize::from(body.indent_level.depth())),
            body.name
        )];
        record.extend(body.cells.iter().map(|c| match c {
            Cell::Blank => String::new(),
            Cell::Number(v) => format_value(*v),
        }));
        builder.push_record(record);
    }

    let mut rendered = builder.build();
    rendered.with(Style::markdown());
    out.push_str(&rendered.to_string());
    out.push('\n');
    let total = table.body_rows().count();
    if total > limit {
        out.push_str(&format!("({} of {} indicators shown)\n", limit, total));
    }
    out
}

pub fn render_pyramids(pyramids: &[Pyramid]) -> String {
    if pyramids.is_empty() {
        return "(no rows)\n".to_string();
    }
    let mut out = String::new();
    for p in pyramids {
        out.push_str(&format!("Year {}", p.year));
        if let Some(hh) = p.hh_size {
            out.push_str(&format!(" (household size {})", format_number(hh, 1)));
        }
        out.push('\n');
        let mut builder = Builder::default();
        builder.push_record(["Age".to_string(), "Male".to_string(), "Female".to_string()]);
        for bar in &p.bars {
            builder.push_record([
                bar.label.to_string(),
                format_value(bar.male.abs()),
                format_value(bar.female),
            ]);
        }
        let mut rendered = builder.build();
        rendered.with(Style::markdown());
        out.push_str(&rendered.to_string());
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::tests::obs;
    use crate::reports::generate_site_report;
    use crate::types::SiteId;
    use chrono::NaiveDate;

    fn table(rows: &[crate::types::IndicatorObservation]) -> ReportTable {
        let at = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        generate_site_report(SiteId::new(7).unwrap(), rows, at).unwrap().0
    }

    #[test]
    fn renders_indents_spacers_and_blanks() {
        let t = table(&[
            obs("POP", "Total population", 2020, Some(1000.0)),
            obs("POP", "Total population", 2021, Some(1050.0)),
            obs("REF", "Number of households refused to give interview", 2021, Some(3.0)),
        ]);
        let s = render_table(&t, None);
        assert!(s.starts_with("Country name: Ethiopia\n"));
        assert!(s.contains("Total population"));
        assert!(s.contains("1,050"));
        assert!(s.contains("  Number of households refused to give interview"));
    }

    #[test]
    fn empty_table_says_no_data() {
        let s = render_table(&table(&[]), None);
        assert!(s.contains("(no data for this site)"));
    }

    #[test]
    fn limits_preview_rows() {
        let t = table(&[
            obs("A", "A", 2020, Some(1.0)),
            obs("B", "B", 2020, Some(2.0)),
            obs("C", "C", 2020, Some(3.0)),
        ]);
        let s = render_table(&t, Some(2));
        assert!(s.contains("(2 of 3 indicators shown)"));
    }

    #[test]
    fn writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &vec![1, 2, 3]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('2'));
    }
}
