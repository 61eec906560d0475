//! Age pyramids: per-year male/female counts over a fixed age order.

use serde::Deserialize;

/// Five-year bands used for the whole-population pyramid.
pub const POPULATION_AGE_ORDER: &[&str] = &[
    "0-4", "5-9", "10-14", "15-19", "20-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50-54",
    "55-59", "60-64", "65-69", "70-74", "75-79", "80+",
];

/// Yearly bands used for the under-5 pyramid.
pub const UNDER5_AGE_ORDER: &[&str] = &["< 1", "1 - < 2", "2 - < 3", "3 - < 4", "4 - < 5"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PyramidRow {
    pub data_year: i32,
    pub age_group_label: String,
    pub male_count: f64,
    pub female_count: f64,
    #[serde(default)]
    pub hh_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PyramidBar {
    pub label: &'static str,
    /// Negated so the male side extends left of the axis.
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pyramid {
    pub year: i32,
    pub bars: Vec<PyramidBar>,
    /// Average household size reported with the year's first row.
    pub hh_size: Option<f64>,
}

/// Group rows by year (in order of first appearance) and lay each year out
/// over `age_order`. Labels missing for a year count as zero; labels not in
/// `age_order` are ignored. A repeated label within a year keeps the later row.
pub fn build_pyramids(rows: &[PyramidRow], age_order: &'static [&'static str]) -> Vec<Pyramid> {
    let mut years: Vec<(i32, Vec<&PyramidRow>)> = Vec::new();
    for r in rows {
        match years.iter_mut().find(|(y, _)| *y == r.data_year) {
            Some((_, group)) => group.push(r),
            None => years.push((r.data_year, vec![r])),
        }
    }

    years
        .into_iter()
        .map(|(year, group)| {
            let bars = age_order
                .iter()
                .map(|label| {
                    let found = group
                        .iter()
                        .rev()
                        .find(|r| r.age_group_label.trim() == *label);
                    PyramidBar {
                        label: *label,
                        male: -found.map(|r| r.male_count).unwrap_or(0.0),
                        female: found.map(|r| r.female_count).unwrap_or(0.0),
                    }
                })
                .collect();
            Pyramid {
                year,
                bars,
                hh_size: group.first().and_then(|r| r.hh_size),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, label: &str, male: f64, female: f64) -> PyramidRow {
        PyramidRow {
            data_year: year,
            age_group_label: label.to_string(),
            male_count: male,
            female_count: female,
            hh_size: Some(4.8),
        }
    }

    #[test]
    fn groups_by_year_in_arrival_order() {
        let rows = vec![
            row(2022, "0-4", 10.0, 12.0),
            row(2021, "5-9", 8.0, 9.0),
            row(2022, "80+", 1.0, 2.0),
        ];
        let p = build_pyramids(&rows, POPULATION_AGE_ORDER);
        assert_eq!(p.iter().map(|p| p.year).collect::<Vec<_>>(), vec![2022, 2021]);
        assert_eq!(p[0].bars.len(), POPULATION_AGE_ORDER.len());
        assert_eq!(p[0].bars[0], PyramidBar { label: "0-4", male: -10.0, female: 12.0 });
        assert_eq!(p[0].bars[1].male, 0.0);
        assert_eq!(p[0].bars[16].female, 2.0);
        assert_eq!(p[0].hh_size, Some(4.8));
    }

    #[test]
    fn under5_ignores_unknown_labels() {
        let rows = vec![row(2020, "< 1", 3.0, 4.0), row(2020, "5-9", 7.0, 7.0)];
        let p = build_pyramids(&rows, UNDER5_AGE_ORDER);
        assert_eq!(p[0].bars.len(), 5);
        assert_eq!(p[0].bars[0].female, 4.0);
        assert!(p[0].bars[1..].iter().all(|b| b.female == 0.0));
    }

    #[test]
    fn parses_api_rows() {
        let json = r#"[{"dataYear":2020,"ageGroupLabel":"0-4","maleCount":5,"femaleCount":6,"hhSize":5.1}]"#;
        let rows: Vec<PyramidRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].hh_size, Some(5.1));
    }
}
