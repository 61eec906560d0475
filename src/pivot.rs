use crate::types::{DuplicateKey, IndicatorObservation, PivotRow};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Indicator rows keyed by year, plus the year axis they share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// One row per indicator code, in the order the codes first appeared.
    pub rows: Vec<PivotRow>,
    /// `(code, year)` pairs seen more than once. Later values won.
    pub duplicates: Vec<DuplicateKey>,
}

impl Pivot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn build_pivot(rows: &[IndicatorObservation]) -> Pivot {
    let mut years: BTreeSet<i32> = BTreeSet::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut pivot_rows: Vec<PivotRow> = Vec::new();
    let mut duplicates: Vec<DuplicateKey> = Vec::new();

    for r in rows {
        years.insert(r.data_year);
        let idx = *index.entry(r.indicator_code.as_str()).or_insert_with(|| {
            pivot_rows.push(PivotRow {
                indicator_code: r.indicator_code.clone(),
                indicator_name: r.indicator_name.clone(),
                values: Default::default(),
            });
            pivot_rows.len() - 1
        });
        let row = &mut pivot_rows[idx];
        if row.indicator_name != r.indicator_name {
            debug!(
                code = %r.indicator_code,
                kept = %row.indicator_name,
                ignored = %r.indicator_name,
                "indicator name differs between years"
            );
        }
        if let Some(previous) = row.values.insert(r.data_year, r.indicator_value) {
            warn!(
                code = %r.indicator_code,
                year = r.data_year,
                ?previous,
                replacement = ?r.indicator_value,
                "duplicate indicator value, keeping the later one"
            );
            duplicates.push(DuplicateKey {
                indicator_code: r.indicator_code.clone(),
                data_year: r.data_year,
                previous,
                replacement: r.indicator_value,
            });
        }
    }

    Pivot {
        years: years.into_iter().collect(),
        rows: pivot_rows,
        duplicates,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::SiteId;

    pub(crate) fn obs(code: &str, name: &str, year: i32, value: Option<f64>) -> IndicatorObservation {
        IndicatorObservation {
            site_id: SiteId::new(7).unwrap(),
            site_name: "Kersa".to_string(),
            country_name: "Ethiopia".to_string(),
            data_year: year,
            indicator_code: code.to_string(),
            indicator_name: name.to_string(),
            data_type: "count".to_string(),
            last_entry_date: None,
            indicator_value: value,
        }
    }

    #[test]
    fn pivots_one_indicator_across_years() {
        let rows = vec![
            obs("POP", "Total population", 2020, Some(1000.0)),
            obs("POP", "Total population", 2021, Some(1050.0)),
        ];
        let p = build_pivot(&rows);
        assert_eq!(p.years, vec![2020, 2021]);
        assert_eq!(p.rows.len(), 1);
        assert_eq!(p.rows[0].indicator_code, "POP");
        assert_eq!(p.rows[0].values.get(&2020), Some(&Some(1000.0)));
        assert_eq!(p.rows[0].values.get(&2021), Some(&Some(1050.0)));
        assert!(p.duplicates.is_empty());
    }

    #[test]
    fn later_duplicate_wins_and_is_recorded() {
        let rows = vec![
            obs("X", "X", 2020, Some(5.0)),
            obs("Y", "Y", 2020, Some(1.0)),
            obs("X", "X", 2020, Some(9.0)),
        ];
        let p = build_pivot(&rows);
        assert_eq!(p.rows[0].values[&2020], Some(9.0));
        assert_eq!(
            p.duplicates,
            vec![DuplicateKey {
                indicator_code: "X".into(),
                data_year: 2020,
                previous: Some(5.0),
                replacement: Some(9.0),
            }]
        );
    }

    #[test]
    fn empty_input_is_empty_pivot() {
        let p = build_pivot(&[]);
        assert!(p.is_empty());
        assert!(p.years.is_empty());
        assert_eq!(p, Pivot::default());
    }

    #[test]
    fn keeps_discovery_order_and_sorts_years() {
        let rows = vec![
            obs("Z", "Zeta", 2022, Some(1.0)),
            obs("A", "Alpha", 2019, Some(2.0)),
            obs("M", "Mu", 2021, Some(3.0)),
            obs("A", "Alpha", 2022, Some(4.0)),
            obs("Z", "Zeta", 2019, None),
        ];
        let p = build_pivot(&rows);
        let codes: Vec<&str> = p.rows.iter().map(|r| r.indicator_code.as_str()).collect();
        assert_eq!(codes, vec!["Z", "A", "M"]);
        assert_eq!(p.years, vec![2019, 2021, 2022]);
        // Only observed years get an entry.
        assert_eq!(p.rows[2].values.len(), 1);
        assert_eq!(p.rows[0].values.get(&2019), Some(&None));
    }

    #[test]
    fn first_name_is_kept_for_a_code() {
        let rows = vec![
            obs("B", "Live births", 2020, Some(1.0)),
            obs("B", "Live births (all)", 2021, Some(2.0)),
        ];
        let p = build_pivot(&rows);
        assert_eq!(p.rows[0].indicator_name, "Live births");
    }
}
