//! Indentation and spacer rules for report rows.
//!
//! Decisions are made from the indicator name alone. Spacers come from a
//! closed list of section-closing labels. Indentation comes from an ordered
//! rule list where the first matching rule decides, so overrides and
//! exclusions sit above the families they shadow.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{IndentLevel, PresentationDecision};

/// Labels of the last row in a section; a blank line is drawn before them.
const SPACER_LABELS: &[&str] = &[
    "Date round data collection ended",
    "Number of households refused to give interview",
    "People moved out of households (Out-migration)",
    "Reunions",
    "Women identified after delivery",
    "Still birth Outcome Unknown",
    "Gestational age Unknown",
    "Children Death Place Unknown",
];

/// A named name-pattern with the indent it assigns.
pub struct IndentRule {
    pub label: &'static str,
    pattern: Regex,
    pub level: IndentLevel,
}

impl IndentRule {
    fn new(label: &'static str, pattern: &str, level: IndentLevel) -> Self {
        let pattern = Regex::new(&format!("(?i){pattern}")).expect("indent rule pattern");
        IndentRule {
            label,
            pattern,
            level,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

static SPACER_RULE: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = SPACER_LABELS.iter().map(|l| regex::escape(l)).collect();
    Regex::new(&format!("(?i)^(?:{})$", alternatives.join("|"))).expect("spacer pattern")
});

static INDENT_RULES: Lazy<Vec<IndentRule>> = Lazy::new(|| {
    use crate::types::IndentLevel::{Deep, Light, Top};
    vec![
        // Section header that would otherwise fall into the gestational-age family.
        IndentRule::new("gestational-age-header", r"^Gestational age at delivery$", Top),
        // Household visits
        IndentRule::new("household-visits", r"^(Active households|Number of households visited|Number of households interviewed successfully|Number of absent households|Number of households refused to give interview)", Light),
        IndentRule::new("interviewed-population-by-sex", r"^Total (male|female) population of households interviewed", Light),
        IndentRule::new("migration", r"^People moved (into|out of) households", Light),
        IndentRule::new("marital-status-changes", r"^(MS Changes (Male|Female) Total|Divorces|Separations|Widows/widowers|Reunions)", Light),
        IndentRule::new("pregnancy-identification", r"^Women identified (on (1st|2nd|3rd) trimester|after delivery)", Light),
        IndentRule::new("live-births-by-sex", r"^Total (Male|Female) Live births", Light),
        IndentRule::new("deaths-by-sex", r"^Total (male|female) deaths", Light),
        // Sub-section totals never sit at leaf depth.
        IndentRule::new("deep-exclusion", r"(Total|Summary|Rate|Ratio|Index|Overall|Population$|Outcome$)", Top),
        IndentRule::new("population-age-band", r"^(Male|Female)(s)?\s(.*years|<1 year|1 to <2 years)", Deep),
        IndentRule::new("deaths-age-band", r"^(Male|Female) deaths", Deep),
        IndentRule::new("births-by-mother-age", r"^(All|Male|Female) births to mothers aged\s\d{2}-\d{2}\syears", Deep),
        IndentRule::new("death-place", r"^(Stillbirths|Neonates|Infants|Children) Death Place", Deep),
        IndentRule::new("age-at-marriage", r"^Age at marriage.*?\((Male|Female)\)", Deep),
        IndentRule::new("stillbirth-outcome-sex", r"^Stillbirth Outcome sex", Deep),
        IndentRule::new("abortion-outcome", r"^Abortion Outcome", Deep),
        IndentRule::new("live-birth-place", r"^Live birth Place", Deep),
        IndentRule::new("stillbirth-outcome-place", r"^Still birth Outcome", Deep),
        IndentRule::new("gestational-age", r"^Gestational age", Deep),
    ]
});

pub fn needs_spacer(name: &str) -> bool {
    SPACER_RULE.is_match(name.trim())
}

/// The rule that decides `name`'s indent, if any.
pub fn matching_rule(name: &str) -> Option<&'static IndentRule> {
    let trimmed = name.trim();
    INDENT_RULES.iter().find(|rule| rule.matches(trimmed))
}

pub fn indent_level(name: &str) -> IndentLevel {
    matching_rule(name)
        .map(|rule| rule.level)
        .unwrap_or(IndentLevel::Top)
}

pub fn classify(name: &str) -> PresentationDecision {
    PresentationDecision {
        indent_level: indent_level(name),
        preceded_by_spacer: needs_spacer(name),
    }
}

/// Labels of every rule matching `name`, in evaluation order. The first one
/// is the rule that decided.
pub fn explain(name: &str) -> Vec<&'static str> {
    let trimmed = name.trim();
    INDENT_RULES
        .iter()
        .filter(|rule| rule.matches(trimmed))
        .map(|rule| rule.label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndentLevel::{Deep, Light, Top};

    #[test]
    fn empty_and_unknown_names_are_top_level() {
        assert_eq!(
            classify(""),
            PresentationDecision { indent_level: Top, preceded_by_spacer: false }
        );
        assert_eq!(classify("   ").indent_level, Top);
        assert_eq!(classify("Something nobody tracks").indent_level, Top);
    }

    #[test]
    fn age_bands_are_deep() {
        assert_eq!(indent_level("Male 20-24 years"), Deep);
        assert_eq!(indent_level("Females <1 year"), Deep);
        assert_eq!(indent_level("Male 1 to <2 years"), Deep);
        assert_eq!(indent_level("Female deaths 0-4 years"), Deep);
        assert_eq!(indent_level("All births to mothers aged 15-19 years"), Deep);
        assert_eq!(indent_level("Infants Death Place Health facility"), Deep);
        assert_eq!(indent_level("Age at marriage <18 (Female)"), Deep);
        assert_eq!(indent_level("Live birth Place Home"), Deep);
    }

    #[test]
    fn totals_are_excluded_from_deep_indent() {
        assert_eq!(indent_level("Male 15-19 years Total"), Top);
        assert_eq!(indent_level("Total male population"), Top);
        assert_eq!(indent_level("Male deaths rate"), Top);
        assert_eq!(indent_level("Still birth Outcome"), Top);
        assert_eq!(indent_level("Female reproductive age Population"), Top);
    }

    #[test]
    fn exclusion_covers_every_deep_family() {
        // "Rate" excludes even though "Outcome" is not the last word.
        assert_eq!(indent_level("Stillbirth Outcome Rate"), Top);
        assert_eq!(indent_level("Still birth Outcome Rate"), Top);
        assert_eq!(indent_level("Stillbirth Outcome sex Male"), Deep);
        assert_eq!(matching_rule("Stillbirth Outcome Rate").map(|r| r.label), Some("deep-exclusion"));
    }

    #[test]
    fn gestational_age_header_is_not_indented() {
        assert_eq!(indent_level("Gestational age at delivery"), Top);
        assert_eq!(indent_level("  gestational AGE at delivery "), Top);
        assert_eq!(indent_level("Gestational age 28-36 weeks"), Deep);
        assert_eq!(
            explain("Gestational age at delivery"),
            vec!["gestational-age-header", "gestational-age"]
        );
    }

    #[test]
    fn light_indent_sub_counts() {
        assert_eq!(indent_level("Number of households visited"), Light);
        assert_eq!(indent_level("Total female population of households interviewed"), Light);
        assert_eq!(indent_level("MS Changes Male Total"), Light);
        assert_eq!(indent_level("Widows/widowers"), Light);
        assert_eq!(indent_level("Women identified on 2nd trimester"), Light);
        assert_eq!(indent_level("Total Female Live births"), Light);
        assert_eq!(indent_level("Total male deaths"), Light);
    }

    #[test]
    fn spacer_is_independent_of_indent() {
        let d = classify("Number of households refused to give interview");
        assert_eq!(d.indent_level, Light);
        assert!(d.preceded_by_spacer);

        let d = classify("Still birth Outcome Unknown");
        assert_eq!(d.indent_level, Deep);
        assert!(d.preceded_by_spacer);

        let d = classify("date round data collection ended ");
        assert_eq!(d.indent_level, Top);
        assert!(d.preceded_by_spacer);
    }

    #[test]
    fn spacer_requires_exact_label() {
        assert!(!needs_spacer("Reunions in 2021"));
        assert!(needs_spacer("REUNIONS"));
        assert!(needs_spacer("People moved out of households (Out-migration)"));
        assert!(!needs_spacer("People moved out of households"));
    }
}
