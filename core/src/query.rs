//! Query descriptions handed to the data store.
//!
//! These types describe what to read or write. Turning them into SQL (and
//! binding every user-provided value) is the store's job.

use crate::opportunity::FieldChange;

/// Search over open opportunities whose name contains every term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunitySearch {
    terms: Vec<String>,
}

impl OpportunitySearch {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Reference semantics of the name predicate: every term must be a
    /// case-insensitive substring of `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.terms
            .iter()
            .all(|term| name.contains(&term.to_lowercase()))
    }
}

/// `ILIKE` pattern matching `term` anywhere, with `\` as escape character.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Change one field of one opportunity.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityUpdate {
    pub opportunity_id: String,
    pub change: FieldChange,
}

/// Fiscal period the revenue report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenuePeriod {
    Month,
    Quarter,
    Year,
}

impl RevenuePeriod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "month" => Some(RevenuePeriod::Month),
            "quarter" => Some(RevenuePeriod::Quarter),
            "year" => Some(RevenuePeriod::Year),
            _ => None,
        }
    }

    /// Value of the `period.type` column.
    pub fn period_type(self) -> &'static str {
        match self {
            RevenuePeriod::Month => "Month",
            RevenuePeriod::Quarter => "Quarter",
            RevenuePeriod::Year => "Year",
        }
    }

    pub fn spoken(self) -> &'static str {
        match self {
            RevenuePeriod::Month => "month",
            RevenuePeriod::Quarter => "quarter",
            RevenuePeriod::Year => "year",
        }
    }
}

/// Aggregate of one owner's opportunities closing in the current period.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueQuery {
    pub owner_id: String,
    pub period: RevenuePeriod,
    pub probability_floor: f64,
    /// Restrict to opportunities that are not closed yet.
    pub open_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSummary {
    /// `None` when no opportunity qualified.
    pub total: Option<f64>,
    pub count: i64,
}

impl RevenueSummary {
    /// Total rounded to the nearest thousand, if there is a usable total.
    pub fn rounded_total(&self) -> Option<i64> {
        self.total
            .filter(|total| total.is_finite())
            .map(|total| ((total / 1000.0).round() * 1000.0) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_term_must_match() {
        let search = OpportunitySearch::new(vec!["west".into(), "COAST".into()]);
        assert!(search.matches_name("West Coast Expansion"));
        assert!(!search.matches_name("West Side Renewal"));
    }

    #[test]
    fn extra_terms_only_narrow() {
        let names = ["Acme Deal", "Acme Big Deal", "Globex Deal", "Initech Renewal"];
        let count = |terms: &[&str]| {
            let search = OpportunitySearch::new(terms.iter().map(|t| t.to_string()).collect());
            names.iter().filter(|n| search.matches_name(n)).count()
        };
        assert_eq!(count(&["deal"]), 3);
        assert_eq!(count(&["acme", "deal"]), 2);
        assert_eq!(count(&["big", "acme", "deal"]), 1);
        assert_eq!(count(&["deal", "acme"]), count(&["acme", "deal"]));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("deal"), "%deal%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("o'brien"), "%o'brien%");
    }

    #[test]
    fn rounds_to_nearest_thousand() {
        let summary = |total| RevenueSummary { total, count: 3 };
        assert_eq!(summary(Some(12_345.67)).rounded_total(), Some(12_000));
        assert_eq!(summary(Some(12_500.0)).rounded_total(), Some(13_000));
        assert_eq!(summary(Some(499.0)).rounded_total(), Some(0));
        assert_eq!(summary(None).rounded_total(), None);
        assert_eq!(summary(Some(f64::NAN)).rounded_total(), None);
    }

    #[test]
    fn parses_period_names() {
        assert_eq!(RevenuePeriod::parse("Quarter"), Some(RevenuePeriod::Quarter));
        assert_eq!(RevenuePeriod::parse(" month "), Some(RevenuePeriod::Month));
        assert_eq!(RevenuePeriod::parse("week"), None);
    }
}
