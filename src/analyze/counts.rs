use serde::Serialize;
use std::collections::BTreeMap;

use super::lookup::CcTldLookup;
use crate::idn::{is_idn, is_punycode};
use crate::parsers::{DomainLabel, RegistryEntry, TldCategory};

/// Per-category counts, always holding all six categories
pub type CategoryTally = BTreeMap<TldCategory, usize>;

/// Internationalized labels split by classification and by encoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdnBreakdown {
    pub total: usize,
    pub country_code: usize,
    pub generic: usize,
    pub ascii: usize,   // xn-- encoded
    pub unicode: usize, // native script
}

/// Totals shared by every source analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TldCounts {
    pub total: usize,
    pub country_code: usize,
    pub generic: usize,
    pub idn: IdnBreakdown,
}

impl TldCounts {
    fn tally<'a, I, F>(labels: I, is_country_code: F) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        F: Fn(&str) -> bool,
    {
        let mut counts = TldCounts::default();

        for label in labels {
            let country_code = is_country_code(label);
            counts.total += 1;
            if country_code {
                counts.country_code += 1;
            }

            if is_idn(label) {
                counts.idn.total += 1;
                if country_code {
                    counts.idn.country_code += 1;
                } else {
                    counts.idn.generic += 1;
                }
                if is_punycode(label) {
                    counts.idn.ascii += 1;
                } else {
                    counts.idn.unicode += 1;
                }
            }
        }

        counts.generic = counts.total - counts.country_code;
        counts
    }
}

/// Root zone database analysis: the shared totals plus delegation and category data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryAnalysis {
    #[serde(flatten)]
    pub counts: TldCounts,
    pub delegated: usize,
    pub undelegated: usize,
    pub undelegated_country_code: usize,
    pub undelegated_generic: usize,
    pub by_category: CategoryTally,
    pub delegated_by_category: CategoryTally,
}

/// Counts the plain-text TLD list, classifying through the lookup
pub fn analyze_tld_list(labels: &[DomainLabel], lookup: &CcTldLookup) -> TldCounts {
    TldCounts::tally(labels.iter().map(String::as_str), |label| lookup.contains(label))
}

/// Counts the bootstrap labels, classifying through the lookup
pub fn analyze_bootstrap(labels: &[DomainLabel], lookup: &CcTldLookup) -> TldCounts {
    TldCounts::tally(labels.iter().map(String::as_str), |label| lookup.contains(label))
}

/// Analyzes root zone database entries, which carry their own category
pub fn analyze_registry(entries: &[RegistryEntry]) -> RegistryAnalysis {
    let country_codes: std::collections::HashSet<&str> = entries
        .iter()
        .filter(|e| e.is_country_code())
        .map(|e| e.tld.as_str())
        .collect();
    let counts = TldCounts::tally(entries.iter().map(|e| e.tld.as_str()), |label| {
        country_codes.contains(label)
    });

    let mut by_category = empty_tally();
    let mut delegated_by_category = empty_tally();
    let mut delegated = 0;
    let mut undelegated_country_code = 0;
    let mut undelegated_generic = 0;

    for entry in entries {
        *by_category.entry(entry.category).or_default() += 1;

        if entry.delegated {
            delegated += 1;
            *delegated_by_category.entry(entry.category).or_default() += 1;
        } else if entry.is_country_code() {
            undelegated_country_code += 1;
        } else {
            undelegated_generic += 1;
        }
    }

    RegistryAnalysis {
        counts,
        delegated,
        undelegated: undelegated_country_code + undelegated_generic,
        undelegated_country_code,
        undelegated_generic,
        by_category,
        delegated_by_category,
    }
}

fn empty_tally() -> CategoryTally {
    TldCategory::ALL.iter().map(|category| (*category, 0)).collect()
}
