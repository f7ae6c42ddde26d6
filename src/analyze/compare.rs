use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::parsers::{DomainLabel, RegistryEntry, TldCategory};

/// Set difference between one feed and the root zone database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Distinct labels in the source; repeats are counted once
    pub source_count: usize,
    /// Distinct delegated registry labels
    pub registry_count: usize,
    pub in_both: usize,
    pub only_in_source: Vec<DomainLabel>,
    /// Registry labels missing from the source, grouped by category
    pub only_in_registry: BTreeMap<TldCategory, Vec<DomainLabel>>,
}

/// Compares source labels with categorized registry labels.
///
/// Labels are matched exactly as each side spells them. A Unicode label on
/// one side and its `xn--` form on the other count as a mismatch.
pub fn compare_sources(
    source_labels: &[DomainLabel],
    registry_labels: &[(DomainLabel, TldCategory)],
) -> ComparisonResult {
    let source: BTreeSet<&str> = source_labels.iter().map(String::as_str).collect();
    let registry: BTreeMap<&str, TldCategory> = registry_labels
        .iter()
        .map(|(label, category)| (label.as_str(), *category))
        .collect();

    let in_both = source.iter().filter(|label| registry.contains_key(*label)).count();

    let only_in_source = source
        .iter()
        .filter(|label| !registry.contains_key(*label))
        .map(|label| label.to_string())
        .collect();

    let mut only_in_registry: BTreeMap<TldCategory, Vec<DomainLabel>> = BTreeMap::new();
    for (label, category) in &registry {
        if !source.contains(label) {
            only_in_registry.entry(*category).or_default().push(label.to_string());
        }
    }

    ComparisonResult {
        source_count: source.len(),
        registry_count: registry.len(),
        in_both,
        only_in_source,
        only_in_registry,
    }
}

/// Bootstrap coverage against delegated registry entries
pub fn compare_bootstrap_vs_registry(
    bootstrap_labels: &[DomainLabel],
    entries: &[RegistryEntry],
) -> ComparisonResult {
    compare_sources(bootstrap_labels, &delegated_labels(entries))
}

/// Root zone TLD list against delegated registry entries
pub fn compare_tld_list_vs_registry(
    tld_labels: &[DomainLabel],
    entries: &[RegistryEntry],
) -> ComparisonResult {
    compare_sources(tld_labels, &delegated_labels(entries))
}

fn delegated_labels(entries: &[RegistryEntry]) -> Vec<(DomainLabel, TldCategory)> {
    entries
        .iter()
        .filter(|e| e.delegated)
        .map(|e| (e.tld.clone(), e.category))
        .collect()
}
