use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::models::{ServiceGroup, TldType, UnifiedDataset, UnifiedTldEntry};
use crate::idn::{is_punycode, to_ascii, to_unicode, IdnPair};
use crate::parsers::{
    normalize_label, parse_bootstrap_records, parse_registry_table, BootstrapRecord, RegistryEntry,
    TldCategory,
};
use crate::supplemental::ManualOverride;

pub const DATASET_DESCRIPTION: &str =
    "Delegated top-level domains grouped by RDAP service, merged from the IANA RDAP bootstrap \
     file, the IANA root zone database and curated country-code RDAP servers";

/// Registry facts kept for each delegated TLD
#[derive(Debug, Clone)]
pub(crate) struct DelegatedTld {
    category: TldCategory,
    manager: Option<String>,
}

/// Builds the unified dataset from raw bootstrap services and the root zone page.
///
/// Generation time is taken from the system clock.
pub fn build_unified_dataset(
    bootstrap_services: &[Value],
    registry_html: &str,
    manual_overrides: &[ManualOverride],
) -> UnifiedDataset {
    let records = parse_bootstrap_records(bootstrap_services);
    let entries = parse_registry_table(registry_html);
    build_from_records(&records, &entries, manual_overrides, Utc::now())
}

/// Builds the unified dataset from already parsed inputs.
///
/// Only delegated registry entries make it into the output. Bootstrap labels
/// and overrides that match no delegated TLD are dropped. Each TLD appears
/// once, under its ASCII form.
pub fn build_from_records(
    records: &[BootstrapRecord],
    entries: &[RegistryEntry],
    manual_overrides: &[ManualOverride],
    generated: DateTime<Utc>,
) -> UnifiedDataset {
    let (delegated, aliases) = index_delegated(entries);
    let (mut servers, duplicates) = bootstrap_servers(records, &aliases);
    for label in &duplicates {
        warn!(
            "Bootstrap lists .{} in more than one service; keeping {:?}",
            label, servers[label]
        );
    }

    for manual in manual_overrides {
        let label = normalize_label(&manual.tld);
        let canonical = aliases
            .get(&label)
            .or_else(|| to_ascii(&label).ok().and_then(|ascii| aliases.get(&ascii)));

        match canonical {
            Some(canonical) if delegated[canonical].category == TldCategory::CountryCode => {
                servers.insert(canonical.clone(), vec![manual.rdap_server.clone()]);
            }
            Some(canonical) => {
                warn!("Ignoring manual RDAP server for .{}: not a country-code TLD", canonical);
            }
            None => {
                debug!("Ignoring manual RDAP server for .{}: not a delegated TLD", label);
            }
        }
    }

    let mut groups: BTreeMap<Vec<String>, Vec<UnifiedTldEntry>> = BTreeMap::new();
    for (tld, info) in &delegated {
        let mut signature = servers.get(tld).cloned().unwrap_or_default();
        signature.sort();

        groups.entry(signature).or_default().push(unified_entry(tld, info));
    }

    let mut services: Vec<ServiceGroup> = groups
        .into_iter()
        .map(|(rdap_servers, mut tlds)| {
            tlds.sort_by(|a, b| a.tld.cmp(&b.tld));
            ServiceGroup { tlds, rdap_servers }
        })
        .collect();
    services.sort_by(|a, b| first_label(a).cmp(first_label(b)));

    info!(
        "Unified dataset: {} TLDs in {} service groups",
        delegated.len(),
        services.len()
    );

    UnifiedDataset {
        description: DATASET_DESCRIPTION.to_string(),
        generated: generated.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        services,
    }
}

/// Maps each delegated bootstrap label to the servers of the last service
/// listing it. Also returns the labels that more than one service lists.
pub(crate) fn bootstrap_servers(
    records: &[BootstrapRecord],
    aliases: &HashMap<String, String>,
) -> (HashMap<String, Vec<String>>, Vec<String>) {
    let mut servers: HashMap<String, (usize, Vec<String>)> = HashMap::new();
    let mut duplicates = BTreeSet::new();

    for (index, record) in records.iter().enumerate() {
        for label in &record.tlds {
            let Some(canonical) = aliases.get(label) else {
                debug!("Bootstrap label .{} is not a delegated TLD", label);
                continue;
            };
            if let Some((previous, _)) = servers.insert(canonical.clone(), (index, record.servers.clone())) {
                if previous != index {
                    duplicates.insert(canonical.clone());
                }
            }
        }
    }

    let servers = servers.into_iter().map(|(label, (_, list))| (label, list)).collect();
    (servers, duplicates.into_iter().collect())
}

/// Indexes delegated entries by canonical label and maps every known
/// spelling of a label (Unicode and ASCII) to that canonical label
pub(crate) fn index_delegated(
    entries: &[RegistryEntry],
) -> (HashMap<String, DelegatedTld>, HashMap<String, String>) {
    let mut delegated = HashMap::new();
    let mut aliases = HashMap::new();

    for entry in entries.iter().filter(|e| e.delegated) {
        let canonical = to_ascii(&entry.tld).unwrap_or_else(|e| {
            warn!("Keeping .{} in native form: {}", entry.tld, e);
            entry.tld.clone()
        });

        aliases.insert(entry.tld.clone(), canonical.clone());
        aliases.insert(canonical.clone(), canonical.clone());
        if is_punycode(&canonical) {
            if let Ok(unicode) = to_unicode(&canonical) {
                aliases.insert(unicode, canonical.clone());
            }
        }

        let info = DelegatedTld { category: entry.category, manager: entry.manager.clone() };
        if delegated.insert(canonical.clone(), info).is_some() {
            debug!("Registry lists .{} twice; keeping the later row", canonical);
        }
    }

    (delegated, aliases)
}

fn unified_entry(tld: &str, info: &DelegatedTld) -> UnifiedTldEntry {
    let (tld_type, tags) = match info.category {
        TldCategory::CountryCode => (TldType::Cctld, Vec::new()),
        other => (TldType::Gtld, vec![other.as_str().to_string()]),
    };

    UnifiedTldEntry {
        tld: tld.to_string(),
        tld_type,
        idn: IdnPair::derive(tld),
        tags,
        manager: info.manager.clone(),
    }
}

fn first_label(group: &ServiceGroup) -> &str {
    group.tlds.first().map(|entry| entry.tld.as_str()).unwrap_or("")
}
