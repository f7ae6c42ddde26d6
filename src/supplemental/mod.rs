//! Curated data that sits beside the IANA feeds: RDAP servers for
//! country-code TLDs missing from the bootstrap file, and friendly names
//! grouping several registry manager names.
//!
//! IANA data stays canonical. Nothing here may shadow a bootstrap entry or
//! reference a TLD or manager the root zone database does not know about;
//! [`check_integrity`] reports any such drift.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

use crate::idn::{is_punycode, to_ascii, to_unicode};
use crate::parsers::{normalize_label, DomainLabel};
use crate::unified::{TldType, UnifiedDataset};

/// RDAP server for a country-code TLD that the bootstrap file does not cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOverride {
    pub tld: DomainLabel,
    pub rdap_server: String,
    pub backend_operator: String,
    pub date_updated: NaiveDate, // Last time the server was verified
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One raw manager name folded into an alias group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMember {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementalData {
    #[serde(default)]
    pub cc_tld_rdap_servers: Vec<ManualOverride>,
    #[serde(default)]
    pub manager_aliases: BTreeMap<String, Vec<AliasMember>>,
}

impl SupplementalData {
    /// Decodes supplemental JSON, dropping malformed elements one at a time.
    ///
    /// Only a document that is not JSON at all is an error.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text).context("Supplemental data is not valid JSON")?;
        let mut data = SupplementalData::default();

        if let Some(overrides) = document.get("ccTldRdapServers").and_then(Value::as_array) {
            for (index, value) in overrides.iter().enumerate() {
                match serde_json::from_value::<ManualOverride>(value.clone()) {
                    Ok(entry) if Url::parse(&entry.rdap_server).is_ok() => {
                        data.cc_tld_rdap_servers.push(entry)
                    }
                    Ok(entry) => warn!(
                        "Skipping manual RDAP server for .{}: invalid URL '{}'",
                        entry.tld, entry.rdap_server
                    ),
                    Err(e) => warn!("Skipping manual RDAP server #{}: {}", index, e),
                }
            }
        }

        if let Some(aliases) = document.get("managerAliases").and_then(Value::as_object) {
            for (alias, members) in aliases {
                let Some(members) = members.as_array() else {
                    warn!("Skipping manager alias '{}': members are not a list", alias);
                    continue;
                };
                let members: Vec<AliasMember> = members
                    .iter()
                    .filter_map(|member| match serde_json::from_value(member.clone()) {
                        Ok(member) => Some(member),
                        Err(e) => {
                            warn!("Skipping member of manager alias '{}': {}", alias, e);
                            None
                        }
                    })
                    .collect();
                data.manager_aliases.insert(alias.clone(), members);
            }
        }

        debug!(
            "Loaded {} manual RDAP servers and {} manager aliases",
            data.cc_tld_rdap_servers.len(),
            data.manager_aliases.len()
        );
        Ok(data)
    }

    /// Reads supplemental data from disk. A missing file yields empty data.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No supplemental data at {}", path.display());
            return Ok(SupplementalData::default());
        }

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&text)
    }
}

/// Drift between curated data and the canonical sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IntegrityViolation {
    UnknownOverrideLabel { tld: String },
    OverrideNotCountryCode { tld: String },
    OverrideShadowsBootstrap { tld: String },
    UnknownManager { alias: String, manager: String },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::UnknownOverrideLabel { tld } => {
                write!(f, "manual RDAP server for .{} which is not a delegated TLD", tld)
            }
            IntegrityViolation::OverrideNotCountryCode { tld } => {
                write!(f, "manual RDAP server for .{} which is not a country-code TLD", tld)
            }
            IntegrityViolation::OverrideShadowsBootstrap { tld } => {
                write!(f, "manual RDAP server for .{} duplicates the IANA bootstrap entry", tld)
            }
            IntegrityViolation::UnknownManager { alias, manager } => {
                write!(f, "alias '{}' references unknown manager '{}'", alias, manager)
            }
        }
    }
}

/// Checks curated data against the unified dataset and the bootstrap labels
pub fn check_integrity(
    supplemental: &SupplementalData,
    dataset: &UnifiedDataset,
    bootstrap_labels: &[DomainLabel],
) -> Vec<IntegrityViolation> {
    let mut violations = Vec::new();

    let mut bootstrap: HashSet<String> = HashSet::new();
    for label in bootstrap_labels {
        bootstrap.insert(label.clone());
        if is_punycode(label) {
            if let Ok(unicode) = to_unicode(label) {
                bootstrap.insert(unicode);
            }
        }
    }

    for manual in &supplemental.cc_tld_rdap_servers {
        let label = normalize_label(&manual.tld);
        let ascii = to_ascii(&label).unwrap_or_else(|_| label.clone());

        match dataset.find(&label) {
            None => violations.push(IntegrityViolation::UnknownOverrideLabel { tld: label.clone() }),
            Some((entry, _)) if entry.tld_type != TldType::Cctld => {
                violations.push(IntegrityViolation::OverrideNotCountryCode { tld: label.clone() })
            }
            Some(_) => {}
        }

        if bootstrap.contains(&label) || bootstrap.contains(&ascii) {
            violations.push(IntegrityViolation::OverrideShadowsBootstrap { tld: label });
        }
    }

    let managers: HashSet<&str> = dataset
        .entries()
        .filter_map(|(entry, _)| entry.manager.as_deref())
        .collect();
    for (alias, members) in &supplemental.manager_aliases {
        for member in members {
            if !managers.contains(member.name.as_str()) {
                violations.push(IntegrityViolation::UnknownManager {
                    alias: alias.clone(),
                    manager: member.name.clone(),
                });
            }
        }
    }

    violations
}

/// A manager's share of an alias group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerShare {
    pub name: String,
    pub tld_count: usize,
    pub source: Option<String>,
}

/// TLD count per manager, with aliased managers folded together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerGroup {
    pub name: String,
    pub tld_count: usize,
    pub members: Vec<ManagerShare>, // Empty unless the group is an alias
}

/// Tallies TLDs per manager and folds aliased managers under their friendly name
pub fn group_managers(
    dataset: &UnifiedDataset,
    aliases: &BTreeMap<String, Vec<AliasMember>>,
) -> Vec<ManagerGroup> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (entry, _) in dataset.entries() {
        if let Some(manager) = entry.manager.as_deref() {
            *counts.entry(manager).or_default() += 1;
        }
    }

    let mut groups = Vec::new();
    let mut aliased: HashSet<&str> = HashSet::new();

    for (alias, members) in aliases {
        let members: Vec<ManagerShare> = members
            .iter()
            .map(|member| {
                aliased.insert(member.name.as_str());
                ManagerShare {
                    name: member.name.clone(),
                    tld_count: counts.get(member.name.as_str()).copied().unwrap_or(0),
                    source: member.source.clone(),
                }
            })
            .collect();

        groups.push(ManagerGroup {
            name: alias.clone(),
            tld_count: members.iter().map(|m| m.tld_count).sum(),
            members,
        });
    }

    for (manager, count) in &counts {
        if !aliased.contains(manager) {
            groups.push(ManagerGroup {
                name: manager.to_string(),
                tld_count: *count,
                members: Vec::new(),
            });
        }
    }

    groups.sort_by(|a, b| b.tld_count.cmp(&a.tld_count).then_with(|| a.name.cmp(&b.name)));
    groups
}
