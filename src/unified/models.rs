use serde::{Deserialize, Serialize};

use crate::idn::{to_ascii, IdnPair};
use crate::parsers::normalize_label;

/// Output classification of a TLD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TldType {
    Gtld,
    Cctld,
}

impl TldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TldType::Gtld => "gtld",
            TldType::Cctld => "cctld",
        }
    }
}

/// One delegated TLD in the unified dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedTldEntry {
    pub tld: String,
    #[serde(rename = "type")]
    pub tld_type: TldType,
    pub idn: Option<IdnPair>,
    /// Registry category, omitted for country-code domains
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
}

/// TLDs sharing the same set of RDAP servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub tlds: Vec<UnifiedTldEntry>,
    #[serde(rename = "rdapServers")]
    pub rdap_servers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedDataset {
    pub description: String,
    pub generated: String, // ISO-8601 UTC, second precision
    pub services: Vec<ServiceGroup>,
}

impl UnifiedDataset {
    /// Iterates every entry together with the group it belongs to
    pub fn entries(&self) -> impl Iterator<Item = (&UnifiedTldEntry, &ServiceGroup)> {
        self.services
            .iter()
            .flat_map(|group| group.tlds.iter().map(move |entry| (entry, group)))
    }

    /// Finds an entry by label, accepting either the ASCII or the Unicode form
    pub fn find(&self, label: &str) -> Option<(&UnifiedTldEntry, &ServiceGroup)> {
        let label = normalize_label(label);
        let ascii = to_ascii(&label).unwrap_or_else(|_| label.clone());

        self.entries().find(|(entry, _)| {
            entry.tld == label
                || entry.tld == ascii
                || entry.idn.as_ref().map_or(false, |idn| idn.unicode == label)
        })
    }

    pub fn tld_count(&self) -> usize {
        self.services.iter().map(|group| group.tlds.len()).sum()
    }

    /// The group of delegated TLDs with no RDAP coverage
    pub fn uncovered(&self) -> Option<&ServiceGroup> {
        self.services.iter().find(|group| group.rdap_servers.is_empty())
    }
}
