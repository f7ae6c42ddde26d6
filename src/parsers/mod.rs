//! Parsers for the three registry feeds.
//!
//! Every parser follows the same policy: a malformed element is logged and
//! skipped, and parsing carries on with the rest of the input. Structural
//! validation of a whole document happens earlier, in the fetcher.

pub mod bootstrap;
pub mod classification;
pub mod registry;
pub mod tld_list;


use serde::{Deserialize, Serialize};

pub use bootstrap::{parse_bootstrap, parse_bootstrap_records};
pub use classification::{is_country_code, TldCategory};
pub use registry::parse_registry_table;
pub use tld_list::parse_tld_list;

/// A top-level domain label: lowercase, without the leading dot
pub type DomainLabel = String;

/// Trims, drops leading dots and lowercases user- or curator-supplied labels
pub fn normalize_label(label: &str) -> DomainLabel {
    label.trim().trim_start_matches('.').to_lowercase()
}

/// One service grouping from the RDAP bootstrap file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRecord {
    pub tlds: Vec<DomainLabel>, // Labels served by this grouping
    pub servers: Vec<String>,   // RDAP base URLs, in source order
}

/// One row of the root zone database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub tld: DomainLabel,
    pub category: TldCategory,
    pub delegated: bool,
    /// Sponsoring organisation; only set for delegated domains
    pub manager: Option<String>,
}

impl RegistryEntry {
    pub fn is_country_code(&self) -> bool {
        self.category == TldCategory::CountryCode
    }
}
