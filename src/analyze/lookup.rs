use std::collections::HashSet;
use tracing::{debug, warn};

use crate::idn::{is_punycode, to_ascii};
use crate::parsers::RegistryEntry;

/// Set of country-code labels indexed under both Unicode and ASCII forms
#[derive(Debug, Clone, Default)]
pub struct CcTldLookup {
    labels: HashSet<String>,
}

impl CcTldLookup {
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Number of indexed forms, not number of domains
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Builds the country-code lookup from root zone database entries.
///
/// Each country-code label is added as published, and labels not already in
/// `xn--` form are also added in their ASCII-compatible encoding. An encoding
/// failure only loses the extra form.
pub fn build_cctld_lookup(entries: &[RegistryEntry]) -> CcTldLookup {
    let mut labels = HashSet::new();

    for entry in entries.iter().filter(|e| e.is_country_code()) {
        labels.insert(entry.tld.clone());

        if is_punycode(&entry.tld) {
            continue;
        }
        match to_ascii(&entry.tld) {
            Ok(ascii) => {
                labels.insert(ascii);
            }
            Err(e) => warn!("No ASCII form indexed for .{}: {}", entry.tld, e),
        }
    }

    debug!("Country-code lookup holds {} label forms", labels.len());
    CcTldLookup { labels }
}
