use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::idn::{is_punycode, to_unicode};

/// Category of a top-level domain as published in the root zone database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TldCategory {
    Generic,
    CountryCode,
    Sponsored,
    Infrastructure,
    Test,
    GenericRestricted,
}

impl TldCategory {
    pub const ALL: [TldCategory; 6] = [
        TldCategory::Generic,
        TldCategory::CountryCode,
        TldCategory::Sponsored,
        TldCategory::Infrastructure,
        TldCategory::Test,
        TldCategory::GenericRestricted,
    ];

    /// Maps the type column text of the root zone table to a category.
    /// Returns `None` for anything unrecognised so the caller can drop the row.
    pub fn from_source_text(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "generic" => Some(TldCategory::Generic),
            "country-code" => Some(TldCategory::CountryCode),
            "sponsored" => Some(TldCategory::Sponsored),
            "infrastructure" => Some(TldCategory::Infrastructure),
            "test" => Some(TldCategory::Test),
            "generic-restricted" => Some(TldCategory::GenericRestricted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TldCategory::Generic => "generic",
            TldCategory::CountryCode => "country-code",
            TldCategory::Sponsored => "sponsored",
            TldCategory::Infrastructure => "infrastructure",
            TldCategory::Test => "test",
            TldCategory::GenericRestricted => "generic-restricted",
        }
    }
}

impl fmt::Display for TldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length heuristic for country-code labels.
///
/// ASCII labels qualify with exactly two characters. Punycode labels are
/// decoded first and qualify with exactly two Unicode scalar values. A label
/// that fails to decode is treated as generic.
pub fn is_country_code(label: &str) -> bool {
    if is_punycode(label) {
        match to_unicode(label) {
            Ok(unicode) => unicode.chars().count() == 2,
            Err(e) => {
                debug!("Treating {} as generic: {}", label, e);
                false
            }
        }
    } else {
        label.chars().count() == 2
    }
}
