use anyhow::{anyhow, Result};
use idna::punycode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix marking an ASCII-compatible (Punycode) label
pub const ACE_PREFIX: &str = "xn--";

/// ASCII and Unicode forms of an internationalized label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdnPair {
    pub ascii: String,   // ASCII-compatible form, e.g. xn--kpry57d
    pub unicode: String, // Native form, e.g. 台灣
}

impl IdnPair {
    /// Derives the IDN pair for a label, or `None` for plain ASCII labels.
    ///
    /// A codec failure never surfaces: both sides fall back to the label
    /// as given.
    pub fn derive(label: &str) -> Option<IdnPair> {
        if is_punycode(label) {
            let unicode = to_unicode(label).unwrap_or_else(|e| {
                debug!("Keeping {} as-is for IDN pair: {}", label, e);
                label.to_string()
            });
            Some(IdnPair { ascii: label.to_string(), unicode })
        } else if !label.is_ascii() {
            let ascii = to_ascii(label).unwrap_or_else(|e| {
                debug!("Keeping {} as-is for IDN pair: {}", label, e);
                label.to_string()
            });
            Some(IdnPair { ascii, unicode: label.to_string() })
        } else {
            None
        }
    }
}

/// True when the label carries the `xn--` prefix
pub fn is_punycode(label: &str) -> bool {
    label.starts_with(ACE_PREFIX)
}

/// True when the label is internationalized in either encoding
pub fn is_idn(label: &str) -> bool {
    is_punycode(label) || !label.is_ascii()
}

/// Decodes an `xn--` label to Unicode. Other labels are returned unchanged.
pub fn to_unicode(label: &str) -> Result<String> {
    match label.strip_prefix(ACE_PREFIX) {
        Some(encoded) if !encoded.is_ascii() => {
            Err(anyhow!("punycode label has non-basic code points: {}", label))
        }
        Some(encoded) => punycode::decode_to_string(encoded)
            .ok_or_else(|| anyhow!("malformed punycode label: {}", label)),
        None => Ok(label.to_string()),
    }
}

/// Encodes a Unicode label to its `xn--` form. ASCII labels are returned unchanged.
pub fn to_ascii(label: &str) -> Result<String> {
    if label.is_ascii() {
        return Ok(label.to_string());
    }
    punycode::encode_str(label)
        .map(|encoded| format!("{}{}", ACE_PREFIX, encoded))
        .ok_or_else(|| anyhow!("cannot punycode-encode label: {}", label))
}
