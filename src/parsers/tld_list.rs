use super::DomainLabel;

/// Parses the plain-text TLD list published alongside the root zone.
///
/// Comment lines (`#`) and blank lines are dropped; everything else is
/// trimmed and lowercased.
pub fn parse_tld_list(text: &str) -> Vec<DomainLabel> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}
