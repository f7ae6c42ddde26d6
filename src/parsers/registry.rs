use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{RegistryEntry, TldCategory};

/// Manager column text for reserved domains that have no operator
const NOT_ASSIGNED: &str = "Not assigned";

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("#tld-table").unwrap());
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Parses the root zone database page into registry entries.
///
/// Rows are read from the table with id `tld-table`. Each row needs a label
/// anchor in the first cell and a recognised category in the second. The
/// optional third cell holds the manager, or "Not assigned" for reserved
/// domains. Rows that fall short are dropped.
pub fn parse_registry_table(html: &str) -> Vec<RegistryEntry> {
    let document = Html::parse_document(html);

    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        warn!("Registry page has no tld-table element");
        return Vec::new();
    };

    table
        .select(&ROW_SELECTOR)
        .filter_map(parse_row)
        .collect()
}

fn parse_row(row: ElementRef<'_>) -> Option<RegistryEntry> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SELECTOR).collect();
    if cells.is_empty() {
        // Header row
        return None;
    }
    if cells.len() < 2 {
        debug!("Skipping registry row with {} cell(s)", cells.len());
        return None;
    }

    let Some(anchor) = cells[0].select(&ANCHOR_SELECTOR).next() else {
        debug!("Skipping registry row without a label anchor");
        return None;
    };

    let tld = clean_label(&anchor.text().collect::<String>());
    if tld.is_empty() {
        debug!("Skipping registry row with an empty label");
        return None;
    }

    let category_text = cell_text(cells[1]);
    let Some(category) = TldCategory::from_source_text(&category_text) else {
        warn!("Skipping .{}: unknown category '{}'", tld, category_text);
        return None;
    };

    let (delegated, manager) = match cells.get(2).map(|cell| cell_text(*cell)) {
        Some(text) if text.eq_ignore_ascii_case(NOT_ASSIGNED) => (false, None),
        Some(text) if text.is_empty() => (true, None),
        Some(text) => (true, Some(text)),
        None => (true, None),
    };

    Some(RegistryEntry { tld, category, delegated, manager })
}

/// Strips direction marks and dots, then lowercases
fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_bidi_mark(*c) && *c != '.')
        .collect::<String>()
        .trim()
        .to_lowercase()
}

fn is_bidi_mark(c: char) -> bool {
    matches!(c, '\u{200E}' | '\u{200F}' | '\u{061C}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}
