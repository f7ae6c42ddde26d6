use serde_json::Value;
use tracing::{debug, warn};

use super::{BootstrapRecord, DomainLabel};

/// Collects every label listed in the `services` array of an RDAP bootstrap file.
///
/// Each service is expected to be `[[labels...], [servers...]]`. Entries that
/// do not have that shape are skipped one element at a time.
pub fn parse_bootstrap(services: &[Value]) -> Vec<DomainLabel> {
    let mut labels = Vec::new();

    for (index, service) in services.iter().enumerate() {
        let Some(tlds) = service_labels(service) else {
            debug!("Skipping bootstrap service #{}: not a [labels, servers] tuple", index);
            continue;
        };
        labels.extend(tlds);
    }

    labels
}

/// Like [`parse_bootstrap`] but keeps the server list attached to each grouping
pub fn parse_bootstrap_records(services: &[Value]) -> Vec<BootstrapRecord> {
    let mut records = Vec::new();

    for (index, service) in services.iter().enumerate() {
        let Some(tlds) = service_labels(service) else {
            debug!("Skipping bootstrap service #{}: not a [labels, servers] tuple", index);
            continue;
        };

        let Some(server_values) = service.get(1).and_then(Value::as_array) else {
            warn!("Skipping bootstrap service #{}: server list missing", index);
            continue;
        };

        let servers: Vec<String> = server_values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        if tlds.is_empty() {
            debug!("Skipping bootstrap service #{}: no usable labels", index);
            continue;
        }

        records.push(BootstrapRecord { tlds, servers });
    }

    records
}

fn service_labels(service: &Value) -> Option<Vec<DomainLabel>> {
    let labels = service.as_array()?.first()?.as_array()?;

    Some(
        labels
            .iter()
            .filter_map(|value| match value.as_str() {
                Some(label) => Some(label),
                None => {
                    debug!("Skipping non-string bootstrap label: {}", value);
                    None
                }
            })
            .map(|label| label.trim_start_matches('.').to_lowercase())
            .filter(|label| !label.is_empty())
            .collect(),
    )
}
