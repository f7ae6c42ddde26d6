//! Orchestration of the fetch → parse → analyze → build flow.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::analyze::{
    analyze_bootstrap, analyze_registry, analyze_tld_list, build_cctld_lookup,
    compare_bootstrap_vs_registry, compare_tld_list_vs_registry, CcTldLookup, ComparisonResult,
    RegistryAnalysis, TldCounts,
};
use crate::config::AppConfig;
use crate::fetcher::{build_client, fetch_source, validate_source, FetchOutcome, Source};
use crate::parsers::{
    parse_bootstrap, parse_bootstrap_records, parse_registry_table, parse_tld_list, BootstrapRecord,
    DomainLabel, RegistryEntry,
};
use crate::storage::DataStore;
use crate::supplemental::{check_integrity, IntegrityViolation, SupplementalData};
use crate::unified::{build_from_records, UnifiedDataset};

/// Blob name of the persisted unified dataset
pub const UNIFIED_FILE: &str = "unified.json";

/// The three sources parsed from one point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tld_list: Vec<DomainLabel>,
    pub bootstrap_records: Vec<BootstrapRecord>,
    pub bootstrap_labels: Vec<DomainLabel>,
    pub registry_entries: Vec<RegistryEntry>,
    lookup: CcTldLookup,
}

/// Count summaries for all three sources
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub tld_list: TldCounts,
    pub bootstrap: TldCounts,
    pub registry: RegistryAnalysis,
}

impl Snapshot {
    /// Parses raw source bytes. Fails only on structurally invalid documents.
    pub fn from_sources(tld_list: &[u8], bootstrap: &[u8], registry_html: &[u8]) -> Result<Self> {
        for (source, bytes) in [
            (Source::TldList, tld_list),
            (Source::Bootstrap, bootstrap),
            (Source::RegistryHtml, registry_html),
        ] {
            validate_source(source, bytes).with_context(|| format!("Stored {} is unusable", source))?;
        }

        let tld_list = parse_tld_list(&String::from_utf8_lossy(tld_list));

        let document: Value = serde_json::from_slice(bootstrap)?;
        let services = document
            .get("services")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let bootstrap_labels = parse_bootstrap(services);
        let bootstrap_records = parse_bootstrap_records(services);

        let registry_entries = parse_registry_table(&String::from_utf8_lossy(registry_html));
        let lookup = build_cctld_lookup(&registry_entries);

        info!(
            "Snapshot: {} listed TLDs, {} bootstrap labels, {} registry entries",
            tld_list.len(),
            bootstrap_labels.len(),
            registry_entries.len()
        );

        Ok(Snapshot {
            tld_list,
            bootstrap_records,
            bootstrap_labels,
            registry_entries,
            lookup,
        })
    }

    /// Loads and parses the stored copies of all three sources
    #[instrument(level = "debug", skip_all, fields(root = %store.root().display()))]
    pub async fn load(store: &DataStore) -> Result<Self> {
        let mut blobs = Vec::with_capacity(Source::ALL.len());
        for source in [Source::TldList, Source::Bootstrap, Source::RegistryHtml] {
            let bytes = store.read_blob(source.file_name()).await?.ok_or_else(|| {
                anyhow!("No stored copy of the {} source; run `update` first", source)
            })?;
            blobs.push(bytes);
        }
        Self::from_sources(&blobs[0], &blobs[1], &blobs[2])
    }

    pub fn lookup(&self) -> &CcTldLookup {
        &self.lookup
    }

    pub fn analysis(&self) -> AnalysisReport {
        AnalysisReport {
            tld_list: analyze_tld_list(&self.tld_list, &self.lookup),
            bootstrap: analyze_bootstrap(&self.bootstrap_labels, &self.lookup),
            registry: analyze_registry(&self.registry_entries),
        }
    }

    pub fn compare_bootstrap(&self) -> ComparisonResult {
        compare_bootstrap_vs_registry(&self.bootstrap_labels, &self.registry_entries)
    }

    pub fn compare_tld_list(&self) -> ComparisonResult {
        compare_tld_list_vs_registry(&self.tld_list, &self.registry_entries)
    }

    pub fn unified(&self, supplemental: &SupplementalData) -> UnifiedDataset {
        build_from_records(
            &self.bootstrap_records,
            &self.registry_entries,
            &supplemental.cc_tld_rdap_servers,
            Utc::now(),
        )
    }

    /// Checks curated data against this snapshot
    pub fn integrity(&self, supplemental: &SupplementalData) -> Vec<IntegrityViolation> {
        let dataset = self.unified(supplemental);
        check_integrity(supplemental, &dataset, &self.bootstrap_labels)
    }
}

/// What an update run did per source
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<Source>,
    pub unchanged: Vec<Source>,
    pub failed: Vec<(Source, String)>,
    pub rebuilt: bool,
}

/// Fetches all sources concurrently, stores the new ones and rebuilds the
/// unified dataset when anything changed.
///
/// A failing source is recorded in the report; the others still update.
#[instrument(skip(config, store))]
pub async fn update_sources(config: &AppConfig, store: &DataStore, force: bool) -> Result<UpdateReport> {
    let client = build_client(&config.http)?;
    let mut metadata = store.read_metadata().await?;
    let mut report = UpdateReport::default();

    let client = &client;
    let fetches = Source::ALL.into_iter().map(|source| {
        let cached = if force { None } else { metadata.get(source.name()).cloned() };
        async move {
            let url = source.url(&config.sources);
            (source, fetch_source(client, source, url, cached.as_ref()).await)
        }
    });
    let results = join_all(fetches).await;

    for (source, result) in results {
        match result {
            Ok(FetchOutcome::Updated { body, metadata: fresh }) => {
                store.write_blob(source.file_name(), &body).await?;
                metadata.insert(source.name().to_string(), fresh);
                report.updated.push(source);
            }
            Ok(FetchOutcome::Unchanged) => report.unchanged.push(source),
            Err(e) => {
                error!("Failed to update {}: {:#}", source, e);
                report.failed.push((source, format!("{:#}", e)));
            }
        }
    }

    if !report.updated.is_empty() {
        store.write_metadata(&metadata).await?;
    }

    if !report.updated.is_empty() || load_unified(store).await?.is_none() {
        match Snapshot::load(store).await {
            Ok(snapshot) => {
                let supplemental = SupplementalData::load(&config.supplemental_path).await?;
                save_unified(store, &snapshot.unified(&supplemental)).await?;
                report.rebuilt = true;
            }
            Err(e) => warn!("Unified dataset not rebuilt: {:#}", e),
        }
    }

    Ok(report)
}

/// Persists the unified dataset, replacing the previous artifact
pub async fn save_unified(store: &DataStore, dataset: &UnifiedDataset) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(dataset)?;
    store.write_blob(UNIFIED_FILE, &bytes).await?;
    info!("Saved unified dataset generated at {}", dataset.generated);
    Ok(())
}

pub async fn load_unified(store: &DataStore) -> Result<Option<UnifiedDataset>> {
    match store.read_blob(UNIFIED_FILE).await? {
        Some(bytes) => Ok(Some(
            serde_json::from_slice(&bytes).context("Stored unified dataset is corrupt")?,
        )),
        None => Ok(None),
    }
}

/// The stored unified dataset, or a fresh build when none has been saved yet
pub async fn current_dataset(store: &DataStore, supplemental_path: &str) -> Result<UnifiedDataset> {
    if let Some(dataset) = load_unified(store).await? {
        return Ok(dataset);
    }
    let snapshot = Snapshot::load(store).await?;
    let supplemental = SupplementalData::load(supplemental_path).await?;
    Ok(snapshot.unified(&supplemental))
}
