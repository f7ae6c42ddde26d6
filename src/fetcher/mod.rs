//! Downloads the three IANA feeds with HTTP conditional caching and rejects
//! bodies that are structurally unusable before they reach storage.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderName, CACHE_CONTROL, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{HttpConfig, SourcesConfig};

static MAX_AGE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"max-age\s*=\s*(\d+)").unwrap());
/// Upper bound on how long a cached copy counts as fresh
const MAX_FRESHNESS_SECS: u64 = 365 * 24 * 60 * 60;

static TLD_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(xn--)?[a-z0-9-]+$").unwrap());

/// The feeds this system reconciles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Bootstrap,    // RDAP bootstrap JSON
    TldList,      // Plain-text root zone TLD list
    RegistryHtml, // Root zone database page
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Bootstrap, Source::TldList, Source::RegistryHtml];

    pub fn name(&self) -> &'static str {
        match self {
            Source::Bootstrap => "bootstrap",
            Source::TldList => "tld-list",
            Source::RegistryHtml => "registry",
        }
    }

    /// Blob name used by the data store
    pub fn file_name(&self) -> &'static str {
        match self {
            Source::Bootstrap => "dns.json",
            Source::TldList => "tlds.txt",
            Source::RegistryHtml => "root-db.html",
        }
    }

    pub fn url<'a>(&self, sources: &'a SourcesConfig) -> &'a str {
        match self {
            Source::Bootstrap => &sources.bootstrap_url,
            Source::TldList => &sources.tld_list_url,
            Source::RegistryHtml => &sources.registry_url,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caching metadata remembered from the last successful download
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub max_age_secs: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SourceMetadata {
    /// True while the Cache-Control max-age window of the last download is open.
    ///
    /// The window is capped at one year whatever the server advertised.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match (self.fetched_at, self.max_age_secs) {
            (Some(fetched_at), Some(max_age)) => {
                let max_age = max_age.min(MAX_FRESHNESS_SECS) as i64;
                fetched_at
                    .checked_add_signed(ChronoDuration::seconds(max_age))
                    .map_or(false, |expires| expires > now)
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Unchanged,
    Updated { body: Vec<u8>, metadata: SourceMetadata },
}

/// Builds the HTTP client shared by all fetches
pub fn build_client(http: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(http.timeout())
        .user_agent(http.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")
}

/// Fetches one source, honoring the cached metadata of the previous download.
///
/// Returns `Unchanged` without touching the network while the cached copy is
/// still fresh, and on `304 Not Modified`.
pub async fn fetch_source(
    client: &Client,
    source: Source,
    url: &str,
    cached: Option<&SourceMetadata>,
) -> Result<FetchOutcome> {
    if let Some(cached) = cached {
        if cached.is_fresh(Utc::now()) {
            debug!("{} is still fresh, skipping request", source);
            return Ok(FetchOutcome::Unchanged);
        }
    }

    let mut request = client.get(url);
    if let Some(cached) = cached {
        if let Some(etag) = &cached.etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = &cached.last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    info!("Fetching {} from {}", source, url);
    let response = request
        .send()
        .await
        .with_context(|| format!("Request for {} failed", url))?;

    let status = response.status();
    if status == StatusCode::NOT_MODIFIED {
        debug!("{} not modified", source);
        return Ok(FetchOutcome::Unchanged);
    }
    if !status.is_success() {
        bail!("Fetching {} from {} returned HTTP {}", source, url, status);
    }

    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let metadata = SourceMetadata {
        etag: header(ETAG),
        last_modified: header(LAST_MODIFIED),
        max_age_secs: header(CACHE_CONTROL).as_deref().and_then(parse_max_age),
        fetched_at: Some(Utc::now()),
    };

    let body = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read {} body", source))?
        .to_vec();

    validate_source(source, &body)?;
    info!("Fetched {} ({} bytes)", source, body.len());

    Ok(FetchOutcome::Updated { body, metadata })
}

/// Extracts `max-age` seconds from a Cache-Control header value
pub fn parse_max_age(cache_control: &str) -> Option<u64> {
    MAX_AGE_REGEX
        .captures(cache_control)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Rejects a downloaded body that cannot be the expected document
pub fn validate_source(source: Source, body: &[u8]) -> Result<()> {
    match source {
        Source::Bootstrap => {
            let document: serde_json::Value =
                serde_json::from_slice(body).context("Bootstrap file is not valid JSON")?;
            if !document.get("services").map_or(false, |services| services.is_array()) {
                bail!("Bootstrap file has no services array");
            }
        }
        Source::TldList => {
            let text = std::str::from_utf8(body).context("TLD list is not UTF-8")?;
            let mut labels = 0;
            for line in text.lines().map(str::trim) {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if !TLD_LINE_REGEX.is_match(&line.to_lowercase()) {
                    bail!("TLD list contains an invalid label: '{}'", line);
                }
                labels += 1;
            }
            if labels == 0 {
                bail!("TLD list is empty");
            }
        }
        Source::RegistryHtml => {
            let html = std::str::from_utf8(body).context("Registry page is not UTF-8")?;
            if !html.contains("tld-table") {
                warn!("Registry page is missing the tld-table element");
                bail!("Registry page has no tld-table");
            }
        }
    }
    Ok(())
}
