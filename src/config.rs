//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `TLDREC__*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration file read when no `--config` path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/tld_reconciler.toml";

pub const DEFAULT_BOOTSTRAP_URL: &str = "https://data.iana.org/rdap/dns.json";
pub const DEFAULT_TLD_LIST_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";
pub const DEFAULT_REGISTRY_URL: &str = "https://www.iana.org/domains/root/db";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding downloaded sources, their cache metadata and the unified dataset
    pub data_dir: String,
    /// Curated manual RDAP servers and manager aliases
    pub supplemental_path: String,
    /// Log to a file in this directory instead of stderr
    #[serde(default)]
    pub log_dir: Option<String>,
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub bootstrap_url: String,
    pub tld_list_url: String,
    pub registry_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Loads configuration from `path` (or the default path) layered over
    /// defaults and under environment overrides. A missing file is fine.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let settings = Config::builder()
            .set_default("data_dir", "data")?
            .set_default("supplemental_path", "data/supplemental.json")?
            .set_default("sources.bootstrap_url", DEFAULT_BOOTSTRAP_URL)?
            .set_default("sources.tld_list_url", DEFAULT_TLD_LIST_URL)?
            .set_default("sources.registry_url", DEFAULT_REGISTRY_URL)?
            .set_default("http.timeout_secs", 30)?
            .set_default(
                "http.user_agent",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name(&file).required(path.is_some()))
            .add_source(Environment::with_prefix("TLDREC").separator("__"))
            .build()
            .with_context(|| format!("Failed to load configuration from {}", file))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            supplemental_path: "data/supplemental.json".to_string(),
            log_dir: None,
            sources: SourcesConfig {
                bootstrap_url: DEFAULT_BOOTSTRAP_URL.to_string(),
                tld_list_url: DEFAULT_TLD_LIST_URL.to_string(),
                registry_url: DEFAULT_REGISTRY_URL.to_string(),
            },
            http: HttpConfig {
                timeout_secs: 30,
                user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
        }
    }
}
