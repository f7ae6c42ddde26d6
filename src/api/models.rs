use serde::Serialize;
use std::time::Instant;

use crate::storage::DataStore;
use crate::unified::UnifiedTldEntry;

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: DataStore,          // Stored sources and unified dataset
    pub supplemental_path: String, // Curated manual servers and aliases
    pub started: Instant,          // Server start, for uptime reporting
}

impl AppState {
    pub fn new(store: DataStore, supplemental_path: impl Into<String>) -> Self {
        Self {
            store,
            supplemental_path: supplemental_path.into(),
            started: Instant::now(),
        }
    }
}

/// Response for the /api/tlds/{tld} endpoint
#[derive(Debug, Serialize)]
pub struct TldLookupResponse {
    #[serde(flatten)]
    pub entry: UnifiedTldEntry,

    /// RDAP servers of the service group holding the TLD
    #[serde(rename = "rdapServers")]
    pub rdap_servers: Vec<String>,
}

/// Health status response for the /health endpoint
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Status indicator: healthy, or degraded when no dataset is available
    pub status: String,

    /// Server uptime in seconds
    pub uptime_secs: u64,

    /// Generation timestamp of the stored unified dataset
    pub dataset_generated: Option<String>,
}

/// Error response for API endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Status indicator: error
    pub status: String,

    /// Error message details
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}
