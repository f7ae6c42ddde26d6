use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use crate::fetcher::SourceMetadata;

/// Name of the JSON map holding per-source cache metadata
pub const METADATA_FILE: &str = "metadata.json";

/// Named blobs and source metadata kept in one data directory
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Writes a blob, replacing any previous content
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    pub async fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        // Staged write: readers only ever see a complete blob
        let target = self.path(name);
        let staging = self.path(&format!(".{}.tmp", name));
        fs::write(&staging, bytes)
            .await
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        fs::rename(&staging, &target)
            .await
            .with_context(|| format!("Failed to replace {}", target.display()))?;

        debug!("Stored {}", target.display());
        Ok(())
    }

    /// Reads a blob, or `None` if it was never written
    pub async fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub async fn read_metadata(&self) -> Result<HashMap<String, SourceMetadata>> {
        match self.read_blob(METADATA_FILE).await? {
            Some(bytes) => serde_json::from_slice(&bytes).context("Corrupt source metadata"),
            None => Ok(HashMap::new()),
        }
    }

    pub async fn write_metadata(&self, metadata: &HashMap<String, SourceMetadata>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(metadata)?;
        self.write_blob(METADATA_FILE, &bytes).await
    }
}
