use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::pagination::DEFAULT_PAGE_SIZE;

pub const DEFAULT_RPC_URL: &str = "wss://dydx-ops-rpc.kingnodes.com/websocket";
pub const DEFAULT_INDEXER_URL: &str = "https://indexer.dydx.trade";
pub const DEFAULT_METADATA_URL: &str =
    "https://66iv2m87ol.execute-api.ap-northeast-1.amazonaws.com/mainnet/metadata-service/v1";

const MAX_RECENT_SEARCHES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: Option<String>,
    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub recent_searches: Vec<String>,
}

fn default_indexer_url() -> String {
    DEFAULT_INDEXER_URL.to_string()
}

fn default_metadata_url() -> String {
    DEFAULT_METADATA_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            indexer_url: default_indexer_url(),
            metadata_url: default_metadata_url(),
            page_size: default_page_size(),
            recent_searches: Vec::new(),
        }
    }
}

impl Config {
    /// Returns the config directory path (~/.config/dyex on Linux)
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("dyex"))
            .context("Could not determine config directory")
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {path:?}"))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {dir:?}"))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config to {path:?}"))?;

        Ok(())
    }

    /// Set the RPC URL and persist
    pub fn set_rpc(&mut self, url: String) -> Result<()> {
        self.rpc_url = Some(url);
        self.save()
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        self.page_size = page_size;
        self.save()
    }

    /// Add a search to recent history and persist
    pub fn add_recent_search(&mut self, query: String) -> Result<()> {
        self.push_recent_search(query);
        self.save()
    }

    /// Most recent first, no duplicates, bounded
    fn push_recent_search(&mut self, query: String) {
        self.recent_searches.retain(|s| s != &query);
        self.recent_searches.insert(0, query);
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);
    }
}

/// Log a failed save. The in-memory value is kept either way.
pub fn warn_if_unsaved(result: Result<()>, setting: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(setting, error = %format!("{e:#}"), "config not saved");
            false
        }
    }
}
