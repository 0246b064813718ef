// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Navigator Configuration
//
// Defines the configuration schema for the navigator engine:
// - Query defaults (top_k, limit) and the per-query timeout budget
// - Search mode presets (precise / explore)
// - Embedding provider selection and query-embedding cache size
// - Optional snapshot to load at startup

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::query::SearchMode;

pub const CONFIG_PATH_ENV: &str = "TAPESTRY_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigatorConfig {
    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default for top_k when the caller omits it
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Default for limit when the caller omits it
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound for top_k/limit; larger requests are rejected
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Per-query budget in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            default_limit: default_limit(),
            max_top_k: default_max_top_k(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Threshold when neither threshold nor mode is given. -1.0 admits every
    /// candidate since cosine similarity lies in [-1, 1].
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,

    #[serde(default = "SearchPreset::precise")]
    pub precise: SearchPreset,

    #[serde(default = "SearchPreset::explore")]
    pub explore: SearchPreset,
}

impl SearchConfig {
    pub fn preset(&self, mode: SearchMode) -> &SearchPreset {
        match mode {
            SearchMode::Precise => &self.precise,
            SearchMode::Explore => &self.explore,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            precise: SearchPreset::precise(),
            explore: SearchPreset::explore(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPreset {
    pub threshold: f64,
    pub top_k: usize,
    /// top_k for related-facet lookups in this mode
    pub related_top_k: usize,
}

impl SearchPreset {
    pub fn precise() -> Self {
        Self {
            threshold: 0.80,
            top_k: 3,
            related_top_k: 5,
        }
    }

    pub fn explore() -> Self {
        Self {
            threshold: 0.30,
            top_k: 20,
            related_top_k: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Offline feature-hashing embedder
    Hashing,
    /// Ollama-compatible HTTP embedding endpoint
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: EmbeddingProviderKind,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Number of query embeddings kept in the LRU cache (0 disables it)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            dimensions: default_dimensions(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

fn default_top_k() -> usize {
    10
}

fn default_limit() -> usize {
    10
}

fn default_max_top_k() -> usize {
    1000
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_threshold() -> f64 {
    -1.0
}

fn default_provider() -> EmbeddingProviderKind {
    EmbeddingProviderKind::Hashing
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "all-minilm".to_string()
}

fn default_dimensions() -> usize {
    384 // all-MiniLM-L6-v2
}

fn default_cache_capacity() -> usize {
    1024
}

impl NavigatorConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. TAPESTRY_CONFIG_PATH environment variable
    /// 2. ./tapestry-config.yaml (working directory)
    /// 3. ~/.tapestry/config.yaml (user home)
    /// 4. /etc/tapestry/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./tapestry-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".tapestry").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/tapestry/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing/invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TAPESTRY_QUERY_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) => {
                    tracing::info!("Environment override: TAPESTRY_QUERY_TIMEOUT_MS={}", ms);
                    self.query.timeout_ms = ms;
                }
                Err(_) => {
                    tracing::warn!("Ignoring invalid TAPESTRY_QUERY_TIMEOUT_MS value: '{}'", val);
                }
            }
        }

        if let Ok(endpoint) = std::env::var("TAPESTRY_EMBEDDING_ENDPOINT") {
            tracing::info!("Environment override: TAPESTRY_EMBEDDING_ENDPOINT={}", endpoint);
            self.embedding.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("TAPESTRY_EMBEDDING_MODEL") {
            tracing::info!("Environment override: TAPESTRY_EMBEDDING_MODEL={}", model);
            self.embedding.model = model;
        }

        if let Ok(path) = std::env::var("TAPESTRY_SNAPSHOT_PATH") {
            tracing::info!("Environment override: TAPESTRY_SNAPSHOT_PATH={}", path);
            self.snapshot = Some(SnapshotConfig { path: PathBuf::from(path) });
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.query.default_top_k == 0 {
            anyhow::bail!("query.default_top_k must be positive");
        }

        if self.query.default_limit == 0 {
            anyhow::bail!("query.default_limit must be positive");
        }

        if self.query.max_top_k < self.query.default_top_k.max(self.query.default_limit) {
            anyhow::bail!(
                "query.max_top_k ({}) is below the configured defaults",
                self.query.max_top_k
            );
        }

        if self.query.timeout_ms == 0 {
            anyhow::bail!("query.timeout_ms must be positive");
        }

        let thresholds = [
            ("search.default_threshold", self.search.default_threshold),
            ("search.precise.threshold", self.search.precise.threshold),
            ("search.explore.threshold", self.search.explore.threshold),
        ];
        for (name, value) in thresholds {
            if !(-1.0..=1.0).contains(&value) {
                anyhow::bail!("{} must lie in [-1, 1], got {}", name, value);
            }
        }

        for (name, preset) in [("precise", &self.search.precise), ("explore", &self.search.explore)] {
            if preset.top_k == 0 || preset.related_top_k == 0 {
                anyhow::bail!("search.{} top_k values must be positive", name);
            }
        }

        if self.embedding.dimensions == 0 {
            anyhow::bail!("embedding.dimensions must be positive");
        }

        if self.embedding.provider == EmbeddingProviderKind::Ollama {
            if self.embedding.endpoint.is_empty() {
                anyhow::bail!("embedding.endpoint cannot be empty for the ollama provider");
            }
            if self.embedding.model.is_empty() {
                anyhow::bail!("embedding.model cannot be empty for the ollama provider");
            }
        }

        Ok(())
    }
}
