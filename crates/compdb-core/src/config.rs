use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::cache::CACHE_FILE_NAME;

/// Optional configuration file looked up next to the compilation database
pub const CONFIG_FILE_NAME: &str = "compdb.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// When an existing cache file is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvalidationPolicy {
    /// The cache is used whenever it exists. A regenerated database is not
    /// noticed until the cache file is deleted.
    #[default]
    #[serde(rename = "existence")]
    Existence,
    /// The database is hashed on every run and the cache is rebuilt when the
    /// hash differs from the one recorded in the cache.
    #[serde(rename = "content-hash")]
    ContentHash,
}

impl std::str::FromStr for InvalidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "existence" => Ok(InvalidationPolicy::Existence),
            "content-hash" | "hash" => Ok(InvalidationPolicy::ContentHash),
            _ => Err(format!(
                "Invalid invalidation policy '{}'. Supported: existence, content-hash",
                s
            )),
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Cache file name, created next to the database (default: cached_options.txt)
    #[serde(default = "default_cache_file_name")]
    pub cache_file_name: String,

    /// Cache trust policy (default: existence)
    #[serde(default)]
    pub invalidation: InvalidationPolicy,

    /// Read and write the cache file at all (default: true)
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

fn default_cache_file_name() -> String {
    CACHE_FILE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_file_name: default_cache_file_name(),
            invalidation: InvalidationPolicy::Existence,
            use_cache: true,
        }
    }
}

/// Command-line overrides; `None` leaves the file value untouched
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub cache_file_name: Option<String>,
    pub invalidation: Option<InvalidationPolicy>,
    pub use_cache: Option<bool>,
}

impl ResolverConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ResolverConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `compdb.yaml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(ref name) = overrides.cache_file_name {
            self.cache_file_name = name.clone();
        }
        if let Some(policy) = overrides.invalidation {
            self.invalidation = policy;
        }
        if let Some(use_cache) = overrides.use_cache {
            self.use_cache = use_cache;
        }
    }
}
