//! Configuration Management
//!
//! Loads persistent configuration for cwvars.

use crate::cache::DEFAULT_FRESHNESS;
use crate::query::ResolverOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TOKEN_ENV: &str = "CWVARS_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Inventory gateway base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Region used for the `default` alias and region-less calls
    #[serde(default)]
    pub default_region: Option<String>,
    /// Enumeration cache freshness window in seconds
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    /// Environment variable holding the gateway bearer token
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cwvars").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective endpoint (config > built-in default)
    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective default region (config > AWS_REGION > AWS_DEFAULT_REGION > us-east-1)
    pub fn effective_region(&self) -> String {
        self.default_region
            .clone()
            .or_else(|| std::env::var("AWS_REGION").ok())
            .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn cache_freshness(&self) -> Duration {
        self.cache_ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FRESHNESS)
    }

    /// Read the bearer token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        let var = self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        std::env::var(var).ok().filter(|t| !t.is_empty())
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            default_region: self.effective_region(),
            cache_freshness: self.cache_freshness(),
        }
    }
}
