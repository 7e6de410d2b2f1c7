//! Configuration management

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Location cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Store capacity reserved up front (default: 64)
    pub initial_capacity: usize,
    /// Names resolved eagerly when the cache is built
    pub preload: Vec<String>,
    /// Keep hit/miss counters (default: true)
    pub collect_stats: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            preload: Vec::new(),
            collect_stats: true,
        }
    }
}

impl CacheConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }
}
