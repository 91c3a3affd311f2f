//! Configuration schema definitions

use crate::cache::CacheConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// Request defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Result cache sizing
    #[serde(default)]
    pub cache: CacheSettings,

    /// Fuzzy matching thresholds
    #[serde(default)]
    pub fuzzy: FuzzyConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            return Err(Error::invalid_config_value("search.max_results", "must be at least 1"));
        }
        for (key, value) in [
            ("fuzzy.min_similarity", self.fuzzy.min_similarity),
            ("fuzzy.correction_similarity", self.fuzzy.correction_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_config_value(key, format!("{value} is outside 0.0..=1.0")));
            }
        }
        Ok(())
    }
}

/// Defaults applied to every search request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Maximum results returned per request
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Apply the filter spec when one is given
    #[serde(default = "default_true")]
    pub include_filters: bool,

    /// Attach autocomplete/trending suggestions
    #[serde(default = "default_true")]
    pub include_suggestions: bool,

    /// Memoize responses
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Maximum "did you mean" entries per response
    #[serde(default = "default_max_did_you_mean")]
    pub max_did_you_mean: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            include_filters: true,
            include_suggestions: true,
            use_cache: true,
            max_did_you_mean: default_max_did_you_mean(),
        }
    }
}

fn default_max_results() -> usize {
    20
}

fn default_max_did_you_mean() -> usize {
    3
}

fn default_true() -> bool {
    true
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Time-to-live in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Soft cap on cached responses
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        CacheConfig {
            ttl: Duration::from_secs(settings.ttl_secs),
            max_entries: settings.max_entries,
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> usize {
    100
}

/// Fuzzy matching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuzzyConfig {
    /// Minimum edit-distance similarity for a fuzzy candidate
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// Maximum candidates per match call
    #[serde(default = "default_fuzzy_max_results")]
    pub max_results: usize,

    /// Similarity required for a rewritten query to count as a correction
    #[serde(default = "default_correction_similarity")]
    pub correction_similarity: f64,

    /// Maximum corrections returned
    #[serde(default = "default_max_corrections")]
    pub max_corrections: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            max_results: default_fuzzy_max_results(),
            correction_similarity: default_correction_similarity(),
            max_corrections: default_max_corrections(),
        }
    }
}

fn default_min_similarity() -> f64 {
    0.3
}

fn default_fuzzy_max_results() -> usize {
    10
}

fn default_correction_similarity() -> f64 {
    0.6
}

fn default_max_corrections() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [cache]
            ttl_secs = 60

            [fuzzy]
            min_similarity = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(schema.cache.ttl_secs, 60);
        assert_eq!(schema.cache.max_entries, 100);
        assert_eq!(schema.fuzzy.min_similarity, 0.5);
        assert_eq!(schema.fuzzy.max_results, 10);
        assert_eq!(schema.search.max_results, 20);
    }

    #[test]
    fn test_validate_rejects_out_of_range_similarity() {
        let mut schema = ConfigSchema::default();
        schema.fuzzy.min_similarity = 1.5;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_cache_settings_conversion() {
        let config = CacheConfig::from(&CacheSettings::default());
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries, 100);
    }
}
