//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! base_seed = 42
//!
//! [cache]
//! memory_capacity = 100
//! ttl_secs = 604800
//! cache_dir = "/var/cache/astral"
//!
//! [sync]
//! prefetch_neighbors = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Cache sizing and expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum sectors kept in memory.
    pub memory_capacity: usize,
    /// Entries evicted at once when memory is full.
    pub memory_evict_batch: usize,
    /// Maximum sectors kept in the persistent store.
    pub persistent_capacity: usize,
    /// Entries evicted at once when the store is full.
    pub persistent_evict_batch: usize,
    /// Persistent records older than this (since last sync) are dropped.
    pub ttl_secs: u64,
    /// Directory for the file store. `None` keeps everything in memory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 100,
            memory_evict_batch: 10,
            persistent_capacity: 1000,
            persistent_evict_batch: 100,
            ttl_secs: 7 * 24 * 60 * 60,
            cache_dir: None,
        }
    }
}

impl CacheConfig {
    /// Persistent record lifetime.
    #[inline]
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Checks sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero capacities or batches.
    pub fn validate(&self) -> ConfigResult<()> {
        let checks = [
            ("memory_capacity", self.memory_capacity),
            ("memory_evict_batch", self.memory_evict_batch),
            ("persistent_capacity", self.persistent_capacity),
            ("persistent_evict_batch", self.persistent_evict_batch),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("cache.{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// Sync behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Generate and cache the 26 neighbours when entering a sector.
    pub prefetch_neighbors: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prefetch_neighbors: true,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Galaxy base seed, shared with the server.
    pub base_seed: u32,
    /// Cache settings.
    pub cache: CacheConfig,
    /// Sync settings.
    pub sync: SyncConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or out-of-range
    /// values (a negative seed, for example) and [`ConfigError::Invalid`]
    /// when validation fails.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cache.memory_capacity, 100);
        assert_eq!(config.cache.ttl(), Duration::from_secs(604_800));
        assert!(config.sync.prefetch_neighbors);
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            base_seed = 42

            [cache]
            memory_capacity = 8
            cache_dir = "/tmp/astral"

            [sync]
            prefetch_neighbors = false
            "#,
        )
        .unwrap();
        assert_eq!(config.base_seed, 42);
        assert_eq!(config.cache.memory_capacity, 8);
        assert_eq!(config.cache.memory_evict_batch, 10);
        assert_eq!(config.cache.cache_dir, Some(PathBuf::from("/tmp/astral")));
        assert!(!config.sync.prefetch_neighbors);
    }

    #[test]
    fn test_negative_seed_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("base_seed = -1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EngineConfig::from_toml_str("[cache]\nmemory_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("memory_capacity"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EngineConfig::load("/nonexistent/astral.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
