//! # Sync Error Types
//!
//! All errors that can occur while caching, syncing or configuring.

use thiserror::Error;

/// Errors raised by the persistent cache tier.
///
/// The cache itself never returns these to callers; they are logged and
/// counted, and the operation degrades to a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying store failed.
    #[error("store i/o failed for {key}: {source}")]
    Io {
        /// Store key involved.
        key: String,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// Record could not be decompressed.
    #[error("corrupt record {key}: {reason}")]
    Corrupt {
        /// Store key involved.
        key: String,
        /// What went wrong.
        reason: String,
    },

    /// Record or index could not be encoded or decoded.
    #[error("serialization failed for {key}: {source}")]
    Serde {
        /// Store key involved.
        key: String,
        /// Cause.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for persistent cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur while fetching or applying server deltas.
///
/// `Clone` so one failure can be handed to every coalesced caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failed or the server returned an error.
    #[error("network error: {0}")]
    Network(String),

    /// Server responded with a body we could not decode.
    #[error("malformed server response: {0}")]
    Parse(String),

    /// A bulk response did not include a requested sector.
    #[error("sector missing from bulk response: {0}")]
    MissingSector(String),

    /// A realtime delta named a sector id that is not canonical.
    #[error("invalid sector id: {0}")]
    InvalidSectorId(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
