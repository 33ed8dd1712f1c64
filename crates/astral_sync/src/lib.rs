//! # ASTRAL Sync
//!
//! Caching and server reconciliation for generated sectors.
//!
//! Static sector content is free: both sides generate it from the same
//! seed. Only what players change travels over the wire, as versioned
//! deltas.
//!
//! ## Core Components
//!
//! - `SectorDelta`: one versioned mutation, as the server sends it
//! - `apply_deltas`: clone-then-patch application in version order
//! - `SectorCache`: memory LRU tier over a TTL-bounded persistent tier
//! - `StateSync`: delta fetching with per-sector request coalescing
//! - `SectorService`: the "coordinates in, current sector out" facade
//! - `EngineConfig`: TOML configuration
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use astral_procedural::{SectorCoords, SectorGenerator};
//! use astral_sync::{apply_deltas, CacheConfig, SectorCache};
//!
//! let cache = SectorCache::memory_only(CacheConfig::default());
//! let sector = SectorGenerator::new(42).generate(SectorCoords::new(1, 2, 3));
//!
//! let current = apply_deltas(&sector, &[]);
//! cache.set(Arc::new(current), 0);
//! assert!(cache.contains("sector_1_2_3"));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod apply;
pub mod cache;
pub mod clock;
pub mod config;
pub mod delta;
pub mod error;
pub mod service;
pub mod source;
pub mod store;
pub mod sync;

pub use apply::{apply_deltas, apply_single_delta, DeltaOutcome};
pub use cache::{CacheEntry, CacheStats, SectorCache, INDEX_KEY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, EngineConfig, SyncConfig};
pub use delta::{
    BulkDeltaQuery, BulkDeltaRequest, BulkDeltaResponse, BulkDeltaResult, DeltaKind,
    DeltaResponse, SectorDelta, SectorVersionInfo,
};
pub use error::{CacheError, CacheResult, ConfigError, ConfigResult, SyncError, SyncResult};
pub use service::{CurrentSector, SectorService};
pub use source::{DeltaSource, JsonDeltaSource, Transport};
pub use store::{FileStore, MemoryStore, PersistentStore};
pub use sync::{StateSync, SyncReport};
