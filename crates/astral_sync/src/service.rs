//! # Sector Service
//!
//! Coordinates in, current sector out:
//!
//! ```text
//! coords ─> cache hit? ──yes──────────────┐
//!             └─no─> generate ─> cache ───┤
//!                                         v
//!                              sync_sector (deltas) ─> current sector
//! ```
//!
//! Sync failures never block the player: the locally known sector is
//! returned together with the error.

use std::sync::Arc;

use astral_procedural::{sector_id_to_coords, GeneratedSector, SectorCoords, SectorGenerator};

use crate::cache::SectorCache;
use crate::config::{EngineConfig, SyncConfig};
use crate::delta::SectorDelta;
use crate::error::{SyncError, SyncResult};
use crate::source::DeltaSource;
use crate::sync::StateSync;

/// Result of [`SectorService::current_sector`].
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentSector {
    /// Best known state of the sector.
    pub sector: Arc<GeneratedSector>,
    /// Why the sector could not be synced, if it was not.
    pub sync_error: Option<SyncError>,
}

impl CurrentSector {
    /// Returns true if the sector was confirmed against the server.
    #[inline]
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.sync_error.is_none()
    }
}

/// Generator, cache and sync wired together.
#[derive(Debug)]
pub struct SectorService<S> {
    generator: Arc<SectorGenerator>,
    cache: Arc<SectorCache>,
    sync: StateSync<S>,
    config: SyncConfig,
}

impl<S: DeltaSource> SectorService<S> {
    /// Wires a service. The cache is the one `sync` writes to.
    #[must_use]
    pub fn new(generator: Arc<SectorGenerator>, sync: StateSync<S>, config: SyncConfig) -> Self {
        Self {
            generator,
            cache: Arc::clone(sync.cache()),
            sync,
            config,
        }
    }

    /// Builds everything from an engine configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory cannot be created.
    pub fn from_config(config: &EngineConfig, source: S) -> std::io::Result<Self> {
        let cache = Arc::new(SectorCache::from_config(&config.cache)?);
        tracing::info!(
            "Sector service starting: base seed {}, persistent cache {}",
            config.base_seed,
            config.cache.cache_dir.is_some()
        );
        Ok(Self::new(
            Arc::new(SectorGenerator::new(config.base_seed)),
            StateSync::new(source, cache),
            config.sync.clone(),
        ))
    }

    /// The generator.
    #[inline]
    #[must_use]
    pub fn generator(&self) -> &SectorGenerator {
        &self.generator
    }

    /// The cache.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<SectorCache> {
        &self.cache
    }

    /// The sync engine.
    #[inline]
    #[must_use]
    pub fn sync(&self) -> &StateSync<S> {
        &self.sync
    }

    /// Cached sector, or a freshly generated one (which is then cached).
    #[must_use]
    pub fn sector_at(&self, coords: SectorCoords) -> Arc<GeneratedSector> {
        let id = coords.sector_id();
        if let Some(sector) = self.cache.get(&id) {
            return sector;
        }
        let sector = Arc::new(self.generator.generate(coords));
        self.cache.set(Arc::clone(&sector), sector.version);
        sector
    }

    /// Sector at `coords` brought up to date with the server.
    ///
    /// Prefetches the neighbourhood first when configured to.
    pub async fn current_sector(&self, coords: SectorCoords) -> CurrentSector {
        let sector = self.sector_at(coords);
        if self.config.prefetch_neighbors {
            self.prefetch_neighbors(coords);
        }

        match self.sync.sync_sector(Arc::clone(&sector)).await {
            Ok(report) => CurrentSector {
                sector: report.sector,
                sync_error: None,
            },
            Err(e) => {
                tracing::warn!("Sync failed for {}, using local state: {}", sector.id, e);
                CurrentSector {
                    sector,
                    sync_error: Some(e),
                }
            }
        }
    }

    /// Generates and caches the 26 neighbours of `coords` that are not
    /// cached yet. Returns how many were added.
    pub fn prefetch_neighbors(&self, coords: SectorCoords) -> usize {
        let ids = coords.neighbors().into_iter().map(SectorCoords::sector_id);
        self.cache.prefetch(ids, |id| {
            sector_id_to_coords(id).map(|c| self.generator.generate(c))
        })
    }

    /// Applies a delta pushed by the server to its sector.
    ///
    /// A push that does not directly follow the known version syncs the
    /// sector instead (see [`StateSync::apply_realtime_delta`]).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSectorId`] if the delta's sector id is
    /// not canonical, or the source's error if a gap-filling sync fails.
    pub async fn receive_realtime(&self, delta: SectorDelta) -> SyncResult<Arc<GeneratedSector>> {
        let coords = sector_id_to_coords(&delta.sector_id)
            .ok_or_else(|| SyncError::InvalidSectorId(delta.sector_id.clone()))?;
        let sector = self.sector_at(coords);
        self.sync.apply_realtime_delta(sector, delta).await
    }
}
