//! # State Sync
//!
//! Reconciles generated sectors with the server's mutable state.
//!
//! ## Coalescing
//!
//! At most one sync per sector id is in flight. Concurrent callers for the
//! same id share one [`Shared`] future and all receive its result:
//!
//! ```text
//! caller A ──┐
//! caller B ──┼──> pending[id] ──> fetch_deltas ──> apply ──> cache
//! caller C ──┘        └── removed when the future settles
//! ```
//!
//! The pending table lock is never held across an `.await`.
//!
//! ## Recorded Deltas
//!
//! Deltas already seen are kept in the cache's side table. Before fetching,
//! the unbroken run of recorded deltas that follows the sector's version is
//! replayed locally, and only newer versions are requested. A gap in the
//! run stops the replay: versions are consecutive per sector, and anything
//! past a gap has to come from the server.

use std::collections::HashMap;
use std::sync::Arc;

use astral_procedural::GeneratedSector;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::apply::apply_deltas;
use crate::cache::SectorCache;
use crate::delta::{
    BulkDeltaRequest, BulkDeltaResponse, BulkDeltaResult, DeltaResponse, SectorDelta,
    SectorVersionInfo,
};
use crate::error::{SyncError, SyncResult};
use crate::source::DeltaSource;

/// Outcome of syncing one sector.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncReport {
    /// Sector after applying every new delta.
    pub sector: Arc<GeneratedSector>,
    /// Version the sector is now confirmed at.
    pub version: u64,
    /// Deltas that were new to this sector.
    pub applied: usize,
}

type PendingSync = Shared<BoxFuture<'static, SyncResult<SyncReport>>>;

struct Inner<S> {
    source: S,
    cache: Arc<SectorCache>,
    pending: Mutex<HashMap<String, PendingSync>>,
}

/// Fetches and applies server deltas, keeping the cache current.
pub struct StateSync<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for StateSync<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for StateSync<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSync")
            .field("pending", &self.inner.pending.lock().len())
            .finish_non_exhaustive()
    }
}

impl<S: DeltaSource> StateSync<S> {
    /// Creates a sync engine over a source and a shared cache.
    #[must_use]
    pub fn new(source: S, cache: Arc<SectorCache>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The cache this engine writes to.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<SectorCache> {
        &self.inner.cache
    }

    /// The delta source.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Syncs currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Deltas for one sector newer than `since_version`.
    ///
    /// # Errors
    ///
    /// Propagates source failures.
    pub async fn fetch_deltas(
        &self,
        sector_id: &str,
        since_version: u64,
    ) -> SyncResult<DeltaResponse> {
        self.inner.source.fetch_deltas(sector_id, since_version).await
    }

    /// Deltas for many sectors in one round trip.
    ///
    /// # Errors
    ///
    /// Propagates source failures.
    pub async fn fetch_bulk_deltas(
        &self,
        requests: &[BulkDeltaRequest],
    ) -> SyncResult<BulkDeltaResponse> {
        self.inner.source.fetch_bulk_deltas(requests).await
    }

    /// Server version summary for one sector.
    ///
    /// # Errors
    ///
    /// Propagates source failures.
    pub async fn sector_version(&self, sector_id: &str) -> SyncResult<SectorVersionInfo> {
        self.inner.source.sector_version(sector_id).await
    }

    /// Brings `sector` up to the server's version and caches the result.
    ///
    /// Deltas newer than `sector.version` are fetched. Concurrent calls for
    /// the same sector id share one request.
    ///
    /// # Errors
    ///
    /// Returns the source's error; nothing is cached in that case.
    pub async fn sync_sector(&self, sector: Arc<GeneratedSector>) -> SyncResult<SyncReport> {
        self.pending_sync(sector).await
    }

    /// Drops every recorded delta, then syncs `sector` from its own version.
    ///
    /// # Errors
    ///
    /// Returns the source's error; nothing is cached in that case.
    pub async fn resync_sector(&self, sector: Arc<GeneratedSector>) -> SyncResult<SyncReport> {
        self.inner.cache.clear_deltas();
        tracing::info!("Forced resync of {} from v{}", sector.id, sector.version);
        self.pending_sync(sector).await
    }

    fn pending_sync(&self, sector: Arc<GeneratedSector>) -> PendingSync {
        let mut pending = self.inner.pending.lock();
        if let Some(existing) = pending.get(&sector.id) {
            tracing::debug!("Joining in-flight sync for {}", sector.id);
            return existing.clone();
        }

        let id = sector.id.clone();
        let inner = Arc::clone(&self.inner);
        let key = id.clone();
        let future = async move {
            let result = inner.run_sync(sector).await;
            inner.pending.lock().remove(&key);
            result
        }
        .boxed()
        .shared();
        pending.insert(id, future.clone());
        future
    }

    /// Syncs many sectors with one bulk request.
    ///
    /// Reports come back in input order.
    ///
    /// # Errors
    ///
    /// Returns the source's error, or [`SyncError::MissingSector`] if the
    /// response omits a requested sector. Nothing is cached on error.
    pub async fn bulk_sync(&self, sectors: &[Arc<GeneratedSector>]) -> SyncResult<Vec<SyncReport>> {
        if sectors.is_empty() {
            return Ok(Vec::new());
        }
        let sectors: Vec<Arc<GeneratedSector>> = sectors
            .iter()
            .map(|sector| self.inner.replay_recorded(Arc::clone(sector)))
            .collect();
        let requests: Vec<BulkDeltaRequest> = sectors
            .iter()
            .map(|sector| BulkDeltaRequest {
                sector_id: sector.id.clone(),
                since_version: sector.version,
            })
            .collect();
        let response = self.inner.source.fetch_bulk_deltas(&requests).await?;

        let mut by_id: HashMap<String, BulkDeltaResult> = response
            .results
            .into_iter()
            .map(|result| (result.sector_id.clone(), result))
            .collect();
        if let Some(missing) = sectors.iter().find(|s| !by_id.contains_key(&s.id)) {
            return Err(SyncError::MissingSector(missing.id.clone()));
        }

        let reports = sectors
            .iter()
            .filter_map(|sector| {
                let result = by_id.remove(&sector.id)?;
                Some(
                    self.inner
                        .absorb(Arc::clone(sector), result.current_version, &result.deltas),
                )
            })
            .collect();
        Ok(reports)
    }

    /// Applies a pushed delta to `sector`, records it and caches the result.
    ///
    /// Recorded deltas are replayed first. The push is applied locally only
    /// when it is the next version; a push that leaves a gap syncs the
    /// sector instead, which brings in the push along with everything
    /// before it. A push at or below the known version changes nothing.
    ///
    /// # Errors
    ///
    /// Returns the source's error when a gap forces a sync that fails.
    pub async fn apply_realtime_delta(
        &self,
        sector: Arc<GeneratedSector>,
        delta: SectorDelta,
    ) -> SyncResult<Arc<GeneratedSector>> {
        let base = self.inner.replay_recorded(sector);
        if delta.version <= base.version {
            tracing::debug!("Realtime delta {} v{} already known", delta.id, delta.version);
            return Ok(base);
        }
        if delta.version != base.version + 1 {
            tracing::debug!(
                "Realtime delta v{} for {} skips versions after v{}, syncing",
                delta.version,
                base.id,
                base.version
            );
            return self.sync_sector(base).await.map(|report| report.sector);
        }

        let deltas = [delta];
        let updated = Arc::new(apply_deltas(&base, &deltas));
        self.inner.cache.append_deltas(&updated.id, &deltas);
        self.inner.cache.set(Arc::clone(&updated), updated.version);
        tracing::debug!("Realtime delta applied to {} (v{})", updated.id, updated.version);
        Ok(updated)
    }
}

impl<S: DeltaSource> Inner<S> {
    async fn run_sync(&self, sector: Arc<GeneratedSector>) -> SyncResult<SyncReport> {
        let sector = self.replay_recorded(sector);
        let response = self.source.fetch_deltas(&sector.id, sector.version).await?;
        Ok(self.absorb(sector, response.current_version, &response.deltas))
    }

    /// `sector` with the unbroken run of recorded deltas after its version
    /// applied.
    fn replay_recorded(&self, sector: Arc<GeneratedSector>) -> Arc<GeneratedSector> {
        let mut next_version = sector.version + 1;
        let run: Vec<SectorDelta> = self
            .cache
            .cached_deltas(&sector.id)
            .into_iter()
            .filter(|d| d.version > sector.version)
            .take_while(|d| {
                let contiguous = d.version == next_version;
                next_version += 1;
                contiguous
            })
            .collect();
        if run.is_empty() {
            return sector;
        }
        tracing::debug!(
            "Replaying {} recorded deltas onto {} (v{})",
            run.len(),
            sector.id,
            sector.version
        );
        Arc::new(apply_deltas(&sector, &run))
    }

    fn absorb(
        &self,
        sector: Arc<GeneratedSector>,
        current_version: u64,
        deltas: &[SectorDelta],
    ) -> SyncReport {
        if deltas.iter().all(|d| d.version <= sector.version) {
            let version = current_version.max(sector.version);
            let cached = self.cache.get_version(&sector.id) == sector.version
                && self.cache.update_version(&sector.id, version);
            if !cached {
                self.cache.set(Arc::clone(&sector), version);
            }
            tracing::debug!("Sector {} already current at v{}", sector.id, version);
            return SyncReport {
                sector,
                version,
                applied: 0,
            };
        }

        let applied = deltas.iter().filter(|d| d.version > sector.version).count();
        let updated = Arc::new(apply_deltas(&sector, deltas));
        let version = current_version.max(updated.version);
        self.cache.set(Arc::clone(&updated), version);
        self.cache.append_deltas(&updated.id, deltas);
        tracing::info!(
            "Sector {} synced: {} new deltas, v{} -> v{}",
            updated.id,
            applied,
            sector.version,
            version
        );
        SyncReport {
            sector: updated,
            version,
            applied,
        }
    }
}
