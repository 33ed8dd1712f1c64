//! Shared fixtures: an in-process delta server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use astral_sync::{
    BulkDeltaRequest, BulkDeltaResponse, BulkDeltaResult, DeltaKind, DeltaResponse, DeltaSource,
    SectorDelta, SectorVersionInfo, SyncError, SyncResult,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Fake server holding a delta log per sector.
#[derive(Default)]
pub struct MockServer {
    log: Mutex<HashMap<String, Vec<SectorDelta>>>,
    fetches: AtomicUsize,
    bulk_fetches: AtomicUsize,
    last_since: AtomicU64,
    offline: AtomicBool,
}

impl MockServer {
    pub fn push(&self, delta: SectorDelta) {
        self.log
            .lock()
            .entry(delta.sector_id.clone())
            .or_default()
            .push(delta);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn bulk_fetches(&self) -> usize {
        self.bulk_fetches.load(Ordering::SeqCst)
    }

    /// `since_version` of the most recent single-sector fetch.
    pub fn last_since(&self) -> u64 {
        self.last_since.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> SyncResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(SyncError::Network("connection refused".to_owned()))
        } else {
            Ok(())
        }
    }

    fn since(&self, sector_id: &str, since_version: u64) -> (u64, Vec<SectorDelta>) {
        let log = self.log.lock();
        let all = log.get(sector_id).map(Vec::as_slice).unwrap_or_default();
        let current = all.iter().map(|d| d.version).max().unwrap_or(0);
        let newer = all
            .iter()
            .filter(|d| d.version > since_version)
            .cloned()
            .collect();
        (current, newer)
    }
}

impl DeltaSource for MockServer {
    async fn fetch_deltas(&self, sector_id: &str, since_version: u64) -> SyncResult<DeltaResponse> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.last_since.store(since_version, Ordering::SeqCst);
        // Stay in flight for a few polls so concurrent callers pile up
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        self.check_online()?;
        let (current_version, deltas) = self.since(sector_id, since_version);
        Ok(DeltaResponse {
            current_version,
            deltas,
        })
    }

    async fn fetch_bulk_deltas(
        &self,
        requests: &[BulkDeltaRequest],
    ) -> SyncResult<BulkDeltaResponse> {
        self.bulk_fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.check_online()?;
        let results = requests
            .iter()
            .map(|request| {
                let (current_version, deltas) =
                    self.since(&request.sector_id, request.since_version);
                BulkDeltaResult {
                    sector_id: request.sector_id.clone(),
                    current_version,
                    deltas,
                }
            })
            .collect();
        Ok(BulkDeltaResponse { results })
    }

    async fn sector_version(&self, sector_id: &str) -> SyncResult<SectorVersionInfo> {
        self.check_online()?;
        let (current_version, _) = self.since(sector_id, 0);
        Ok(SectorVersionInfo {
            current_version,
            is_pristine: current_version == 0,
            first_visited_at: None,
            last_delta_at: None,
        })
    }
}

/// A delta of `kind` for `sector_id`.
pub fn delta(sector_id: &str, version: u64, kind: DeltaKind, changes: Value) -> SectorDelta {
    SectorDelta {
        id: format!("{sector_id}-d{version}"),
        sector_id: sector_id.to_owned(),
        delta_type: kind,
        target_id: None,
        target_type: None,
        changes,
        applied_at: 1_700_000_000_000 + version,
        version,
        caused_by: Some("test".to_owned()),
    }
}

/// Threat level change.
pub fn threat(sector_id: &str, version: u64, level: u8) -> SectorDelta {
    delta(
        sector_id,
        version,
        DeltaKind::ThreatLevelChanged,
        json!({ "threatLevel": level }),
    )
}

/// Sector ownership change.
pub fn owner(sector_id: &str, version: u64, faction: &str) -> SectorDelta {
    delta(
        sector_id,
        version,
        DeltaKind::OwnershipChanged,
        json!({ "faction": faction }),
    )
}
