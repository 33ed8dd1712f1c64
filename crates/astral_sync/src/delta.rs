//! # Sector Deltas
//!
//! Versioned, server-issued mutations of a sector's gameplay state, and the
//! JSON bodies they travel in.
//!
//! Every shape here serializes as camelCase JSON, matching the server.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a delta changes.
///
/// Unrecognized wire names survive as [`DeltaKind::Other`] so a newer
/// server cannot break decoding of a whole batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeltaKind {
    /// Asteroid node or deposit lost quantity.
    ResourceDepleted,
    /// Asteroid node or deposit refilled.
    ResourceRespawned,
    /// Station took damage.
    StationDamaged,
    /// Station was repaired.
    StationRepaired,
    /// Station was destroyed.
    StationDestroyed,
    /// Sector or station changed hands.
    OwnershipChanged,
    /// Sector or planet population changed.
    PopulationChanged,
    /// Sector threat level changed.
    ThreatLevelChanged,
    /// An NPC spawned.
    NpcSpawned,
    /// An NPC was destroyed.
    NpcDestroyed,
    /// An anomaly was triggered.
    AnomalyTriggered,
    /// A triggered anomaly reset.
    AnomalyReset,
    /// A hazard appeared.
    HazardAppeared,
    /// A hazard cleared.
    HazardCleared,
    /// Any kind this client does not know.
    Other(String),
}

impl DeltaKind {
    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ResourceDepleted => "resource_depleted",
            Self::ResourceRespawned => "resource_respawned",
            Self::StationDamaged => "station_damaged",
            Self::StationRepaired => "station_repaired",
            Self::StationDestroyed => "station_destroyed",
            Self::OwnershipChanged => "ownership_changed",
            Self::PopulationChanged => "population_changed",
            Self::ThreatLevelChanged => "threat_level_changed",
            Self::NpcSpawned => "npc_spawned",
            Self::NpcDestroyed => "npc_destroyed",
            Self::AnomalyTriggered => "anomaly_triggered",
            Self::AnomalyReset => "anomaly_reset",
            Self::HazardAppeared => "hazard_appeared",
            Self::HazardCleared => "hazard_cleared",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for DeltaKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "resource_depleted" => Self::ResourceDepleted,
            "resource_respawned" => Self::ResourceRespawned,
            "station_damaged" => Self::StationDamaged,
            "station_repaired" => Self::StationRepaired,
            "station_destroyed" => Self::StationDestroyed,
            "ownership_changed" => Self::OwnershipChanged,
            "population_changed" => Self::PopulationChanged,
            "threat_level_changed" => Self::ThreatLevelChanged,
            "npc_spawned" => Self::NpcSpawned,
            "npc_destroyed" => Self::NpcDestroyed,
            "anomaly_triggered" => Self::AnomalyTriggered,
            "anomaly_reset" => Self::AnomalyReset,
            "hazard_appeared" => Self::HazardAppeared,
            "hazard_cleared" => Self::HazardCleared,
            _ => Self::Other(name),
        }
    }
}

impl From<DeltaKind> for String {
    fn from(kind: DeltaKind) -> Self {
        match kind {
            DeltaKind::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One versioned mutation of a sector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorDelta {
    /// Server-assigned delta id.
    pub id: String,
    /// Sector the delta belongs to.
    pub sector_id: String,
    /// Kind of change.
    pub delta_type: DeltaKind,
    /// Entity the change targets, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Entity category of the target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Kind-specific payload.
    #[serde(default)]
    pub changes: serde_json::Value,
    /// Server time the delta was applied (ms since Unix epoch).
    #[serde(default)]
    pub applied_at: u64,
    /// Monotonic per-sector version.
    pub version: u64,
    /// Provenance (player or system event id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<String>,
}

/// Response to a single-sector delta fetch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaResponse {
    /// Server's version for the sector.
    pub current_version: u64,
    /// Deltas newer than the requested version.
    #[serde(default)]
    pub deltas: Vec<SectorDelta>,
}

/// One entry of a bulk fetch request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeltaRequest {
    /// Sector to fetch.
    pub sector_id: String,
    /// Version the client already has.
    pub since_version: u64,
}

/// Body of a bulk fetch request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeltaQuery {
    /// Sectors to fetch.
    pub requests: Vec<BulkDeltaRequest>,
}

/// One entry of a bulk fetch response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeltaResult {
    /// Sector this result is for.
    pub sector_id: String,
    /// Server's version for the sector.
    pub current_version: u64,
    /// Deltas newer than the requested version.
    #[serde(default)]
    pub deltas: Vec<SectorDelta>,
}

/// Body of a bulk fetch response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkDeltaResponse {
    /// Per-sector results.
    pub results: Vec<BulkDeltaResult>,
}

/// Response to a version check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorVersionInfo {
    /// Server's version for the sector.
    pub current_version: u64,
    /// True if no delta was ever applied.
    pub is_pristine: bool,
    /// First visit time (ms since Unix epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_visited_at: Option<u64>,
    /// Last delta time (ms since Unix epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_delta_at: Option<u64>,
}
