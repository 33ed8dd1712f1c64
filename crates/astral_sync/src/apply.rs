//! # Delta Application
//!
//! Clone-then-patch: [`apply_deltas`] never touches the sector it is given.
//! Deltas are applied in ascending version order and a delta at or below
//! the sector's version is a no-op, so replaying a batch, or the same
//! batch shuffled, yields the same sector.
//!
//! ## Payload Keys
//!
//! | kind | keys read from `changes` |
//! |---|---|
//! | resource depleted | `remaining`, else `amount` subtracted, else 0 |
//! | resource respawned | `quantity`, else the maximum |
//! | station damaged | `health`, else `damage` subtracted; optional `shields` |
//! | station repaired | `health`, else the maximum |
//! | ownership changed | `faction` (string or null; stations need a string) |
//! | population changed | `population` (sector total, or one planet) |
//!
//! Ownership and population deltas address the sector when `target_id` is
//! absent, is the sector's own id, or `target_type` is `"sector"`. Any other
//! target must be a station (ownership) or a planet (population).
//! | threat level changed | `threatLevel`, else `level` |
//! | hazard appeared | a hazard object (`hazardType`, `severity`, `radius`, `position`) |
//!
//! Missing targets and unusable payloads still advance the version: the
//! server has already incorporated the delta.

use astral_procedural::{GeneratedSector, Hazard, HazardType, LocalPosition, StationStatus};
use serde::Deserialize;
use serde_json::Value;

use crate::delta::{DeltaKind, SectorDelta};

/// Threat level bounds.
const MIN_THREAT: f64 = 1.0;
const MAX_THREAT: f64 = 10.0;

/// What happened to one delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// Content changed and the version advanced.
    Applied,
    /// Version already incorporated; nothing changed.
    Stale,
    /// Version advanced but no content changed (unknown kind, missing
    /// target, unusable payload, or an NPC event).
    Recorded,
}

/// Applies `deltas` to a copy of `sector` and returns the copy.
///
/// Input order does not matter; deltas are sorted by version first.
#[must_use]
pub fn apply_deltas(sector: &GeneratedSector, deltas: &[SectorDelta]) -> GeneratedSector {
    let mut ordered: Vec<&SectorDelta> = deltas.iter().collect();
    ordered.sort_by_key(|d| d.version);

    let mut next = sector.clone();
    for delta in ordered {
        apply_single_delta(&mut next, delta);
    }
    next
}

/// Applies one delta in place to an owned sector.
///
/// Callers holding shared snapshots should go through [`apply_deltas`].
pub fn apply_single_delta(sector: &mut GeneratedSector, delta: &SectorDelta) -> DeltaOutcome {
    if delta.version <= sector.version {
        tracing::debug!(
            "Skipping stale delta {} v{} for {} (at v{})",
            delta.id,
            delta.version,
            sector.id,
            sector.version
        );
        return DeltaOutcome::Stale;
    }

    let changed = match &delta.delta_type {
        DeltaKind::ResourceDepleted => deplete_resource(sector, delta),
        DeltaKind::ResourceRespawned => respawn_resource(sector, delta),
        DeltaKind::StationDamaged => damage_station(sector, delta),
        DeltaKind::StationRepaired => repair_station(sector, delta),
        DeltaKind::StationDestroyed => destroy_station(sector, delta),
        DeltaKind::OwnershipChanged => change_ownership(sector, delta),
        DeltaKind::PopulationChanged => change_population(sector, delta),
        DeltaKind::ThreatLevelChanged => change_threat(sector, delta),
        DeltaKind::NpcSpawned | DeltaKind::NpcDestroyed => {
            tracing::debug!("NPC event {} in {}: {}", delta.delta_type, sector.id, delta.changes);
            false
        }
        DeltaKind::AnomalyTriggered => set_anomaly_triggered(sector, delta, true),
        DeltaKind::AnomalyReset => set_anomaly_triggered(sector, delta, false),
        DeltaKind::HazardAppeared => add_hazard(sector, delta),
        DeltaKind::HazardCleared => clear_hazard(sector, delta),
        DeltaKind::Other(name) => {
            tracing::warn!("Unknown delta type {} ({}) for {}", name, delta.id, sector.id);
            false
        }
    };

    sector.version = delta.version;
    if changed {
        DeltaOutcome::Applied
    } else {
        DeltaOutcome::Recorded
    }
}

/// Numeric payload field.
fn number(delta: &SectorDelta, key: &str) -> Option<f64> {
    delta.changes.get(key).and_then(Value::as_f64)
}

/// Saturating float to count conversion.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: f64) -> u32 {
    value.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Saturating float to population conversion.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn to_population(value: f64) -> u64 {
    value.clamp(0.0, u64::MAX as f64) as u64
}

fn missing_target(sector: &GeneratedSector, delta: &SectorDelta) -> bool {
    tracing::debug!(
        "Delta {} ({}) targets {:?}, not found in {}",
        delta.id,
        delta.delta_type,
        delta.target_id,
        sector.id
    );
    false
}

/// Mutable quantity of an asteroid node or a sector deposit.
struct QuantityMut<'a> {
    quantity: &'a mut u32,
    max_quantity: u32,
    depleted: &'a mut bool,
}

fn find_quantity<'a>(sector: &'a mut GeneratedSector, target: &str) -> Option<QuantityMut<'a>> {
    let node = sector
        .asteroid_fields
        .iter_mut()
        .flat_map(|field| field.nodes.iter_mut())
        .find(|node| node.id == target);
    if let Some(node) = node {
        return Some(QuantityMut {
            quantity: &mut node.quantity,
            max_quantity: node.max_quantity,
            depleted: &mut node.depleted,
        });
    }
    sector
        .resources
        .iter_mut()
        .find(|deposit| deposit.id == target)
        .map(|deposit| QuantityMut {
            quantity: &mut deposit.quantity,
            max_quantity: deposit.max_quantity,
            depleted: &mut deposit.depleted,
        })
}

fn deplete_resource(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let remaining = number(delta, "remaining");
    let amount = number(delta, "amount");
    let Some(target) = delta.target_id.as_deref() else {
        return missing_target(sector, delta);
    };
    let Some(slot) = find_quantity(sector, target) else {
        return missing_target(sector, delta);
    };

    *slot.quantity = match (remaining, amount) {
        (Some(remaining), _) => to_count(remaining).min(slot.max_quantity),
        (None, Some(amount)) => slot.quantity.saturating_sub(to_count(amount)),
        (None, None) => 0,
    };
    *slot.depleted = *slot.quantity == 0;
    true
}

fn respawn_resource(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let quantity = number(delta, "quantity");
    let Some(target) = delta.target_id.as_deref() else {
        return missing_target(sector, delta);
    };
    let Some(slot) = find_quantity(sector, target) else {
        return missing_target(sector, delta);
    };

    *slot.quantity = quantity.map_or(slot.max_quantity, |q| to_count(q).min(slot.max_quantity));
    *slot.depleted = *slot.quantity == 0;
    true
}

fn damage_station(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let health = number(delta, "health");
    let damage = number(delta, "damage");
    let shields = number(delta, "shields");
    let Some(station) = target_station(sector, delta) else {
        return missing_target(sector, delta);
    };

    let next = match (health, damage) {
        (Some(health), _) => health,
        (None, Some(damage)) => station.health - damage,
        (None, None) => station.health,
    };
    station.health = next.clamp(0.0, station.max_health);
    if let Some(shields) = shields {
        station.shields = shields.clamp(0.0, 1.0);
    }
    station.status = if station.health <= 0.0 {
        StationStatus::Destroyed
    } else {
        StationStatus::Damaged
    };
    true
}

fn repair_station(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let health = number(delta, "health");
    let Some(station) = target_station(sector, delta) else {
        return missing_target(sector, delta);
    };

    station.health = health.unwrap_or(station.max_health).clamp(0.0, station.max_health);
    station.status = StationStatus::Operational;
    true
}

fn destroy_station(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let Some(station) = target_station(sector, delta) else {
        return missing_target(sector, delta);
    };
    station.health = 0.0;
    station.shields = 0.0;
    station.status = StationStatus::Destroyed;
    true
}

fn target_station<'a>(
    sector: &'a mut GeneratedSector,
    delta: &SectorDelta,
) -> Option<&'a mut astral_procedural::Station> {
    let target = delta.target_id.as_deref()?;
    sector.stations.iter_mut().find(|s| s.id == target)
}

/// Returns true if the delta addresses the sector as a whole.
///
/// An untargeted delta, one typed `"sector"`, or one naming the sector's own
/// id is sector-level. Anything else names a body inside the sector.
fn targets_sector(sector: &GeneratedSector, delta: &SectorDelta) -> bool {
    match delta.target_id.as_deref() {
        None => true,
        Some(target) => target == sector.id || delta.target_type.as_deref() == Some("sector"),
    }
}

fn change_ownership(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let Some(faction) = delta.changes.get("faction") else {
        return false;
    };
    let faction = faction.as_str().map(str::to_owned);

    if targets_sector(sector, delta) {
        sector.controlling_faction = faction;
        return true;
    }
    let Some(station) = target_station(sector, delta) else {
        return missing_target(sector, delta);
    };
    match faction {
        Some(faction) => {
            station.faction = faction;
            true
        }
        None => false,
    }
}

fn change_population(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let Some(population) = number(delta, "population").map(to_population) else {
        return false;
    };

    if targets_sector(sector, delta) {
        sector.total_population = population;
        return true;
    }
    let target = delta.target_id.as_deref();
    let Some(planet) = sector
        .planets
        .iter_mut()
        .find(|p| Some(p.id.as_str()) == target)
    else {
        return missing_target(sector, delta);
    };
    let previous = planet.population;
    planet.population = population;
    sector.total_population = sector
        .total_population
        .saturating_sub(previous)
        .saturating_add(population);
    true
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn change_threat(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let Some(level) = number(delta, "threatLevel").or_else(|| number(delta, "level")) else {
        return false;
    };
    sector.threat_level = level.round().clamp(MIN_THREAT, MAX_THREAT) as u8;
    true
}

fn set_anomaly_triggered(
    sector: &mut GeneratedSector,
    delta: &SectorDelta,
    triggered: bool,
) -> bool {
    let target = delta.target_id.as_deref();
    let Some(anomaly) = sector
        .anomalies
        .iter_mut()
        .find(|a| Some(a.id.as_str()) == target)
    else {
        return missing_target(sector, delta);
    };
    anomaly.triggered = triggered;
    if triggered {
        anomaly.discovered = true;
    }
    true
}

/// Hazard fields as the server sends them.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HazardPayload {
    hazard_type: HazardType,
    #[serde(default = "default_severity")]
    severity: u8,
    #[serde(default = "default_radius")]
    radius: f64,
    #[serde(default)]
    position: LocalPosition,
}

const fn default_severity() -> u8 {
    1
}

const fn default_radius() -> f64 {
    0.1
}

fn add_hazard(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let payload = match HazardPayload::deserialize(&delta.changes) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Unusable hazard payload in delta {}: {}", delta.id, e);
            return false;
        }
    };
    let hazard = Hazard {
        id: delta.target_id.clone().unwrap_or_else(|| delta.id.clone()),
        hazard_type: payload.hazard_type,
        severity: payload.severity.clamp(1, 5),
        radius: payload.radius,
        position: payload.position,
    };

    match sector.hazards.iter_mut().find(|h| h.id == hazard.id) {
        Some(existing) => *existing = hazard,
        None => sector.hazards.push(hazard),
    }
    true
}

fn clear_hazard(sector: &mut GeneratedSector, delta: &SectorDelta) -> bool {
    let Some(target) = delta.target_id.as_deref() else {
        return missing_target(sector, delta);
    };
    let before = sector.hazards.len();
    sector.hazards.retain(|h| h.id != target);
    if sector.hazards.len() == before {
        return missing_target(sector, delta);
    }
    true
}
