//! # Anomalies, Resource Deposits and Hazards
//!
//! ## Draw Order
//!
//! Anomalies: count (range draw in anomaly sectors, otherwise one chance
//! roll), then per anomaly: type, position (3), danger, strength.
//!
//! Deposits: one presence roll per [`ResourceType::ALL`] entry in order;
//! present deposits then draw quantity and richness before the next roll.
//!
//! Hazards: count (range draw, fixed, or chance roll by sector type), then
//! per hazard: type from the sector's pool, severity, radius, position (3).

use crate::rng::SectorRng;
use crate::sector::{
    Anomaly, AnomalyType, Hazard, HazardType, ResourceDeposit, ResourceType, SectorType,
};
use crate::structures::random_position;

/// Anomaly kinds, in pick order.
const ANOMALY_TYPES: [AnomalyType; 6] = [
    AnomalyType::Wormhole,
    AnomalyType::SpatialRift,
    AnomalyType::GravityWell,
    AnomalyType::TemporalDistortion,
    AnomalyType::DerelictSignal,
    AnomalyType::DarkMatterCloud,
];

/// Maximum probability of any single deposit.
const MAX_DEPOSIT_CHANCE: f64 = 0.95;

/// Hazard severity ceiling.
const MAX_SEVERITY: i64 = 5;

impl ResourceType {
    /// Base chance of a sector-wide deposit.
    const fn deposit_chance(self) -> f64 {
        match self {
            Self::Iron => 0.6,
            Self::Nickel => 0.45,
            Self::Titanium => 0.3,
            Self::Platinum => 0.12,
            Self::Water => 0.4,
            Self::Deuterium => 0.25,
            Self::Helium3 => 0.2,
            Self::Crystals => 0.1,
            Self::ExoticMatter => 0.02,
        }
    }
}

impl SectorType {
    /// Hazard kinds that can appear in this sector type.
    const fn hazard_pool(self) -> &'static [HazardType] {
        match self {
            Self::Nebula => &[HazardType::IonStorm, HazardType::RadiationZone],
            Self::AsteroidField => &[HazardType::DebrisField, HazardType::Minefield],
            Self::Anomaly => &[HazardType::GravitationalShear, HazardType::RadiationZone],
            Self::Empty | Self::Sparse | Self::Standard | Self::Populated => &[
                HazardType::RadiationZone,
                HazardType::IonStorm,
                HazardType::Minefield,
                HazardType::DebrisField,
                HazardType::GravitationalShear,
                HazardType::SolarFlare,
            ],
        }
    }

    /// Severity added to hazards in this sector type.
    const fn hazard_severity_bonus(self) -> i64 {
        match self {
            Self::Nebula | Self::Anomaly => 1,
            _ => 0,
        }
    }
}

/// Generates the sector's anomalies.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn generate_anomalies(
    rng: &mut SectorRng,
    sector_id: &str,
    sector_type: SectorType,
) -> Vec<Anomaly> {
    let count = if sector_type == SectorType::Anomaly {
        rng.next_int(1, 3)
    } else {
        i64::from(rng.next_bool(0.05))
    };

    let mut anomalies = Vec::new();
    for index in 0..count {
        let anomaly_type = ANOMALY_TYPES[rng.next_index(ANOMALY_TYPES.len())];
        let position = random_position(rng);
        let danger_level = rng.next_int(1, 5) as u8;
        let strength = rng.next_float(0.1, 1.0);
        anomalies.push(Anomaly {
            id: format!("{sector_id}_anomaly_{index}"),
            anomaly_type,
            position,
            danger_level,
            strength,
            discovered: false,
            triggered: false,
        });
    }
    anomalies
}

/// Generates sector-wide resource deposits.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn generate_resources(
    rng: &mut SectorRng,
    sector_id: &str,
    sector_type: SectorType,
) -> Vec<ResourceDeposit> {
    let modifier = sector_type.resource_modifier();
    let mut deposits = Vec::new();
    for resource_type in ResourceType::ALL {
        let chance = (resource_type.deposit_chance() * modifier).min(MAX_DEPOSIT_CHANCE);
        if !rng.next_bool(chance) {
            continue;
        }
        let quantity = rng.next_int(500, 10_000) as u32;
        let richness = rng.next_float(0.1, 1.0);
        deposits.push(ResourceDeposit {
            id: format!("{sector_id}_deposit_{}", resource_type.as_str()),
            resource_type,
            quantity,
            max_quantity: quantity,
            richness,
            depleted: false,
        });
    }
    deposits
}

/// Number of hazards for a sector type.
fn hazard_count(rng: &mut SectorRng, sector_type: SectorType) -> i64 {
    match sector_type {
        SectorType::Nebula | SectorType::Anomaly => rng.next_int(1, 2),
        SectorType::AsteroidField => 1,
        SectorType::Empty => i64::from(rng.next_bool(0.15)),
        SectorType::Sparse | SectorType::Standard | SectorType::Populated => {
            i64::from(rng.next_bool(0.1))
        }
    }
}

/// Generates navigation hazards.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn generate_hazards(
    rng: &mut SectorRng,
    sector_id: &str,
    sector_type: SectorType,
) -> Vec<Hazard> {
    let count = hazard_count(rng, sector_type);
    let pool = sector_type.hazard_pool();
    let mut hazards = Vec::new();
    for index in 0..count {
        let hazard_type = pool[rng.next_index(pool.len())];
        let severity = (rng.next_int(1, MAX_SEVERITY) + sector_type.hazard_severity_bonus())
            .min(MAX_SEVERITY) as u8;
        let radius = rng.next_float(0.05, 0.4);
        let position = random_position(rng);
        hazards.push(Hazard {
            id: format!("{sector_id}_hazard_{index}"),
            hazard_type,
            severity,
            radius,
            position,
        });
    }
    hazards
}
