//! # Asteroid Fields and Stations
//!
//! ## Draw Order
//!
//! Asteroid fields: count (one draw, or one chance roll), then per field:
//! position (3), radius, density, composition, node count, and per node a
//! composition roll, an optional off-type pick, and the quantity.
//!
//! Stations: count (a range draw for populated sectors, otherwise one
//! chance roll or nothing), then per station: type, size, faction, name
//! designation, position (3), docking ports, shields.

use crate::bodies::pick_cumulative;
use crate::names::FACTIONS;
use crate::rng::SectorRng;
use crate::sector::{
    AsteroidField, LocalPosition, ResourceNode, ResourceType, SectorType, Station, StationSize,
    StationStatus, StationType,
};

/// Resources asteroid rock can carry.
const ORE_TYPES: [ResourceType; 6] = [
    ResourceType::Iron,
    ResourceType::Nickel,
    ResourceType::Titanium,
    ResourceType::Platinum,
    ResourceType::Crystals,
    ResourceType::Water,
];

/// Station roles, in pick order.
const STATION_TYPES: [StationType; 6] = [
    StationType::Trading,
    StationType::Military,
    StationType::Research,
    StationType::Mining,
    StationType::Shipyard,
    StationType::Outpost,
];

/// Station sizes with cumulative thresholds.
const STATION_SIZES: [(StationSize, f64); 3] = [
    (StationSize::Small, 0.5),
    (StationSize::Medium, 0.85),
    (StationSize::Large, 1.0),
];

/// Draws a position inside the sector. Three draws (x, y, z).
pub(crate) fn random_position(rng: &mut SectorRng) -> LocalPosition {
    LocalPosition {
        x: rng.next_float(-1.0, 1.0),
        y: rng.next_float(-1.0, 1.0),
        z: rng.next_float(-1.0, 1.0),
    }
}

/// Number of asteroid fields for a sector type.
fn asteroid_field_count(rng: &mut SectorRng, sector_type: SectorType) -> i64 {
    if sector_type == SectorType::AsteroidField {
        rng.next_int(1, 3)
    } else {
        i64::from(rng.next_bool(0.25))
    }
}

/// Generates the sector's asteroid fields.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn generate_asteroid_fields(
    rng: &mut SectorRng,
    sector_id: &str,
    sector_type: SectorType,
) -> Vec<AsteroidField> {
    let count = asteroid_field_count(rng, sector_type);
    let mut fields = Vec::new();
    for index in 0..count {
        let id = format!("{sector_id}_asteroids_{index}");
        let position = random_position(rng);
        let radius = rng.next_float(0.05, 0.3);
        let density = rng.next_float(0.1, 1.0);
        let composition = ORE_TYPES[rng.next_index(ORE_TYPES.len())];

        let node_count = rng.next_int(3, 8);
        let mut nodes = Vec::with_capacity(node_count as usize);
        for node_index in 0..node_count {
            let resource_type = if rng.next_bool(0.7) {
                composition
            } else {
                ORE_TYPES[rng.next_index(ORE_TYPES.len())]
            };
            let base = rng.next_int(100, 1000) as f64;
            let quantity = (base * (0.5 + density)).round() as u32;
            nodes.push(ResourceNode {
                id: format!("{id}_node_{node_index}"),
                resource_type,
                quantity,
                max_quantity: quantity,
                depleted: false,
            });
        }

        fields.push(AsteroidField {
            id,
            position,
            radius,
            density,
            composition,
            nodes,
        });
    }
    fields
}

/// Number of stations for a sector type.
fn station_count(rng: &mut SectorRng, sector_type: SectorType) -> i64 {
    match sector_type {
        SectorType::Populated => rng.next_int(1, 3),
        SectorType::Standard => i64::from(rng.next_bool(0.4)),
        SectorType::Sparse => i64::from(rng.next_bool(0.1)),
        SectorType::Anomaly => i64::from(rng.next_bool(0.15)),
        SectorType::Empty | SectorType::Nebula | SectorType::AsteroidField => 0,
    }
}

/// Generates the sector's stations.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn generate_stations(
    rng: &mut SectorRng,
    sector_id: &str,
    sector_type: SectorType,
) -> Vec<Station> {
    let count = station_count(rng, sector_type);
    let mut stations = Vec::new();
    for index in 0..count {
        let station_type = STATION_TYPES[rng.next_index(STATION_TYPES.len())];
        let size = pick_cumulative(&STATION_SIZES, rng.next_f64());
        let faction = FACTIONS[rng.next_index(FACTIONS.len())];
        let designation = rng.next_int(1, 999);
        let position = random_position(rng);
        let (min_ports, max_ports) = size.docking_ports();
        let docking_ports = rng.next_int(min_ports, max_ports) as u32;
        let shields = rng.next_float(0.0, 1.0);

        let short = faction.split_whitespace().next().unwrap_or(faction);
        stations.push(Station {
            id: format!("{sector_id}_station_{index}"),
            name: format!("{short} {} {designation}", station_type.label()),
            station_type,
            size,
            faction: faction.to_owned(),
            position,
            health: size.max_health(),
            max_health: size.max_health(),
            shields,
            docking_ports,
            services: station_type.services(),
            status: StationStatus::Operational,
            crew: size.crew(),
        });
    }
    stations
}
