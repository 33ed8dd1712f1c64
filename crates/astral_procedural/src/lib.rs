//! # ASTRAL Procedural Generation
//!
//! Deterministic sector generation for an effectively infinite galaxy.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same base seed and coordinates always produce the
//!    same sector, on this client and on the server
//! 2. **Pure**: No clock, no I/O, no global state
//! 3. **Ordered**: Every sub-generator draws from one shared stream in a
//!    fixed, documented order
//!
//! ## Core Components
//!
//! - `SectorRng`: the published 32-bit random stream
//! - `SectorCoords`: grid positions, seeds and canonical ids
//! - `SectorGenerator`: turns coordinates into a `GeneratedSector`
//! - `StaticSectorContent`: the seed-derived subset used for parity checks
//!
//! ## Example
//!
//! ```rust
//! use astral_procedural::{SectorCoords, SectorGenerator};
//!
//! let generator = SectorGenerator::new(42);
//! let sector = generator.generate(SectorCoords::new(10, 20, 30));
//!
//! assert_eq!(sector.id, "sector_10_20_30");
//! assert!((1..=10).contains(&sector.threat_level));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod coords;
pub mod error;
pub mod generator;
pub mod parity;
pub mod rng;
pub mod sector;

mod ambient;
mod bodies;
mod names;
mod phenomena;
mod structures;

pub use coords::{
    coords_to_display_string, coords_to_sector_id, coords_to_seed, direct_neighbor_coords,
    display_string_to_coords, distance_from_center, neighbor_coords, sector_id_to_coords,
    DistanceBand, ParseSectorIdError, SectorCoords,
};
pub use error::{GenerationError, GenerationResult};
pub use generator::SectorGenerator;
pub use names::FACTIONS;
pub use parity::StaticSectorContent;
pub use rng::{improve_seed, RngError, SectorRng};
pub use sector::{
    AmbientElements, Anomaly, AnomalyType, AsteroidField, Atmosphere, BackgroundField,
    GeneratedSector, HabitableZone, Hazard, HazardType, LocalPosition, NavigationType, Planet,
    PlanetType, ResourceDeposit, ResourceNode, ResourceType, SectorType, Star, StarClass, Station,
    StationService, StationSize, StationStatus, StationType,
};
