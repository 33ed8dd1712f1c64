//! # Sector Generator
//!
//! Turns `(base seed, coordinates)` into a complete [`GeneratedSector`].
//!
//! ## Draw Order
//!
//! ```text
//! 1. seed -> fresh SectorRng, fork background stream (no draw)
//! 2. sector type roll (distance band table)
//! 3. navigation roll (empty / anomaly / asteroid sectors only)
//! 4. star presence roll (nebula / anomaly / sparse only), star, planets
//! 5. asteroid fields, stations, anomalies
//! 6. resource deposits, hazards
//! 7. ambient (main stream), background (forked stream)
//! 8. threat jitter roll
//! ```
//!
//! The server runs the same sequence. Adding, removing or reordering any
//! draw changes every value after it.

use crate::ambient::generate_ambient;
use crate::bodies::{generate_planets, generate_star, pick_cumulative};
use crate::coords::{DistanceBand, SectorCoords};
use crate::error::{GenerationError, GenerationResult};
use crate::phenomena::{generate_anomalies, generate_hazards, generate_resources};
use crate::rng::SectorRng;
use crate::sector::{GeneratedSector, NavigationType, SectorType, Star};
use crate::structures::{generate_asteroid_fields, generate_stations};

/// Fork modifier for the background starfield stream.
const BACKGROUND_FORK: u32 = 0xB6;

/// Threat level bounds.
const MIN_THREAT: i64 = 1;
const MAX_THREAT: i64 = 10;

/// Sector types by cumulative probability, near band (< 1000).
const NEAR_TABLE: [(SectorType, f64); 7] = [
    (SectorType::Populated, 0.25),
    (SectorType::Standard, 0.55),
    (SectorType::Sparse, 0.70),
    (SectorType::AsteroidField, 0.80),
    (SectorType::Nebula, 0.88),
    (SectorType::Anomaly, 0.93),
    (SectorType::Empty, 1.0),
];

/// Sector types by cumulative probability, mid band (1000..5000).
const MID_TABLE: [(SectorType, f64); 7] = [
    (SectorType::Populated, 0.10),
    (SectorType::Standard, 0.35),
    (SectorType::Sparse, 0.55),
    (SectorType::AsteroidField, 0.67),
    (SectorType::Nebula, 0.77),
    (SectorType::Anomaly, 0.84),
    (SectorType::Empty, 1.0),
];

/// Sector types by cumulative probability, far band (>= 5000).
const FAR_TABLE: [(SectorType, f64); 7] = [
    (SectorType::Populated, 0.02),
    (SectorType::Standard, 0.12),
    (SectorType::Sparse, 0.30),
    (SectorType::AsteroidField, 0.40),
    (SectorType::Nebula, 0.52),
    (SectorType::Anomaly, 0.62),
    (SectorType::Empty, 1.0),
];

impl DistanceBand {
    /// Sector type table for this band.
    const fn sector_table(self) -> &'static [(SectorType, f64); 7] {
        match self {
            Self::Near => &NEAR_TABLE,
            Self::Mid => &MID_TABLE,
            Self::Far => &FAR_TABLE,
        }
    }
}

/// Deterministic sector generator for one base seed.
///
/// Holds no mutable state; share it freely across threads.
///
/// # Example
///
/// ```rust
/// use astral_procedural::{SectorCoords, SectorGenerator};
///
/// let generator = SectorGenerator::new(42);
/// let a = generator.generate(SectorCoords::new(10, 20, 30));
/// let b = generator.generate(SectorCoords::new(10, 20, 30));
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorGenerator {
    /// Global seed every sector seed derives from.
    base_seed: u32,
}

impl SectorGenerator {
    /// Creates a generator for a base seed.
    #[inline]
    #[must_use]
    pub const fn new(base_seed: u32) -> Self {
        Self { base_seed }
    }

    /// Creates a generator from an untyped seed.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidSeed`] if the value is negative or
    /// does not fit in 32 bits.
    pub fn try_from_raw(seed: i64) -> GenerationResult<Self> {
        u32::try_from(seed)
            .map(Self::new)
            .map_err(|_| GenerationError::InvalidSeed(seed))
    }

    /// Returns the base seed.
    #[inline]
    #[must_use]
    pub const fn base_seed(&self) -> u32 {
        self.base_seed
    }

    /// Seed of the sector at `coords`.
    #[inline]
    #[must_use]
    pub const fn sector_seed(&self, coords: SectorCoords) -> u32 {
        coords.seed(self.base_seed)
    }

    /// Generates from fractional coordinates (floored first).
    #[must_use]
    pub fn generate_at(&self, x: f64, y: f64, z: f64) -> GeneratedSector {
        self.generate(SectorCoords::from_f64(x, y, z))
    }

    /// Generates the sector at `coords`.
    #[must_use]
    pub fn generate(&self, coords: SectorCoords) -> GeneratedSector {
        let id = coords.sector_id();
        let seed = self.sector_seed(coords);
        let mut rng = SectorRng::new(seed);
        let mut background = rng.fork(BACKGROUND_FORK);

        let band = DistanceBand::of(coords.distance_from_center());
        let sector_type = pick_cumulative(band.sector_table(), rng.next_f64());
        let navigation_type = roll_navigation(&mut rng, sector_type);

        let star = if has_star(&mut rng, sector_type) {
            Some(generate_star(&mut rng, &id))
        } else {
            None
        };
        let planets = star
            .as_ref()
            .map(|star: &Star| generate_planets(&mut rng, &id, star))
            .unwrap_or_default();

        let asteroid_fields = generate_asteroid_fields(&mut rng, &id, sector_type);
        let stations = generate_stations(&mut rng, &id, sector_type);
        let anomalies = generate_anomalies(&mut rng, &id, sector_type);
        let resources = generate_resources(&mut rng, &id, sector_type);
        let hazards = generate_hazards(&mut rng, &id, sector_type);
        let ambient = generate_ambient(&mut rng, &mut background, sector_type);

        let danger: i64 = anomalies.iter().map(|a| i64::from(a.danger_level)).sum();
        let severity: i64 = hazards.iter().map(|h| i64::from(h.severity)).sum();
        let threat = MIN_THREAT
            + band.threat_bonus()
            + sector_type.threat_bonus()
            + danger / 3
            + severity / 3
            + rng.next_int(0, 1);
        let threat_level = u8::try_from(threat.clamp(MIN_THREAT, MAX_THREAT)).unwrap_or(1);

        let total_population = planets.iter().map(|p| p.population).sum::<u64>()
            + stations.iter().map(|s| s.crew).sum::<u64>();
        let controlling_faction = stations.first().map(|s| s.faction.clone());

        GeneratedSector {
            id,
            coords,
            seed,
            sector_type,
            navigation_type,
            star,
            planets,
            asteroid_fields,
            stations,
            anomalies,
            resources,
            hazards,
            ambient,
            threat_level,
            controlling_faction,
            total_population,
            version: 0,
        }
    }
}

impl TryFrom<i64> for SectorGenerator {
    type Error = GenerationError;

    fn try_from(seed: i64) -> GenerationResult<Self> {
        Self::try_from_raw(seed)
    }
}

/// Navigation class for a sector type.
fn roll_navigation(rng: &mut SectorRng, sector_type: SectorType) -> NavigationType {
    match sector_type {
        SectorType::Nebula => NavigationType::Nebula,
        SectorType::Empty => {
            if rng.next_bool(0.3) {
                NavigationType::Void
            } else {
                NavigationType::Normal
            }
        }
        SectorType::Anomaly => {
            if rng.next_bool(0.4) {
                NavigationType::Hazard
            } else {
                NavigationType::Normal
            }
        }
        SectorType::AsteroidField => {
            if rng.next_bool(0.15) {
                NavigationType::Hazard
            } else {
                NavigationType::Normal
            }
        }
        SectorType::Sparse | SectorType::Standard | SectorType::Populated => {
            NavigationType::Normal
        }
    }
}

/// Whether a sector of this type has a star.
fn has_star(rng: &mut SectorRng, sector_type: SectorType) -> bool {
    match sector_type {
        SectorType::Empty => false,
        SectorType::Nebula => rng.next_bool(0.4),
        SectorType::Anomaly => rng.next_bool(0.5),
        SectorType::Sparse => rng.next_bool(0.7),
        SectorType::Standard | SectorType::Populated | SectorType::AsteroidField => true,
    }
}
