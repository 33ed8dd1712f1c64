//! # Stars and Planets
//!
//! ## Draw Order
//!
//! Star (`generate_star`):
//! 1. spectral class roll
//! 2. name (syllable count, then one draw per syllable)
//! 3. mass, radius, temperature, age
//!
//! Planets (`generate_planets`), after one count draw, per planet:
//! 1. orbit spacing
//! 2. type roll within the orbital zone
//! 3. mass, radius, atmosphere, water coverage
//! 4. resource count, then one draw per resource
//! 5. moons, rings, orbit angle
//! 6. habitable worlds only: inhabited roll, then population if inhabited
//!
//! Luminosity, habitable zone, colour, gravity, temperature and orbital
//! period are derived and consume nothing.

use std::f64::consts::TAU;

use crate::names;
use crate::rng::SectorRng;
use crate::sector::{Atmosphere, HabitableZone, Planet, PlanetType, ResourceType, Star, StarClass};

/// Solar surface temperature, the reference for luminosity.
const SOLAR_TEMPERATURE: f64 = 5778.0;

/// Spectral classes with cumulative population thresholds.
///
/// Red dwarfs dominate; O stars and black holes are vanishingly rare.
const STAR_CLASS_TABLE: [(StarClass, f64); 11] = [
    (StarClass::M, 0.7000),
    (StarClass::K, 0.8200),
    (StarClass::G, 0.8950),
    (StarClass::F, 0.9250),
    (StarClass::A, 0.9310),
    (StarClass::B, 0.9323),
    (StarClass::O, 0.932_33),
    (StarClass::WhiteDwarf, 0.9800),
    (StarClass::BrownDwarf, 0.9960),
    (StarClass::NeutronStar, 0.9990),
    (StarClass::BlackHole, 1.0),
];

/// Physical ranges for one spectral class.
struct StarProfile {
    mass: (f64, f64),
    radius: (f64, f64),
    temperature: (f64, f64),
    age: (f64, f64),
    planets: (i64, i64),
}

impl StarClass {
    /// Ranges every star of this class is drawn from.
    const fn profile(self) -> StarProfile {
        match self {
            Self::M => StarProfile {
                mass: (0.08, 0.45),
                radius: (0.1, 0.7),
                temperature: (2400.0, 3700.0),
                age: (1.0, 13.0),
                planets: (0, 6),
            },
            Self::K => StarProfile {
                mass: (0.45, 0.8),
                radius: (0.7, 0.96),
                temperature: (3700.0, 5200.0),
                age: (1.0, 13.0),
                planets: (1, 8),
            },
            Self::G => StarProfile {
                mass: (0.8, 1.04),
                radius: (0.96, 1.15),
                temperature: (5200.0, 6000.0),
                age: (1.0, 10.0),
                planets: (1, 9),
            },
            Self::F => StarProfile {
                mass: (1.04, 1.4),
                radius: (1.15, 1.4),
                temperature: (6000.0, 7500.0),
                age: (1.0, 5.0),
                planets: (1, 8),
            },
            Self::A => StarProfile {
                mass: (1.4, 2.1),
                radius: (1.4, 1.8),
                temperature: (7500.0, 10_000.0),
                age: (0.1, 2.0),
                planets: (0, 6),
            },
            Self::B => StarProfile {
                mass: (2.1, 16.0),
                radius: (1.8, 6.6),
                temperature: (10_000.0, 30_000.0),
                age: (0.01, 0.5),
                planets: (0, 4),
            },
            Self::O => StarProfile {
                mass: (16.0, 90.0),
                radius: (6.6, 15.0),
                temperature: (30_000.0, 50_000.0),
                age: (0.001, 0.01),
                planets: (0, 3),
            },
            Self::WhiteDwarf => StarProfile {
                mass: (0.5, 1.4),
                radius: (0.008, 0.02),
                temperature: (4000.0, 40_000.0),
                age: (1.0, 13.0),
                planets: (0, 3),
            },
            Self::BrownDwarf => StarProfile {
                mass: (0.013, 0.08),
                radius: (0.08, 0.12),
                temperature: (500.0, 2400.0),
                age: (1.0, 13.0),
                planets: (0, 3),
            },
            Self::NeutronStar => StarProfile {
                mass: (1.1, 2.3),
                radius: (0.000_014, 0.000_02),
                temperature: (100_000.0, 1_000_000.0),
                age: (0.01, 13.0),
                planets: (0, 2),
            },
            Self::BlackHole => StarProfile {
                mass: (3.0, 30.0),
                radius: (0.000_01, 0.000_04),
                temperature: (0.0, 0.0),
                age: (0.01, 13.0),
                planets: (0, 2),
            },
        }
    }
}

/// Display colour for a surface temperature.
fn star_color(temperature: f64) -> &'static str {
    match temperature {
        t if t <= 0.0 => "#000000",
        t if t < 2400.0 => "#8b3a1a",
        t if t < 3700.0 => "#ff6f3c",
        t if t < 5200.0 => "#ffb56b",
        t if t < 6000.0 => "#fff4e8",
        t if t < 7500.0 => "#f8f7ff",
        t if t < 10_000.0 => "#cad7ff",
        _ => "#9bb0ff",
    }
}

/// Picks the first entry whose threshold exceeds `roll`.
///
/// Rolls past the final threshold land on the last entry. `table` must be
/// non-empty; every caller passes a constant table.
pub(crate) fn pick_cumulative<T: Copy>(table: &[(T, f64)], roll: f64) -> T {
    let fallback = table[table.len() - 1].0;
    table
        .iter()
        .find(|(_, threshold)| roll < *threshold)
        .map_or(fallback, |(value, _)| *value)
}

/// Generates the sector's star.
pub(crate) fn generate_star(rng: &mut SectorRng, sector_id: &str) -> Star {
    let class = pick_cumulative(&STAR_CLASS_TABLE, rng.next_f64());
    let name = names::star_name(rng);
    let profile = class.profile();
    let mass = rng.next_float(profile.mass.0, profile.mass.1);
    let radius = rng.next_float(profile.radius.0, profile.radius.1);
    let temperature = rng.next_float(profile.temperature.0, profile.temperature.1);
    let age = rng.next_float(profile.age.0, profile.age.1);

    // Stefan-Boltzmann in solar units
    let luminosity = radius * radius * (temperature / SOLAR_TEMPERATURE).powi(4);

    Star {
        id: format!("{sector_id}_star"),
        name,
        class,
        mass,
        radius,
        temperature,
        luminosity,
        age,
        color: star_color(temperature).to_owned(),
        habitable_zone: HabitableZone::from_luminosity(luminosity),
    }
}

/// Orbital zone relative to the habitable zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OrbitalZone {
    Scorched,
    Hot,
    Temperate,
    Cold,
    Frozen,
}

impl OrbitalZone {
    fn of(distance: f64, zone: HabitableZone) -> Self {
        if distance < zone.inner * 0.5 {
            Self::Scorched
        } else if distance < zone.inner {
            Self::Hot
        } else if distance <= zone.outer {
            Self::Temperate
        } else if distance <= zone.outer * 4.0 {
            Self::Cold
        } else {
            Self::Frozen
        }
    }

    const fn type_table(self) -> &'static [(PlanetType, f64)] {
        match self {
            Self::Scorched => &[(PlanetType::Lava, 0.6), (PlanetType::Barren, 1.0)],
            Self::Hot => &[
                (PlanetType::Desert, 0.5),
                (PlanetType::Barren, 0.8),
                (PlanetType::Lava, 1.0),
            ],
            Self::Temperate => &[
                (PlanetType::Terran, 0.45),
                (PlanetType::Ocean, 0.7),
                (PlanetType::Desert, 0.85),
                (PlanetType::Barren, 1.0),
            ],
            Self::Cold => &[
                (PlanetType::GasGiant, 0.55),
                (PlanetType::Ice, 0.8),
                (PlanetType::Barren, 1.0),
            ],
            Self::Frozen => &[
                (PlanetType::IceGiant, 0.5),
                (PlanetType::Ice, 0.8),
                (PlanetType::GasGiant, 1.0),
            ],
        }
    }
}

/// Physical ranges for one planet type.
struct PlanetProfile {
    mass: (f64, f64),
    radius: (f64, f64),
    water: (f64, f64),
    moons: (i64, i64),
    ring_chance: f64,
    resource_count: (i64, i64),
    resources: &'static [ResourceType],
    atmospheres: &'static [Atmosphere],
}

impl PlanetType {
    const fn profile(self) -> PlanetProfile {
        use Atmosphere as A;
        use ResourceType as R;
        match self {
            Self::Lava => PlanetProfile {
                mass: (0.1, 2.0),
                radius: (0.3, 1.3),
                water: (0.0, 0.0),
                moons: (0, 1),
                ring_chance: 0.0,
                resource_count: (1, 3),
                resources: &[R::Iron, R::Nickel, R::Titanium, R::Platinum],
                atmospheres: &[A::None, A::Thin, A::Toxic],
            },
            Self::Barren => PlanetProfile {
                mass: (0.01, 1.0),
                radius: (0.1, 1.0),
                water: (0.0, 0.05),
                moons: (0, 2),
                ring_chance: 0.02,
                resource_count: (0, 2),
                resources: &[R::Iron, R::Nickel, R::Titanium, R::Platinum, R::Water],
                atmospheres: &[A::None, A::Thin],
            },
            Self::Desert => PlanetProfile {
                mass: (0.3, 2.0),
                radius: (0.5, 1.4),
                water: (0.0, 0.1),
                moons: (0, 2),
                ring_chance: 0.02,
                resource_count: (0, 2),
                resources: &[R::Iron, R::Titanium, R::Crystals],
                atmospheres: &[A::Thin, A::Breathable, A::Toxic],
            },
            Self::Terran => PlanetProfile {
                mass: (0.5, 2.5),
                radius: (0.8, 1.5),
                water: (0.3, 0.8),
                moons: (0, 3),
                ring_chance: 0.03,
                resource_count: (0, 2),
                resources: &[R::Iron, R::Water, R::Crystals, R::Nickel],
                atmospheres: &[A::Breathable, A::Breathable, A::Breathable, A::Dense, A::Thin],
            },
            Self::Ocean => PlanetProfile {
                mass: (0.8, 3.0),
                radius: (0.9, 1.8),
                water: (0.85, 1.0),
                moons: (0, 3),
                ring_chance: 0.03,
                resource_count: (0, 2),
                resources: &[R::Water, R::Deuterium, R::Crystals],
                atmospheres: &[A::Breathable, A::Breathable, A::Dense],
            },
            Self::Ice => PlanetProfile {
                mass: (0.05, 1.5),
                radius: (0.2, 1.2),
                water: (0.2, 0.9),
                moons: (0, 4),
                ring_chance: 0.05,
                resource_count: (0, 2),
                resources: &[R::Water, R::Deuterium, R::Helium3],
                atmospheres: &[A::None, A::Thin],
            },
            Self::GasGiant => PlanetProfile {
                mass: (50.0, 4000.0),
                radius: (6.0, 15.0),
                water: (0.0, 0.0),
                moons: (1, 24),
                ring_chance: 0.35,
                resource_count: (1, 2),
                resources: &[R::Helium3, R::Deuterium],
                atmospheres: &[A::Crushing],
            },
            Self::IceGiant => PlanetProfile {
                mass: (10.0, 50.0),
                radius: (3.0, 6.0),
                water: (0.0, 0.1),
                moons: (1, 14),
                ring_chance: 0.25,
                resource_count: (1, 2),
                resources: &[R::Helium3, R::Deuterium, R::Water],
                atmospheres: &[A::Crushing, A::Dense],
            },
        }
    }

    /// Terran and ocean worlds can host people.
    const fn supports_life(self) -> bool {
        matches!(self, Self::Terran | Self::Ocean)
    }
}

/// Generates the planets orbiting `star`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn generate_planets(rng: &mut SectorRng, sector_id: &str, star: &Star) -> Vec<Planet> {
    let (min, max) = star.class.profile().planets;
    let count = rng.next_int(min, max).max(0) as u32;
    let zone = star.habitable_zone;

    // Anchor orbits to the star's output; remnants get a nominal scale.
    let scale = star.luminosity.sqrt().max(0.05);

    let mut planets = Vec::with_capacity(count as usize);
    let mut distance = 0.0;
    for index in 0..count {
        distance = if index == 0 {
            scale * rng.next_float(0.3, 0.7)
        } else {
            distance * rng.next_float(1.4, 2.0)
        };
        planets.push(generate_planet(rng, sector_id, star, zone, index, distance));
    }
    planets
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn generate_planet(
    rng: &mut SectorRng,
    sector_id: &str,
    star: &Star,
    zone: HabitableZone,
    index: u32,
    distance: f64,
) -> Planet {
    let planet_type = pick_cumulative(OrbitalZone::of(distance, zone).type_table(), rng.next_f64());
    let profile = planet_type.profile();

    let mass = rng.next_float(profile.mass.0, profile.mass.1);
    let radius = rng.next_float(profile.radius.0, profile.radius.1);
    let atmosphere = profile.atmospheres[rng.next_index(profile.atmospheres.len())];
    let water_coverage = rng.next_float(profile.water.0, profile.water.1);

    let resource_count = rng.next_int(profile.resource_count.0, profile.resource_count.1);
    let mut resources = Vec::new();
    for _ in 0..resource_count {
        let resource = profile.resources[rng.next_index(profile.resources.len())];
        if !resources.contains(&resource) {
            resources.push(resource);
        }
    }

    let moons = rng.next_int(profile.moons.0, profile.moons.1).max(0) as u32;
    let has_rings = rng.next_bool(profile.ring_chance);
    let orbit_angle = rng.next_float(0.0, TAU);

    let habitable = planet_type.supports_life() && atmosphere == Atmosphere::Breathable;
    let population = if habitable && rng.next_bool(0.6) {
        rng.next_int(1_000_000, 8_000_000_000) as u64
    } else {
        0
    };

    Planet {
        id: format!("{sector_id}_planet_{index}"),
        name: format!("{} {}", star.name, names::roman(index + 1)),
        planet_type,
        orbit_index: index,
        orbital_distance: distance,
        orbital_period: (distance.powi(3) / star.mass.max(f64::EPSILON)).sqrt(),
        orbit_angle,
        mass,
        radius,
        gravity: mass / (radius * radius),
        temperature: 278.0 * star.luminosity.powf(0.25) / distance.max(f64::EPSILON).sqrt(),
        atmosphere,
        water_coverage,
        resources,
        moons,
        has_rings,
        habitable,
        population,
    }
}
