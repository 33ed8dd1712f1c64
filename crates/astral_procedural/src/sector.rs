//! # Sector Records
//!
//! The value tree produced by [`crate::SectorGenerator`] and consumed by
//! renderers, the cache and the delta applier.
//!
//! All records serialize as camelCase JSON, the same shape the server uses.

use serde::{Deserialize, Serialize};

use crate::coords::SectorCoords;

/// Position inside a sector, in sector-local units (roughly [-1, 1]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalPosition {
    /// X offset.
    pub x: f64,
    /// Y offset.
    pub y: f64,
    /// Z offset.
    pub z: f64,
}

impl LocalPosition {
    /// Sector centre.
    pub const CENTER: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

/// Broad classification of a sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorType {
    /// Nothing but dust.
    Empty,
    /// A thinly settled system.
    Sparse,
    /// An ordinary system.
    Standard,
    /// A heavily settled system.
    Populated,
    /// Inside a nebula.
    Nebula,
    /// Dominated by asteroid belts.
    AsteroidField,
    /// Home to spatial anomalies.
    Anomaly,
}

impl SectorType {
    /// Threat contribution of the sector type.
    #[must_use]
    pub const fn threat_bonus(self) -> i64 {
        match self {
            Self::Anomaly => 2,
            Self::Nebula | Self::AsteroidField => 1,
            Self::Empty | Self::Sparse | Self::Standard | Self::Populated => 0,
        }
    }

    /// Multiplier applied to resource deposit probabilities.
    #[must_use]
    pub const fn resource_modifier(self) -> f64 {
        match self {
            Self::Empty => 0.3,
            Self::Sparse => 0.7,
            Self::Standard | Self::Anomaly => 1.0,
            Self::Populated => 0.8,
            Self::Nebula => 1.2,
            Self::AsteroidField => 1.5,
        }
    }
}

/// How ships move through a sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    /// Open space.
    Normal,
    /// Sensor-degrading nebula.
    Nebula,
    /// Featureless void, no navigation beacons.
    Void,
    /// Hazardous transit.
    Hazard,
}

/// Spectral class (or remnant kind) of a star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarClass {
    /// Red dwarf.
    M,
    /// Orange dwarf.
    K,
    /// Yellow dwarf.
    G,
    /// Yellow-white.
    F,
    /// White.
    A,
    /// Blue-white giant.
    B,
    /// Blue giant.
    O,
    /// Stellar remnant.
    WhiteDwarf,
    /// Failed star.
    BrownDwarf,
    /// Collapsed core.
    NeutronStar,
    /// Singularity.
    BlackHole,
}

/// Orbital band in which liquid water is possible, in AU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitableZone {
    /// Inner edge.
    pub inner: f64,
    /// Outer edge.
    pub outer: f64,
}

impl HabitableZone {
    /// Derives the zone from a luminosity in solar units.
    #[must_use]
    pub fn from_luminosity(luminosity: f64) -> Self {
        Self {
            inner: (luminosity / 1.1).sqrt(),
            outer: (luminosity / 0.53).sqrt(),
        }
    }

    /// Returns true if `distance` lies inside the zone.
    #[must_use]
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.inner && distance <= self.outer
    }
}

/// The primary star of a sector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    /// Stable id, `{sector_id}_star`.
    pub id: String,
    /// Generated name.
    pub name: String,
    /// Spectral class.
    pub class: StarClass,
    /// Mass in solar masses.
    pub mass: f64,
    /// Radius in solar radii.
    pub radius: f64,
    /// Surface temperature in kelvin.
    pub temperature: f64,
    /// Luminosity in solar units.
    pub luminosity: f64,
    /// Age in billions of years.
    pub age: f64,
    /// Hex display colour derived from temperature.
    pub color: String,
    /// Derived habitable zone.
    pub habitable_zone: HabitableZone,
}

/// Planet archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetType {
    /// Molten surface.
    Lava,
    /// Airless rock.
    Barren,
    /// Dry world.
    Desert,
    /// Earth-like.
    Terran,
    /// Global ocean.
    Ocean,
    /// Frozen rock.
    Ice,
    /// Hydrogen giant.
    GasGiant,
    /// Volatile-rich giant.
    IceGiant,
}

/// Atmosphere class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Atmosphere {
    /// Vacuum.
    None,
    /// Trace gases.
    Thin,
    /// Breathable mix.
    Breathable,
    /// Poisonous mix.
    Toxic,
    /// Thick but survivable with gear.
    Dense,
    /// Giant-planet envelope.
    Crushing,
}

/// A planet orbiting the sector's star.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    /// Stable id, `{sector_id}_planet_{index}`.
    pub id: String,
    /// Star name plus roman numeral.
    pub name: String,
    /// Archetype.
    pub planet_type: PlanetType,
    /// Zero-based orbit index.
    pub orbit_index: u32,
    /// Semi-major axis in AU.
    pub orbital_distance: f64,
    /// Period in years.
    pub orbital_period: f64,
    /// Current orbital angle in radians.
    pub orbit_angle: f64,
    /// Mass in Earth masses.
    pub mass: f64,
    /// Radius in Earth radii.
    pub radius: f64,
    /// Surface gravity in g.
    pub gravity: f64,
    /// Equilibrium temperature in kelvin.
    pub temperature: f64,
    /// Atmosphere class.
    pub atmosphere: Atmosphere,
    /// Fraction of surface covered by water or ice.
    pub water_coverage: f64,
    /// Extractable resources.
    pub resources: Vec<ResourceType>,
    /// Number of moons.
    pub moons: u32,
    /// Whether the planet has rings.
    pub has_rings: bool,
    /// Whether unprotected humans can live here.
    pub habitable: bool,
    /// Inhabitants. Mutable through deltas.
    pub population: u64,
}

/// Extractable resource category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Common metal.
    Iron,
    /// Common metal.
    Nickel,
    /// Structural metal.
    Titanium,
    /// Precious metal.
    Platinum,
    /// Water ice.
    Water,
    /// Fusion fuel.
    Deuterium,
    /// Fusion fuel.
    Helium3,
    /// Energy crystals.
    Crystals,
    /// Exotic matter.
    ExoticMatter,
}

impl ResourceType {
    /// Every category, in deposit-roll order.
    pub const ALL: [Self; 9] = [
        Self::Iron,
        Self::Nickel,
        Self::Titanium,
        Self::Platinum,
        Self::Water,
        Self::Deuterium,
        Self::Helium3,
        Self::Crystals,
        Self::ExoticMatter,
    ];

    /// Snake-case name, used in deposit ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iron => "iron",
            Self::Nickel => "nickel",
            Self::Titanium => "titanium",
            Self::Platinum => "platinum",
            Self::Water => "water",
            Self::Deuterium => "deuterium",
            Self::Helium3 => "helium3",
            Self::Crystals => "crystals",
            Self::ExoticMatter => "exotic_matter",
        }
    }
}

/// A mineable node inside an asteroid field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    /// Stable id, `{field_id}_node_{index}`.
    pub id: String,
    /// What the node yields.
    pub resource_type: ResourceType,
    /// Remaining units. Mutable through deltas.
    pub quantity: u32,
    /// Units when full.
    pub max_quantity: u32,
    /// True once mined out. Mutable through deltas.
    pub depleted: bool,
}

/// A belt of asteroids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsteroidField {
    /// Stable id, `{sector_id}_asteroids_{index}`.
    pub id: String,
    /// Field centre.
    pub position: LocalPosition,
    /// Extent in sector-local units.
    pub radius: f64,
    /// Rock density in [0.1, 1).
    pub density: f64,
    /// Dominant resource.
    pub composition: ResourceType,
    /// Mineable nodes.
    pub nodes: Vec<ResourceNode>,
}

/// Station role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationType {
    /// Market hub.
    Trading,
    /// Naval base.
    Military,
    /// Science platform.
    Research,
    /// Ore processing.
    Mining,
    /// Ship construction.
    Shipyard,
    /// Frontier outpost.
    Outpost,
}

impl StationType {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trading => "Exchange",
            Self::Military => "Bastion",
            Self::Research => "Observatory",
            Self::Mining => "Refinery",
            Self::Shipyard => "Yards",
            Self::Outpost => "Outpost",
        }
    }

    /// Services offered by this kind of station.
    #[must_use]
    pub fn services(self) -> Vec<StationService> {
        use StationService::{Missions, Refuel, Repair, Research, Shipbuilding, Trade};
        match self {
            Self::Trading => vec![Refuel, Trade, Missions],
            Self::Military => vec![Refuel, Repair, Missions],
            Self::Research => vec![Research, Missions],
            Self::Mining => vec![Refuel, Trade],
            Self::Shipyard => vec![Repair, Shipbuilding, Trade],
            Self::Outpost => vec![Refuel],
        }
    }
}

/// Service offered at a station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationService {
    /// Fuel.
    Refuel,
    /// Hull repair.
    Repair,
    /// Commodity market.
    Trade,
    /// Mission board.
    Missions,
    /// Research lab.
    Research,
    /// Ship construction.
    Shipbuilding,
}

/// Station size class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationSize {
    /// Small.
    Small,
    /// Medium.
    Medium,
    /// Large.
    Large,
}

impl StationSize {
    /// Crew aboard a station of this size.
    #[must_use]
    pub const fn crew(self) -> u64 {
        match self {
            Self::Small => 200,
            Self::Medium => 1_500,
            Self::Large => 10_000,
        }
    }

    /// Hull points of a station of this size.
    #[must_use]
    pub const fn max_health(self) -> f64 {
        match self {
            Self::Small => 500.0,
            Self::Medium => 2_000.0,
            Self::Large => 8_000.0,
        }
    }

    /// Inclusive docking-port range.
    #[must_use]
    pub const fn docking_ports(self) -> (i64, i64) {
        match self {
            Self::Small => (1, 4),
            Self::Medium => (4, 12),
            Self::Large => (12, 32),
        }
    }
}

/// Operational state of a station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationStatus {
    /// Fully working.
    Operational,
    /// Hull below maximum.
    Damaged,
    /// Wreck.
    Destroyed,
}

/// A space station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Stable id, `{sector_id}_station_{index}`.
    pub id: String,
    /// Generated name.
    pub name: String,
    /// Role.
    pub station_type: StationType,
    /// Size class.
    pub size: StationSize,
    /// Owning faction. Mutable through deltas.
    pub faction: String,
    /// Position in the sector.
    pub position: LocalPosition,
    /// Hull points. Mutable through deltas.
    pub health: f64,
    /// Maximum hull points.
    pub max_health: f64,
    /// Shield strength in [0, 1).
    pub shields: f64,
    /// Docking ports.
    pub docking_ports: u32,
    /// Services offered.
    pub services: Vec<StationService>,
    /// Operational state. Mutable through deltas.
    pub status: StationStatus,
    /// Crew aboard.
    pub crew: u64,
}

/// Anomaly kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Traversable shortcut.
    Wormhole,
    /// Tear in space.
    SpatialRift,
    /// Invisible mass.
    GravityWell,
    /// Time runs oddly.
    TemporalDistortion,
    /// Unexplained transmission.
    DerelictSignal,
    /// Dark matter concentration.
    DarkMatterCloud,
}

/// A spatial anomaly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    /// Stable id, `{sector_id}_anomaly_{index}`.
    pub id: String,
    /// Kind.
    pub anomaly_type: AnomalyType,
    /// Position in the sector.
    pub position: LocalPosition,
    /// Danger in [1, 5].
    pub danger_level: u8,
    /// Field strength in [0.1, 1).
    pub strength: f64,
    /// Whether anyone has scanned it. Mutable through deltas.
    pub discovered: bool,
    /// Whether it has been triggered. Mutable through deltas.
    pub triggered: bool,
}

/// A sector-wide resource deposit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDeposit {
    /// Stable id, `{sector_id}_deposit_{resource}`.
    pub id: String,
    /// Category.
    pub resource_type: ResourceType,
    /// Remaining units. Mutable through deltas.
    pub quantity: u32,
    /// Units when full.
    pub max_quantity: u32,
    /// Yield multiplier in [0.1, 1).
    pub richness: f64,
    /// True once mined out. Mutable through deltas.
    pub depleted: bool,
}

/// Hazard kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardType {
    /// Ionising radiation.
    RadiationZone,
    /// Charged particle storm.
    IonStorm,
    /// Abandoned mines.
    Minefield,
    /// Wreckage.
    DebrisField,
    /// Tidal forces.
    GravitationalShear,
    /// Stellar eruption.
    SolarFlare,
}

/// A navigation hazard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hazard {
    /// Stable id, `{sector_id}_hazard_{index}` (or the delta target id).
    pub id: String,
    /// Kind.
    pub hazard_type: HazardType,
    /// Severity in [1, 5].
    pub severity: u8,
    /// Extent in sector-local units.
    pub radius: f64,
    /// Centre.
    pub position: LocalPosition,
}

/// Background parameters drawn from the forked side stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundField {
    /// Starfield density in [0.2, 1).
    pub star_density: f64,
    /// Seed for the renderer's star scatter.
    pub star_seed: u32,
    /// Backdrop nebula tint.
    pub nebula_color: String,
    /// Backdrop nebula opacity in [0, 1).
    pub nebula_intensity: f64,
    /// Orientation of the galactic band in radians.
    pub galactic_band_angle: f64,
}

/// Purely cosmetic elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientElements {
    /// Space dust density in [0, 1).
    pub dust_density: f64,
    /// Dust tint.
    pub dust_color: String,
    /// Unit vector cosmic rays travel along.
    pub cosmic_ray_direction: [f64; 3],
    /// Cosmic ray intensity in [0, 1).
    pub cosmic_ray_intensity: f64,
    /// Background starfield and nebula.
    pub background: BackgroundField,
}

/// A fully generated sector, possibly with deltas applied.
///
/// Static content is fixed by `(base seed, coords)`. The gameplay fields at
/// the bottom start from generated values and change only through versioned
/// deltas, which always produce a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSector {
    /// Canonical id, `sector_{x}_{y}_{z}`.
    pub id: String,
    /// Grid position.
    pub coords: SectorCoords,
    /// Per-sector seed.
    pub seed: u32,
    /// Classification.
    pub sector_type: SectorType,
    /// Navigation class.
    pub navigation_type: NavigationType,
    /// Primary star, if any.
    pub star: Option<Star>,
    /// Planets in orbit order.
    pub planets: Vec<Planet>,
    /// Asteroid belts.
    pub asteroid_fields: Vec<AsteroidField>,
    /// Stations.
    pub stations: Vec<Station>,
    /// Anomalies.
    pub anomalies: Vec<Anomaly>,
    /// Resource deposits.
    pub resources: Vec<ResourceDeposit>,
    /// Navigation hazards.
    pub hazards: Vec<Hazard>,
    /// Cosmetic elements.
    pub ambient: AmbientElements,
    /// Threat in [1, 10].
    pub threat_level: u8,
    /// Faction in control, if any.
    pub controlling_faction: Option<String>,
    /// Planet populations plus station crews.
    pub total_population: u64,
    /// Highest delta version applied; 0 for a pristine sector.
    pub version: u64,
}

impl GeneratedSector {
    /// Returns true if no delta has been applied.
    #[inline]
    #[must_use]
    pub const fn is_pristine(&self) -> bool {
        self.version == 0
    }

    /// Looks up a station by id.
    #[must_use]
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// Looks up a planet by id.
    #[must_use]
    pub fn planet(&self, id: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }
}
