//! # Sector Coordinates
//!
//! Integer sector addressing, seed hashing and the canonical string forms.
//!
//! ## Seed Hash
//!
//! ```text
//! seed = base ^ (x * 73856093) ^ (y * 19349663) ^ (z * 83492791)
//! ```
//!
//! Coordinates are floored first and every product wraps modulo 2^32, so
//! the origin always hashes to the base seed itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-axis hash primes.
const PRIME_X: u32 = 73_856_093;
const PRIME_Y: u32 = 19_349_663;
const PRIME_Z: u32 = 83_492_791;

/// Prefix of the canonical sector id.
pub const SECTOR_ID_PREFIX: &str = "sector";

/// Sectors closer than this to the origin are in the near band.
pub const NEAR_BAND_LIMIT: f64 = 1000.0;
/// Sectors closer than this (and not near) are in the mid band.
pub const MID_BAND_LIMIT: f64 = 5000.0;

/// Integer position of a sector in the galaxy grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorCoords {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl SectorCoords {
    /// The galactic centre.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Creates coordinates from integers.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates coordinates from arbitrary floats, flooring each axis.
    ///
    /// Values beyond the `i32` range saturate.
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    #[must_use]
    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }

    /// Hashes these coordinates with a base seed.
    #[allow(clippy::cast_sign_loss)]
    #[inline]
    #[must_use]
    pub const fn seed(self, base_seed: u32) -> u32 {
        let hx = (self.x as u32).wrapping_mul(PRIME_X);
        let hy = (self.y as u32).wrapping_mul(PRIME_Y);
        let hz = (self.z as u32).wrapping_mul(PRIME_Z);
        base_seed ^ hx ^ hy ^ hz
    }

    /// Canonical sector id, `sector_{x}_{y}_{z}`.
    #[must_use]
    pub fn sector_id(self) -> String {
        format!("{SECTOR_ID_PREFIX}_{}_{}_{}", self.x, self.y, self.z)
    }

    /// Display form, `x.y.z`.
    #[must_use]
    pub fn display_string(self) -> String {
        format!("{}.{}.{}", self.x, self.y, self.z)
    }

    /// Euclidean distance from the origin.
    #[must_use]
    pub fn distance_from_center(self) -> f64 {
        let (x, y, z) = (f64::from(self.x), f64::from(self.y), f64::from(self.z));
        (x * x + y * y + z * z).sqrt()
    }

    /// Returns these coordinates shifted by an offset.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// The 26 Moore neighbours, centre excluded.
    ///
    /// Ordered by z, then y, then x offset, each ascending.
    #[must_use]
    pub fn neighbors(self) -> Vec<Self> {
        let mut out = Vec::with_capacity(26);
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    out.push(self.offset(dx, dy, dz));
                }
            }
        }
        out
    }

    /// The 6 face neighbours: -x, +x, -y, +y, -z, +z.
    #[must_use]
    pub fn direct_neighbors(self) -> [Self; 6] {
        [
            self.offset(-1, 0, 0),
            self.offset(1, 0, 0),
            self.offset(0, -1, 0),
            self.offset(0, 1, 0),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
        ]
    }
}

impl fmt::Display for SectorCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SECTOR_ID_PREFIX}_{}_{}_{}", self.x, self.y, self.z)
    }
}

/// Error returned when a string is not a canonical sector id.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed sector id: {0:?}")]
pub struct ParseSectorIdError(pub String);

impl FromStr for SectorCoords {
    type Err = ParseSectorIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        sector_id_to_coords(s).ok_or_else(|| ParseSectorIdError(s.to_owned()))
    }
}

/// Distance band a sector falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBand {
    /// Closer than 1000.
    Near,
    /// 1000 up to (not including) 5000.
    Mid,
    /// 5000 and beyond.
    Far,
}

impl DistanceBand {
    /// Classifies a distance from the origin.
    #[must_use]
    pub fn of(distance: f64) -> Self {
        if distance < NEAR_BAND_LIMIT {
            Self::Near
        } else if distance < MID_BAND_LIMIT {
            Self::Mid
        } else {
            Self::Far
        }
    }

    /// Threat contribution of the band.
    #[must_use]
    pub const fn threat_bonus(self) -> i64 {
        match self {
            Self::Near => 0,
            Self::Mid => 1,
            Self::Far => 2,
        }
    }
}

/// Hashes (possibly fractional) coordinates with a base seed.
#[must_use]
pub fn coords_to_seed(base_seed: u32, x: f64, y: f64, z: f64) -> u32 {
    SectorCoords::from_f64(x, y, z).seed(base_seed)
}

/// Canonical id for (possibly fractional) coordinates.
#[must_use]
pub fn coords_to_sector_id(x: f64, y: f64, z: f64) -> String {
    SectorCoords::from_f64(x, y, z).sector_id()
}

/// Parses a canonical sector id.
///
/// Accepts `sector_{x}_{y}_{z}` or the bare `{x}_{y}_{z}`; returns `None`
/// for anything else.
#[must_use]
pub fn sector_id_to_coords(id: &str) -> Option<SectorCoords> {
    let body = id
        .strip_prefix(SECTOR_ID_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(id);
    parse_three(body, '_')
}

/// Display form for (possibly fractional) coordinates.
#[must_use]
pub fn coords_to_display_string(x: f64, y: f64, z: f64) -> String {
    SectorCoords::from_f64(x, y, z).display_string()
}

/// Parses the `x.y.z` display form.
#[must_use]
pub fn display_string_to_coords(display: &str) -> Option<SectorCoords> {
    parse_three(display, '.')
}

/// Euclidean distance of coordinates from the origin.
#[must_use]
pub fn distance_from_center(coords: SectorCoords) -> f64 {
    coords.distance_from_center()
}

/// The 26 Moore neighbours of `coords`.
#[must_use]
pub fn neighbor_coords(coords: SectorCoords) -> Vec<SectorCoords> {
    coords.neighbors()
}

/// The 6 face neighbours of `coords`.
#[must_use]
pub fn direct_neighbor_coords(coords: SectorCoords) -> [SectorCoords; 6] {
    coords.direct_neighbors()
}

/// Splits into exactly three strict integers.
fn parse_three(s: &str, sep: char) -> Option<SectorCoords> {
    let mut parts = s.split(sep);
    let x = parse_strict_int(parts.next()?)?;
    let y = parse_strict_int(parts.next()?)?;
    let z = parse_strict_int(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(SectorCoords::new(x, y, z))
}

/// Optional `-` followed by ASCII digits only.
fn parse_strict_int(field: &str) -> Option<i32> {
    let digits = field.strip_prefix('-').unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_identity() {
        for base in [0, 1, 42, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(coords_to_seed(base, 0.0, 0.0, 0.0), base);
        }
    }

    #[test]
    fn test_axis_independence() {
        let x = coords_to_seed(42, 1.0, 0.0, 0.0);
        let y = coords_to_seed(42, 0.0, 1.0, 0.0);
        let z = coords_to_seed(42, 0.0, 0.0, 1.0);
        assert_ne!(x, y);
        assert_ne!(y, z);
        assert_ne!(x, z);
        assert_eq!(x, 42 ^ PRIME_X);
    }

    #[test]
    fn test_fractional_input_floors() {
        assert_eq!(
            coords_to_seed(42, 5.9, 10.1, 15.7),
            coords_to_seed(42, 5.0, 10.0, 15.0)
        );
        assert_eq!(SectorCoords::from_f64(-0.5, -1.2, 2.9), SectorCoords::new(-1, -2, 2));
    }

    #[test]
    fn test_known_seeds() {
        assert_eq!(SectorCoords::new(10, 20, 30).seed(42), 2_925_490_326);
        assert_eq!(SectorCoords::new(-1, -2, -3).seed(42), 4_147_803_536);
    }

    #[test]
    fn test_sector_id_format() {
        assert_eq!(coords_to_sector_id(1.0, 2.0, 3.0), "sector_1_2_3");
        assert_eq!(coords_to_sector_id(-1.0, -2.0, -3.0), "sector_-1_-2_-3");
        assert_eq!(SectorCoords::new(4, 5, 6).to_string(), "sector_4_5_6");
    }

    #[test]
    fn test_sector_id_round_trip() {
        for coords in [
            SectorCoords::new(0, 0, 0),
            SectorCoords::new(1, 2, 3),
            SectorCoords::new(-1, -2, -3),
            SectorCoords::new(i32::MAX, i32::MIN, 7),
        ] {
            assert_eq!(sector_id_to_coords(&coords.sector_id()), Some(coords));
            assert_eq!(coords.sector_id().parse::<SectorCoords>(), Ok(coords));
        }
    }

    #[test]
    fn test_sector_id_without_prefix() {
        assert_eq!(sector_id_to_coords("7_-8_9"), Some(SectorCoords::new(7, -8, 9)));
    }

    #[test]
    fn test_sector_id_rejects_malformed() {
        for bad in [
            "",
            "sector",
            "sector_1_2",
            "sector_1_2_3_4",
            "sector_a_2_3",
            "sector_1__3",
            "sector_1.5_2_3",
            "sector_+1_2_3",
            "sector_-_2_3",
            "galaxy_1_2_3",
            "1_2",
        ] {
            assert_eq!(sector_id_to_coords(bad), None, "{bad:?} should not parse");
        }
        assert!("nope".parse::<SectorCoords>().is_err());
    }

    #[test]
    fn test_display_string_round_trip() {
        assert_eq!(coords_to_display_string(3.0, -4.0, 5.0), "3.-4.5");
        assert_eq!(display_string_to_coords("3.-4.5"), Some(SectorCoords::new(3, -4, 5)));
        assert_eq!(display_string_to_coords("3.4"), None);
        assert_eq!(display_string_to_coords("3.4.5.6"), None);
        assert_eq!(display_string_to_coords("sector_3_4_5"), None);
    }

    #[test]
    fn test_distance_bands() {
        assert_eq!(DistanceBand::of(0.0), DistanceBand::Near);
        assert_eq!(DistanceBand::of(999.9), DistanceBand::Near);
        assert_eq!(DistanceBand::of(1000.0), DistanceBand::Mid);
        assert_eq!(DistanceBand::of(4999.0), DistanceBand::Mid);
        assert_eq!(DistanceBand::of(5000.0), DistanceBand::Far);
        let d = distance_from_center(SectorCoords::new(3, 4, 0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_moore_neighbors() {
        let center = SectorCoords::new(5, -5, 0);
        let neighbors = neighbor_coords(center);
        assert_eq!(neighbors.len(), 26);
        assert!(!neighbors.contains(&center));
        let unique: std::collections::HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 26);
        for n in &neighbors {
            assert!((n.x - center.x).abs() <= 1);
            assert!((n.y - center.y).abs() <= 1);
            assert!((n.z - center.z).abs() <= 1);
        }
    }

    #[test]
    fn test_direct_neighbors() {
        let center = SectorCoords::new(0, 0, 0);
        let neighbors = direct_neighbor_coords(center);
        assert_eq!(neighbors.len(), 6);
        for n in neighbors {
            let diffs = [n.x - center.x, n.y - center.y, n.z - center.z];
            assert_eq!(diffs.iter().filter(|d| **d != 0).count(), 1);
            assert_eq!(diffs.iter().map(|d| d.abs()).sum::<i32>(), 1);
        }
    }
}
