//! # Static Content Extraction
//!
//! Selects the seed-derived part of a sector so two independent
//! generators can be compared field by field.
//!
//! Gameplay scalars (threat, faction, population), the delta version and
//! cosmetic ambient data are left out. Compare pristine sectors only:
//! deltas rewrite station health, deposit quantities and anomaly flags.

use serde::Serialize;

use crate::coords::SectorCoords;
use crate::sector::{
    Anomaly, AsteroidField, GeneratedSector, Hazard, NavigationType, Planet, ResourceDeposit,
    SectorType, Star, Station,
};

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Borrowed view over a sector's static content.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSectorContent<'a> {
    /// Canonical id.
    pub id: &'a str,
    /// Grid position.
    pub coords: SectorCoords,
    /// Per-sector seed.
    pub seed: u32,
    /// Classification.
    pub sector_type: SectorType,
    /// Navigation class.
    pub navigation_type: NavigationType,
    /// Primary star.
    pub star: Option<&'a Star>,
    /// Planets.
    pub planets: &'a [Planet],
    /// Asteroid belts.
    pub asteroid_fields: &'a [AsteroidField],
    /// Stations.
    pub stations: &'a [Station],
    /// Anomalies.
    pub anomalies: &'a [Anomaly],
    /// Resource deposits.
    pub resources: &'a [ResourceDeposit],
    /// Hazards.
    pub hazards: &'a [Hazard],
}

impl<'a> StaticSectorContent<'a> {
    /// Borrows the static fields of `sector`.
    #[must_use]
    pub fn of(sector: &'a GeneratedSector) -> Self {
        Self {
            id: &sector.id,
            coords: sector.coords,
            seed: sector.seed,
            sector_type: sector.sector_type,
            navigation_type: sector.navigation_type,
            star: sector.star.as_ref(),
            planets: &sector.planets,
            asteroid_fields: &sector.asteroid_fields,
            stations: &sector.stations,
            anomalies: &sector.anomalies,
            resources: &sector.resources,
            hazards: &sector.hazards,
        }
    }

    /// Compact JSON in field declaration order.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// FNV-1a hash of [`Self::canonical_json`].
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn fingerprint(&self) -> serde_json::Result<u64> {
        let json = self.canonical_json()?;
        Ok(fnv1a(json.as_bytes()))
    }
}

impl GeneratedSector {
    /// Static content view, see [`StaticSectorContent`].
    #[inline]
    #[must_use]
    pub fn static_content(&self) -> StaticSectorContent<'_> {
        StaticSectorContent::of(self)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SectorGenerator;

    #[test]
    fn test_fnv_known_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_gameplay_fields_do_not_affect_fingerprint() {
        let sector = SectorGenerator::new(5).generate(SectorCoords::new(1, 2, 3));
        let mut mutated = sector.clone();
        mutated.threat_level = 10;
        mutated.total_population += 1;
        mutated.controlling_faction = Some("Pirates".to_owned());
        mutated.version = 9;
        assert_eq!(
            sector.static_content().fingerprint().ok(),
            mutated.static_content().fingerprint().ok()
        );
    }

    #[test]
    fn test_canonical_json_excludes_gameplay_fields() {
        let sector = SectorGenerator::new(5).generate(SectorCoords::new(0, 0, 0));
        let json = sector.static_content().canonical_json().unwrap();
        assert!(json.starts_with(r#"{"id":"sector_0_0_0","coords":"#));
        assert!(!json.contains("threatLevel"));
        assert!(!json.contains("ambient"));
        assert!(!json.contains("\"version\""));
    }

    #[test]
    fn test_neighbours_differ() {
        let generator = SectorGenerator::new(5);
        let a = generator.generate(SectorCoords::new(0, 0, 0));
        let b = generator.generate(SectorCoords::new(1, 0, 0));
        assert_ne!(
            a.static_content().fingerprint().unwrap(),
            b.static_content().fingerprint().unwrap()
        );
    }
}
