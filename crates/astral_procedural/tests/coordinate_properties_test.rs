//! # Coordinate Hashing Properties
//!
//! The hashing rules the server relies on to agree with us on which sector
//! is which.

use astral_procedural::{
    coords_to_display_string, coords_to_seed, coords_to_sector_id, direct_neighbor_coords,
    display_string_to_coords, distance_from_center, neighbor_coords, sector_id_to_coords,
    DistanceBand, SectorCoords,
};

/// Test: The origin hashes to the base seed itself.
#[test]
fn test_origin_identity() {
    for base in [0, 1, 42, u32::MAX] {
        assert_eq!(coords_to_seed(base, 0.0, 0.0, 0.0), base);
    }
}

/// Test: Unit steps along each axis give distinct seeds.
#[test]
fn test_axis_independence() {
    let x = coords_to_seed(42, 1.0, 0.0, 0.0);
    let y = coords_to_seed(42, 0.0, 1.0, 0.0);
    let z = coords_to_seed(42, 0.0, 0.0, 1.0);
    assert_ne!(x, y);
    assert_ne!(y, z);
    assert_ne!(x, z);
}

/// Test: Fractional coordinates floor before hashing and formatting.
#[test]
fn test_fractional_input_floors() {
    assert_eq!(
        coords_to_seed(42, 5.9, 10.1, 15.7),
        coords_to_seed(42, 5.0, 10.0, 15.0)
    );
    assert_eq!(coords_to_sector_id(5.9, 10.1, 15.7), "sector_5_10_15");
    assert_eq!(coords_to_sector_id(-0.5, 0.0, 0.0), "sector_-1_0_0");
    assert_eq!(coords_to_display_string(1.2, -3.4, 5.6), "1.-4.5");
}

/// Test: Negative coordinates hash with wrapping arithmetic.
#[test]
fn test_negative_coordinates() {
    assert_eq!(coords_to_seed(42, -1.0, -2.0, -3.0), 4_147_803_536);
    assert_eq!(
        sector_id_to_coords("sector_-1_-2_-3"),
        Some(SectorCoords::new(-1, -2, -3))
    );
}

/// Test: Malformed ids and display strings are rejected.
#[test]
fn test_malformed_identifiers() {
    for id in ["", "sector_", "sector_1_2", "sector_1_2_3_4", "sector_a_b_c", "sector_1.5_2_3"] {
        assert_eq!(sector_id_to_coords(id), None, "{id:?} should not parse");
    }
    assert_eq!(sector_id_to_coords("1_2_3"), Some(SectorCoords::new(1, 2, 3)));
    assert_eq!(display_string_to_coords("4.5.6"), Some(SectorCoords::new(4, 5, 6)));
    assert_eq!(display_string_to_coords("4.5"), None);
}

/// Test: Moore and face neighbourhoods have the right size and exclude the centre.
#[test]
fn test_neighbourhoods() {
    let centre = SectorCoords::new(7, -7, 0);
    let all = neighbor_coords(centre);
    let direct = direct_neighbor_coords(centre);

    assert_eq!(all.len(), 26);
    assert_eq!(direct.len(), 6);
    assert!(!all.contains(&centre));
    assert!(direct.iter().all(|c| all.contains(c)));
    assert_eq!(all[0], SectorCoords::new(6, -8, -1));
    assert_eq!(all[25], SectorCoords::new(8, -6, 1));
}

/// Test: Distance bands split at 1000 and 5000.
#[test]
fn test_distance_bands() {
    let d = distance_from_center(SectorCoords::new(3, 4, 0));
    assert!((d - 5.0).abs() < f64::EPSILON);
    assert_eq!(DistanceBand::of(999.9), DistanceBand::Near);
    assert_eq!(DistanceBand::of(1000.0), DistanceBand::Mid);
    assert_eq!(DistanceBand::of(5000.0), DistanceBand::Far);
}
