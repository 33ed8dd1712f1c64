//! # Ambient Visuals
//!
//! Cosmetic only, but still deterministic.
//!
//! Dust and cosmic rays come from the main stream (dust density, dust
//! colour, ray azimuth, ray elevation, ray intensity). The background
//! starfield comes from a stream forked before the first main draw, so it
//! stays put even if the main stream's consumption changes.

use std::f64::consts::TAU;

use crate::rng::SectorRng;
use crate::sector::{AmbientElements, BackgroundField, SectorType};

/// Dust tints.
const DUST_COLORS: [&str; 5] = ["#8a7f72", "#6b5d8f", "#4f6f8f", "#8f6b4f", "#5f8f6b"];

/// Backdrop nebula tints.
const NEBULA_COLORS: [&str; 6] = [
    "#3b1f5c", "#1f3b5c", "#5c1f3b", "#1f5c4a", "#5c4a1f", "#2a2a40",
];

/// Generates cosmetic elements.
///
/// `background` must be the stream forked at the start of generation.
pub(crate) fn generate_ambient(
    rng: &mut SectorRng,
    background: &mut SectorRng,
    sector_type: SectorType,
) -> AmbientElements {
    let dust_density = rng.next_float(0.0, 1.0);
    let dust_color = DUST_COLORS[rng.next_index(DUST_COLORS.len())];
    let azimuth = rng.next_float(0.0, TAU);
    let cos_elevation = rng.next_float(-1.0, 1.0);
    let cosmic_ray_intensity = rng.next_float(0.0, 1.0);

    let sin_elevation = (1.0 - cos_elevation * cos_elevation).max(0.0).sqrt();
    let cosmic_ray_direction = [
        sin_elevation * azimuth.cos(),
        sin_elevation * azimuth.sin(),
        cos_elevation,
    ];

    AmbientElements {
        dust_density,
        dust_color: dust_color.to_owned(),
        cosmic_ray_direction,
        cosmic_ray_intensity,
        background: generate_background(background, sector_type),
    }
}

/// Background starfield and nebula from the side stream.
fn generate_background(rng: &mut SectorRng, sector_type: SectorType) -> BackgroundField {
    let star_density = rng.next_float(0.2, 1.0);
    let star_seed = rng.next_u32();
    let nebula_color = NEBULA_COLORS[rng.next_index(NEBULA_COLORS.len())];
    let nebula_intensity = if sector_type == SectorType::Nebula {
        rng.next_float(0.6, 1.0)
    } else {
        rng.next_float(0.0, 0.4)
    };
    let galactic_band_angle = rng.next_float(0.0, TAU);

    BackgroundField {
        star_density,
        star_seed,
        nebula_color: nebula_color.to_owned(),
        nebula_intensity,
        galactic_band_angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosmic_ray_direction_is_unit() {
        for seed in 0..100 {
            let mut main = SectorRng::new(seed);
            let mut side = main.fork(1);
            let ambient = generate_ambient(&mut main, &mut side, SectorType::Standard);
            let [x, y, z] = ambient.cosmic_ray_direction;
            assert!(((x * x + y * y + z * z) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_background_ignores_main_stream_position() {
        let mut main_a = SectorRng::new(9);
        let mut side_a = main_a.fork(0xB6);
        let mut main_b = SectorRng::new(9);
        let mut side_b = main_b.fork(0xB6);
        for _ in 0..17 {
            main_b.next_f64();
        }
        let a = generate_ambient(&mut main_a, &mut side_a, SectorType::Nebula);
        let b = generate_ambient(&mut main_b, &mut side_b, SectorType::Nebula);
        assert_eq!(a.background, b.background);
        assert_ne!(a.dust_density, b.dust_density);
        assert!(a.background.nebula_intensity >= 0.6);
    }
}
