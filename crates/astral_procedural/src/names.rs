//! Name generation for stars and stations.

use crate::rng::SectorRng;

/// Syllables star names are built from.
const STAR_SYLLABLES: [&str; 20] = [
    "al", "ve", "ka", "tor", "ri", "zen", "or", "ix", "lu", "mar", "tha", "sol", "dra", "ny",
    "quo", "bel", "cy", "ren", "as", "oth",
];

/// Factions that can own stations.
pub const FACTIONS: [&str; 5] = [
    "Terran Concord",
    "Vega Syndicate",
    "Free Traders Guild",
    "Orion Collective",
    "Independent",
];

/// Draws a star name. `1 + syllables` draws (2-3 syllables).
pub(crate) fn star_name(rng: &mut SectorRng) -> String {
    let syllables = rng.next_int(2, 3);
    let mut name = String::new();
    for _ in 0..syllables {
        name.push_str(STAR_SYLLABLES[rng.next_index(STAR_SYLLABLES.len())]);
    }
    capitalize(&name)
}

/// Upper-cases the first letter.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Roman numeral for planet designations (1-based).
pub(crate) fn roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 9] = [
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, glyph) in TABLE {
        while n >= value {
            out.push_str(glyph);
            n -= value;
        }
    }
    out
}
