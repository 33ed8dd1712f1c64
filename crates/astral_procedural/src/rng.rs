//! # Deterministic Sector RNG
//!
//! The random stream every sub-generator draws from.
//!
//! ## Determinism Guarantee
//!
//! The server generates the same sectors independently, so this stream is a
//! published algorithm rather than an implementation detail:
//!
//! ```text
//! seed improvement:  x = seed + 0x6D2B79F5
//!                    x = (x ^ x >> 16) * 0x85EBCA6B
//!                    x = (x ^ x >> 13) * 0xC2B2AE35
//!                    x =  x ^ x >> 16
//!
//! step:              state = state + 0x9E3779B9
//!                    z = (state ^ state >> 16) * 0x21F0AAAD
//!                    z = (z ^ z >> 15) * 0x735A2D97
//!                    z =  z ^ z >> 15
//! ```
//!
//! Every addition and multiplication wraps modulo 2^32.
//!
//! ## Ownership
//!
//! `SectorRng` is deliberately not `Clone`. Two live copies resuming draws
//! from the same state would silently desynchronize from the server. Use
//! [`SectorRng::fork`] for an independent side stream.

use thiserror::Error;

/// Offset added to a raw seed before avalanche mixing.
const SEED_OFFSET: u32 = 0x6D2B_79F5;
/// First avalanche multiplier.
const SEED_MIX_A: u32 = 0x85EB_CA6B;
/// Second avalanche multiplier.
const SEED_MIX_B: u32 = 0xC2B2_AE35;

/// Odd constant the state advances by on every draw.
const STREAM_INCREMENT: u32 = 0x9E37_79B9;
/// First output multiplier.
const STREAM_MIX_A: u32 = 0x21F0_AAAD;
/// Second output multiplier.
const STREAM_MIX_B: u32 = 0x735A_2D97;

/// Prime used to spread fork modifiers over the state space.
const FORK_PRIME: u32 = 2_654_435_761;

/// 2^32 as a float, the divisor mapping a `u32` draw into [0, 1).
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Errors raised by RNG helpers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngError {
    /// `pick` was called on an empty sequence.
    #[error("invalid argument: cannot pick from an empty sequence")]
    EmptySequence,
}

/// Avalanche-mixes a raw seed into a well-distributed initial state.
///
/// Low-entropy seeds (0, 1, 2, ...) would otherwise produce correlated
/// first outputs.
#[inline]
#[must_use]
pub const fn improve_seed(seed: u32) -> u32 {
    let mut x = seed.wrapping_add(SEED_OFFSET);
    x = (x ^ (x >> 16)).wrapping_mul(SEED_MIX_A);
    x = (x ^ (x >> 13)).wrapping_mul(SEED_MIX_B);
    x ^ (x >> 16)
}

/// Single-owner deterministic random stream.
///
/// # Example
///
/// ```rust
/// use astral_procedural::SectorRng;
///
/// let mut a = SectorRng::new(42);
/// let mut b = SectorRng::new(42);
/// assert_eq!(a.next_f64(), b.next_f64());
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct SectorRng {
    /// Current 32-bit state.
    state: u32,
}

impl SectorRng {
    /// Creates a stream from a raw seed (the seed is improved first).
    #[inline]
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: improve_seed(seed),
        }
    }

    /// Returns the current state value for inspection.
    ///
    /// Reading the state does not advance the stream.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Advances the stream and returns the raw 32-bit output.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STREAM_INCREMENT);
        let mut z = self.state;
        z = (z ^ (z >> 16)).wrapping_mul(STREAM_MIX_A);
        z = (z ^ (z >> 15)).wrapping_mul(STREAM_MIX_B);
        z ^ (z >> 15)
    }

    /// Advances the stream and returns a float in [0, 1).
    ///
    /// This is the primitive draw; every other helper consumes exactly the
    /// number of `next_f64` calls documented on it.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Returns an integer in `[min, max]` (inclusive). One draw.
    ///
    /// An empty range (`max < min`) still consumes the draw and yields `min`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        let roll = self.next_f64();
        let span = max - min + 1;
        if span <= 0 {
            return min;
        }
        min + (roll * span as f64).floor() as i64
    }

    /// Returns a float in `[min, max)`. One draw.
    #[inline]
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns `true` with probability `p`. One draw.
    #[inline]
    pub fn next_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Returns an index in `[0, len)`. One draw.
    ///
    /// `len` of zero yields 0; callers indexing with the result must pass a
    /// non-empty length (see [`SectorRng::pick`] for the checked form).
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        (self.next_f64() * len as f64) as usize
    }

    /// Picks one element uniformly. One draw.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::EmptySequence`] for an empty slice. No draw is
    /// consumed in that case.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, RngError> {
        if items.is_empty() {
            return Err(RngError::EmptySequence);
        }
        Ok(&items[self.next_index(items.len())])
    }

    /// Shuffles in place (Fisher-Yates from the back). `len - 1` draws.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(0, i as i64) as usize;
            items.swap(i, j);
        }
    }

    /// Normally distributed value (Box-Muller). Two draws.
    pub fn next_gaussian(&mut self, mean: f64, stddev: f64) -> f64 {
        // ln(0) is -inf
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + z * stddev
    }

    /// Derives an independent stream without consuming parent draws.
    ///
    /// The child is seeded with `state ^ (modifier * 2654435761)`, so the
    /// same parent state and modifier always give the same child.
    #[inline]
    #[must_use]
    pub const fn fork(&self, modifier: u32) -> Self {
        Self::new(self.state ^ modifier.wrapping_mul(FORK_PRIME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence_seed_zero() {
        // Reference values shared with the server implementation.
        let mut rng = SectorRng::new(0);
        assert_eq!(rng.state(), 0xC471_8DB0);
        assert_eq!(rng.next_u32(), 2_557_034_218);
        assert_eq!(rng.next_u32(), 3_805_203_543);
        assert_eq!(rng.next_u32(), 2_124_401_148);
        assert_eq!(rng.next_u32(), 768_125_912);
    }

    #[test]
    fn test_known_sequence_seed_42() {
        let mut rng = SectorRng::new(42);
        assert_eq!(rng.state(), 0x2C86_C7C3);
        assert_eq!(rng.next_u32(), 1_612_398_739);
        assert_eq!(rng.next_u32(), 2_598_869_376);
    }

    #[test]
    fn test_next_f64_matches_u32_division() {
        let mut rng = SectorRng::new(0);
        let value = rng.next_f64();
        assert!((value - 2_557_034_218.0 / 4_294_967_296.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_determinism() {
        let mut a = SectorRng::new(987_654);
        let mut b = SectorRng::new(987_654);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_range() {
        let mut rng = SectorRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "value {v} out of range");
        }
    }

    #[test]
    fn test_low_entropy_seeds_diverge() {
        let first: Vec<u32> = (0..8).map(|s| SectorRng::new(s).next_u32()).collect();
        for i in 0..first.len() {
            for j in (i + 1)..first.len() {
                assert_ne!(first[i], first[j], "seeds {i} and {j} collide");
            }
        }
    }

    #[test]
    fn test_next_int_inclusive_bounds() {
        let mut rng = SectorRng::new(99);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = rng.next_int(-2, 2);
            assert!((-2..=2).contains(&v));
            seen_min |= v == -2;
            seen_max |= v == 2;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_next_int_empty_range_still_draws() {
        let mut a = SectorRng::new(5);
        let mut b = SectorRng::new(5);
        assert_eq!(a.next_int(10, 3), 10);
        b.next_f64();
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_pick_empty_is_invalid_argument() {
        let mut rng = SectorRng::new(1);
        let before = rng.state();
        let empty: [u8; 0] = [];
        assert_eq!(rng.pick(&empty), Err(RngError::EmptySequence));
        assert_eq!(rng.state(), before, "failed pick must not consume a draw");
    }

    #[test]
    fn test_pick_covers_all_items() {
        let mut rng = SectorRng::new(3);
        let items = ["a", "b", "c"];
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            let picked = rng.pick(&items).unwrap();
            let idx = items.iter().position(|i| i == picked).unwrap();
            counts[idx] += 1;
        }
        assert!(counts.iter().all(|&c| c > 800), "skewed counts {counts:?}");
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SectorRng::new(11);
        let mut items: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_ne!(items, sorted, "50 elements should not shuffle to identity");
    }

    #[test]
    fn test_gaussian_consumes_two_draws() {
        let mut a = SectorRng::new(8);
        let mut b = SectorRng::new(8);
        let _ = a.next_gaussian(0.0, 1.0);
        b.next_f64();
        b.next_f64();
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_gaussian_mean() {
        let mut rng = SectorRng::new(2024);
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| rng.next_gaussian(10.0, 2.0)).sum();
        let mean = sum / f64::from(n);
        assert!((mean - 10.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn test_fork_does_not_advance_parent() {
        let mut parent = SectorRng::new(42);
        let mut reference = SectorRng::new(42);
        let _child = parent.fork(1);
        assert_eq!(parent.next_u32(), reference.next_u32());
    }

    #[test]
    fn test_fork_is_deterministic_and_modifier_sensitive() {
        let parent = SectorRng::new(42);
        let mut a = parent.fork(1);
        let mut b = parent.fork(1);
        let mut c = parent.fork(2);
        let va = a.next_u32();
        assert_eq!(va, b.next_u32());
        assert_ne!(va, c.next_u32());
    }
}
