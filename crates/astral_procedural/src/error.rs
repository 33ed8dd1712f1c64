//! # Generation Error Types

use thiserror::Error;

/// Errors that can occur at the generator's input boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationError {
    /// Base seed is not representable as an unsigned 32-bit integer.
    #[error("invalid base seed {0}: must be in 0..=4294967295")]
    InvalidSeed(i64),
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
