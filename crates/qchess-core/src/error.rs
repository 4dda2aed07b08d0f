//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while building or indexing board primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A bit array did not contain exactly 64 entries.
    #[error("bit vector must have exactly 64 bits, got {0}")]
    BitLength(usize),

    /// A bit array contained something other than 0 or 1.
    #[error("bit {index} has value {value}, expected 0 or 1")]
    BitValue {
        /// Position of the offending entry.
        index: usize,
        /// The value found there.
        value: u8,
    },

    /// A bit or square index outside 0..64.
    #[error("index {0} is out of range (expected 0..64)")]
    IndexOutOfRange(usize),

    /// A hex string could not be parsed as a 64-bit occupancy.
    #[error("invalid hex occupancy '{0}'")]
    InvalidHex(String),

    /// Square notation other than `a1`..`h8`.
    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    /// A piece letter outside `KQRBNPkqrbnp`.
    #[error("invalid piece tag '{0}'")]
    InvalidPiece(char),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
