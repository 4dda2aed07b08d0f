//! Error types for the simulator crate.
//!
//! Every variant here is a programming error in the caller: the rules layer
//! is expected to validate moves before touching the simulator.

use qchess_core::{CoreError, Piece};
use thiserror::Error;

/// Errors produced by gate application, measurement and construction.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Square index outside 0..64.
    #[error("square index {0} is out of range (expected 0..64)")]
    IndexOutOfRange(usize),

    /// A gate was asked to act on a single square.
    #[error("{gate} requires distinct squares, got {square} twice")]
    SameSquare {
        /// Gate name.
        gate: &'static str,
        /// The repeated square index.
        square: usize,
    },

    /// The tags on the two squares do not permit this gate.
    #[error(
        "{gate} precondition violated on {src}->{dst}: source tag {}, destination tag {}",
        format_tag(.src_tag),
        format_tag(.dst_tag)
    )]
    Precondition {
        /// Gate name.
        gate: &'static str,
        /// Source square index.
        src: usize,
        /// Destination square index.
        dst: usize,
        /// Tag found on the source.
        src_tag: Option<Piece>,
        /// Tag found on the destination.
        dst_tag: Option<Piece>,
    },

    /// A control square overlaps the gate squares or another control.
    #[error("control square {0} overlaps the gate operands or another control")]
    InvalidControl(usize),

    /// Tag string length differs from the occupancy population count.
    #[error("tag list has {got} entries but the occupancy has {expected} pieces")]
    TagCountMismatch {
        /// Population count of the occupancy.
        expected: u32,
        /// Number of tags supplied.
        got: usize,
    },

    /// A tag letter outside the piece alphabet.
    #[error("invalid tag character '{0}'")]
    InvalidTag(char),

    /// A prescribed measurement outcome has zero probability.
    #[error("outcome {outcome} on square {square} is impossible (probability {probability})")]
    ImpossibleOutcome {
        /// Square index.
        square: usize,
        /// Requested outcome.
        outcome: bool,
        /// Occupation probability of the square.
        probability: f64,
    },

    /// The operation requires a tagged square.
    #[error("square {0} carries no piece")]
    EmptySquare(usize),

    /// The operation requires a square occupied with certainty.
    #[error("square {square} is occupied with probability {probability}, expected 1")]
    NotCertain {
        /// Square index.
        square: usize,
        /// Its marginal probability.
        probability: f64,
    },

    /// Invalid board primitive.
    #[error("board error: {0}")]
    Core(#[from] CoreError),
}

#[allow(clippy::ref_option)]
fn format_tag(tag: &Option<Piece>) -> String {
    match tag {
        Some(piece) => format!("'{piece}'"),
        None => "none".to_string(),
    }
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
