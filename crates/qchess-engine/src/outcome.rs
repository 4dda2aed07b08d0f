//! Move validation outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of checking a move request against the rules.
///
/// Validation never fails with an error; an illegal move is simply one of the
/// `Invalid*` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationOutcome {
    /// The move may be played.
    Valid,
    /// No piece on the source square.
    InvalidNoPiece,
    /// The source piece belongs to the side not to move.
    InvalidWrongColor,
    /// A square on the path or the destination is occupied.
    InvalidPathBlocked,
    /// A coordinate lies off the board.
    InvalidOutOfBounds,
    /// The piece cannot move that way.
    InvalidPieceMovement,
    /// Reserved; check detection is not implemented.
    InvalidInCheck,
    /// Castling rights, placement or empty squares are missing.
    InvalidCastleConditions,
}

impl ValidationOutcome {
    /// Whether the move may be played.
    pub const fn is_valid(self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Kebab-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            ValidationOutcome::Valid => "valid",
            ValidationOutcome::InvalidNoPiece => "invalid-no-piece",
            ValidationOutcome::InvalidWrongColor => "invalid-wrong-color",
            ValidationOutcome::InvalidPathBlocked => "invalid-path-blocked",
            ValidationOutcome::InvalidOutOfBounds => "invalid-out-of-bounds",
            ValidationOutcome::InvalidPieceMovement => "invalid-piece-movement",
            ValidationOutcome::InvalidInCheck => "invalid-in-check",
            ValidationOutcome::InvalidCastleConditions => "invalid-castle-conditions",
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
