//! Move requests.

use std::fmt;

use qchess_core::{PieceKind, Square};
use serde::{Deserialize, Serialize};

/// A move as asked for by a player, before validation.
///
/// One field layout covers every archetype:
///
/// | shape                         | meaning                          |
/// |-------------------------------|----------------------------------|
/// | `src → dst`                   | normal move, capture or castle   |
/// | `src → dst + dst_second`      | split                            |
/// | `src + src_second → dst`      | merge                            |
/// | `src + src_second → dst + dst_second` | castle written as king and rook |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Source square.
    pub src: Square,
    /// Destination square.
    pub dst: Square,
    /// Second source of a merge, or the rook of a written-out castle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_second: Option<Square>,
    /// Second destination of a split, or the rook of a written-out castle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_second: Option<Square>,
    /// Promotion piece for a pawn reaching the last rank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    /// A single-destination move.
    pub const fn new(src: Square, dst: Square) -> Self {
        Self {
            src,
            dst,
            src_second: None,
            dst_second: None,
            promotion: None,
        }
    }

    /// Split `src` into `d1` and `d2`.
    pub const fn split(src: Square, d1: Square, d2: Square) -> Self {
        Self {
            src,
            dst: d1,
            src_second: None,
            dst_second: Some(d2),
            promotion: None,
        }
    }

    /// Merge `s1` and `s2` into `dst`.
    pub const fn merge(s1: Square, s2: Square, dst: Square) -> Self {
        Self {
            src: s1,
            dst,
            src_second: Some(s2),
            dst_second: None,
            promotion: None,
        }
    }

    /// Same move with a promotion piece.
    #[must_use]
    pub const fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }

    pub const fn is_split(&self) -> bool {
        self.src_second.is_none() && self.dst_second.is_some()
    }

    pub const fn is_merge(&self) -> bool {
        self.src_second.is_some() && self.dst_second.is_none()
    }

    /// Both second squares present; only meaningful as a castle.
    pub const fn is_paired(&self) -> bool {
        self.src_second.is_some() && self.dst_second.is_some()
    }

    /// Whether either second square is present.
    pub const fn is_quantum(&self) -> bool {
        self.is_split() || self.is_merge()
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.src)?;
        if let Some(s2) = self.src_second {
            write!(f, "{s2}")?;
        }
        write!(f, ",{}", self.dst)?;
        if let Some(d2) = self.dst_second {
            write!(f, "{d2}")?;
        }
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
