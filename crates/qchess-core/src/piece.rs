//! Piece tags.
//!
//! A tag is the piece letter bound to a square: uppercase for white, lowercase
//! for black.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Side to move / piece color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Moves first; uppercase letters.
    White,
    /// Lowercase letters.
    Black,
}

impl Color {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank direction pawns of this color advance in.
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Zero-based back rank.
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Zero-based rank pawns start on.
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Zero-based rank pawns promote on.
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

/// Kind of piece, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Uppercase letter for this kind.
    pub const fn letter(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    /// Parse a letter of either case.
    pub fn from_letter(c: char) -> CoreResult<Self> {
        match c.to_ascii_uppercase() {
            'K' => Ok(PieceKind::King),
            'Q' => Ok(PieceKind::Queen),
            'R' => Ok(PieceKind::Rook),
            'B' => Ok(PieceKind::Bishop),
            'N' => Ok(PieceKind::Knight),
            'P' => Ok(PieceKind::Pawn),
            _ => Err(CoreError::InvalidPiece(c)),
        }
    }

    /// Kinds a pawn may promote to.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Whether a pawn may promote to this kind.
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
        )
    }
}

/// A colored piece; the value stored in a square's tag slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Piece kind.
    pub kind: PieceKind,
    /// Piece color.
    pub color: Color,
}

impl Piece {
    /// Construct a piece.
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Parse a tag letter; case selects the color.
    pub fn from_char(c: char) -> CoreResult<Self> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Ok(Self { kind, color })
    }

    /// Tag letter for this piece.
    pub fn to_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({})", self.to_char())
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Piece::from_char(c).map_err(serde::de::Error::custom),
            _ => Err(serde::de::Error::custom(format!("invalid piece tag '{s}'"))),
        }
    }
}

/// Tags of the standard starting position, in occupancy order (a1 … h8).
pub const STANDARD_TAGS: &str = "RNBQKBNRPPPPPPPPpppppppprnbqkbnr";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_round_trip() {
        for c in "KQRBNPkqrbnp".chars() {
            assert_eq!(Piece::from_char(c).unwrap().to_char(), c);
        }
        assert_eq!(Piece::from_char('x'), Err(CoreError::InvalidPiece('x')));
    }

    #[test]
    fn test_case_selects_color() {
        assert_eq!(Piece::from_char('q').unwrap().color, Color::Black);
        assert_eq!(Piece::from_char('Q').unwrap().color, Color::White);
    }

    #[test]
    fn test_standard_tags_parse() {
        let tags: Vec<Piece> = STANDARD_TAGS
            .chars()
            .map(|c| Piece::from_char(c).unwrap())
            .collect();
        assert_eq!(tags.len(), 32);
        assert_eq!(tags[4], Piece::new(PieceKind::King, Color::White));
        assert_eq!(tags[28], Piece::new(PieceKind::King, Color::Black));
    }

    #[test]
    fn test_piece_serializes_as_letter() {
        let json = serde_json::to_string(&Piece::from_char('n').unwrap()).unwrap();
        assert_eq!(json, "\"n\"");
    }
}
