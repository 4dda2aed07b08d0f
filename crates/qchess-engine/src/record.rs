//! Move history and game bookkeeping records.

use std::fmt;

use chrono::{DateTime, Utc};
use qchess_core::{Color, Piece, Square};
use qchess_sim::Measurement;
use serde::{Deserialize, Serialize};

use crate::request::MoveRequest;

/// How a move was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveType {
    /// Plain iSwap onto an empty square or a square held by the same piece.
    Normal,
    /// The destination held an opposing piece.
    Capture,
    /// A measurement found the way unavailable; nothing moved.
    Blocked,
    /// One source, two destinations.
    Split,
    /// Two sources, one destination.
    Merge,
    /// King and rook moved together.
    Castle,
    /// Pawn captured the pawn that just passed it.
    EnPassant,
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveType::Normal => "normal",
            MoveType::Capture => "capture",
            MoveType::Blocked => "blocked",
            MoveType::Split => "split",
            MoveType::Merge => "merge",
            MoveType::Castle => "castle",
            MoveType::EnPassant => "en-passant",
        };
        f.write_str(s)
    }
}

/// A piece taken off the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub piece: Piece,
    pub square: Square,
    /// Occupation probability before the capture was resolved.
    pub probability: f64,
    /// Index of the move that captured it.
    pub move_number: u32,
}

/// One entry in the append-only move history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based move number.
    pub number: u32,
    /// Side that moved.
    pub color: Color,
    /// The request as played; replaying it reproduces the move.
    pub request: MoveRequest,
    pub move_type: MoveType,
    /// The moving piece.
    pub piece: Piece,
    /// Whether an opposing piece was removed.
    pub captured: Option<CapturedPiece>,
    /// Measurements made while playing the move, in order.
    pub measurements: Vec<Measurement>,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    /// Outcomes of every measurement, for replay.
    pub fn outcomes(&self) -> Vec<bool> {
        self.measurements.iter().map(|m| m.outcome).collect()
    }

    /// Whether the move captured a piece.
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} {} ({})", self.number, self.piece, self.request, self.move_type)?;
        if !self.measurements.is_empty() {
            let bits: String = self
                .measurements
                .iter()
                .map(|m| if m.outcome { '1' } else { '0' })
                .collect();
            write!(f, " [{bits}]")?;
        }
        Ok(())
    }
}

/// Castling availability for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

impl CastlingRights {
    /// No castling for either side.
    pub const fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    /// Whether `color` may still castle on the given wing.
    pub const fn allows(&self, color: Color, kingside: bool) -> bool {
        match (color, kingside) {
            (Color::White, true) => self.white_kingside,
            (Color::White, false) => self.white_queenside,
            (Color::Black, true) => self.black_kingside,
            (Color::Black, false) => self.black_queenside,
        }
    }

    /// Drop both rights of `color`.
    pub fn clear_color(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drop the right tied to a rook corner, if `square` is one.
    pub fn clear_corner(&mut self, square: Square) {
        match square.index() {
            0 => self.white_queenside = false,
            7 => self.white_kingside = false,
            56 => self.black_queenside = false,
            63 => self.black_kingside = false,
            _ => {}
        }
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ];
        let s: String = flags.iter().filter(|(on, _)| *on).map(|(_, c)| *c).collect();
        if s.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&s)
        }
    }
}
