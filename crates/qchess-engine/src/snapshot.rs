//! Serializable game snapshots.

use std::fmt;

use chrono::{DateTime, Utc};
use qchess_core::{Color, Piece, Square};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{CapturedPiece, CastlingRights, MoveRecord};

/// Whether the game is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Ongoing,
    /// Black's king was captured.
    WhiteWins,
    /// White's king was captured.
    BlackWins,
}

impl GameStatus {
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }

    /// Status after `color` loses its last king.
    pub const fn king_lost_by(color: Color) -> Self {
        match color {
            Color::White => GameStatus::BlackWins,
            Color::Black => GameStatus::WhiteWins,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => f.write_str("ongoing"),
            GameStatus::WhiteWins => f.write_str("white-wins"),
            GameStatus::BlackWins => f.write_str("black-wins"),
        }
    }
}

/// Tag and occupation probability of one square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareState {
    pub square: Square,
    pub piece: Option<Piece>,
    pub probability: f64,
}

/// Immutable copy of a game, suitable for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: Uuid,
    /// All 64 squares in index order.
    pub squares: Vec<SquareState>,
    /// Occupancy covariance between every pair of squares.
    pub correlations: Vec<Vec<f64>>,
    pub current_player: Color,
    pub moves: Vec<MoveRecord>,
    pub captured: Vec<CapturedPiece>,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub move_count: u32,
    pub status: GameStatus,
    /// Seed of the measurement random source.
    pub seed: u64,
    pub basis_states: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameSnapshot {
    /// State of one square.
    pub fn square(&self, square: Square) -> Option<&SquareState> {
        self.squares.get(square.index())
    }

    /// Sum of all occupation probabilities, i.e. the expected piece count.
    pub fn expected_pieces(&self) -> f64 {
        self.squares.iter().map(|s| s.probability).sum()
    }
}
