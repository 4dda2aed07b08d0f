//! Error types for the rules engine.

use qchess_core::CoreError;
use qchess_sim::SimError;
use thiserror::Error;

use crate::outcome::ValidationOutcome;
use crate::snapshot::GameStatus;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by [`crate::MoveEngine`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The move failed validation; nothing was changed.
    #[error("illegal move: {0}")]
    IllegalMove(ValidationOutcome),

    /// The move could grow the state past the configured cap.
    #[error("superposition limit reached: {current} basis states, cap {limit}")]
    SuperpositionLimit {
        /// Configured cap.
        limit: usize,
        /// Basis states before the move.
        current: usize,
    },

    /// The game has already ended.
    #[error("game is over ({0})")]
    GameOver(GameStatus),

    /// More moves were asked to be undone than were played.
    #[error("cannot undo {requested} moves, only {available} played")]
    NothingToUndo {
        /// Moves requested.
        requested: usize,
        /// Moves in the history.
        available: usize,
    },

    /// A move command could not be parsed.
    #[error(transparent)]
    Notation(#[from] NotationError),

    /// The simulator rejected an operation.
    #[error("simulator error: {0}")]
    Simulator(#[from] SimError),

    /// Invalid board primitive.
    #[error("board error: {0}")]
    Core(#[from] CoreError),
}

/// Errors from parsing move commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum NotationError {
    /// Nothing to parse.
    #[error("empty move command")]
    Empty,

    /// Expected `from,to` with an optional outcome field.
    #[error("expected 2 or 3 comma-separated fields, got {0}")]
    FieldCount(usize),

    /// A field that is not one or two squares.
    #[error("malformed field '{0}'")]
    Malformed(String),

    /// A square name that does not parse.
    #[error("invalid square in '{0}'")]
    Square(String),

    /// Promotion letter outside `qrbn`.
    #[error("invalid promotion piece '{0}'")]
    Promotion(char),

    /// Outcome field containing something other than `0`/`1`.
    #[error("invalid measurement outcome '{0}'")]
    Outcome(String),
}
