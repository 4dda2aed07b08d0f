//! Quantum chess rules engine
//!
//! [`MoveEngine`] owns a [`qchess_sim::QuantumStateSimulator`] and the chess
//! bookkeeping around it: side to move, castling rights, en passant, captures
//! and the move history. Moves are validated against marginal probabilities
//! and then played as iSwap-family gates, with measurements resolving
//! captures and blocked destinations.
//!
//! # Move archetypes
//!
//! | Request          | Gates                                           |
//! |------------------|-------------------------------------------------|
//! | normal           | `iswap(src, dst)`                               |
//! | capture          | measure `dst`, measure `src`, remove, `iswap`   |
//! | blocked          | measure `dst`; move only if it was empty        |
//! | split            | `iswap(src, d1)`, `sqrt_iswap(d1, d2)`          |
//! | merge            | `sqrt_iswap_dagger(s1, s2)`, `iswap_dagger`     |
//! | castle           | `iswap` for the king, then for the rook         |
//! | en passant       | measure and remove the passed pawn, `iswap`     |
//!
//! # Example
//!
//! ```rust
//! use qchess_engine::{MoveEngine, MoveType};
//!
//! let mut game = MoveEngine::with_seed(12345).unwrap();
//! game.play_command("e2,e4").unwrap();
//! let record = game.play_command("g8,f6h6").unwrap();
//! assert_eq!(record.move_type, MoveType::Split);
//!
//! let snapshot = game.game_state();
//! assert_eq!(snapshot.move_count, 2);
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod moves;
pub mod notation;
pub mod outcome;
pub mod record;
pub mod request;
pub mod rules;
pub mod snapshot;

pub use config::{Config, ConfigError, EngineConfig, LoggingConfig, PlayConfig};
pub use error::{EngineError, EngineResult, NotationError};
pub use game::MoveEngine;
pub use notation::MoveCommand;
pub use outcome::ValidationOutcome;
pub use record::{CapturedPiece, CastlingRights, MoveRecord, MoveType};
pub use request::MoveRequest;
pub use snapshot::{GameSnapshot, GameStatus, SquareState};
