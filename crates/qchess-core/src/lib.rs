//! Quantum chess board primitives
//!
//! This crate holds the value types shared by the simulator and the rules
//! engine:
//!
//! - [`BitVector`]: an immutable 64-bit occupancy pattern (bit 0 = a1, bit 63 = h8)
//! - [`Square`]: a board coordinate with file, rank, index and algebraic name
//! - [`Piece`], [`PieceKind`], [`Color`]: the `KQRBNP` / `kqrbnp` tag alphabet
//!
//! # Example
//!
//! ```rust
//! use qchess_core::{BitVector, Square};
//!
//! let start = BitVector::standard_starting_position();
//! assert_eq!(start.to_hex(), "ffff00000000ffff");
//!
//! let e2: Square = "e2".parse().unwrap();
//! assert!(start.get(e2.index()).unwrap());
//! ```

pub mod bitvector;
pub mod error;
pub mod piece;
pub mod square;

pub use bitvector::{BOARD_SQUARES, BitVector};
pub use error::{CoreError, CoreResult};
pub use piece::{Color, Piece, PieceKind, STANDARD_TAGS};
pub use square::Square;
