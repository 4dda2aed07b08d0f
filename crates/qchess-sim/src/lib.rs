//! Quantum chess state simulation
//!
//! The board is held as a superposition of 64-bit occupancy patterns with a
//! piece tag bound to each square. Pieces move through the iSwap family of
//! gates, optionally conditioned on control squares, and are resolved by
//! measuring individual squares with a seeded random source.
//!
//! # Example
//!
//! ```rust
//! use qchess_sim::{Controls, QuantumStateSimulator};
//!
//! let mut sim = QuantumStateSimulator::from_board("b1N", Some(12345)).unwrap();
//! sim.split(1, 16, 18).unwrap(); // b1 -> a3 / c3
//! assert!((sim.probability(16).unwrap() - 0.5).abs() < 1e-9);
//!
//! sim.merge(16, 18, 16).unwrap();
//! assert!((sim.probability(16).unwrap() - 1.0).abs() < 1e-9);
//! # let _ = Controls::none();
//! ```

pub mod error;
pub mod rng;
pub mod simulator;

pub use error::{SimError, SimResult};
pub use rng::SeededRandom;
pub use simulator::{
    AMPLITUDE_EPSILON, CERTAINTY_EPSILON, Capture, Controls, Measurement, QuantumStateSimulator,
    SwapGate, SwapOutcome,
};
