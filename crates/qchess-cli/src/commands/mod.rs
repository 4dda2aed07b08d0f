//! CLI command implementations.

pub mod board;
pub mod common;
pub mod play;
pub mod replay;
pub mod self_play;
pub mod version;
