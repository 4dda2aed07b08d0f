//! Board command implementation.

use anyhow::{Context, Result};

use qchess_engine::Config;

use super::common::create_engine;

/// Execute the board command.
pub fn execute(config: &Config, seed: Option<u64>) -> Result<()> {
    let engine = create_engine(config, seed)?;
    println!("{engine}");
    println!();

    let json = serde_json::to_string_pretty(&engine.game_state())
        .context("Failed to serialize snapshot")?;
    println!("{json}");
    Ok(())
}
