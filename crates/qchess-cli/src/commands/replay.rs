//! Replay command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use qchess_engine::Config;

use super::common::{create_engine, print_record, read_commands};

/// Execute the replay command.
pub fn execute(config: &Config, file: &Path, seed: Option<u64>) -> Result<()> {
    let commands = read_commands(file)?;
    let mut engine = create_engine(config, seed)?;

    println!(
        "{} Replaying {} ({} moves, seed {})",
        style("→").cyan().bold(),
        style(file.display()).green(),
        commands.len(),
        style(engine.seed()).yellow()
    );

    for (line, command) in &commands {
        if engine.status().is_over() {
            anyhow::bail!("line {line}: game already over ({})", engine.status());
        }
        let record = engine
            .play_command(command)
            .with_context(|| format!("line {line}: '{command}'"))?;
        print_record(&record);
    }

    info!(moves = commands.len(), status = %engine.status(), "replay finished");

    println!();
    println!("{engine}");
    let snapshot = engine.game_state();
    println!(
        "Status: {}  Captured: {}  Expected pieces: {:.3}  Basis states: {}",
        style(snapshot.status).bold(),
        snapshot.captured.len(),
        snapshot.expected_pieces(),
        snapshot.basis_states
    );
    Ok(())
}
