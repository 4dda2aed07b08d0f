//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use qchess_engine::{Config, EngineError, MoveEngine, MoveRecord, moves};
use qchess_sim::SeededRandom;

/// Build a game from the loaded configuration; `seed` overrides the configured seed.
pub fn create_engine(config: &Config, seed: Option<u64>) -> Result<MoveEngine> {
    let mut engine_config = config.engine.clone();
    if seed.is_some() {
        engine_config.seed = seed;
    }
    MoveEngine::from_config(&engine_config).context("Failed to set up the game")
}

/// Random source for computer moves, derived from the game seed so a seeded
/// game replays identically.
pub fn move_picker(engine: &MoveEngine) -> SeededRandom {
    SeededRandom::new(engine.seed().rotate_left(32))
}

/// Read a move file: one command per line, blank lines and `#` comments skipped.
///
/// Returns each command with its 1-based line number.
pub fn read_commands(path: &Path) -> Result<Vec<(usize, String)>> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.to_string()))
        .collect())
}

/// Play one random move for the side to move.
///
/// When a split or merge would exceed the basis-state cap, a classical move is
/// picked instead. Returns `None` when the side to move has no legal move.
pub fn play_random(
    engine: &mut MoveEngine,
    split_weight: f64,
    rng: &mut SeededRandom,
) -> Result<Option<MoveRecord>> {
    let Some(request) = engine.random_move(split_weight, rng) else {
        return Ok(None);
    };

    match engine.make_move(request) {
        Ok(record) => Ok(Some(record)),
        Err(EngineError::SuperpositionLimit { limit, current }) => {
            debug!(limit, current, "basis-state cap reached, picking a classical move");
            let classical: Vec<_> = engine
                .legal_moves()
                .into_iter()
                .filter(|m| !m.is_quantum())
                .collect();
            match moves::choose_random(&classical, 0.0, rng) {
                Some(request) => Ok(Some(engine.make_move(request)?)),
                None => Ok(None),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Print one played move.
pub fn print_record(record: &MoveRecord) {
    println!("  {} {}", style("→").cyan().bold(), record);
    if let Some(captured) = &record.captured {
        println!(
            "    {} {} on {} (p = {:.3})",
            style("captured").red(),
            captured.piece,
            captured.square,
            captured.probability
        );
    }
}
