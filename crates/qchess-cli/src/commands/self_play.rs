//! Self-play command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use qchess_engine::{Config, GameSnapshot, GameStatus};

use super::common::{create_engine, move_picker, play_random};

/// Execute the self-play command.
pub fn execute(
    config: &Config,
    moves: Option<usize>,
    games: usize,
    seed: Option<u64>,
    export: Option<&Path>,
) -> Result<()> {
    if games == 0 {
        anyhow::bail!("--games must be at least 1");
    }
    let max_moves = moves.unwrap_or(config.play.max_self_play_moves);
    let base_seed = seed.or(config.engine.seed);

    println!(
        "{} Self-play: {} game(s), up to {} moves each, split weight {}",
        style("→").cyan().bold(),
        games,
        max_moves,
        config.play.split_weight
    );

    let progress = ProgressBar::new(games as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut snapshots = Vec::with_capacity(games);
    for game in 0..games {
        let game_seed = base_seed.map(|s| s.wrapping_add(game as u64));
        let snapshot = play_one(config, game_seed, max_moves)?;
        info!(
            game,
            seed = snapshot.seed,
            moves = snapshot.move_count,
            status = %snapshot.status,
            "self-play game finished"
        );
        progress.set_message(format!("last: {} moves, {}", snapshot.move_count, snapshot.status));
        progress.inc(1);
        snapshots.push(snapshot);
    }
    progress.finish_and_clear();

    print_summary(&snapshots);

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&snapshots)
            .context("Failed to serialize snapshots")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "{} Exported {} snapshot(s) to {}",
            style("✓").green().bold(),
            snapshots.len(),
            style(path.display()).green()
        );
    }
    Ok(())
}

fn play_one(config: &Config, seed: Option<u64>, max_moves: usize) -> Result<GameSnapshot> {
    let mut engine = create_engine(config, seed)?;
    let mut rng = move_picker(&engine);

    for _ in 0..max_moves {
        if engine.status().is_over() {
            break;
        }
        if play_random(&mut engine, config.play.split_weight, &mut rng)?.is_none() {
            break;
        }
    }
    Ok(engine.game_state())
}

fn print_summary(snapshots: &[GameSnapshot]) {
    let count = |status: GameStatus| snapshots.iter().filter(|s| s.status == status).count();
    let total_moves: u64 = snapshots.iter().map(|s| u64::from(s.move_count)).sum();

    println!();
    println!("Results:");
    println!("  White wins:  {}", style(count(GameStatus::WhiteWins)).bold());
    println!("  Black wins:  {}", style(count(GameStatus::BlackWins)).bold());
    println!("  Unfinished:  {}", count(GameStatus::Ongoing));
    println!(
        "  Avg. moves:  {:.1}",
        total_moves as f64 / snapshots.len().max(1) as f64
    );
}
