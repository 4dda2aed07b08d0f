//! Interactive game in the terminal.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;

use qchess_core::Color;
use qchess_engine::{Config, MoveEngine};

use super::common::{create_engine, move_picker, play_random, print_record};

/// Who plays which side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Two humans at one terminal
    Pvp,
    /// Human white, computer black
    Pvc,
    /// Computer white, human black
    Cvp,
}

impl Mode {
    /// Whether the computer moves for `color`.
    pub fn is_computer(self, color: Color) -> bool {
        matches!(
            (self, color),
            (Mode::Pvc, Color::Black) | (Mode::Cvp, Color::White)
        )
    }

    /// Plies taken back by `:undo`, so a human gets their own move back.
    fn undo_steps(self) -> usize {
        match self {
            Mode::Pvp => 1,
            Mode::Pvc | Mode::Cvp => 2,
        }
    }
}

const HELP: &str = "\
Moves:
  e2,e4      move or capture
  b1,a3c3    split b1 into a3 and c3
  a3c3,b1    merge a3 and c3 into b1
  e1h1,g1f1  castle, king and rook written out
  e7,e8q     promote (q, r, b, n)
  d1,d7,1    force measurement outcomes (1 = present)
Commands:
  :help :quit :undo :random :print :moves";

/// Execute the play command.
pub fn execute(config: &Config, mode: Mode, seed: Option<u64>) -> Result<()> {
    let mut engine = create_engine(config, seed)?;
    let mut rng = move_picker(&engine);
    let split_weight = config.play.split_weight;

    println!(
        "{} New game {} (seed {})",
        style("→").cyan().bold(),
        style(engine.id()).dim(),
        style(engine.seed()).yellow()
    );
    println!("Type {} for the notation.", style(":help").green());
    println!();
    println!("{engine}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !engine.status().is_over() {
        let side = engine.current_player();

        if mode.is_computer(side) {
            match play_random(&mut engine, split_weight, &mut rng)? {
                Some(record) => {
                    print_record(&record);
                    println!("{engine}");
                }
                None => {
                    println!("{} has no legal move.", side);
                    break;
                }
            }
            continue;
        }

        print!("{} ", style(format!("{side} >")).bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read input")?;
        let line = line.trim();

        match line {
            "" => {}
            ":quit" | ":q" => break,
            ":help" => println!("{HELP}"),
            ":print" => println!("{engine}"),
            ":moves" => print_moves(&engine),
            ":undo" => {
                let steps = mode.undo_steps().min(engine.history().len()).max(1);
                match engine.undo(steps) {
                    Ok(()) => println!("{engine}"),
                    Err(e) => report(&e),
                }
            }
            ":random" => match play_random(&mut engine, split_weight, &mut rng)? {
                Some(record) => {
                    print_record(&record);
                    println!("{engine}");
                }
                None => println!("{} has no legal move.", side),
            },
            command if command.starts_with(':') => {
                println!("Unknown command {}; try :help", style(command).yellow());
            }
            command => match engine.play_command(command) {
                Ok(record) => {
                    print_record(&record);
                    println!("{engine}");
                }
                Err(e) => report(&e),
            },
        }
    }

    if engine.status().is_over() {
        println!(
            "{} Game over: {}",
            style("✓").green().bold(),
            style(engine.status()).bold()
        );
    }
    Ok(())
}

fn print_moves(engine: &MoveEngine) {
    let moves: Vec<String> = engine.legal_moves().iter().map(ToString::to_string).collect();
    println!("{} legal moves:", moves.len());
    for row in moves.chunks(8) {
        println!("  {}", row.join("  "));
    }
}

fn report(error: &dyn std::error::Error) {
    println!("  {} {}", style("✗").red().bold(), error);
}
