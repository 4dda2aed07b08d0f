//! qchess command-line interface
//!
//! The main entry point for the qchess terminal front end.
//!
//! ```text
//!   8  r n b q k b n r
//!   7  p p p p p p p p
//!   6  . . . . . . . .        Q U A N T U M
//!   5  . . . . . . . .          C H E S S
//!   4  . . . . . . . .
//!   3  . . . . . . . .     pieces in superposition,
//!   2  P P P P P P P P     measured when they collide
//!   1  R N B Q K B N R
//!      a b c d e f g h
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use qchess_engine::{Config, LoggingConfig};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{board, play, replay, self_play, version};

/// qchess - quantum chess on a sparse state-vector simulator
#[derive(Parser)]
#[command(name = "qchess")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ~/.qchess/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game in the terminal
    Play {
        /// Who plays which side
        #[arg(short, long, value_enum, default_value_t = play::Mode::Pvp)]
        mode: play::Mode,

        /// Measurement seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Replay a move file (one command per line) and print the final board
    Replay {
        /// Move file
        file: PathBuf,

        /// Measurement seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Play random games against itself
    SelfPlay {
        /// Move limit per game (defaults to the configured limit)
        #[arg(short, long)]
        moves: Option<usize>,

        /// Number of games
        #[arg(short, long, default_value = "1")]
        games: usize,

        /// Seed of the first game; later games use consecutive seeds
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the final snapshots as JSON
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Print the starting position and its snapshot
    Board {
        /// Measurement seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show the version and the effective settings
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose, &config.logging);

    // Execute command
    let result = match cli.command {
        Commands::Play { mode, seed } => play::execute(&config, mode, seed),

        Commands::Replay { file, seed } => replay::execute(&config, &file, seed),

        Commands::SelfPlay {
            moves,
            games,
            seed,
            export,
        } => self_play::execute(&config, moves, games, seed, export.as_deref()),

        Commands::Board { seed } => board::execute(&config, seed),

        Commands::Version => {
            version::execute(&config, cli.config.as_deref());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

/// Verbosity flags win over the configured level.
fn init_logging(verbose: u8, logging: &LoggingConfig) {
    let filter = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
