//! Version command implementation.

use std::path::Path;

use console::style;
use qchess_engine::Config;

/// Print the version and the settings a game would start with.
pub fn execute(config: &Config, config_file: Option<&Path>) {
    println!(
        "{} {}",
        style("qchess").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).yellow()
    );

    let source = match config_file {
        Some(path) => path.display().to_string(),
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        },
    };
    let seed = config
        .engine
        .seed
        .map_or_else(|| "random".to_string(), |s| s.to_string());

    println!();
    println!("{}", style(format!("Settings ({source})")).bold());
    println!("  seed              {seed}");
    println!("  max basis states  {}", config.engine.max_basis_states);
    println!("  split weight      {}", config.play.split_weight);
    println!("  self-play limit   {}", config.play.max_self_play_moves);
    println!(
        "  logging           {} ({})",
        config.logging.level, config.logging.format
    );
}
