//! GhostShip CLI - Command-line interface
//!
//! Commands:
//! - play: Play one game (humans and/or AIs)
//! - match: Minimax vs MCTS over several games
//! - benchmark: Time one decision per search setting

mod benchmark;
mod config;
mod match_cmd;
mod play_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghostship")]
#[command(about = "GhostShip troop placement game with minimax and MCTS opponents")]
struct Cli {
    /// Game config JSON (board size, heuristics, turn cap)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for reproducible AI play
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play minimax against MCTS
    Match(match_cmd::MatchArgs),
    /// Time minimax and MCTS decisions
    Benchmark(benchmark::BenchmarkArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let game_config = config::load_game_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, &game_config, cli.seed),
        Commands::Match(args) => match_cmd::run(args, &game_config, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, &game_config, cli.seed),
    }
}

/// RUST_LOG wins; otherwise info, or debug with --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
