//! Benchmark command - time one decision for each search
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_minimax_benchmarks(), run_mcts_benchmark(), report_results()
//! - Level 3: benchmark_minimax(), benchmark_mcts()
//! - Level 4: formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use ghostship_core::{Board, GameConfig, MinimaxAI, Player};
use ghostship_mcts::MctsPlayer;

use crate::config::AiConfig;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Maximum minimax depth to test (1..=depth)
    #[arg(long, default_value = "5")]
    pub depth: u32,

    /// MCTS iterations
    #[arg(long, default_value = "1000")]
    pub iterations: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of a single benchmark run
#[derive(Clone, Debug, Serialize)]
struct BenchmarkResult {
    name: String,
    #[serde(serialize_with = "duration_ms::serialize")]
    time: Duration,
    /// Positions searched (minimax) or simulations (MCTS)
    work: u64,
    chosen: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// This function reads like a table of contents:
/// 1. Time minimax at every depth, with and without pruning
/// 2. Time one MCTS decision
/// 3. Report all results
pub fn run(args: BenchmarkArgs, config: &GameConfig, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting benchmarks: depth 1..={}, mcts {} iterations on {}x{}",
        args.depth,
        args.iterations,
        config.width,
        config.height
    );

    let board = config.new_board();
    let mut results = run_minimax_benchmarks(&args, config, &board);
    results.push(run_mcts_benchmark(&args, &board, seed));

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn run_minimax_benchmarks(args: &BenchmarkArgs, config: &GameConfig, board: &Board) -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    for depth in 1..=args.depth {
        for pruning in [true, false] {
            tracing::info!("Benchmarking minimax at depth {} (pruning: {})...", depth, pruning);
            let ai = MinimaxAI::new(depth, config.heuristics.clone()).with_pruning(pruning);
            results.push(benchmark_minimax(ai, board));
        }
    }
    results
}

fn run_mcts_benchmark(args: &BenchmarkArgs, board: &Board, seed: Option<u64>) -> BenchmarkResult {
    tracing::info!("Benchmarking MCTS ({} iterations)...", args.iterations);
    let mut ai = AiConfig::mcts(args.iterations);
    ai.seed = seed;
    benchmark_mcts(MctsPlayer::new(ai.mcts_config()), board)
}

fn report_results(results: &[BenchmarkResult], args: &BenchmarkArgs) {
    if args.json {
        if let Ok(json) = serde_json::to_string_pretty(results) {
            println!("{}", json);
        }
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn benchmark_minimax(mut ai: MinimaxAI, board: &Board) -> BenchmarkResult {
    let start = Instant::now();
    let outcome = ai.search(board, Player::One, Player::Two);
    let time = start.elapsed();

    BenchmarkResult {
        name: format!(
            "Minimax D{}{}",
            ai.depth,
            if ai.pruning() { "" } else { " (no pruning)" }
        ),
        time,
        work: outcome.nodes,
        chosen: describe(outcome.best_move.map(|m| m.col)),
    }
}

fn benchmark_mcts(mut player: MctsPlayer, board: &Board) -> BenchmarkResult {
    let iterations = player.config().iterations;
    let start = Instant::now();
    let result = player.search(board, Player::One);
    let time = start.elapsed();

    BenchmarkResult {
        name: format!("MCTS {} iters", iterations),
        time,
        work: result.as_ref().map_or(0, |r| r.total_simulations as u64),
        chosen: describe(result.and_then(|r| r.best_move()).map(|m| m.col)),
    }
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn describe(col: Option<usize>) -> String {
    match col {
        Some(col) => format!("column {}", col),
        None => "pass".to_string(),
    }
}

fn print_text_results(results: &[BenchmarkResult]) {
    println!("\n=== Benchmark Results ===");
    println!("{:<26} {:>12} {:>12}  {}", "Search", "Time", "Nodes/Sims", "Choice");
    for result in results {
        println!(
            "{:<26} {:>10.2}ms {:>12}  {}",
            result.name,
            result.time.as_secs_f64() * 1000.0,
            result.work,
            result.chosen
        );
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
