//! Match command - Minimax vs MCTS over several games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use ghostship_core::{Game, GameConfig, MinimaxAI, Move, Outcome, Player, Strategy};
use ghostship_mcts::MctsPlayer;

use crate::config::AiConfig;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play (seats alternate)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Minimax search depth
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// MCTS iterations per move
    #[arg(long, default_value = "1000")]
    pub iterations: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Which strategy won a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
enum MatchWinner {
    Minimax,
    Mcts,
    Draw,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    winner: MatchWinner,
    turns: u32,
    minimax_seat: Player,
    /// Placement per turn, `None` for a pass
    moves: Vec<Option<Move>>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    minimax_wins: usize,
    mcts_wins: usize,
    draws: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Play the match (multiple games)
/// 2. Report results
pub fn run(args: MatchArgs, config: &GameConfig, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting match: minimax depth {} vs mcts {} iterations ({} games)",
        args.depth,
        args.iterations,
        args.games
    );

    let results = play_match(&args, config, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(args: &MatchArgs, config: &GameConfig, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    let progress = ProgressBar::new(args.games as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games {msg}")?
            .progress_chars("##-"),
    );

    for game_num in 0..args.games {
        // Alternate seats for fairness
        let minimax_seat = if game_num % 2 == 0 { Player::One } else { Player::Two };

        let record = play_single_game(game_num + 1, minimax_seat, args, config, &mut rng)?;

        tracing::info!(
            "Game {}: {:?} ({} turns)",
            record.game_number,
            record.winner,
            record.turns
        );

        games.push(record);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game with minimax in `minimax_seat`
fn play_single_game(
    game_number: usize,
    minimax_seat: Player,
    args: &MatchArgs,
    config: &GameConfig,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut minimax = MinimaxAI::new(args.depth, config.heuristics.clone());
    let mut mcts = MctsPlayer::new(AiConfig::mcts(args.iterations).with_seed(rng.gen()).mcts_config());

    let mut game = Game::new(config);
    while !game.is_over() {
        let strategy: &mut dyn Strategy = if game.current_player() == minimax_seat {
            &mut minimax
        } else {
            &mut mcts
        };
        game.play_strategy(strategy)?;
    }

    let winner = match game.outcome() {
        Outcome::Won(player) if player == minimax_seat => MatchWinner::Minimax,
        Outcome::Won(_) => MatchWinner::Mcts,
        _ => MatchWinner::Draw,
    };

    Ok(GameRecord {
        game_number,
        winner,
        turns: game.turns(),
        minimax_seat,
        moves: game.history().iter().map(|t| t.mv).collect(),
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |who: MatchWinner| games.iter().filter(|g| g.winner == who).count();
    let minimax_wins = count(MatchWinner::Minimax);
    let mcts_wins = count(MatchWinner::Mcts);
    let draws = count(MatchWinner::Draw);

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    MatchResults {
        games,
        minimax_wins,
        mcts_wins,
        draws,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Per-game entry in the JSON report
#[derive(Serialize)]
struct JsonGame {
    game_number: usize,
    winner: MatchWinner,
    turns: u32,
    minimax_seat: Player,
    moves: Vec<Option<Move>>,
}

#[derive(Serialize)]
struct JsonOutput {
    total_games: usize,
    minimax_wins: usize,
    mcts_wins: usize,
    draws: usize,
    avg_turns: f32,
    games: Vec<JsonGame>,
}

fn json_output(results: &MatchResults) -> JsonOutput {
    JsonOutput {
        total_games: results.games.len(),
        minimax_wins: results.minimax_wins,
        mcts_wins: results.mcts_wins,
        draws: results.draws,
        avg_turns: results.avg_turns,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.winner,
                turns: g.turns,
                minimax_seat: g.minimax_seat,
                moves: g.moves.clone(),
            })
            .collect(),
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    if let Ok(json) = serde_json::to_string_pretty(&json_output(results)) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games:   {}", total);
    println!(
        "Minimax wins:  {} ({:.1}%)",
        results.minimax_wins,
        percent(results.minimax_wins, total)
    );
    println!(
        "MCTS wins:     {} ({:.1}%)",
        results.mcts_wins,
        percent(results.mcts_wins, total)
    );
    println!("Draws:         {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg turns:     {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} in {} turns (minimax as {})",
            game.game_number, game.winner, game.turns, game.minimax_seat
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
