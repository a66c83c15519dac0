//! Play command - one game between humans and/or AIs
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_seats(), play_game()
//! - Level 3: take_turn(), read_human_move()
//! - Level 4: event rendering

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Args;

use ghostship_core::{Game, GameConfig, GameEvent, Outcome, Player, Strategy};

use crate::config::{AiConfig, PlayerType};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Who plays player one (bottom row)
    #[arg(long, value_enum, default_value = "human")]
    pub player1: PlayerType,

    /// Who plays player two (top row)
    #[arg(long, value_enum, default_value = "minimax")]
    pub player2: PlayerType,

    /// Minimax search depth
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// MCTS iterations per move
    #[arg(long, default_value = "1000")]
    pub iterations: usize,

    /// MCTS time limit per move in milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,
}

/// One side of the table. `None` strategy means a human at the keyboard.
pub struct Seat {
    pub player: Player,
    pub strategy: Option<Box<dyn Strategy>>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, config: &GameConfig, seed: Option<u64>) -> Result<()> {
    let mut seats = build_seats(&args, config, seed);

    tracing::info!(
        "Starting game: {:?} vs {:?} on {}x{}",
        args.player1,
        args.player2,
        config.width,
        config.height
    );

    let mut game = Game::new(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = play_game(&mut game, &mut seats, &mut stdin.lock(), &mut stdout.lock())?;

    tracing::info!("Game finished after {} turns: {:?}", game.turns(), outcome);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Seats for both players, each AI seeded from `seed` when given
fn build_seats(args: &PlayArgs, config: &GameConfig, seed: Option<u64>) -> [Seat; 2] {
    let seat = |player: Player, player_type: PlayerType| {
        let mut ai = AiConfig {
            depth: args.depth,
            iterations: args.iterations,
            time_limit_ms: args.time_limit_ms,
            ..AiConfig::new(player_type)
        }
        .with_heuristics(config.heuristics.clone());
        if let Some(seed) = seed {
            ai = ai.with_seed(seed.wrapping_add(player.number() as u64));
        }
        Seat {
            player,
            strategy: ai.build_strategy(),
        }
    };

    [seat(Player::One, args.player1), seat(Player::Two, args.player2)]
}

/// Drive `game` to its end, reading human moves from `input` and writing
/// the running commentary to `output`
pub fn play_game<R: BufRead, W: Write>(
    game: &mut Game,
    seats: &mut [Seat; 2],
    input: &mut R,
    output: &mut W,
) -> Result<Outcome> {
    writeln!(output, "{}", game.board())?;

    while !game.is_over() {
        let player = game.current_player();
        let seat = seats
            .iter_mut()
            .find(|s| s.player == player)
            .context("no seat for the player to move")?;

        take_turn(game, seat, input, output)?;
        render_events(game, output)?;
    }

    Ok(game.outcome())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Let the seat's AI or human make one move (or pass)
fn take_turn<R: BufRead, W: Write>(game: &mut Game, seat: &mut Seat, input: &mut R, output: &mut W) -> Result<()> {
    if let Some(strategy) = seat.strategy.as_mut() {
        game.play_strategy(strategy.as_mut())?;
        return Ok(());
    }

    if game.legal_moves().is_empty() {
        game.pass()?;
        return Ok(());
    }

    loop {
        let col = read_human_move(game, input, output)?;
        match game.place(col) {
            Ok(_) => return Ok(()),
            Err(err) => writeln!(output, "{}", err)?,
        }
    }
}

/// Prompt until the player types a column number
fn read_human_move<R: BufRead, W: Write>(game: &Game, input: &mut R, output: &mut W) -> Result<usize> {
    let cols: Vec<String> = game.legal_moves().iter().map(|m| m.col.to_string()).collect();

    loop {
        write!(
            output,
            "{} places {:?}, column [{}]: ",
            game.current_player(),
            game.board().next_troop_type(),
            cols.join(", ")
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed before the game ended");
        }
        match line.trim().parse::<usize>() {
            Ok(col) => return Ok(col),
            Err(_) => writeln!(output, "'{}' is not a column number", line.trim())?,
        }
    }
}

// ============================================================================
// LEVEL 4 - RENDERING
// ============================================================================

fn render_events<W: Write>(game: &mut Game, output: &mut W) -> Result<()> {
    for event in game.take_events() {
        match event {
            GameEvent::TroopPlaced { player, mv } => writeln!(output, "{} places {}", player, mv)?,
            GameEvent::Passed { player } => writeln!(output, "{} cannot place and passes", player)?,
            GameEvent::TroopsAdvanced { player, summary } if summary.captured + summary.destroyed > 0 => {
                writeln!(
                    output,
                    "{}'s troops advance: {} captured, {} lost",
                    player, summary.captured, summary.destroyed
                )?
            }
            GameEvent::BoardChanged => writeln!(output, "{}", game.board())?,
            GameEvent::GameOver { outcome: Outcome::Won(winner) } => writeln!(output, "{} wins!", winner)?,
            GameEvent::GameOver { outcome } => writeln!(output, "Game over: {:?}", outcome)?,
            GameEvent::TroopsAdvanced { .. } | GameEvent::TurnEnded { .. } => {}
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
