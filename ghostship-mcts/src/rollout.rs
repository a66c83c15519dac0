//! Rollout (simulation) strategies for MCTS
//!
//! ## Architecture
//! - Level 2: Batch rollout coordination
//! - Level 3: Single rollout implementation
//! - Level 4: Random move selection

use ghostship_core::rules::{apply_turn, legal_moves, pass_turn};
use ghostship_core::{Board, Move, Player};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a rollout simulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RolloutResult {
    /// Winner, or `None` if the step cap was hit first
    pub winner: Option<Player>,
    /// Turns played (passes included)
    pub turns_played: u32,
}

impl RolloutResult {
    /// Score for `ai`: 1 for a win, 0 for a loss, `draw_score` otherwise
    pub fn score(&self, ai: Player, draw_score: f32) -> f32 {
        match self.winner {
            Some(winner) if winner == ai => 1.0,
            Some(_) => 0.0,
            None => draw_score,
        }
    }
}

// ============================================================================
// CPU ROLLOUT (Level 3 - Single Rollout)
// ============================================================================

/// Play uniformly random turns from `board` with `to_move` placing first.
///
/// A player with a full home row passes. Stops at a winner or after
/// `max_steps` turns.
pub fn cpu_rollout<R: Rng>(board: &Board, to_move: Player, max_steps: u32, rng: &mut R) -> RolloutResult {
    let mut current = board.clone();
    let mut player = to_move;
    let mut turns_played = 0;

    while current.winner().is_none() && turns_played < max_steps {
        let moves = legal_moves(&current, player);
        match select_random_move(&moves, rng) {
            Some(mv) => {
                apply_turn(&mut current, mv, player);
            }
            None => {
                pass_turn(&mut current, player);
            }
        }
        player = player.opponent();
        turns_played += 1;
    }

    RolloutResult {
        winner: current.winner(),
        turns_played,
    }
}

/// Select a random move uniformly from the list
fn select_random_move<R: Rng>(moves: &[Move], rng: &mut R) -> Option<Move> {
    moves.choose(rng).copied()
}

// ============================================================================
// BATCH ROLLOUT (Level 2 - Batch Coordination)
// ============================================================================

/// Seeded rollout runner shared across one search
pub struct RolloutEngine {
    max_steps: u32,
    rng: ChaCha8Rng,
}

impl RolloutEngine {
    pub fn new(max_steps: u32, seed: u64) -> Self {
        Self {
            max_steps,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Run `count` rollouts from the same position
    ///
    /// Spreads them over rayon when built with the `parallel` feature.
    pub fn rollout_batch(&mut self, board: &Board, to_move: Player, count: usize) -> Vec<RolloutResult> {
        if count > 1 {
            self.cpu_rollout_batch(board, to_move, count)
        } else {
            self.sequential_batch(board, to_move, count)
        }
    }

    fn sequential_batch(&mut self, board: &Board, to_move: Player, count: usize) -> Vec<RolloutResult> {
        (0..count)
            .map(|_| cpu_rollout(board, to_move, self.max_steps, &mut self.rng))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn cpu_rollout_batch(&mut self, board: &Board, to_move: Player, count: usize) -> Vec<RolloutResult> {
        let seed = self.rng.gen();
        parallel_cpu_rollouts(board, to_move, count, self.max_steps, seed)
    }

    #[cfg(not(feature = "parallel"))]
    fn cpu_rollout_batch(&mut self, board: &Board, to_move: Player, count: usize) -> Vec<RolloutResult> {
        self.sequential_batch(board, to_move, count)
    }
}

// ============================================================================
// PARALLEL CPU ROLLOUT
// ============================================================================

/// Parallel CPU rollouts using rayon
#[cfg(feature = "parallel")]
pub fn parallel_cpu_rollouts(
    board: &Board,
    to_move: Player,
    count: usize,
    max_steps: u32,
    seed: u64,
) -> Vec<RolloutResult> {
    use rayon::prelude::*;

    (0..count)
        .into_par_iter()
        .map(|i| {
            // Each rollout gets a unique seed based on index
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            cpu_rollout(board, to_move, max_steps, &mut rng)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
