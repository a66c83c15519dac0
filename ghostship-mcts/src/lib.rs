//! GhostShip MCTS - Monte Carlo Tree Search player
//!
//! This crate provides:
//! - Tree policy (UCB1, mirrored for the opponent's nodes)
//! - Random rollouts, optionally spread over rayon (`parallel` feature)
//! - Backpropagation of AI-perspective scores
//!
//! The searched board is never mutated: the tree owns clones.

pub mod rollout;
pub mod search;
pub mod tree;

use std::time::Duration;

use ghostship_core::rules::legal_moves;
use ghostship_core::{Board, Move, Player, Strategy};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use search::{run_search, MoveStatistics, SearchResult};
pub use tree::{MctsTree, NodeId};

/// MCTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Search iterations per move (one expansion each)
    pub iterations: usize,
    /// UCB1 exploration constant
    pub exploration: f32,
    /// Turns after which a rollout is scored as a draw
    pub max_rollout_steps: u32,
    /// Score given to a capped rollout
    pub draw_score: f32,
    /// Rollouts per expanded leaf
    pub rollouts_per_leaf: usize,
    /// Wall-clock budget per move, on top of `iterations`
    pub time_limit: Option<Duration>,
    /// Fixed seed for reproducible play
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration: std::f32::consts::SQRT_2,
            max_rollout_steps: 200,
            draw_score: 0.5,
            rollouts_per_leaf: 1,
            time_limit: None,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Default config with the given iteration count
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }
}

/// MCTS player
pub struct MctsPlayer {
    config: MctsConfig,
    rng: ChaCha8Rng,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run a full search for `ai`, who must be the player to move.
    ///
    /// Returns `None` when `ai` has no legal placement.
    pub fn search(&mut self, board: &Board, ai: Player) -> Option<SearchResult> {
        if legal_moves(board, ai).is_empty() {
            return None;
        }
        let seed = self.rng.gen();
        Some(run_search(MctsTree::new(board.clone(), ai), &self.config, seed))
    }

    /// Get best move using MCTS (most visited root child).
    ///
    /// Falls back to the first legal placement when the budget (iterations
    /// or time limit) ran out before any root child was expanded.
    pub fn best_move(&mut self, board: &Board, ai: Player) -> Option<Move> {
        let fallback = legal_moves(board, ai).first().copied();
        if self.config.iterations == 0 {
            return fallback;
        }

        let result = self.search(board, ai)?;
        let best = result.best_move().or(fallback);
        debug!(
            %ai,
            simulations = result.total_simulations,
            best = ?best,
            "mcts chose move"
        );
        best
    }
}

impl Strategy for MctsPlayer {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose_move(&mut self, board: &Board, ai: Player) -> Option<Move> {
        self.best_move(board, ai)
    }
}

/// One-shot MCTS move for `ai` against `human` with default settings
pub fn choose_move(board: &Board, ai: Player, human: Player, iterations: usize) -> Option<Move> {
    debug_assert_eq!(human, ai.opponent());
    MctsPlayer::new(MctsConfig::with_iterations(iterations)).best_move(board, ai)
}

// ============================================================================
// TESTS
// ============================================================================
