//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm:
//! 1. Selection - Use UCB1 to traverse tree
//! 2. Expansion - Add child node
//! 3. Simulation - Rollout to terminal state
//! 4. Backpropagation - Update statistics
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases
//! - Level 4: Utilities

use std::time::Instant;

use ghostship_core::Move;
use serde::Serialize;
use tracing::debug;

use crate::rollout::RolloutEngine;
use crate::tree::{MctsTree, NodeId};
use crate::MctsConfig;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of MCTS search
#[derive(Debug)]
pub struct SearchResult {
    /// The final tree after search
    pub tree: MctsTree,
    /// Total simulations performed
    pub total_simulations: u32,
    /// Statistics for each root move, in column order
    pub move_stats: Vec<MoveStatistics>,
}

/// Statistics for a single move at root
#[derive(Clone, Debug, Serialize)]
pub struct MoveStatistics {
    pub mv: Move,
    pub visits: u32,
    pub win_rate: f32,
    pub ucb1: f32,
}

impl SearchResult {
    /// Get the best move (most visited)
    pub fn best_move(&self) -> Option<Move> {
        self.tree.best_move()
    }

    /// Get move with highest win rate, first one on ties
    pub fn highest_winrate_move(&self) -> Option<Move> {
        let mut best: Option<&MoveStatistics> = None;
        for stats in &self.move_stats {
            if best.map_or(true, |b| stats.win_rate > b.win_rate) {
                best = Some(stats);
            }
        }
        best.map(|s| s.mv)
    }

    /// Get all moves sorted by visits
    pub fn moves_by_visits(&self) -> Vec<(Move, u32)> {
        let mut moves: Vec<_> = self.move_stats
            .iter()
            .map(|s| (s.mv, s.visits))
            .collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run MCTS search
///
/// Level 2 function - coordinates the search phases. Stops after
/// `config.iterations` or when `config.time_limit` runs out.
pub fn run_search(mut tree: MctsTree, config: &MctsConfig, seed: u64) -> SearchResult {
    let mut rollout_engine = RolloutEngine::new(config.max_rollout_steps, seed);
    let started = Instant::now();

    for _ in 0..config.iterations {
        if config.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
            debug!(done = tree.total_simulations(), "mcts time limit reached");
            break;
        }
        run_single_iteration(&mut tree, config, &mut rollout_engine);
    }

    // Collect statistics
    let total_simulations = tree.total_simulations();
    let move_stats = collect_move_statistics(&tree, config.exploration);

    debug!(
        simulations = total_simulations,
        nodes = tree.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "mcts search finished"
    );

    SearchResult {
        tree,
        total_simulations,
        move_stats,
    }
}

// ============================================================================
// SINGLE ITERATION (Level 3 - MCTS Phases)
// ============================================================================

/// Single MCTS iteration
///
/// Level 3 function - implements one complete MCTS cycle.
fn run_single_iteration(tree: &mut MctsTree, config: &MctsConfig, rollout_engine: &mut RolloutEngine) {
    // Phase 1: Selection
    let path = tree.select_leaf(config.exploration);
    let leaf_id = path.last().copied().unwrap_or(NodeId::ROOT);

    // Phase 2: Expansion (if not terminal)
    let simulation_node = if !tree.get(leaf_id).is_terminal() && !tree.get(leaf_id).is_fully_expanded() {
        tree.expand(leaf_id).unwrap_or(leaf_id)
    } else {
        leaf_id
    };

    // Phase 3 and 4: Simulation and backpropagation
    for score in simulate_node(tree, simulation_node, config, rollout_engine) {
        tree.backpropagate(simulation_node, score);
    }
}

/// Scores for a node, from the AI's side: the known result if the game is
/// already decided, otherwise `rollouts_per_leaf` rollouts
fn simulate_node(
    tree: &MctsTree,
    node_id: NodeId,
    config: &MctsConfig,
    rollout_engine: &mut RolloutEngine,
) -> Vec<f32> {
    let ai = tree.ai();
    let node = tree.get(node_id);

    if let Some(winner) = node.board.winner() {
        return vec![if winner == ai { 1.0 } else { 0.0 }];
    }

    rollout_engine
        .rollout_batch(&node.board, node.to_move, config.rollouts_per_leaf.max(1))
        .iter()
        .map(|result| result.score(ai, config.draw_score))
        .collect()
}

// ============================================================================
// STATISTICS COLLECTION (Level 4 - Utilities)
// ============================================================================

/// Collect statistics for root moves
fn collect_move_statistics(tree: &MctsTree, exploration: f32) -> Vec<MoveStatistics> {
    let parent_visits = tree.total_simulations();

    tree.move_statistics()
        .into_iter()
        .map(|(mv, visits, win_rate)| {
            // Informational only; selection happens in the tree
            let ucb1 = if visits == 0 {
                f32::INFINITY
            } else {
                win_rate + exploration * ((parent_visits as f32).ln() / visits as f32).sqrt()
            };

            MoveStatistics {
                mv,
                visits,
                win_rate,
                ucb1,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
