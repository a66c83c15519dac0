//! Minimax AI with alpha-beta pruning

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Move, Player};
use crate::eval::{evaluate, Heuristics};
use crate::rules::{legal_moves, simulate_turn};

// ============================================================================
// STRATEGY SEAM
// ============================================================================

/// A move picker the turn controller can drive.
///
/// Implementations get a read-only snapshot and must explore on their own
/// clones. `None` means no legal placement exists.
pub trait Strategy {
    fn name(&self) -> &str;

    fn choose_move(&mut self, board: &Board, ai: Player) -> Option<Move>;
}

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of a minimax search
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Chosen placement (`None` if the home row is full)
    pub best_move: Option<Move>,
    /// Minimax value of the chosen placement
    pub score: i32,
    /// Positions visited, root children included
    pub nodes: u64,
}

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Depth-limited minimax player
#[derive(Clone, Debug)]
pub struct MinimaxAI {
    pub depth: u32,
    pub heuristics: Heuristics,
    pruning: bool,
    nodes: u64,
}

impl MinimaxAI {
    pub fn new(depth: u32, heuristics: Heuristics) -> Self {
        Self {
            depth,
            heuristics,
            pruning: true,
            nodes: 0,
        }
    }

    /// Turn alpha-beta cutoffs on or off. Only the node count differs.
    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    /// Search `self.depth` plies for the best placement for `ai` against
    /// `human`.
    ///
    /// The root ply counts toward the depth; depth 0 behaves like depth 1
    /// and scores each placement by the static heuristic of the board it
    /// produces. Equal scores keep the first (lowest column) move.
    pub fn search(&mut self, board: &Board, ai: Player, human: Player) -> SearchOutcome {
        self.nodes = 0;
        let child_depth = self.depth.saturating_sub(1);

        let mut best_move = None;
        let mut best_score = i32::MIN;
        let mut alpha = i32::MIN;
        let beta = i32::MAX;

        for mv in legal_moves(board, ai) {
            let child = simulate_turn(board, mv, ai);
            let score = self.minimax(&child, child_depth, alpha, beta, false, ai, human);

            if best_move.is_none() || score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
        }

        debug!(
            depth = self.depth,
            nodes = self.nodes,
            score = best_score,
            "minimax chose {:?}",
            best_move
        );

        SearchOutcome {
            best_move,
            score: best_score,
            nodes: self.nodes,
        }
    }

    /// Best placement for `ai`, or `None` when its home row is full
    pub fn best_move(&mut self, board: &Board, ai: Player, human: Player) -> Option<Move> {
        self.search(board, ai, human).best_move
    }

    /// Evaluate a position for `ai`
    pub fn evaluate(&self, board: &Board, ai: Player) -> i32 {
        evaluate(board, ai, &self.heuristics)
    }

    /// Nodes visited by the last search
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn pruning(&self) -> bool {
        self.pruning
    }

    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        ai: Player,
        human: Player,
    ) -> i32 {
        self.nodes += 1;

        if depth == 0 || board.winner().is_some() {
            return evaluate(board, ai, &self.heuristics);
        }

        // Whoever places at this level; the other side's troops advance
        let mover = if maximizing { ai } else { human };
        // An empty move list returns the sentinel unchanged
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for mv in legal_moves(board, mover) {
            let child = simulate_turn(board, mv, mover);
            let score = self.minimax(&child, depth - 1, alpha, beta, !maximizing, ai, human);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if self.pruning && beta <= alpha {
                break;
            }
        }

        best
    }
}

impl Default for MinimaxAI {
    fn default() -> Self {
        Self::new(3, Heuristics::default())
    }
}

impl Strategy for MinimaxAI {
    fn name(&self) -> &str {
        "minimax"
    }

    fn choose_move(&mut self, board: &Board, ai: Player) -> Option<Move> {
        self.best_move(board, ai, ai.opponent())
    }
}

/// One-shot minimax decision with default heuristics
pub fn choose_move(board: &Board, ai: Player, human: Player, max_depth: u32) -> Option<Move> {
    MinimaxAI::new(max_depth, Heuristics::default()).best_move(board, ai, human)
}

// ============================================================================
// TESTS
// ============================================================================
