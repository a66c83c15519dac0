//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, Player};

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Advancement value of a troop on its own home row
    pub distance_base: i32,
    /// Flat per-strength bonus for the evaluating side's troops
    pub own_troop_bonus: i32,
    /// Score for a decided game
    pub win_value: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            distance_base: 10,
            own_troop_bonus: 2,
            win_value: 1000,
        }
    }
}

/// Rows a troop still has to cover to reach the owner's goal row
pub fn distance_to_goal(row: usize, owner: Player, height: usize) -> i32 {
    let goal = owner.goal_row(height);
    (goal as i32 - row as i32).abs()
}

/// Evaluate from `ai`'s perspective (positive = good for `ai`).
///
/// Each troop scores `strength * (distance_base - distance_to_goal)`; the
/// AI's own troops add `strength * own_troop_bonus`. Opponent troops count
/// negatively. A decided game adds `+-win_value`.
pub fn evaluate(board: &Board, ai: Player, heuristics: &Heuristics) -> i32 {
    let height = board.height();
    let mut score = 0;

    for (row, _, troop) in board.troops() {
        let strength = troop.kind.strength();
        let advance = strength * (heuristics.distance_base - distance_to_goal(row, troop.owner, height));
        if troop.owner == ai {
            score += advance + strength * heuristics.own_troop_bonus;
        } else {
            score -= advance;
        }
    }

    match board.winner() {
        Some(w) if w == ai => score + heuristics.win_value,
        Some(_) => score - heuristics.win_value,
        None => score,
    }
}
