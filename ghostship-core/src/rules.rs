//! Rule engine: placement validation, troop advance and combat, turn pipeline
//!
//! All functions operate on a `Board` passed in by the caller. Placement is a
//! raw mutation primitive; validation is a separate step so simulations can
//! skip it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::{Board, Cell, Move, Player, Troop, TroopType};

// ============================================================================
// ERRORS
// ============================================================================

/// Why a placement was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("{player} must place on row {expected}, not row {row}")]
    WrongRow {
        player: Player,
        row: usize,
        expected: usize,
    },

    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },

    #[error("cell ({row}, {col}) is outside the {width}x{height} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("game is over, {winner} has won")]
    GameOver { winner: Player },

    #[error("game ended in a draw after {turns} turns")]
    Drawn { turns: u32 },

    #[error("it is {expected}'s turn, not {player}'s")]
    NotYourTurn { player: Player, expected: Player },

    #[error("{player} cannot pass while ({row}, {col}) is free")]
    MustPlace { player: Player, row: usize, col: usize },
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// Check that `player` may place at (`row`, `col`).
///
/// Valid iff the row is the player's home row and the cell is empty. The
/// error's `Display` is the human-readable reason.
pub fn validate_placement(
    board: &Board,
    row: usize,
    col: usize,
    player: Player,
) -> Result<(), RuleError> {
    let expected = player.home_row(board.height());
    if row != expected {
        return Err(RuleError::WrongRow {
            player,
            row,
            expected,
        });
    }

    match board.cell(row, col) {
        None => Err(RuleError::OutOfBounds {
            row,
            col,
            width: board.width(),
            height: board.height(),
        }),
        Some(cell) if !cell.is_empty() => Err(RuleError::Occupied { row, col }),
        Some(_) => Ok(()),
    }
}

/// Boolean form of [`validate_placement`]
pub fn is_placement_valid(board: &Board, row: usize, col: usize, player: Player) -> bool {
    validate_placement(board, row, col, player).is_ok()
}

/// Put a troop on the board without validating the target.
///
/// Out-of-bounds coordinates are ignored with a warning.
pub fn place_troop(board: &mut Board, row: usize, col: usize, player: Player, kind: TroopType) {
    match board.cell_mut(row, col) {
        Some(cell) => *cell = Cell::occupied(Troop::new(kind, player)),
        None => warn!(row, col, "place_troop: coordinates outside the board, ignoring"),
    }
}

/// Clear a cell. Returns whether a troop was removed.
///
/// Out-of-bounds coordinates are a no-op with a warning.
pub fn remove_troop(board: &mut Board, row: usize, col: usize) -> bool {
    match board.cell_mut(row, col) {
        Some(cell) => {
            let removed = !cell.is_empty();
            cell.clear();
            removed
        }
        None => {
            warn!(row, col, "remove_troop: coordinates outside the board, ignoring");
            false
        }
    }
}

/// Every legal placement for `player`: empty home-row cells in ascending
/// column order, each with the board's next troop type
pub fn legal_moves(board: &Board, player: Player) -> Vec<Move> {
    if board.height() == 0 {
        return Vec::new();
    }
    let row = player.home_row(board.height());
    let troop = board.next_troop_type();
    board
        .empty_cells_in_row(row)
        .into_iter()
        .map(|col| Move::new(row, col, troop))
        .collect()
}

// ============================================================================
// ADVANCE AND COMBAT
// ============================================================================

/// What happened during one advance pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceSummary {
    /// Troops that stepped into an empty cell
    pub moved: u32,
    /// Troops that beat a weaker enemy and took its cell
    pub captured: u32,
    /// Troops that ran into a stronger enemy and were destroyed
    pub destroyed: u32,
    /// Troops that stayed put (friendly ahead or equal enemy)
    pub blocked: u32,
}

/// Advance every troop belonging to the opponent of `moving_player` one row
/// toward its goal, resolving combat.
///
/// Rows are processed from the destination side inward so no troop moves
/// twice in one pass. Per troop:
/// - empty target: step forward
/// - weaker enemy: replace it
/// - equal enemy or friendly troop: stay
/// - stronger enemy: the advancing troop is destroyed
pub fn advance_opponent_troops(board: &mut Board, moving_player: Player) -> AdvanceSummary {
    let advancing = moving_player.opponent();
    let direction = advancing.direction();
    let height = board.height();
    let mut summary = AdvanceSummary::default();

    if height < 2 {
        return summary;
    }

    let source_rows: Vec<usize> = if direction > 0 {
        (0..height - 1).rev().collect()
    } else {
        (1..height).collect()
    };

    for row in source_rows {
        let target_row = (row as isize + direction) as usize;
        for col in 0..board.width() {
            let troop = match board.cell(row, col).and_then(|c| c.troop) {
                Some(t) if t.owner == advancing => t,
                _ => continue,
            };
            let target = match board.cell(target_row, col) {
                Some(cell) => *cell,
                None => continue,
            };

            match target.troop {
                None => {
                    move_troop(board, (row, col), (target_row, col));
                    summary.moved += 1;
                }
                Some(other) if other.owner == advancing => {
                    summary.blocked += 1;
                }
                Some(enemy) if troop.kind > enemy.kind => {
                    debug!(
                        attacker = ?troop.kind, defender = ?enemy.kind, row = target_row, col,
                        "{} captures enemy troop", advancing
                    );
                    remove_troop(board, target_row, col);
                    move_troop(board, (row, col), (target_row, col));
                    summary.captured += 1;
                }
                Some(enemy) if troop.kind == enemy.kind => {
                    summary.blocked += 1;
                }
                Some(enemy) => {
                    debug!(
                        attacker = ?troop.kind, defender = ?enemy.kind, row, col,
                        "{} troop destroyed by stronger enemy", advancing
                    );
                    remove_troop(board, row, col);
                    summary.destroyed += 1;
                }
            }
        }
    }

    summary
}

fn move_troop(board: &mut Board, from: (usize, usize), to: (usize, usize)) {
    let troop = board.cell(from.0, from.1).and_then(|c| c.troop);
    if let (Some(troop), Some(_)) = (troop, board.cell(to.0, to.1)) {
        remove_troop(board, from.0, from.1);
        place_troop(board, to.0, to.1, troop.owner, troop.kind);
    }
}

// ============================================================================
// TURN PIPELINE
// ============================================================================

/// Play one full turn: place, advance the opponent's troops, check for a
/// winner, then rotate troop type and turn if the game goes on.
///
/// Does not validate `mv`; call [`validate_placement`] first.
pub fn apply_turn(board: &mut Board, mv: Move, player: Player) -> AdvanceSummary {
    place_troop(board, mv.row, mv.col, player, mv.troop);
    finish_turn(board, player)
}

/// Skip placement (no legal cell) but still resolve the rest of the turn
pub fn pass_turn(board: &mut Board, player: Player) -> AdvanceSummary {
    finish_turn(board, player)
}

/// Clone-then-apply, for search
pub fn simulate_turn(board: &Board, mv: Move, player: Player) -> Board {
    let mut next = board.clone();
    apply_turn(&mut next, mv, player);
    next
}

fn finish_turn(board: &mut Board, player: Player) -> AdvanceSummary {
    let summary = advance_opponent_troops(board, player);
    if board.check_for_winner().is_none() {
        board.rotate_next_troop_type();
        board.end_turn();
    }
    summary
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn put(board: &mut Board, row: usize, col: usize, kind: TroopType, owner: Player) {
        place_troop(board, row, col, owner, kind);
    }

    fn owner_at(board: &Board, row: usize, col: usize) -> Option<Player> {
        board.cell(row, col).and_then(|c| c.owner())
    }

    #[test]
    fn test_placement_only_on_home_row() {
        let board = Board::new(5, 7);
        assert!(is_placement_valid(&board, 0, 2, Player::One));
        assert!(is_placement_valid(&board, 6, 2, Player::Two));
        assert_eq!(
            validate_placement(&board, 6, 2, Player::One),
            Err(RuleError::WrongRow {
                player: Player::One,
                row: 6,
                expected: 0
            })
        );
        assert!(!is_placement_valid(&board, 3, 0, Player::Two));
    }

    #[test]
    fn test_placement_rejects_occupied_and_out_of_bounds() {
        let mut board = Board::new(3, 4);
        put(&mut board, 0, 1, TroopType::Small, Player::Two);
        assert_eq!(
            validate_placement(&board, 0, 1, Player::One),
            Err(RuleError::Occupied { row: 0, col: 1 })
        );
        assert!(matches!(
            validate_placement(&board, 0, 3, Player::One),
            Err(RuleError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_reason_is_readable() {
        let board = Board::new(3, 4);
        let err = validate_placement(&board, 2, 0, Player::Two).unwrap_err();
        assert_eq!(err.to_string(), "Player 2 must place on row 3, not row 2");
    }

    #[test]
    fn test_remove_troop_out_of_bounds_is_noop() {
        let mut board = Board::new(2, 2);
        put(&mut board, 0, 0, TroopType::Small, Player::One);
        let before = board.clone();
        assert!(!remove_troop(&mut board, 5, 0));
        assert!(!remove_troop(&mut board, 0, 5));
        assert_eq!(board, before);
        assert!(remove_troop(&mut board, 0, 0));
        assert!(board.cell(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_legal_moves_in_column_order() {
        let mut board = Board::new(4, 3);
        put(&mut board, 2, 1, TroopType::Small, Player::Two);
        board.rotate_next_troop_type();

        let moves = legal_moves(&board, Player::Two);
        assert_eq!(
            moves,
            vec![
                Move::new(2, 0, TroopType::Medium),
                Move::new(2, 2, TroopType::Medium),
                Move::new(2, 3, TroopType::Medium),
            ]
        );
    }

    #[test]
    fn test_advance_into_empty_cell() {
        let mut board = Board::new(1, 4);
        put(&mut board, 3, 0, TroopType::Small, Player::Two);

        let summary = advance_opponent_troops(&mut board, Player::One);
        assert_eq!(summary.moved, 1);
        assert_eq!(owner_at(&board, 2, 0), Some(Player::Two));
        assert!(board.cell(3, 0).unwrap().is_empty());
    }

    #[test]
    fn test_advance_moves_only_one_row_per_pass() {
        let mut board = Board::new(1, 5);
        put(&mut board, 0, 0, TroopType::Small, Player::One);
        advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(owner_at(&board, 1, 0), Some(Player::One));
        assert!(board.cell(2, 0).unwrap().is_empty());

        let mut board = Board::new(1, 5);
        put(&mut board, 4, 0, TroopType::Small, Player::Two);
        advance_opponent_troops(&mut board, Player::One);
        assert_eq!(owner_at(&board, 3, 0), Some(Player::Two));
        assert!(board.cell(2, 0).unwrap().is_empty());
    }

    #[test]
    fn test_column_of_troops_advances_together() {
        let mut board = Board::new(1, 5);
        put(&mut board, 0, 0, TroopType::Small, Player::One);
        put(&mut board, 1, 0, TroopType::Large, Player::One);

        let summary = advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(summary.moved, 2);
        assert_eq!(board.cell(2, 0).unwrap().kind(), Some(TroopType::Large));
        assert_eq!(board.cell(1, 0).unwrap().kind(), Some(TroopType::Small));
        assert!(board.cell(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_friendly_troop_blocks() {
        let mut board = Board::new(1, 4);
        put(&mut board, 3, 0, TroopType::Small, Player::One);
        put(&mut board, 2, 0, TroopType::Large, Player::One);

        let summary = advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(summary.blocked, 1);
        assert_eq!(board.troop_count(Player::One), 2);
        assert_eq!(board.cell(2, 0).unwrap().kind(), Some(TroopType::Large));
    }

    #[test]
    fn test_stronger_troop_captures() {
        let mut board = Board::new(1, 4);
        put(&mut board, 1, 0, TroopType::Large, Player::One);
        put(&mut board, 2, 0, TroopType::Medium, Player::Two);

        let summary = advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(summary.captured, 1);
        assert_eq!(
            board.cell(2, 0).unwrap().troop,
            Some(Troop::new(TroopType::Large, Player::One))
        );
        assert!(board.cell(1, 0).unwrap().is_empty());
        assert_eq!(board.troop_count(Player::Two), 0);
    }

    #[test]
    fn test_weaker_troop_is_destroyed() {
        let mut board = Board::new(1, 4);
        put(&mut board, 1, 0, TroopType::Small, Player::One);
        put(&mut board, 2, 0, TroopType::Medium, Player::Two);

        let summary = advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(summary.destroyed, 1);
        assert!(board.cell(1, 0).unwrap().is_empty());
        assert_eq!(owner_at(&board, 2, 0), Some(Player::Two));
    }

    #[test]
    fn test_equal_medium_troops_hold() {
        let mut board = Board::new(1, 4);
        put(&mut board, 1, 0, TroopType::Medium, Player::One);
        put(&mut board, 2, 0, TroopType::Medium, Player::Two);
        let before = board.clone();

        let summary = advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(summary.blocked, 1);
        assert_eq!(board, before);

        advance_opponent_troops(&mut board, Player::One);
        assert_eq!(board, before);
    }

    #[test]
    fn test_strength_ordering() {
        for attacker in TroopType::ALL {
            for defender in TroopType::ALL {
                let mut board = Board::new(1, 3);
                put(&mut board, 0, 0, attacker, Player::One);
                put(&mut board, 1, 0, defender, Player::Two);
                advance_opponent_troops(&mut board, Player::Two);

                let holder = owner_at(&board, 1, 0);
                if attacker > defender {
                    assert_eq!(holder, Some(Player::One), "{:?} vs {:?}", attacker, defender);
                } else {
                    assert_eq!(holder, Some(Player::Two), "{:?} vs {:?}", attacker, defender);
                }
            }
        }
    }

    #[test]
    fn test_single_column_scenario() {
        // 1 wide, 2 high
        let mut board = Board::new(1, 2);
        assert!(is_placement_valid(&board, 0, 0, Player::One));
        place_troop(&mut board, 0, 0, Player::One, TroopType::Small);

        // Player one just moved: nothing of player two's to advance
        let summary = advance_opponent_troops(&mut board, Player::One);
        assert_eq!(summary, AdvanceSummary::default());
        assert_eq!(board.check_for_winner(), None);

        // Player two's turn resolves player one's march
        advance_opponent_troops(&mut board, Player::Two);
        assert_eq!(owner_at(&board, 1, 0), Some(Player::One));
        assert_eq!(board.check_for_winner(), Some(Player::One));
    }

    #[test]
    fn test_apply_turn_rotates() {
        let mut board = Board::new(3, 5);
        let mv = legal_moves(&board, Player::One)[0];
        apply_turn(&mut board, mv, Player::One);

        assert_eq!(board.player_turn(), Player::Two);
        assert_eq!(board.next_troop_type(), TroopType::Medium);
        assert_eq!(owner_at(&board, 0, 0), Some(Player::One));
    }

    #[test]
    fn test_apply_turn_stops_at_winner() {
        let mut board = Board::new(1, 3);
        put(&mut board, 1, 0, TroopType::Medium, Player::One);
        board.end_turn();

        let mv = legal_moves(&board, Player::Two)[0];
        assert_eq!(mv, Move::new(2, 0, TroopType::Small));
        let summary = apply_turn(&mut board, mv, Player::Two);

        // The medium troop beats the fresh small one and lands on the goal row
        assert_eq!(summary.captured, 1);
        assert_eq!(board.winner(), Some(Player::One));
        assert_eq!(board.player_turn(), Player::Two);
        assert_eq!(board.next_troop_type(), TroopType::Small);
    }

    #[test]
    fn test_simulate_turn_leaves_source_untouched() {
        let board = Board::new(3, 3);
        let mv = legal_moves(&board, Player::One)[1];
        let next = simulate_turn(&board, mv, Player::One);

        assert_eq!(board, Board::new(3, 3));
        assert_eq!(owner_at(&next, 0, 1), Some(Player::One));
    }

    #[test]
    fn test_pass_turn_still_advances() {
        let mut board = Board::new(1, 3);
        put(&mut board, 2, 0, TroopType::Small, Player::Two);
        pass_turn(&mut board, Player::One);

        assert_eq!(owner_at(&board, 1, 0), Some(Player::Two));
        assert_eq!(board.player_turn(), Player::Two);
    }
}
