//! Board state model: grid of cells, turn, next troop type, winner

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// PLAYERS AND TROOPS
// ============================================================================

/// Player seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Row delta this player's troops march in
    pub fn direction(self) -> isize {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }

    /// Placement row (0 for player one, last row for player two)
    pub fn home_row(self, height: usize) -> usize {
        match self {
            Player::One => 0,
            Player::Two => height.saturating_sub(1),
        }
    }

    /// Row this player must reach to win
    pub fn goal_row(self, height: usize) -> usize {
        self.opponent().home_row(height)
    }

    /// Seat number as shown to humans
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Troop size. The discriminant is the combat strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TroopType {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl TroopType {
    pub const ALL: [TroopType; 3] = [TroopType::Small, TroopType::Medium, TroopType::Large];

    pub fn strength(self) -> i32 {
        self as i32
    }

    /// Next type in the placement cycle
    pub fn next(self) -> Self {
        match self {
            TroopType::Small => TroopType::Medium,
            TroopType::Medium => TroopType::Large,
            TroopType::Large => TroopType::Small,
        }
    }

    fn symbol(self) -> char {
        match self {
            TroopType::Small => 's',
            TroopType::Medium => 'm',
            TroopType::Large => 'l',
        }
    }
}

/// A troop on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Troop {
    pub kind: TroopType,
    pub owner: Player,
}

impl Troop {
    pub fn new(kind: TroopType, owner: Player) -> Self {
        Self { kind, owner }
    }
}

/// A board square. An empty cell has neither troop type nor owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub troop: Option<Troop>,
}

impl Cell {
    pub const EMPTY: Cell = Cell { troop: None };

    pub fn occupied(troop: Troop) -> Self {
        Self { troop: Some(troop) }
    }

    pub fn is_empty(&self) -> bool {
        self.troop.is_none()
    }

    pub fn owner(&self) -> Option<Player> {
        self.troop.map(|t| t.owner)
    }

    pub fn kind(&self) -> Option<TroopType> {
        self.troop.map(|t| t.kind)
    }

    pub fn clear(&mut self) {
        self.troop = None;
    }
}

/// One row of cells, fixed width
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Cell::EMPTY; width],
        }
    }
}

/// A placement: put `troop` at (`row`, `col`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub troop: TroopType,
}

impl Move {
    pub fn new(row: usize, col: usize, troop: TroopType) -> Self {
        Self { row, col, troop }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at ({}, {})", self.troop, self.row, self.col)
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Full game state (clone to explore)
///
/// Row 0 is player one's home row, the last row is player two's. `Clone`
/// is a deep copy: rows and cells are owned values, so a clone shares
/// nothing with its source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: Vec<Row>,
    player_turn: Player,
    next_troop_type: TroopType,
    winner: Option<Player>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board, player one to move, small troops first
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: (0..height).map(|_| Row::empty(width)).collect(),
            player_turn: Player::One,
            next_troop_type: TroopType::Small,
            winner: None,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.cells.len())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn player_turn(&self) -> Player {
        self.player_turn
    }

    pub fn next_troop_type(&self) -> TroopType {
        self.next_troop_type
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height() && col < self.width()
    }

    /// Cell at (row, col), `None` when out of bounds
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Iterate occupied cells as (row, col, troop)
    pub fn troops(&self) -> impl Iterator<Item = (usize, usize, Troop)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.cells
                .iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.troop.map(|t| (r, c, t)))
        })
    }

    /// Number of troops a player has on the board
    pub fn troop_count(&self, player: Player) -> usize {
        self.troops().filter(|(_, _, t)| t.owner == player).count()
    }

    /// Empty columns of a row, ascending
    pub fn empty_cells_in_row(&self, row: usize) -> Vec<usize> {
        match self.rows.get(row) {
            Some(r) => r
                .cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_empty())
                .map(|(c, _)| c)
                .collect(),
            None => Vec::new(),
        }
    }

    // ========================================================================
    // STATE TRANSITIONS
    // ========================================================================

    /// Record a winner if one side has reached the far row.
    ///
    /// Player one reaching the last row is checked first. An already
    /// decided winner is never cleared.
    pub fn check_for_winner(&mut self) -> Option<Player> {
        let height = self.height();
        if height == 0 {
            return self.winner;
        }

        let reached = |row: &Row, player: Player| row.cells.iter().any(|c| c.owner() == Some(player));

        if reached(&self.rows[Player::One.goal_row(height)], Player::One) {
            self.winner = Some(Player::One);
        } else if reached(&self.rows[Player::Two.goal_row(height)], Player::Two) {
            self.winner = Some(Player::Two);
        }

        self.winner
    }

    /// Cycle Small -> Medium -> Large -> Small
    pub fn rotate_next_troop_type(&mut self) {
        self.next_troop_type = self.next_troop_type.next();
    }

    /// Hand the turn to the other player
    pub fn end_turn(&mut self) {
        self.player_turn = self.player_turn.opponent();
    }
}

impl fmt::Display for Board {
    /// Last row first, so player one's home row is at the bottom
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows.iter().enumerate().rev() {
            write!(f, "{:>2} |", r)?;
            for cell in &row.cells {
                match cell.troop {
                    None => write!(f, " .")?,
                    Some(t) => {
                        let sym = t.kind.symbol();
                        let sym = if t.owner == Player::One {
                            sym.to_ascii_uppercase()
                        } else {
                            sym
                        };
                        write!(f, " {}", sym)?
                    }
                }
            }
            writeln!(f)?;
        }
        write!(f, "    ")?;
        for c in 0..self.width() {
            write!(f, "{:>2}", c % 10)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = Board::new(5, 7);
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 7);
        assert_eq!(board.player_turn(), Player::One);
        assert_eq!(board.next_troop_type(), TroopType::Small);
        assert_eq!(board.winner(), None);
        assert_eq!(board.troops().count(), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let board = Board::new(3, 3);
        let mut clone = board.clone();
        assert_eq!(board, clone);

        *clone.cell_mut(1, 1).unwrap() = Cell::occupied(Troop::new(TroopType::Large, Player::Two));
        clone.rotate_next_troop_type();
        clone.end_turn();

        assert!(board.cell(1, 1).unwrap().is_empty());
        assert_eq!(board.next_troop_type(), TroopType::Small);
        assert_eq!(board.player_turn(), Player::One);
    }

    #[test]
    fn test_troop_rotation_cycles() {
        let mut board = Board::new(1, 1);
        board.rotate_next_troop_type();
        assert_eq!(board.next_troop_type(), TroopType::Medium);
        board.rotate_next_troop_type();
        assert_eq!(board.next_troop_type(), TroopType::Large);
        board.rotate_next_troop_type();
        assert_eq!(board.next_troop_type(), TroopType::Small);
    }

    #[test]
    fn test_player_rows() {
        assert_eq!(Player::One.home_row(7), 0);
        assert_eq!(Player::Two.home_row(7), 6);
        assert_eq!(Player::One.goal_row(7), 6);
        assert_eq!(Player::Two.goal_row(7), 0);
        assert_eq!(Player::One.direction(), 1);
        assert_eq!(Player::Two.direction(), -1);
    }

    #[test]
    fn test_winner_player_one_checked_first() {
        let mut board = Board::new(2, 3);
        *board.cell_mut(2, 0).unwrap() = Cell::occupied(Troop::new(TroopType::Small, Player::One));
        *board.cell_mut(0, 1).unwrap() = Cell::occupied(Troop::new(TroopType::Small, Player::Two));

        assert_eq!(board.check_for_winner(), Some(Player::One));
    }

    #[test]
    fn test_winner_is_sticky() {
        let mut board = Board::new(1, 3);
        *board.cell_mut(0, 0).unwrap() = Cell::occupied(Troop::new(TroopType::Small, Player::Two));
        assert_eq!(board.check_for_winner(), Some(Player::Two));

        board.cell_mut(0, 0).unwrap().clear();
        assert_eq!(board.check_for_winner(), Some(Player::Two));
    }

    #[test]
    fn test_no_winner_on_empty_board() {
        let mut board = Board::new(4, 4);
        assert_eq!(board.check_for_winner(), None);
        assert_eq!(board.check_for_winner(), None);
    }

    #[test]
    fn test_empty_cells_in_row() {
        let mut board = Board::new(4, 2);
        *board.cell_mut(0, 2).unwrap() = Cell::occupied(Troop::new(TroopType::Small, Player::One));
        assert_eq!(board.empty_cells_in_row(0), vec![0, 1, 3]);
        assert!(board.empty_cells_in_row(9).is_empty());
    }

    #[test]
    fn test_display_marks_owners() {
        let mut board = Board::new(2, 2);
        *board.cell_mut(0, 0).unwrap() = Cell::occupied(Troop::new(TroopType::Large, Player::One));
        *board.cell_mut(1, 1).unwrap() = Cell::occupied(Troop::new(TroopType::Medium, Player::Two));
        let text = board.to_string();
        assert!(text.contains(" 1 | . m"));
        assert!(text.contains(" 0 | L ."));
    }
}
