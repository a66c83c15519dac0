//! Turn controller: owns the authoritative board and drives the turn cycle
//!
//! AwaitingPlacement(player) -> placed -> opponent troops advanced ->
//! winner checked -> turn rotated -> AwaitingPlacement(other player).
//! A decided winner (or the turn cap) ends the game; later placements are
//! rejected.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::Strategy;
use crate::board::{Board, Move, Player};
use crate::config::GameConfig;
use crate::rules::{self, AdvanceSummary, RuleError};

// ============================================================================
// TYPES
// ============================================================================

/// How the game stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Won(Player),
    /// Turn cap reached without a winner
    Draw,
}

/// Notification for the presentation layer. Fire-and-forget: nothing the
/// consumer does with these feeds back into game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TroopPlaced { player: Player, mv: Move },
    Passed { player: Player },
    TroopsAdvanced { player: Player, summary: AdvanceSummary },
    BoardChanged,
    TurnEnded { next: Player },
    GameOver { outcome: Outcome },
}

/// One entry of the move history. `mv` is `None` for a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub player: Player,
    pub mv: Option<Move>,
}

// ============================================================================
// GAME
// ============================================================================

/// A game in progress
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    max_turns: u32,
    history: Vec<TurnRecord>,
    events: Vec<GameEvent>,
    drawn: bool,
}

impl Game {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_board(config.new_board(), config.max_turns)
    }

    /// Resume from an existing board
    pub fn with_board(board: Board, max_turns: u32) -> Self {
        Self {
            board,
            max_turns,
            history: Vec::new(),
            events: Vec::new(),
            drawn: false,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Read-only view of the authoritative board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.board.player_turn()
    }

    pub fn outcome(&self) -> Outcome {
        match self.board.winner() {
            Some(winner) => Outcome::Won(winner),
            None if self.drawn => Outcome::Draw,
            None => Outcome::Ongoing,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome() != Outcome::Ongoing
    }

    /// Turns played so far, passes included
    pub fn turns(&self) -> u32 {
        self.history.len() as u32
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Legal placements for the player to move
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        rules::legal_moves(&self.board, self.current_player())
    }

    /// Drain pending notifications
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// Place the next troop in `col` of the current player's home row
    pub fn place(&mut self, col: usize) -> Result<Outcome, RuleError> {
        let player = self.current_player();
        let row = player.home_row(self.board.height());
        self.place_at(player, row, col)
    }

    /// Place for `player` at (`row`, `col`), validating turn order and
    /// placement rules first
    pub fn place_at(&mut self, player: Player, row: usize, col: usize) -> Result<Outcome, RuleError> {
        self.ensure_can_act(player)?;
        rules::validate_placement(&self.board, row, col, player)?;

        let mv = Move::new(row, col, self.board.next_troop_type());
        debug!(%player, %mv, "placing troop");
        self.events.push(GameEvent::TroopPlaced { player, mv });

        let summary = rules::apply_turn(&mut self.board, mv, player);
        Ok(self.finish_turn(player, Some(mv), summary))
    }

    /// Skip placement. Only allowed when the home row is full.
    pub fn pass(&mut self) -> Result<Outcome, RuleError> {
        let player = self.current_player();
        self.ensure_can_act(player)?;
        if let Some(mv) = rules::legal_moves(&self.board, player).first() {
            return Err(RuleError::MustPlace {
                player,
                row: mv.row,
                col: mv.col,
            });
        }

        debug!(%player, "no legal placement, passing");
        self.events.push(GameEvent::Passed { player });

        let summary = rules::pass_turn(&mut self.board, player);
        Ok(self.finish_turn(player, None, summary))
    }

    /// Let `strategy` move for the current player. The strategy sees a
    /// snapshot; the chosen move is applied here. Returns the move played,
    /// `None` for a pass.
    pub fn play_strategy(&mut self, strategy: &mut dyn Strategy) -> Result<Option<Move>, RuleError> {
        let player = self.current_player();
        self.ensure_can_act(player)?;

        let snapshot = self.board.clone();
        match strategy.choose_move(&snapshot, player) {
            Some(mv) => {
                self.place_at(player, mv.row, mv.col)?;
                Ok(Some(mv))
            }
            None => {
                self.pass()?;
                Ok(None)
            }
        }
    }

    fn ensure_can_act(&self, player: Player) -> Result<(), RuleError> {
        match self.outcome() {
            Outcome::Won(winner) => return Err(RuleError::GameOver { winner }),
            Outcome::Draw => return Err(RuleError::Drawn { turns: self.turns() }),
            Outcome::Ongoing => {}
        }
        let expected = self.current_player();
        if player != expected {
            return Err(RuleError::NotYourTurn { player, expected });
        }
        Ok(())
    }

    fn finish_turn(&mut self, player: Player, mv: Option<Move>, summary: AdvanceSummary) -> Outcome {
        self.history.push(TurnRecord { player, mv });
        self.events.push(GameEvent::TroopsAdvanced {
            player: player.opponent(),
            summary,
        });
        self.events.push(GameEvent::BoardChanged);

        if self.board.winner().is_none() && self.turns() >= self.max_turns {
            self.drawn = true;
        }

        let outcome = self.outcome();
        match outcome {
            Outcome::Ongoing => {
                self.events.push(GameEvent::TurnEnded {
                    next: self.current_player(),
                });
            }
            _ => {
                info!(?outcome, turns = self.turns(), "game over");
                self.events.push(GameEvent::GameOver { outcome });
            }
        }
        outcome
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MinimaxAI;
    use crate::board::TroopType;

    fn small_config() -> GameConfig {
        GameConfig {
            width: 3,
            height: 4,
            ..GameConfig::default()
        }
    }

    /// Always picks the last legal column
    struct LastColumn;

    impl Strategy for LastColumn {
        fn name(&self) -> &str {
            "last-column"
        }

        fn choose_move(&mut self, board: &Board, ai: Player) -> Option<Move> {
            rules::legal_moves(board, ai).pop()
        }
    }

    #[test]
    fn test_game_creation() {
        let game = Game::new(&GameConfig::default());
        assert_eq!(game.current_player(), Player::One);
        assert_eq!(game.outcome(), Outcome::Ongoing);
        assert_eq!(game.legal_moves().len(), 5);
        assert_eq!(game.turns(), 0);
    }

    #[test]
    fn test_place_rotates_turn_and_troop() {
        let mut game = Game::new(&small_config());
        assert_eq!(game.place(1), Ok(Outcome::Ongoing));

        assert_eq!(game.current_player(), Player::Two);
        assert_eq!(game.board().next_troop_type(), TroopType::Medium);
        assert_eq!(game.board().cell(0, 1).unwrap().owner(), Some(Player::One));

        let events = game.take_events();
        assert_eq!(
            events.first(),
            Some(&GameEvent::TroopPlaced {
                player: Player::One,
                mv: Move::new(0, 1, TroopType::Small)
            })
        );
        assert!(events.contains(&GameEvent::BoardChanged));
        assert_eq!(events.last(), Some(&GameEvent::TurnEnded { next: Player::Two }));
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn test_rejects_out_of_turn_and_occupied() {
        let mut game = Game::new(&small_config());
        assert!(matches!(
            game.place_at(Player::Two, 3, 0),
            Err(RuleError::NotYourTurn { .. })
        ));

        game.place(0).unwrap();
        game.place(0).unwrap();
        // Player one's troop advanced out of (0, 0) during player two's turn
        assert!(game.board().cell(0, 0).unwrap().is_empty());
        assert!(matches!(
            game.place_at(Player::One, 2, 0),
            Err(RuleError::WrongRow { .. })
        ));
    }

    #[test]
    fn test_single_column_game() {
        let config = GameConfig {
            width: 1,
            height: 2,
            ..GameConfig::default()
        };
        let mut game = Game::new(&config);

        // Small troop placed; nothing of player two's to advance
        assert_eq!(game.place(0), Ok(Outcome::Ongoing));
        // Medium troop placed; player one's small troop attacks it and dies
        assert_eq!(game.place(0), Ok(Outcome::Ongoing));
        assert!(game.board().cell(0, 0).unwrap().is_empty());
        // Large troop placed; the medium troop attacks it and dies
        assert_eq!(game.place(0), Ok(Outcome::Ongoing));
        assert!(game.board().cell(1, 0).unwrap().is_empty());
        // Small troop placed; the large troop captures it on the goal row
        assert_eq!(game.place(0), Ok(Outcome::Won(Player::One)));

        assert_eq!(game.turns(), 4);
        assert_eq!(game.place(0), Err(RuleError::GameOver { winner: Player::One }));
        assert_eq!(game.pass(), Err(RuleError::GameOver { winner: Player::One }));
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_pass_requires_full_home_row() {
        let mut game = Game::new(&small_config());
        assert_eq!(
            game.pass(),
            Err(RuleError::MustPlace {
                player: Player::One,
                row: 0,
                col: 0
            })
        );
    }

    #[test]
    fn test_pass_when_home_row_full() {
        let mut board = Board::new(1, 4);
        rules::place_troop(&mut board, 0, 0, Player::One, TroopType::Small);
        rules::place_troop(&mut board, 1, 0, Player::One, TroopType::Small);
        rules::place_troop(&mut board, 2, 0, Player::Two, TroopType::Medium);
        let mut game = Game::with_board(board, 50);

        assert_eq!(game.play_strategy(&mut LastColumn), Ok(None));
        assert_eq!(game.current_player(), Player::Two);
        assert_eq!(game.history().last().unwrap().mv, None);
        // Player two's medium troop still advanced and captured
        assert_eq!(game.board().cell(1, 0).unwrap().owner(), Some(Player::Two));
        assert!(game.take_events().contains(&GameEvent::Passed { player: Player::One }));
    }

    #[test]
    fn test_play_until_winner() {
        let mut game = Game::new(&small_config());
        let mut p1 = LastColumn;
        let mut p2 = MinimaxAI::new(2, Default::default());

        while !game.is_over() {
            if game.current_player() == Player::One {
                game.play_strategy(&mut p1).unwrap();
            } else {
                game.play_strategy(&mut p2).unwrap();
            }
        }

        let outcome = game.outcome();
        assert_ne!(outcome, Outcome::Ongoing);
        if let Outcome::Won(winner) = outcome {
            assert_eq!(game.place(0), Err(RuleError::GameOver { winner }));
        }
        let events = game.take_events();
        assert_eq!(events.last(), Some(&GameEvent::GameOver { outcome }));
    }

    #[test]
    fn test_turn_cap_draws() {
        let config = GameConfig {
            max_turns: 1,
            ..small_config()
        };
        let mut game = Game::new(&config);
        assert_eq!(game.place(0), Ok(Outcome::Draw));
        assert_eq!(game.place(0), Err(RuleError::Drawn { turns: 1 }));
    }
}
