//! GhostShip Core - Game engine and AI
//!
//! This crate provides the core game logic for GhostShip:
//! - Board state (grid of troops, turn, next troop type, winner)
//! - Rule engine (placement, advance and combat, win detection)
//! - Position evaluation
//! - Minimax AI with alpha-beta pruning
//! - Turn controller emitting presentation events

pub mod board;
pub mod rules;
pub mod eval;
pub mod ai;
pub mod game;
pub mod config;

// Re-exports for convenient access
pub use board::{Board, Cell, Move, Player, Row, Troop, TroopType};
pub use rules::{AdvanceSummary, RuleError};
pub use eval::{evaluate, Heuristics};
pub use ai::{MinimaxAI, SearchOutcome, Strategy};
pub use game::{Game, GameEvent, Outcome, TurnRecord};
pub use config::GameConfig;
