//! Seat configuration: who plays each side and how strong
//!
//! Level 4 - Utilities and configuration

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;

use ghostship_core::{GameConfig, Heuristics, MinimaxAI, Strategy};
use ghostship_mcts::{MctsConfig, MctsPlayer};

/// Player type for a seat
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PlayerType {
    /// Moves typed on stdin
    Human,
    /// Depth-limited minimax with alpha-beta pruning
    #[default]
    Minimax,
    /// Monte Carlo Tree Search
    Mcts,
}

/// AI configuration for one seat
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub player_type: PlayerType,
    /// Search depth for minimax
    pub depth: u32,
    /// Iterations for MCTS
    pub iterations: usize,
    /// Optional MCTS time limit in milliseconds
    pub time_limit_ms: Option<u64>,
    /// Heuristics for minimax evaluation
    pub heuristics: Heuristics,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            player_type: PlayerType::Minimax,
            depth: 3,
            iterations: 1000,
            time_limit_ms: None,
            heuristics: Heuristics::default(),
            seed: None,
        }
    }
}

impl AiConfig {
    /// Config for the given seat type with default strength
    pub fn new(player_type: PlayerType) -> Self {
        Self {
            player_type,
            ..Default::default()
        }
    }

    /// MCTS with the given iteration count
    pub fn mcts(iterations: usize) -> Self {
        Self {
            player_type: PlayerType::Mcts,
            iterations,
            ..Default::default()
        }
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig {
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            seed: self.seed,
            ..MctsConfig::with_iterations(self.iterations)
        }
    }

    /// Build the AI for this seat; `None` for a human seat
    pub fn build_strategy(&self) -> Option<Box<dyn Strategy>> {
        match self.player_type {
            PlayerType::Human => None,
            PlayerType::Minimax => Some(Box::new(MinimaxAI::new(self.depth, self.heuristics.clone()))),
            PlayerType::Mcts => Some(Box::new(MctsPlayer::new(self.mcts_config()))),
        }
    }
}

/// Game config from `--config`, or defaults
pub fn load_game_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path),
        None => Ok(GameConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_has_no_strategy() {
        assert!(AiConfig::new(PlayerType::Human).build_strategy().is_none());
    }

    #[test]
    fn test_build_strategies() {
        let minimax = AiConfig::new(PlayerType::Minimax).build_strategy().unwrap();
        assert_eq!(minimax.name(), "minimax");

        let mcts = AiConfig::mcts(10).with_seed(1).build_strategy().unwrap();
        assert_eq!(mcts.name(), "mcts");
    }

    #[test]
    fn test_mcts_config_carries_limits() {
        let config = AiConfig {
            time_limit_ms: Some(250),
            ..AiConfig::mcts(500).with_seed(7)
        }
        .mcts_config();

        assert_eq!(config.iterations, 500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.time_limit, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_default_game_config() {
        let config = load_game_config(None).unwrap();
        assert_eq!(config, GameConfig::default());
    }
}
