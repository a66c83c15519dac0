//! GameConfig - board size, evaluation weights and turn cap

use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::eval::Heuristics;

/// Default board width (columns)
pub const DEFAULT_WIDTH: usize = 5;
/// Default board height (rows)
pub const DEFAULT_HEIGHT: usize = 7;
/// Turns after which a game is called a draw
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Settings for one game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub heuristics: Heuristics,
    pub max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            heuristics: Heuristics::default(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: GameConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.width >= 1, "board width must be at least 1");
        ensure!(self.height >= 1, "board height must be at least 1");
        ensure!(self.max_turns >= 1, "max_turns must be at least 1");
        Ok(())
    }

    /// Fresh board of the configured size
    pub fn new_board(&self) -> Board {
        Board::new(self.width, self.height)
    }
}
