//! Retro Arcade - simulation core for six classic mini-games
//!
//! Core modules:
//! - `sim`: Deterministic game engines (Snake, Tetris, Breakout, Invaders, 2048, Memory)
//! - `cues`: Maps engine events to sound cues and screen flashes
//! - `highscores`: Per-game leaderboards
//! - `stats`: Per-game play statistics
//! - `achievements`: Achievement catalogue and unlock tracking
//! - `settings`: Player preferences and playfield configuration
//!
//! The engines never schedule themselves. The host drives ticks from its own loop
//! and feeds the returned events to the collaborator modules.

pub mod achievements;
pub mod cues;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod stats;

pub use achievements::{Achievement, AchievementBook, AchievementContext};
pub use highscores::{HighScores, Leaderboard};
pub use settings::{Playfields, Settings};
pub use stats::{PlayStats, StatsBook};

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Snake advances one cell per tick
    pub const SNAKE_TICK_MS: u32 = 150;
    pub const SNAKE_COLS: i32 = 20;
    pub const SNAKE_ROWS: i32 = 20;

    /// Breakout and Invaders tick once per animation frame
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Canvas size shared by Breakout and Invaders
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 500.0;

    pub const PUZZLE_SIZE: usize = 4;
    pub const MEMORY_PAIRS: usize = 8;
    /// How long a mismatched pair stays face up before the host unflips it
    pub const MEMORY_UNFLIP_DELAY_MS: u32 = 800;
}

/// Identifies one of the six games
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Snake,
    Tetris,
    Breakout,
    Invaders,
    #[serde(rename = "2048")]
    Puzzle2048,
    Memory,
}

impl GameId {
    pub const ALL: [GameId; 6] = [
        GameId::Snake,
        GameId::Tetris,
        GameId::Breakout,
        GameId::Invaders,
        GameId::Puzzle2048,
        GameId::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::Breakout => "breakout",
            GameId::Invaders => "invaders",
            GameId::Puzzle2048 => "2048",
            GameId::Memory => "memory",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameId::Snake),
            "tetris" => Some(GameId::Tetris),
            "breakout" => Some(GameId::Breakout),
            "invaders" => Some(GameId::Invaders),
            "2048" | "puzzle" => Some(GameId::Puzzle2048),
            "memory" => Some(GameId::Memory),
            _ => None,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            GameId::Snake => "Snake",
            GameId::Tetris => "Tetris",
            GameId::Breakout => "Breakout",
            GameId::Invaders => "Invaders",
            GameId::Puzzle2048 => "2048",
            GameId::Memory => "Memory",
        }
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
