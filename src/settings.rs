//! Arcade settings and preferences
//!
//! Plain serde data. The host decides where the JSON lives.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Board and canvas sizes each engine is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfields {
    pub snake_cols: i32,
    pub snake_rows: i32,
    pub breakout_width: f32,
    pub breakout_height: f32,
    pub invaders_width: f32,
    pub invaders_height: f32,
    /// 2048 grid edge length
    pub puzzle_size: usize,
    pub memory_pairs: usize,
}

impl Default for Playfields {
    fn default() -> Self {
        Self {
            snake_cols: consts::SNAKE_COLS,
            snake_rows: consts::SNAKE_ROWS,
            breakout_width: consts::CANVAS_WIDTH,
            breakout_height: consts::CANVAS_HEIGHT,
            invaders_width: consts::CANVAS_WIDTH,
            invaders_height: consts::CANVAS_HEIGHT,
            puzzle_size: consts::PUZZLE_SIZE,
            memory_pairs: consts::MEMORY_PAIRS,
        }
    }
}

impl Playfields {
    /// Smallest sizes the engines play sensibly at
    const MIN_GRID: i32 = 5;
    const MIN_CANVAS: f32 = 200.0;
    const MIN_PUZZLE: usize = 2;
    const MAX_PUZZLE: usize = 8;

    /// Pull out-of-range values back to playable sizes
    pub fn sanitized(&self) -> Self {
        Self {
            snake_cols: self.snake_cols.max(Self::MIN_GRID),
            snake_rows: self.snake_rows.max(Self::MIN_GRID),
            breakout_width: self.breakout_width.max(Self::MIN_CANVAS),
            breakout_height: self.breakout_height.max(Self::MIN_CANVAS),
            invaders_width: self.invaders_width.max(Self::MIN_CANVAS),
            invaders_height: self.invaders_height.max(Self::MIN_CANVAS),
            puzzle_size: self.puzzle_size.clamp(Self::MIN_PUZZLE, Self::MAX_PUZZLE),
            memory_pairs: self
                .memory_pairs
                .clamp(1, crate::sim::memory::SYMBOLS.len()),
        }
    }
}

/// Game settings/preferences
///
/// `reduced_motion` is a host-side addition: the arcade's own accessibility
/// options never had one. It only gates screen flashes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no screen flashes)
    pub reduced_motion: bool,

    pub playfields: Playfields,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            reduced_motion: false,
            playfields: Playfields::default(),
        }
    }
}

impl Settings {
    pub fn effective_master_volume(&self) -> f32 {
        self.master_volume.clamp(0.0, 1.0)
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        self.sfx_volume.clamp(0.0, 1.0)
    }

    /// Screen flashes allowed (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        !self.reduced_motion
    }

    /// Parse settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
