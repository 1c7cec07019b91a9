//! Deterministic simulation module
//!
//! All gameplay logic lives here. Each engine is a plain data state plus the
//! transitions that mutate it in place:
//! - The caller owns the state exclusively and applies calls in time order
//! - Randomness comes only from the `rng` argument
//! - No rendering, input, audio or storage dependencies

pub mod breakout;
pub mod demo;
pub mod geom;
pub mod invaders;
pub mod memory;
pub mod puzzle2048;
pub mod rng;
pub mod snake;
pub mod tetris;

pub use breakout::{Ball, BreakoutEvent, BreakoutState, Brick, Paddle};
pub use geom::{Direction, Point, Rect};
pub use invaders::{Alien, Bullet, InvadersEvent, InvadersState, Player, Shield};
pub use memory::{Card, FlipOutcome, MemoryState};
pub use puzzle2048::{Board, Tile};
pub use rng::GameRng;
pub use snake::{SnakeEvent, SnakeState};
pub use tetris::{Piece, PieceKind, TetrisEvent, TetrisState};

use serde::{Deserialize, Serialize};

use crate::GameId;

/// End-of-session facts the host hands to leaderboards, stats and achievements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub score: u64,
    pub level: Option<u32>,
    pub lines_cleared: Option<u32>,
    pub snake_length: Option<usize>,
    pub pairs: Option<u32>,
    pub moves: Option<u32>,
    pub max_tile: Option<u32>,
    /// Won outright (all bricks, all aliens, or every pair with no mistakes)
    pub perfect_game: bool,
    pub no_lives_lost: bool,
}

/// Any engine event, tagged so a host can route one stream to its cue and
/// effect layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    Started(GameId),
    Snake(SnakeEvent),
    /// Tetris piece moved sideways
    PieceShifted,
    PieceRotated,
    /// Tetris hard drop, before the lock
    PieceDropped,
    Tetris(TetrisEvent),
    Breakout(BreakoutEvent),
    /// Invaders player fired
    Shot,
    Invaders(InvadersEvent),
    /// 2048 move that changed the board
    Slid { merged: bool },
    Memory(FlipOutcome),
    GameOver(GameId),
}

/// Common read-only view over every engine state
pub trait GameSession {
    fn game_id(&self) -> GameId;

    /// Score as shown to the player
    fn score(&self) -> u64;

    fn is_over(&self) -> bool;

    fn summary(&self) -> GameSummary;
}
