//! Achievement catalogue and unlock tracking
//!
//! The catalogue is fixed data. `AchievementBook` records which entries a
//! player has unlocked and when; the host calls `check` once per finished game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::sim::GameSummary;

/// Which games an achievement listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Game(GameId),
    Global,
}

/// Unlock predicate over a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Condition {
    /// Any finished game in scope
    Played,
    Score(u64),
    SnakeLength(usize),
    Lines(u32),
    MaxTile(u32),
    /// Finished within this many moves
    MovesAtMost(u32),
    PerfectGame,
    /// Won without losing a life
    Flawless,
    TotalGames(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Badge glyph
    pub icon: char,
    pub scope: Scope,
    pub condition: Condition,
}

/// Facts about one finished game plus arcade-wide totals
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementContext {
    pub game: GameId,
    pub summary: GameSummary,
    /// Including the game just finished
    pub total_games_played: u32,
}

impl AchievementContext {
    pub fn new(game: GameId, summary: GameSummary, total_games_played: u32) -> Self {
        Self {
            game,
            summary,
            total_games_played,
        }
    }
}

impl Achievement {
    pub fn is_met(&self, ctx: &AchievementContext) -> bool {
        if let Scope::Game(game) = self.scope {
            if game != ctx.game {
                return false;
            }
        }
        let s = &ctx.summary;
        match self.condition {
            Condition::Played => true,
            Condition::Score(min) => s.score >= min,
            Condition::SnakeLength(min) => s.snake_length.is_some_and(|l| l >= min),
            Condition::Lines(min) => s.lines_cleared.is_some_and(|l| l >= min),
            Condition::MaxTile(min) => s.max_tile.is_some_and(|t| t >= min),
            Condition::MovesAtMost(max) => s.moves.is_some_and(|m| m <= max),
            Condition::PerfectGame => s.perfect_game,
            Condition::Flawless => s.perfect_game && s.no_lives_lost,
            Condition::TotalGames(min) => ctx.total_games_played >= min,
        }
    }
}

const fn def(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: char,
    scope: Scope,
    condition: Condition,
) -> Achievement {
    Achievement {
        id,
        name,
        description,
        icon,
        scope,
        condition,
    }
}

use Condition::*;
use GameId::{Breakout, Invaders, Memory, Puzzle2048, Snake, Tetris};

pub static CATALOGUE: [Achievement; 29] = [
    // Snake
    def("snake-first", "First Bite", "Play your first game of Snake", 'S', Scope::Game(Snake), Played),
    def("snake-50", "Hungry Snake", "Score 50+ in Snake", 'S', Scope::Game(Snake), Score(50)),
    def("snake-100", "Python", "Score 100+ in Snake", 'S', Scope::Game(Snake), Score(100)),
    def("snake-200", "Anaconda", "Score 200+ in Snake", 'S', Scope::Game(Snake), Score(200)),
    def("snake-long", "Lengthy", "Reach length 20+ in Snake", 'S', Scope::Game(Snake), SnakeLength(20)),
    // Tetris
    def("tetris-first", "Block Party", "Play your first game of Tetris", 'T', Scope::Game(Tetris), Played),
    def("tetris-lines-10", "Line Worker", "Clear 10 lines in Tetris", 'T', Scope::Game(Tetris), Lines(10)),
    def("tetris-lines-40", "Tetris Master", "Clear 40 lines in Tetris", 'T', Scope::Game(Tetris), Lines(40)),
    def("tetris-1000", "High Stacker", "Score 1000+ in Tetris", 'T', Scope::Game(Tetris), Score(1000)),
    def("tetris-5000", "Tetromino God", "Score 5000+ in Tetris", 'T', Scope::Game(Tetris), Score(5000)),
    // Breakout
    def("breakout-first", "Brick Breaker", "Play your first game of Breakout", 'B', Scope::Game(Breakout), Played),
    def("breakout-500", "Demolition", "Score 500+ in Breakout", 'B', Scope::Game(Breakout), Score(500)),
    def("breakout-clear", "Clean Sweep", "Clear all bricks in Breakout", 'B', Scope::Game(Breakout), PerfectGame),
    def("breakout-noloss", "Unbreakable", "Beat Breakout without losing a life", 'B', Scope::Game(Breakout), Flawless),
    // Invaders
    def("invaders-first", "Space Cadet", "Play your first game of Invaders", 'I', Scope::Game(Invaders), Played),
    def("invaders-500", "Alien Hunter", "Score 500+ in Invaders", 'I', Scope::Game(Invaders), Score(500)),
    def("invaders-1000", "Space Commander", "Score 1000+ in Invaders", 'I', Scope::Game(Invaders), Score(1000)),
    def("invaders-clear", "Fleet Destroyer", "Clear all aliens in a wave", 'I', Scope::Game(Invaders), PerfectGame),
    // 2048
    def("2048-first", "Slider", "Play your first game of 2048", '2', Scope::Game(Puzzle2048), Played),
    def("2048-512", "Half K", "Reach the 512 tile", '2', Scope::Game(Puzzle2048), MaxTile(512)),
    def("2048-1024", "Almost There", "Reach the 1024 tile", '2', Scope::Game(Puzzle2048), MaxTile(1024)),
    def("2048-2048", "Winner!", "Reach the 2048 tile", '2', Scope::Game(Puzzle2048), MaxTile(2048)),
    def("2048-4096", "Beyond 2048", "Reach the 4096 tile", '2', Scope::Game(Puzzle2048), MaxTile(4096)),
    // Memory
    def("memory-first", "Good Memory", "Play your first game of Memory", 'M', Scope::Game(Memory), Played),
    def("memory-fast", "Quick Recall", "Complete Memory in under 20 moves", 'M', Scope::Game(Memory), MovesAtMost(20)),
    def("memory-perfect", "Perfect Memory", "Complete Memory with no mistakes", 'M', Scope::Game(Memory), PerfectGame),
    // Global
    def("play-5", "Regular", "Play 5 total games", 'G', Scope::Global, TotalGames(5)),
    def("play-25", "Dedicated", "Play 25 total games", 'G', Scope::Global, TotalGames(25)),
    def("play-100", "Arcade Rat", "Play 100 total games", 'G', Scope::Global, TotalGames(100)),
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOGUE.iter().find(|a| a.id == id)
}

/// Unlocked achievement ids mapped to their unlock timestamp (Unix ms)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementBook {
    unlocked: BTreeMap<String, f64>,
}

impl AchievementBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock every newly satisfied achievement; returns just those
    pub fn check(&mut self, ctx: &AchievementContext, timestamp: f64) -> Vec<&'static Achievement> {
        let mut fresh = Vec::new();
        for a in &CATALOGUE {
            if self.unlocked.contains_key(a.id) || !a.is_met(ctx) {
                continue;
            }
            self.unlocked.insert(a.id.to_string(), timestamp);
            log::info!("Achievement unlocked: {} ({})", a.name, a.id);
            fresh.push(a);
        }
        fresh
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains_key(id)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<f64> {
        self.unlocked.get(id).copied()
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &'static Achievement> + '_ {
        CATALOGUE.iter().filter(|a| self.is_unlocked(a.id))
    }

    pub fn locked(&self) -> impl Iterator<Item = &'static Achievement> + '_ {
        CATALOGUE.iter().filter(|a| !self.is_unlocked(a.id))
    }

    pub fn by_scope(scope: Scope) -> impl Iterator<Item = &'static Achievement> {
        CATALOGUE.iter().filter(move |a| a.scope == scope)
    }

    /// (unlocked, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.unlocked().count(), CATALOGUE.len())
    }

    pub fn reset(&mut self) {
        self.unlocked.clear();
    }

    /// Parse a saved book, dropping ids no longer in the catalogue
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut book: Self = serde_json::from_str(json)?;
        book.unlocked.retain(|id, _| find(id).is_some());
        Ok(book)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
