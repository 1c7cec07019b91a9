//! High score leaderboards
//!
//! One top-10 table per game, kept sorted best first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::GameId;

/// Maximum number of high scores to keep per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached, for games that have levels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Top scores for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies. Ties rank below earlier entries.
    /// Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: u64, level: Option<u32>, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Leaderboards for every game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    boards: BTreeMap<GameId, Leaderboard>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for `game`, best first; empty if never played
    pub fn scores(&self, game: GameId) -> &[HighScoreEntry] {
        self.boards
            .get(&game)
            .map(|b| b.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn board(&self, game: GameId) -> Option<&Leaderboard> {
        self.boards.get(&game)
    }

    /// Best score for `game`, 0 if none
    pub fn high_score(&self, game: GameId) -> u64 {
        self.boards
            .get(&game)
            .and_then(Leaderboard::top_score)
            .unwrap_or(0)
    }

    pub fn qualifies(&self, game: GameId, score: u64) -> bool {
        self.boards
            .get(&game)
            .map_or(score > 0, |b| b.qualifies(score))
    }

    /// Record a finished game. Returns the rank achieved; rank 1 is a new high score.
    pub fn submit(
        &mut self,
        game: GameId,
        score: u64,
        level: Option<u32>,
        timestamp: f64,
    ) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let rank = self
            .boards
            .entry(game)
            .or_default()
            .add_score(score, level, timestamp)?;
        if rank == 1 {
            log::info!("New {} high score: {}", game, score);
        } else {
            log::debug!("{} score {} ranked #{}", game, score, rank);
        }
        Some(rank)
    }

    pub fn clear_game(&mut self, game: GameId) {
        self.boards.remove(&game);
    }

    pub fn clear_all(&mut self) {
        self.boards.clear();
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
