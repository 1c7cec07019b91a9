//! Per-game play statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::GameId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayStats {
    pub games_played: u32,
    /// Whole seconds across all sessions
    pub total_play_secs: u64,
    pub highest_score: u64,
    /// Unix timestamp (ms) of the last finished session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<f64>,
}

/// A session in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenSession {
    game: GameId,
    started_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsBook {
    games: BTreeMap<GameId, PlayStats>,
    #[serde(skip)]
    session: Option<OpenSession>,
}

impl StatsBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for `game`, zeroed if never played
    pub fn stats(&self, game: GameId) -> PlayStats {
        self.games.get(&game).copied().unwrap_or_default()
    }

    pub fn total_games_played(&self) -> u32 {
        self.games.values().map(|s| s.games_played).sum()
    }

    pub fn total_play_secs(&self) -> u64 {
        self.games.values().map(|s| s.total_play_secs).sum()
    }

    /// Fold one finished game into the totals
    pub fn record(&mut self, game: GameId, score: u64, play_secs: u64, timestamp: f64) {
        let stats = self.games.entry(game).or_default();
        stats.games_played += 1;
        stats.total_play_secs += play_secs;
        stats.highest_score = stats.highest_score.max(score);
        stats.last_played = Some(timestamp);
        log::debug!(
            "{} stats: {} played, best {}",
            game,
            stats.games_played,
            stats.highest_score
        );
    }

    /// Start timing a game. Replaces any session left open.
    pub fn start_session(&mut self, game: GameId, now_ms: f64) {
        self.session = Some(OpenSession {
            game,
            started_ms: now_ms,
        });
    }

    /// Close the open session and record it. Returns the game, or `None`
    /// when no session was open.
    pub fn end_session(&mut self, score: u64, now_ms: f64) -> Option<GameId> {
        let session = self.session.take()?;
        let elapsed = ((now_ms - session.started_ms) / 1000.0).floor().max(0.0) as u64;
        self.record(session.game, score, elapsed, now_ms);
        Some(session.game)
    }

    pub fn reset(&mut self) {
        self.games.clear();
        self.session = None;
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
