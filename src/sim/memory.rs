//! Memory: pair matching over a shuffled deck

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{GameSession, GameSummary};
use crate::GameId;

/// Card faces, one per pair. Letters easily confused at small sizes are skipped.
pub const SYMBOLS: [char; 18] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'N', 'P', 'R', 'S', 'T', 'W', 'X',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    pub symbol: char,
    pub pair_id: u32,
    pub flipped: bool,
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipOutcome {
    /// First card of a pair turned over
    Flip,
    Match,
    /// Both cards stay face up until `unflip_mismatch`
    Mismatch,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryState {
    pub cards: Vec<Card>,
    /// Indices of face-up, unmatched cards awaiting comparison
    pub flipped: Vec<usize>,
    pub moves: u32,
    pub pairs: u32,
    pub total_pairs: u32,
    pub mistakes: u32,
    pub game_over: bool,
}

impl MemoryState {
    pub fn new<R: Rng + ?Sized>(pair_count: usize, rng: &mut R) -> Self {
        let pair_count = pair_count.clamp(1, SYMBOLS.len());
        let mut cards: Vec<Card> = SYMBOLS[..pair_count]
            .iter()
            .enumerate()
            .flat_map(|(pair, &symbol)| {
                let pair_id = pair as u32;
                [0, 1].map(|k| Card {
                    id: pair_id * 2 + k,
                    symbol,
                    pair_id,
                    flipped: false,
                    matched: false,
                })
            })
            .collect();
        cards.shuffle(rng);

        Self {
            cards,
            flipped: Vec::with_capacity(2),
            moves: 0,
            pairs: 0,
            total_pairs: pair_count as u32,
            mistakes: 0,
            game_over: false,
        }
    }

    /// Two cards are face up and waiting on `unflip_mismatch`
    pub fn awaiting_unflip(&self) -> bool {
        self.flipped.len() >= 2
    }

    pub fn flip_card(&mut self, index: usize) -> FlipOutcome {
        let pending = self.flipped.len();
        let Some(card) = self.cards.get_mut(index) else {
            return FlipOutcome::Ignore;
        };
        if card.flipped || card.matched || pending >= 2 {
            return FlipOutcome::Ignore;
        }

        card.flipped = true;
        self.flipped.push(index);
        if self.flipped.len() < 2 {
            return FlipOutcome::Flip;
        }

        self.moves += 1;
        let (a, b) = (self.flipped[0], self.flipped[1]);
        if self.cards[a].pair_id != self.cards[b].pair_id {
            return FlipOutcome::Mismatch;
        }

        self.cards[a].matched = true;
        self.cards[b].matched = true;
        self.pairs += 1;
        self.flipped.clear();
        if self.pairs == self.total_pairs {
            self.game_over = true;
            log::info!(
                "Memory cleared in {} moves with {} mistakes",
                self.moves,
                self.mistakes
            );
        }
        FlipOutcome::Match
    }

    /// Turn the pending mismatched pair back face down
    pub fn unflip_mismatch(&mut self) {
        for &i in &self.flipped {
            self.cards[i].flipped = false;
        }
        self.mistakes += 1;
        self.flipped.clear();
    }

    /// Efficiency score: `round(1000 * pairs / max(moves, 1))`
    pub fn score(&self) -> u64 {
        if self.pairs == 0 {
            return 0;
        }
        let efficiency = f64::from(self.pairs) / f64::from(self.moves.max(1));
        (efficiency * 1000.0).round() as u64
    }

    pub fn perfect_game(&self) -> bool {
        self.game_over && self.mistakes == 0
    }
}

impl GameSession for MemoryState {
    fn game_id(&self) -> GameId {
        GameId::Memory
    }

    fn score(&self) -> u64 {
        MemoryState::score(self)
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn summary(&self) -> GameSummary {
        GameSummary {
            score: MemoryState::score(self),
            pairs: Some(self.pairs),
            moves: Some(self.moves),
            perfect_game: self.perfect_game(),
            ..Default::default()
        }
    }
}
