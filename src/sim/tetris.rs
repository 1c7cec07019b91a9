//! Tetris: falling tetrominoes, rotation with wall kicks, line clears and levels
//!
//! The board is `ROWS` rows of `COLS` cells, row 0 at the top. The active piece is
//! stored as four cell offsets relative to `current_pos`; the locked stack lives in
//! `board` and never overlaps the active piece.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Point;
use super::{GameSession, GameSummary};
use crate::GameId;

pub const COLS: usize = 10;
pub const ROWS: usize = 20;

/// Points for clearing 0..=4 rows at once, multiplied by the level
pub const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];
/// Column offsets tried in order when a rotation collides
pub const KICK_OFFSETS: [i32; 5] = [0, -1, 1, -2, 2];
pub const LINES_PER_LEVEL: u32 = 10;

/// Gravity interval bounds (milliseconds)
const BASE_INTERVAL_MS: u32 = 1000;
const INTERVAL_STEP_MS: u32 = 80;
const MIN_INTERVAL_MS: u32 = 100;

/// Extra points per cell for player-initiated drops
const SOFT_DROP_POINTS: u64 = 1;
const HARD_DROP_POINTS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Uniform pick over the seven kinds
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Cell offsets for a rotation index (taken modulo 4)
    pub fn shape(self, rotation: u8) -> [Point; 4] {
        let table = SHAPES[self as usize][(rotation % 4) as usize];
        table.map(|(x, y)| Point::new(x, y))
    }
}

/// Four rotations per kind, indexed by `PieceKind as usize`
const SHAPES: [[[(i32, i32); 4]; 4]; 7] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // O
    [
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
        [(0, 0), (1, 0), (0, 1), (1, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

/// The active tetromino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    /// Offsets relative to the piece position
    pub cells: [Point; 4],
    pub rotation: u8,
}

impl Piece {
    /// Piece in its spawn rotation
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            cells: kind.shape(0),
            rotation: 0,
        }
    }

    pub fn rotated(&self) -> Self {
        let rotation = (self.rotation + 1) % 4;
        Self {
            kind: self.kind,
            cells: self.kind.shape(rotation),
            rotation,
        }
    }

    pub fn cells_at(&self, pos: Point) -> [Point; 4] {
        self.cells.map(|c| c.offset(pos.x, pos.y))
    }
}

/// One board row; `None` is empty
pub type Row = [Option<PieceKind>; COLS];

/// Outcome of one gravity step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetrisEvent {
    /// Piece fell one row
    Fell,
    /// Piece locked; a new one spawned
    Locked { lines: u32 },
    /// Locking ended the game
    ToppedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetrisState {
    pub board: Vec<Row>,
    pub current: Piece,
    pub current_pos: Point,
    pub next: PieceKind,
    pub score: u64,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
}

/// Where new pieces enter: centred, top row
pub fn spawn_position() -> Point {
    Point::new(COLS as i32 / 2 - 1, 0)
}

/// Gravity interval in milliseconds for a level
pub fn tick_interval(level: u32) -> u32 {
    let speedup = level.saturating_sub(1).saturating_mul(INTERVAL_STEP_MS);
    BASE_INTERVAL_MS.saturating_sub(speedup).max(MIN_INTERVAL_MS)
}

/// Level reached after clearing `lines` rows in total
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

impl TetrisState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            board: vec![[None; COLS]; ROWS],
            current: Piece::new(PieceKind::random(rng)),
            current_pos: spawn_position(),
            next: PieceKind::random(rng),
            score: 0,
            level: 1,
            lines_cleared: 0,
            game_over: false,
        }
    }

    /// Board coordinates of the active piece
    pub fn absolute_cells(&self) -> [Point; 4] {
        self.current.cells_at(self.current_pos)
    }

    /// True if any cell is outside the walls/floor or on a locked cell.
    /// Cells above the top row are allowed.
    pub fn collides(&self, cells: &[Point]) -> bool {
        cells.iter().any(|c| {
            c.x < 0
                || c.x >= COLS as i32
                || c.y >= ROWS as i32
                || (c.y >= 0 && self.board[c.y as usize][c.x as usize].is_some())
        })
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        if self.game_over {
            return false;
        }
        let next = self.current_pos.offset(dx, dy);
        if self.collides(&self.current.cells_at(next)) {
            return false;
        }
        self.current_pos = next;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1, 0)
    }

    pub fn move_down(&mut self) -> bool {
        self.try_shift(0, 1)
    }

    /// Player-initiated single-row drop, worth one point when it succeeds
    pub fn soft_drop(&mut self) -> bool {
        let moved = self.move_down();
        if moved {
            self.score += SOFT_DROP_POINTS;
        }
        moved
    }

    /// Rotate clockwise, trying each kick offset in order
    pub fn rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let rotated = self.current.rotated();
        for dx in KICK_OFFSETS {
            let pos = self.current_pos.offset(dx, 0);
            if !self.collides(&rotated.cells_at(pos)) {
                self.current = rotated;
                self.current_pos = pos;
                return true;
            }
        }
        false
    }

    /// Drop until resting; returns rows fallen. Does not lock.
    pub fn hard_drop(&mut self) -> u32 {
        let mut dropped = 0;
        while self.move_down() {
            dropped += 1;
        }
        dropped
    }

    /// Hard drop worth two points per row, then lock. Returns lines cleared.
    pub fn drop_and_lock<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        if self.game_over {
            return 0;
        }
        let dropped = self.hard_drop();
        self.score += u64::from(dropped) * HARD_DROP_POINTS;
        self.lock_and_spawn(rng)
    }

    /// Write the active piece into the board, clear full rows, score them and
    /// bring in the queued piece. Returns lines cleared by this lock.
    pub fn lock_and_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        if self.game_over {
            return 0;
        }

        let cells = self.absolute_cells();
        if cells.iter().any(|c| c.y < 0) {
            self.game_over = true;
            log::info!("Tetris topped out above the field with score {}", self.score);
            return 0;
        }
        for c in cells {
            self.board[c.y as usize][c.x as usize] = Some(self.current.kind);
        }

        let cleared = self.clear_lines();
        self.lines_cleared += cleared;
        self.score += LINE_SCORES[cleared.min(4) as usize] * u64::from(self.level);

        let level = level_for_lines(self.lines_cleared);
        if level != self.level {
            log::info!("Tetris level {} -> {}", self.level, level);
            self.level = level;
        }
        if cleared > 0 {
            log::debug!("Cleared {} line(s), total {}", cleared, self.lines_cleared);
        }

        self.current = Piece::new(self.next);
        self.current_pos = spawn_position();
        self.next = PieceKind::random(rng);

        if self.collides(&self.absolute_cells()) {
            self.game_over = true;
            log::info!(
                "Tetris game over: score {}, level {}, lines {}",
                self.score,
                self.level,
                self.lines_cleared
            );
        }

        cleared
    }

    /// Remove full rows bottom-up, re-checking the same index after each removal
    fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = ROWS;
        while y > 0 {
            let row = y - 1;
            if self.board[row].iter().all(Option::is_some) {
                self.board.remove(row);
                self.board.insert(0, [None; COLS]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// One gravity step: fall a row, or lock when resting
    pub fn gravity_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TetrisEvent {
        if self.game_over {
            return TetrisEvent::ToppedOut;
        }
        if self.move_down() {
            return TetrisEvent::Fell;
        }
        let lines = self.lock_and_spawn(rng);
        if self.game_over {
            TetrisEvent::ToppedOut
        } else {
            TetrisEvent::Locked { lines }
        }
    }

    /// Row the piece would rest on after a hard drop
    pub fn ghost_y(&self) -> i32 {
        let mut y = self.current_pos.y;
        while !self.collides(&self.current.cells_at(Point::new(self.current_pos.x, y + 1))) {
            y += 1;
        }
        y
    }

    pub fn ghost_cells(&self) -> [Point; 4] {
        self.current.cells_at(Point::new(self.current_pos.x, self.ghost_y()))
    }

    /// Current gravity interval in milliseconds
    pub fn interval_ms(&self) -> u32 {
        tick_interval(self.level)
    }
}

impl GameSession for TetrisState {
    fn game_id(&self) -> GameId {
        GameId::Tetris
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.game_over
    }

    fn summary(&self) -> GameSummary {
        GameSummary {
            score: self.score,
            level: Some(self.level),
            lines_cleared: Some(self.lines_cleared),
            ..Default::default()
        }
    }
}
