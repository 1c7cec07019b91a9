//! Attract-mode autoplayers
//!
//! Each runner plays one engine headless until the game ends or the step
//! limit is reached, collecting every event along the way. The players are
//! simple heuristics meant to look plausible, not to play optimally.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::breakout::PADDLE_WIDTH;
use super::invaders::ALIEN_SIZE;
use super::tetris::{self, Row};
use super::{
    Board, BreakoutState, Direction, EngineEvent, FlipOutcome, GameSession, GameSummary,
    InvadersState, MemoryState, Point, SnakeState, TetrisEvent, TetrisState,
};
use crate::{GameId, Playfields};

/// Steps a runner takes before giving up on a game that will not end
pub const DEFAULT_STEP_LIMIT: u32 = 20_000;

/// Outcome of one headless game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoRun {
    pub game: GameId,
    /// Ticks, pieces, slides or flips taken, depending on the game
    pub steps: u32,
    pub finished: bool,
    pub summary: GameSummary,
    pub events: Vec<EngineEvent>,
}

impl DemoRun {
    fn new(game: GameId) -> Self {
        Self {
            game,
            steps: 0,
            finished: false,
            summary: GameSummary::default(),
            events: vec![EngineEvent::Started(game)],
        }
    }

    fn finish(mut self, session: &dyn GameSession) -> Self {
        self.finished = session.is_over();
        self.summary = session.summary();
        if self.finished {
            self.events.push(EngineEvent::GameOver(self.game));
        }
        log::debug!(
            "{} demo: {} steps, score {}, finished {}",
            self.game,
            self.steps,
            self.summary.score,
            self.finished
        );
        self
    }
}

/// Play `game` with its autoplayer
pub fn run<R: Rng + ?Sized>(
    game: GameId,
    fields: &Playfields,
    step_limit: u32,
    rng: &mut R,
) -> DemoRun {
    match game {
        GameId::Snake => play_snake(
            SnakeState::new(fields.snake_cols, fields.snake_rows, rng),
            step_limit,
            rng,
        ),
        GameId::Tetris => play_tetris(TetrisState::new(rng), step_limit, rng),
        GameId::Breakout => play_breakout(
            BreakoutState::new(fields.breakout_width, fields.breakout_height),
            step_limit,
            rng,
        ),
        GameId::Invaders => play_invaders(
            InvadersState::new(fields.invaders_width, fields.invaders_height),
            step_limit,
            rng,
        ),
        GameId::Puzzle2048 => play_2048(Board::new(fields.puzzle_size, rng), step_limit, rng),
        GameId::Memory => play_memory(MemoryState::new(fields.memory_pairs, rng), step_limit, rng),
    }
}

// === Snake ===

/// Greedy toward food, but never into a pocket smaller than the body
pub fn play_snake<R: Rng + ?Sized>(mut state: SnakeState, step_limit: u32, rng: &mut R) -> DemoRun {
    let mut run = DemoRun::new(GameId::Snake);
    while !state.game_over && run.steps < step_limit {
        if let Some(dir) = snake_choice(&state) {
            state.set_direction(dir);
        }
        run.events.push(EngineEvent::Snake(state.tick(rng)));
        run.steps += 1;
    }
    run.finish(&state)
}

fn snake_choice(state: &SnakeState) -> Option<Direction> {
    let head = state.head();
    let len = state.length();
    Direction::ALL
        .into_iter()
        .filter(|d| *d != state.direction.opposite())
        .filter_map(|d| {
            let next = head.step(d);
            if !state.in_bounds(next) || state.occupies(next) {
                return None;
            }
            let roomy = open_area(state, next, len) >= len;
            let dist = (next.x - state.food.x).abs() + (next.y - state.food.y).abs();
            Some((d, roomy, dist))
        })
        // Roomy first, then closest to food, then keep heading
        .max_by_key(|&(d, roomy, dist)| (roomy, -dist, d == state.direction))
        .map(|(d, _, _)| d)
}

/// Free cells reachable from `start`, counting at most `cap`
fn open_area(state: &SnakeState, start: Point, cap: usize) -> usize {
    // The tail moves out of the way as the head advances
    let body_len = state.segments.len().saturating_sub(1);
    let blocked = |p: Point| state.segments.iter().take(body_len).any(|s| *s == p);

    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(p) = queue.pop_front() {
        if seen.len() >= cap {
            break;
        }
        for d in Direction::ALL {
            let n = p.step(d);
            if state.in_bounds(n) && !blocked(n) && !seen.contains(&n) {
                seen.push(n);
                queue.push_back(n);
            }
        }
    }
    seen.len()
}

// === Tetris ===

const HEIGHT_WEIGHT: f32 = -0.51;
const LINES_WEIGHT: f32 = 0.76;
const HOLES_WEIGHT: f32 = -0.36;
const BUMPINESS_WEIGHT: f32 = -0.18;

/// Try every rotation and column, keep the best resting place, then play it
/// out with real moves and a hard drop. One step per piece.
pub fn play_tetris<R: Rng + ?Sized>(mut state: TetrisState, step_limit: u32, rng: &mut R) -> DemoRun {
    let mut run = DemoRun::new(GameId::Tetris);
    while !state.game_over && run.steps < step_limit {
        let (rotations, target_x) = tetris_choice(&state);

        for _ in 0..rotations {
            if state.rotate() {
                run.events.push(EngineEvent::PieceRotated);
            }
        }
        while state.current_pos.x != target_x {
            let moved = if state.current_pos.x > target_x {
                state.move_left()
            } else {
                state.move_right()
            };
            if !moved {
                break;
            }
            run.events.push(EngineEvent::PieceShifted);
        }

        run.events.push(EngineEvent::PieceDropped);
        let lines = state.drop_and_lock(rng);
        run.events.push(EngineEvent::Tetris(if state.game_over {
            TetrisEvent::ToppedOut
        } else {
            TetrisEvent::Locked { lines }
        }));
        run.steps += 1;
    }
    run.finish(&state)
}

fn tetris_choice(state: &TetrisState) -> (u8, i32) {
    let mut best = (0, state.current_pos.x);
    let mut best_score = f32::NEG_INFINITY;

    let mut rotated = state.clone();
    for rotations in 0..4u8 {
        if rotations > 0 && !rotated.rotate() {
            break;
        }
        let mut probe = rotated.clone();
        while probe.move_left() {}
        loop {
            let mut landed = probe.clone();
            landed.hard_drop();
            let score = evaluate_placement(&landed.board, &landed.absolute_cells());
            if score > best_score {
                best_score = score;
                best = (rotations, probe.current_pos.x);
            }
            if !probe.move_right() {
                break;
            }
        }
    }
    best
}

/// Weighted board quality after resting `cells`: fewer holes, lower and
/// flatter stacks, more cleared lines
fn evaluate_placement(board: &[Row], cells: &[Point]) -> f32 {
    let mut board = board.to_vec();
    for c in cells {
        if c.y < 0 {
            return f32::NEG_INFINITY;
        }
        board[c.y as usize][c.x as usize] = Some(tetris::PieceKind::I);
    }

    let before = board.len();
    board.retain(|row| !row.iter().all(Option::is_some));
    let lines = (before - board.len()) as f32;

    let mut heights = [0usize; tetris::COLS];
    let mut holes = 0usize;
    for (x, height) in heights.iter_mut().enumerate() {
        if let Some(top) = board.iter().position(|row| row[x].is_some()) {
            *height = board.len() - top;
            holes += board[top..].iter().filter(|row| row[x].is_none()).count();
        }
    }
    let aggregate: usize = heights.iter().sum();
    let bumpiness: usize = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();

    HEIGHT_WEIGHT * aggregate as f32
        + LINES_WEIGHT * lines
        + HOLES_WEIGHT * holes as f32
        + BUMPINESS_WEIGHT * bumpiness as f32
}

// === Breakout ===

/// Track the ball with a drifting offset so rebounds vary
pub fn play_breakout<R: Rng + ?Sized>(
    mut state: BreakoutState,
    step_limit: u32,
    rng: &mut R,
) -> DemoRun {
    let mut run = DemoRun::new(GameId::Breakout);
    while !state.game_over && run.steps < step_limit {
        let t = run.steps as f32 * 0.01;
        let offset = (t.sin() * 0.3 + (t * 0.7).sin() * 0.1) * PADDLE_WIDTH;
        state.move_paddle(state.ball.pos.x + offset);
        run.events
            .extend(state.tick(rng).into_iter().map(EngineEvent::Breakout));
        run.steps += 1;
    }
    run.finish(&state)
}

// === Invaders ===

/// How far above the cannon an alien shot counts as incoming
const DODGE_RANGE: f32 = 60.0;

/// Hunt the lowest alien, fire when lined up, sidestep incoming shots
pub fn play_invaders<R: Rng + ?Sized>(
    mut state: InvadersState,
    step_limit: u32,
    rng: &mut R,
) -> DemoRun {
    let mut run = DemoRun::new(GameId::Invaders);
    while !state.game_over && run.steps < step_limit {
        let centre = state.player.pos.x + state.player.width / 2.0;

        let threat = state.alien_bullets.iter().find(|b| {
            (b.pos.x - centre).abs() <= state.player.width
                && b.pos.y < state.player.pos.y
                && state.player.pos.y - b.pos.y < DODGE_RANGE
        });
        let target = state
            .aliens
            .iter()
            .filter(|a| a.alive)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|a| a.pos.x + ALIEN_SIZE / 2.0);

        if let Some(bullet) = threat {
            let away = if bullet.pos.x > centre || centre > state.width - state.player.width {
                Direction::Left
            } else {
                Direction::Right
            };
            state.move_player(away);
        } else if let Some(x) = target {
            if (x - centre).abs() > ALIEN_SIZE / 4.0 {
                state.move_player(if x < centre { Direction::Left } else { Direction::Right });
            }
            if (x - centre).abs() < ALIEN_SIZE / 2.0 && state.player_shoot() {
                run.events.push(EngineEvent::Shot);
            }
        }

        run.events
            .extend(state.tick(rng).into_iter().map(EngineEvent::Invaders));
        run.steps += 1;
    }
    run.finish(&state)
}

// === 2048 ===

/// Corner strategy preference
const SLIDE_ORDER: [Direction; 4] = [
    Direction::Down,
    Direction::Left,
    Direction::Right,
    Direction::Up,
];

/// Keep big tiles in the bottom-left corner by preferring down and left
pub fn play_2048<R: Rng + ?Sized>(mut board: Board, step_limit: u32, rng: &mut R) -> DemoRun {
    let mut run = DemoRun::new(GameId::Puzzle2048);
    while !board.game_over && run.steps < step_limit {
        let moved = SLIDE_ORDER.iter().any(|&dir| board.slide(dir, rng));
        if !moved {
            break;
        }
        let merged = board.grid.iter().flatten().flatten().any(|t| t.merged);
        run.events.push(EngineEvent::Slid { merged });
        run.steps += 1;
    }
    run.finish(&board)
}

// === Memory ===

/// Player with perfect recall of every face seen so far. One step per flip.
pub fn play_memory<R: Rng + ?Sized>(mut state: MemoryState, step_limit: u32, rng: &mut R) -> DemoRun {
    let mut run = DemoRun::new(GameId::Memory);
    let mut seen: Vec<Option<char>> = vec![None; state.cards.len()];

    while !state.game_over && run.steps + 2 <= step_limit {
        let known = known_pair(&state, &seen);
        let first = match known {
            Some((a, _)) => Some(a),
            None => unseen_card(&state, &seen, None, rng),
        };
        let Some(first) = first else {
            break;
        };
        let outcome = state.flip_card(first);
        seen[first] = Some(state.cards[first].symbol);
        run.events.push(EngineEvent::Memory(outcome));
        run.steps += 1;

        let symbol = state.cards[first].symbol;
        let partner = match known {
            Some((_, b)) => Some(b),
            None => (0..seen.len())
                .find(|&i| i != first && !state.cards[i].matched && seen[i] == Some(symbol)),
        };
        let second = match partner {
            Some(b) => Some(b),
            None => unseen_card(&state, &seen, Some(first), rng),
        };
        let Some(second) = second else {
            break;
        };
        let outcome = state.flip_card(second);
        seen[second] = Some(state.cards[second].symbol);
        run.events.push(EngineEvent::Memory(outcome));
        run.steps += 1;

        if outcome == FlipOutcome::Mismatch {
            state.unflip_mismatch();
        }
    }
    run.finish(&state)
}

/// Two remembered, unmatched cards with the same face
fn known_pair(state: &MemoryState, seen: &[Option<char>]) -> Option<(usize, usize)> {
    let open: Vec<usize> = (0..seen.len())
        .filter(|&i| seen[i].is_some() && !state.cards[i].matched)
        .collect();
    open.iter().enumerate().find_map(|(k, &a)| {
        open[k + 1..]
            .iter()
            .find(|&&b| seen[b] == seen[a])
            .map(|&b| (a, b))
    })
}

fn unseen_card<R: Rng + ?Sized>(
    state: &MemoryState,
    seen: &[Option<char>],
    except: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    let hidden: Vec<usize> = (0..seen.len())
        .filter(|&i| seen[i].is_none() && !state.cards[i].matched && Some(i) != except)
        .collect();
    if hidden.is_empty() {
        None
    } else {
        Some(hidden[rng.random_range(0..hidden.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded;

    #[test]
    fn test_every_demo_starts_and_respects_step_limit() {
        let fields = Playfields::default();
        for game in GameId::ALL {
            let run = run(game, &fields, 50, &mut seeded(1));
            assert_eq!(run.game, game);
            assert!(run.steps <= 50);
            assert_eq!(run.events.first(), Some(&EngineEvent::Started(game)));
        }
    }

    #[test]
    fn test_memory_player_always_finishes() {
        for seed in 0..10 {
            let state = MemoryState::new(8, &mut seeded(seed));
            let run = play_memory(state, DEFAULT_STEP_LIMIT, &mut seeded(seed + 100));
            assert!(run.finished);
            assert_eq!(run.summary.pairs, Some(8));
            assert_eq!(run.events.last(), Some(&EngineEvent::GameOver(GameId::Memory)));
            // Perfect recall never needs more than one mismatch per unseen pair
            assert!(run.summary.moves.is_some_and(|m| m <= 16));
        }
    }

    #[test]
    fn test_2048_player_plays_until_stuck() {
        let board = Board::new(4, &mut seeded(3));
        let run = play_2048(board, DEFAULT_STEP_LIMIT, &mut seeded(4));
        assert!(run.finished);
        assert!(run.summary.score > 0);
        assert!(run.summary.max_tile.is_some_and(|t| t >= 64));
    }

    #[test]
    fn test_snake_player_eats() {
        let state = SnakeState::new(20, 20, &mut seeded(5));
        let run = play_snake(state, 2_000, &mut seeded(6));
        let ate = run
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Snake(crate::sim::SnakeEvent::Ate)))
            .count();
        assert!(ate >= 5);
        assert_eq!(run.summary.score, ate as u64 * 10);
    }

    #[test]
    fn test_tetris_player_clears_lines() {
        let state = TetrisState::new(&mut seeded(7));
        let run = play_tetris(state, 300, &mut seeded(8));
        assert!(run.summary.lines_cleared.is_some_and(|l| l > 0));
    }

    #[test]
    fn test_evaluate_prefers_line_clear() {
        let mut board = vec![[None; tetris::COLS]; tetris::ROWS];
        for x in 0..tetris::COLS - 1 {
            board[tetris::ROWS - 1][x] = Some(tetris::PieceKind::O);
        }
        let bottom = tetris::ROWS as i32 - 1;
        let fill = [
            Point::new(9, bottom),
            Point::new(9, bottom - 1),
            Point::new(9, bottom - 2),
            Point::new(9, bottom - 3),
        ];
        let stack = [
            Point::new(0, bottom - 1),
            Point::new(0, bottom - 2),
            Point::new(0, bottom - 3),
            Point::new(0, bottom - 4),
        ];
        assert!(evaluate_placement(&board, &fill) > evaluate_placement(&board, &stack));
    }

    #[test]
    fn test_breakout_player_breaks_bricks() {
        let state = BreakoutState::new(400.0, 500.0);
        let run = play_breakout(state, 3_000, &mut seeded(9));
        assert!(run.summary.score > 0);
    }

    #[test]
    fn test_invaders_player_scores() {
        let state = InvadersState::new(400.0, 500.0);
        let run = play_invaders(state, 2_000, &mut seeded(10));
        assert!(run.events.contains(&EngineEvent::Shot));
        assert!(run.summary.score > 0);
    }
}
