//! Snake: grid path growth, food spawning and collision death

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::{Direction, Point};
use super::{GameSession, GameSummary};
use crate::GameId;

/// Points awarded per food eaten
pub const SCORE_PER_FOOD: u64 = 10;

/// Rejection-sampling attempts before falling back to a free-cell scan
const FOOD_SAMPLE_ATTEMPTS: u32 = 64;

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakeEvent {
    /// Advanced one cell without growing
    Moved,
    /// Head landed on food; snake grew by one
    Ate,
    /// Hit a wall or itself; body left untouched
    Died,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeState {
    /// Body cells, head first
    pub segments: VecDeque<Point>,
    pub food: Point,
    pub direction: Direction,
    /// Direction committed on the next tick
    pub next_direction: Direction,
    pub cols: i32,
    pub rows: i32,
    pub score: u64,
    pub game_over: bool,
}

impl SnakeState {
    /// Three-segment snake centred on the grid, heading right
    pub fn new<R: Rng + ?Sized>(cols: i32, rows: i32, rng: &mut R) -> Self {
        let cx = cols / 2;
        let cy = rows / 2;
        let segments = VecDeque::from([
            Point::new(cx, cy),
            Point::new(cx - 1, cy),
            Point::new(cx - 2, cy),
        ]);
        let mut state = Self {
            segments,
            food: Point::default(),
            direction: Direction::Right,
            next_direction: Direction::Right,
            cols,
            rows,
            score: 0,
            game_over: false,
        };
        if let Some(food) = state.spawn_food(rng) {
            state.food = food;
        }
        state
    }

    pub fn head(&self) -> Point {
        self.segments[0]
    }

    pub fn length(&self) -> usize {
        self.segments.len()
    }

    /// Queue a turn; reversing onto the current heading is ignored
    pub fn set_direction(&mut self, dir: Direction) {
        if dir != self.direction.opposite() {
            self.next_direction = dir;
        }
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SnakeEvent {
        if self.game_over {
            return SnakeEvent::Died;
        }

        self.direction = self.next_direction;
        let next = self.head().step(self.direction);

        if !self.in_bounds(next) || self.occupies(next) {
            self.game_over = true;
            log::info!("Snake died at length {} with score {}", self.length(), self.score);
            return SnakeEvent::Died;
        }

        self.segments.push_front(next);

        if next == self.food {
            self.score += SCORE_PER_FOOD;
            if let Some(food) = self.spawn_food(rng) {
                self.food = food;
            }
            return SnakeEvent::Ate;
        }

        self.segments.pop_back();
        SnakeEvent::Moved
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.cols && p.y >= 0 && p.y < self.rows
    }

    pub fn occupies(&self, p: Point) -> bool {
        self.segments.contains(&p)
    }

    /// Random cell not covered by the snake, `None` when the grid is full
    pub fn spawn_food<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        if self.cols <= 0 || self.rows <= 0 {
            return None;
        }
        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let p = Point::new(
                rng.random_range(0..self.cols),
                rng.random_range(0..self.rows),
            );
            if !self.occupies(p) {
                return Some(p);
            }
        }

        // Crowded board: pick uniformly among the free cells instead
        let free: Vec<Point> = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| Point::new(x, y)))
            .filter(|p| !self.occupies(*p))
            .collect();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.random_range(0..free.len())])
        }
    }
}

impl GameSession for SnakeState {
    fn game_id(&self) -> GameId {
        GameId::Snake
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
            snake_length: Some(self.length()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded;
    use proptest::prelude::*;

    #[test]
    fn test_new_snake_centred_heading_right() {
        let mut rng = seeded(1);
        let state = SnakeState::new(20, 20, &mut rng);
        assert_eq!(state.length(), 3);
        assert_eq!(state.head(), Point::new(10, 10));
        assert_eq!(state.segments[2], Point::new(8, 10));
        assert_eq!(state.direction, Direction::Right);
        assert!(!state.occupies(state.food));
        assert!(state.in_bounds(state.food));
    }

    #[test]
    fn test_reverse_direction_rejected() {
        let mut rng = seeded(2);
        let mut state = SnakeState::new(20, 20, &mut rng);
        state.set_direction(Direction::Left);
        assert_eq!(state.next_direction, Direction::Right);
        state.set_direction(Direction::Up);
        assert_eq!(state.next_direction, Direction::Up);
    }

    #[test]
    fn test_move_keeps_length() {
        let mut rng = seeded(3);
        let mut state = SnakeState::new(20, 20, &mut rng);
        state.food = Point::new(0, 0);
        assert_eq!(state.tick(&mut rng), SnakeEvent::Moved);
        assert_eq!(state.length(), 3);
        assert_eq!(state.head(), Point::new(11, 10));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut rng = seeded(4);
        let mut state = SnakeState::new(20, 20, &mut rng);
        state.food = Point::new(11, 10);
        assert_eq!(state.tick(&mut rng), SnakeEvent::Ate);
        assert_eq!(state.length(), 4);
        assert_eq!(state.score, 10);
        assert!(!state.occupies(state.food));
    }

    #[test]
    fn test_wall_death_leaves_body() {
        let mut rng = seeded(5);
        let mut state = SnakeState::new(20, 20, &mut rng);
        state.food = Point::new(0, 0);
        for _ in 0..9 {
            assert_eq!(state.tick(&mut rng), SnakeEvent::Moved);
        }
        let before = state.segments.clone();
        assert_eq!(state.tick(&mut rng), SnakeEvent::Died);
        assert!(state.game_over);
        assert_eq!(state.segments, before);
    }

    #[test]
    fn test_self_collision() {
        let mut rng = seeded(6);
        let mut state = SnakeState::new(20, 20, &mut rng);
        state.segments = VecDeque::from([
            Point::new(5, 5),
            Point::new(4, 5),
            Point::new(4, 6),
            Point::new(5, 6),
            Point::new(6, 6),
        ]);
        state.food = Point::new(0, 0);
        state.set_direction(Direction::Down);
        let before = state.segments.clone();
        assert_eq!(state.tick(&mut rng), SnakeEvent::Died);
        assert_eq!(state.segments, before);
    }

    #[test]
    fn test_food_on_last_free_cell() {
        let mut rng = seeded(7);
        let mut state = SnakeState::new(2, 2, &mut rng);
        state.segments = VecDeque::from([Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)]);
        assert_eq!(state.spawn_food(&mut rng), Some(Point::new(0, 1)));
        state.segments.push_back(Point::new(0, 1));
        assert_eq!(state.spawn_food(&mut rng), None);
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_body_never_overlaps(seed in any::<u64>(), dirs in proptest::collection::vec(direction(), 1..200)) {
            let mut rng = seeded(seed);
            let mut state = SnakeState::new(12, 12, &mut rng);
            for dir in dirs {
                state.set_direction(dir);
                let len = state.length();
                let score = state.score;
                match state.tick(&mut rng) {
                    SnakeEvent::Died => break,
                    SnakeEvent::Ate => {
                        prop_assert_eq!(state.length(), len + 1);
                        prop_assert_eq!(state.score, score + SCORE_PER_FOOD);
                    }
                    SnakeEvent::Moved => prop_assert_eq!(state.length(), len),
                }
                let mut cells: Vec<_> = state.segments.iter().copied().collect();
                cells.sort_by_key(|p| (p.x, p.y));
                cells.dedup();
                prop_assert_eq!(cells.len(), state.length());
            }
        }
    }
}
