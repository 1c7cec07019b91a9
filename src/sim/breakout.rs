//! Breakout: ball, paddle and a wall of bricks
//!
//! Per-frame simulation in canvas pixels (y grows down). Collisions are
//! axis-aligned: the ball is treated as its bounding box against bricks and the
//! paddle, and every rebound is a velocity component inversion.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::{GameSession, GameSummary};
use crate::GameId;

pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 8;
/// Row colours, top to bottom
pub const BRICK_COLORS: [u32; BRICK_ROWS] = [0xFF3333, 0xFF8800, 0xFFB000, 0x00FF41, 0x00E5FF];
pub const BRICK_HEIGHT: f32 = 18.0;
const BRICK_MARGIN: f32 = 10.0;
const BRICK_TOP: f32 = 40.0;
const BRICK_GAP: f32 = 4.0;
pub const SCORE_PER_BRICK: u64 = 10;

pub const BALL_SPEED: f32 = 4.0;
pub const BALL_RADIUS: f32 = 5.0;
/// Sideways share of the serve velocity
const SERVE_SIDEWAYS: f32 = 0.7;
/// Serve height above the bottom edge
const SERVE_OFFSET: f32 = 50.0;

pub const PADDLE_WIDTH: f32 = 80.0;
pub const PADDLE_HEIGHT: f32 = 10.0;
const PADDLE_OFFSET: f32 = 30.0;

pub const START_LIVES: u8 = 3;

/// Things that happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakoutEvent {
    /// Ball struck a brick (at most one per tick)
    BrickHit,
    /// That strike used up the brick's last hit
    BrickBroken,
    /// Ball left the bottom edge and a life was lost
    Died,
    /// Last brick broken
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub color: u32,
    /// Hits remaining before the brick breaks
    pub hits: u8,
    pub broken: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutState {
    pub ball: Ball,
    pub paddle: Paddle,
    pub bricks: Vec<Brick>,
    pub score: u64,
    pub lives: u8,
    pub lives_lost: u32,
    pub game_over: bool,
    pub won: bool,
    pub width: f32,
    pub height: f32,
}

impl BreakoutState {
    /// Fresh wall, ball served up and to the right
    pub fn new(width: f32, height: f32) -> Self {
        let brick_w = (width - 2.0 * BRICK_MARGIN) / BRICK_COLS as f32;
        let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
        for (row, &color) in BRICK_COLORS.iter().enumerate() {
            for col in 0..BRICK_COLS {
                bricks.push(Brick {
                    rect: Rect::new(
                        BRICK_MARGIN + col as f32 * brick_w,
                        BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
                        brick_w - BRICK_GAP,
                        BRICK_HEIGHT,
                    ),
                    color,
                    // Top row is armoured
                    hits: if row == 0 { 2 } else { 1 },
                    broken: false,
                });
            }
        }

        Self {
            ball: Ball {
                pos: serve_position(width, height),
                vel: Vec2::new(BALL_SPEED * SERVE_SIDEWAYS, -BALL_SPEED),
                radius: BALL_RADIUS,
            },
            paddle: Paddle {
                rect: Rect::new(
                    width / 2.0 - PADDLE_WIDTH / 2.0,
                    height - PADDLE_OFFSET,
                    PADDLE_WIDTH,
                    PADDLE_HEIGHT,
                ),
            },
            bricks,
            score: 0,
            lives: START_LIVES,
            lives_lost: 0,
            game_over: false,
            won: false,
            width,
            height,
        }
    }

    /// Centre the paddle on pointer `x`, kept fully on screen
    pub fn move_paddle(&mut self, x: f32) {
        let w = self.paddle.rect.size.x;
        self.paddle.rect.pos.x = (x - w / 2.0).min(self.width - w).max(0.0);
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| !b.broken).count()
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<BreakoutEvent> {
        let mut events = Vec::new();
        if self.game_over {
            return events;
        }

        let ball = &mut self.ball;
        ball.pos += ball.vel;

        // Side walls
        if ball.pos.x - ball.radius <= 0.0 || ball.pos.x + ball.radius >= self.width {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = ball.pos.x.clamp(ball.radius, self.width - ball.radius);
        }
        // Ceiling
        if ball.pos.y - ball.radius <= 0.0 {
            ball.vel.y = ball.vel.y.abs();
            ball.pos.y = ball.radius;
        }

        // Floor
        if ball.pos.y + ball.radius >= self.height {
            self.lives = self.lives.saturating_sub(1);
            self.lives_lost += 1;
            events.push(BreakoutEvent::Died);
            if self.lives == 0 {
                self.game_over = true;
                log::info!("Breakout game over with score {}", self.score);
            } else {
                log::debug!("Breakout life lost, {} remaining", self.lives);
                self.serve(rng);
            }
            return events;
        }

        // Paddle, only while falling
        let p = self.paddle.rect;
        if ball.vel.y > 0.0
            && ball.pos.y + ball.radius >= p.top()
            && ball.pos.y - ball.radius <= p.bottom()
            && ball.pos.x >= p.left()
            && ball.pos.x <= p.right()
        {
            ball.vel.y = -ball.vel.y.abs();
            // -1 at the left edge, 0 centre, +1 right edge
            let hit = (ball.pos.x - p.left()) / p.size.x;
            ball.vel.x = BALL_SPEED * (hit - 0.5) * 2.0;
            ball.pos.y = p.top() - ball.radius;
        }

        // First brick touched wins
        if let Some(brick) = self
            .bricks
            .iter_mut()
            .filter(|b| !b.broken)
            .find(|b| b.rect.overlaps_circle_box(ball.pos, ball.radius))
        {
            brick.hits = brick.hits.saturating_sub(1);
            if brick.hits == 0 {
                brick.broken = true;
                self.score += SCORE_PER_BRICK;
                events.push(BreakoutEvent::BrickBroken);
            }
            ball.vel.y = -ball.vel.y;
            events.push(BreakoutEvent::BrickHit);
        }

        if self.bricks.iter().all(|b| b.broken) {
            self.won = true;
            self.game_over = true;
            events.push(BreakoutEvent::Won);
            log::info!(
                "Breakout cleared with score {} ({} lives lost)",
                self.score,
                self.lives_lost
            );
        }

        events
    }

    /// Put the ball back at the serve spot with a random sideways direction
    fn serve<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball.pos = serve_position(self.width, self.height);
        self.ball.vel = Vec2::new(BALL_SPEED * SERVE_SIDEWAYS * side, -BALL_SPEED);
    }

    /// Cleared the wall
    pub fn perfect_game(&self) -> bool {
        self.won
    }

    pub fn no_lives_lost(&self) -> bool {
        self.lives_lost == 0
    }
}

fn serve_position(width: f32, height: f32) -> Vec2 {
    Vec2::new(width / 2.0, height - SERVE_OFFSET)
}

impl GameSession for BreakoutState {
    fn game_id(&self) -> GameId {
        GameId::Breakout
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
            perfect_game: self.perfect_game(),
            no_lives_lost: self.no_lives_lost(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded;

    #[test]
    fn test_new_layout() {
        let state = BreakoutState::new(400.0, 500.0);
        assert_eq!(state.bricks.len(), 40);
        assert!(state.bricks[..8].iter().all(|b| b.hits == 2));
        assert!(state.bricks[8..].iter().all(|b| b.hits == 1));
        assert_eq!(state.bricks[8].color, BRICK_COLORS[1]);
        assert_eq!(state.ball.pos, Vec2::new(200.0, 450.0));
        assert!(state.ball.vel.y < 0.0 && state.ball.vel.x > 0.0);
        assert_eq!(state.paddle.rect.pos, Vec2::new(160.0, 470.0));
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_paddle_clamped() {
        let mut state = BreakoutState::new(400.0, 500.0);
        state.move_paddle(-100.0);
        assert_eq!(state.paddle.rect.pos.x, 0.0);
        state.move_paddle(1000.0);
        assert_eq!(state.paddle.rect.pos.x, 320.0);
        state.move_paddle(200.0);
        assert_eq!(state.paddle.rect.pos.x, 160.0);
    }

    #[test]
    fn test_last_life_lost_ends_game() {
        let mut state = BreakoutState::new(400.0, 500.0);
        state.ball.pos.y = 496.0;
        state.ball.vel.y = 5.0;
        state.lives = 1;
        let events = state.tick(&mut seeded(1));
        assert!(events.contains(&BreakoutEvent::Died));
        assert_eq!(state.lives, 0);
        assert!(state.game_over);
        assert!(!state.won);
        assert!(state.tick(&mut seeded(1)).is_empty());
    }

    #[test]
    fn test_life_lost_resets_serve() {
        let mut state = BreakoutState::new(400.0, 500.0);
        state.ball.pos = Vec2::new(50.0, 496.0);
        state.ball.vel = Vec2::new(1.0, 5.0);
        let events = state.tick(&mut seeded(2));
        assert_eq!(events, vec![BreakoutEvent::Died]);
        assert_eq!(state.lives, 2);
        assert_eq!(state.lives_lost, 1);
        assert!(!state.game_over);
        assert_eq!(state.ball.pos, Vec2::new(200.0, 450.0));
        assert_eq!(state.ball.vel.y, -BALL_SPEED);
        assert_eq!(state.ball.vel.x.abs(), BALL_SPEED * 0.7);
    }

    #[test]
    fn test_wall_and_ceiling_rebound() {
        let mut state = BreakoutState::new(400.0, 500.0);
        state.ball.pos = Vec2::new(3.0, 300.0);
        state.ball.vel = Vec2::new(-4.0, 1.0);
        state.tick(&mut seeded(3));
        assert_eq!(state.ball.vel.x, 4.0);
        assert_eq!(state.ball.pos.x, BALL_RADIUS);

        state.ball.pos = Vec2::new(200.0, 6.0);
        state.ball.vel = Vec2::new(0.0, -4.0);
        state.tick(&mut seeded(3));
        assert_eq!(state.ball.vel.y, 4.0);
    }

    #[test]
    fn test_paddle_angles_by_hit_offset() {
        let mut state = BreakoutState::new(400.0, 500.0);
        // Left edge of the paddle sends the ball left
        state.ball.pos = Vec2::new(162.0, 462.0);
        state.ball.vel = Vec2::new(0.0, 4.0);
        state.tick(&mut seeded(4));
        assert!(state.ball.vel.y < 0.0);
        assert!(state.ball.vel.x < -3.0);
        assert_eq!(state.ball.pos.y, 470.0 - BALL_RADIUS);

        // Dead centre goes straight up
        state.ball.pos = Vec2::new(200.0, 462.0);
        state.ball.vel = Vec2::new(0.0, 4.0);
        state.tick(&mut seeded(4));
        assert_eq!(state.ball.vel.x, 0.0);
    }

    #[test]
    fn test_armoured_brick_takes_two_hits() {
        let mut state = BreakoutState::new(400.0, 500.0);
        let target = state.bricks[0].rect;
        let aim = Vec2::new(target.left() + 5.0, target.bottom() + 6.0);

        state.ball.pos = aim;
        state.ball.vel = Vec2::new(0.0, -2.0);
        let events = state.tick(&mut seeded(5));
        assert_eq!(events, vec![BreakoutEvent::BrickHit]);
        assert_eq!(state.bricks[0].hits, 1);
        assert_eq!(state.ball.vel.y, 2.0);

        state.ball.pos = aim;
        state.ball.vel = Vec2::new(0.0, -2.0);
        let events = state.tick(&mut seeded(5));
        assert_eq!(events, vec![BreakoutEvent::BrickBroken, BreakoutEvent::BrickHit]);
        assert!(state.bricks[0].broken);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_last_brick_wins_same_tick() {
        let mut state = BreakoutState::new(400.0, 500.0);
        for brick in state.bricks.iter_mut().skip(1) {
            brick.broken = true;
            brick.hits = 0;
        }
        state.bricks[0].hits = 1;
        let target = state.bricks[0].rect;
        state.ball.pos = Vec2::new(target.left() + 5.0, target.bottom() + 6.0);
        state.ball.vel = Vec2::new(0.0, -2.0);
        let events = state.tick(&mut seeded(6));
        assert!(events.contains(&BreakoutEvent::Won));
        assert!(state.won && state.game_over);
        assert!(state.summary().perfect_game);
        assert!(state.summary().no_lives_lost);
    }
}
