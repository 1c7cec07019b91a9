//! Invaders: a marching alien fleet, bullets and destructible shields
//!
//! Per-frame simulation in canvas pixels (y grows down). The fleet only moves when
//! its timer elapses; the timer period shrinks every time the fleet descends.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::{GameSession, GameSummary};
use crate::GameId;

pub const ALIEN_COLS: usize = 8;
pub const ALIEN_ROWS: usize = 4;
pub const ALIEN_SIZE: f32 = 24.0;
const ALIEN_GAP: f32 = 8.0;
const FLEET_TOP: f32 = 40.0;
/// Horizontal step per fleet move
const FLEET_STEP: f32 = 8.0;
/// Fleet turns around this close to a side wall
const EDGE_MARGIN: f32 = 10.0;
/// Ticks between fleet moves at the start
pub const FLEET_START_PERIOD: u32 = 30;
const FLEET_MIN_PERIOD: u32 = 5;
const FLEET_SPEEDUP: u32 = 2;
/// Chance per tick that some alien fires
const ALIEN_FIRE_CHANCE: f64 = 0.02;

pub const PLAYER_WIDTH: f32 = 36.0;
const PLAYER_HEIGHT: f32 = 12.0;
const PLAYER_SPEED: f32 = 5.0;
const PLAYER_OFFSET: f32 = 40.0;
pub const MAX_PLAYER_BULLETS: usize = 2;
const BULLET_SPEED: f32 = 6.0;
const ALIEN_BULLET_SPEED: f32 = 3.0;

pub const SHIELD_COUNT: usize = 3;
pub const SHIELD_WIDTH: usize = 40;
pub const SHIELD_HEIGHT: usize = 24;
const SHIELD_OFFSET: f32 = 100.0;
/// Impact erases a square of this radius around the hit pixel
const EROSION_RADIUS: i32 = 2;

pub const START_LIVES: u8 = 3;

/// Things that happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvadersEvent {
    /// A player bullet destroyed an alien
    AlienHit,
    /// An alien bullet struck the player
    PlayerHit,
    /// A bullet chipped a shield
    ShieldHit,
    /// The fleet reached the player's row
    Overrun,
    /// No aliens remain
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub width: f32,
}

impl Player {
    fn hitbox(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, PLAYER_HEIGHT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alien {
    /// Top-left corner
    pub pos: Vec2,
    pub alive: bool,
    /// Point tier 0..=2, higher rows are worth more
    pub tier: u8,
}

impl Alien {
    pub fn hitbox(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, ALIEN_SIZE, ALIEN_SIZE)
    }

    /// Score for destroying this alien
    pub fn points(&self) -> u64 {
        (u64::from(self.tier) + 1) * 10
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Vertical velocity per tick (negative travels up)
    pub vy: f32,
}

/// A destructible bunker; `pixels[y][x]` is true while that pixel stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub rect: Rect,
    pub pixels: Vec<Vec<bool>>,
}

impl Shield {
    fn solid(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, SHIELD_WIDTH as f32, SHIELD_HEIGHT as f32),
            pixels: vec![vec![true; SHIELD_WIDTH]; SHIELD_HEIGHT],
        }
    }

    pub fn intact_pixels(&self) -> usize {
        self.pixels.iter().flatten().filter(|p| **p).count()
    }

    /// Erode around a bullet if it lands on a standing pixel
    fn absorb(&mut self, at: Vec2) -> bool {
        let r = self.rect;
        if at.x < r.left() || at.x >= r.right() || at.y < r.top() || at.y >= r.bottom() {
            return false;
        }
        let px = (at.x - r.left()).floor() as i32;
        let py = (at.y - r.top()).floor() as i32;
        if !self.pixel(px, py) {
            return false;
        }
        for dy in -EROSION_RADIUS..=EROSION_RADIUS {
            for dx in -EROSION_RADIUS..=EROSION_RADIUS {
                self.clear(px + dx, py + dy);
            }
        }
        true
    }

    fn pixel(&self, x: i32, y: i32) -> bool {
        usize::try_from(y)
            .ok()
            .zip(usize::try_from(x).ok())
            .and_then(|(y, x)| self.pixels.get(y).and_then(|row| row.get(x)))
            .copied()
            .unwrap_or(false)
    }

    fn clear(&mut self, x: i32, y: i32) {
        if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
            if let Some(p) = self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
                *p = false;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvadersState {
    pub player: Player,
    pub aliens: Vec<Alien>,
    pub player_bullets: Vec<Bullet>,
    pub alien_bullets: Vec<Bullet>,
    pub shields: Vec<Shield>,
    /// +1 marching right, -1 marching left
    pub fleet_dir: f32,
    /// Ticks between fleet moves
    pub fleet_period: u32,
    pub fleet_timer: u32,
    pub score: u64,
    pub lives: u8,
    pub game_over: bool,
    pub won: bool,
    pub width: f32,
    pub height: f32,
}

impl InvadersState {
    pub fn new(width: f32, height: f32) -> Self {
        let pitch = ALIEN_SIZE + ALIEN_GAP;
        let start_x = (width - ALIEN_COLS as f32 * pitch) / 2.0;
        let mut aliens = Vec::with_capacity(ALIEN_ROWS * ALIEN_COLS);
        for row in 0..ALIEN_ROWS {
            let tier = match row {
                0 => 2,
                1 => 1,
                _ => 0,
            };
            for col in 0..ALIEN_COLS {
                aliens.push(Alien {
                    pos: Vec2::new(
                        start_x + col as f32 * pitch,
                        FLEET_TOP + row as f32 * pitch,
                    ),
                    alive: true,
                    tier,
                });
            }
        }

        let shields = (0..SHIELD_COUNT)
            .map(|i| {
                let x = width * (i + 1) as f32 / (SHIELD_COUNT + 1) as f32
                    - SHIELD_WIDTH as f32 / 2.0;
                Shield::solid(x, height - SHIELD_OFFSET)
            })
            .collect();

        Self {
            player: Player {
                pos: Vec2::new(width / 2.0 - PLAYER_WIDTH / 2.0, height - PLAYER_OFFSET),
                width: PLAYER_WIDTH,
            },
            aliens,
            player_bullets: Vec::new(),
            alien_bullets: Vec::new(),
            shields,
            fleet_dir: 1.0,
            fleet_period: FLEET_START_PERIOD,
            fleet_timer: 0,
            score: 0,
            lives: START_LIVES,
            game_over: false,
            won: false,
            width,
            height,
        }
    }

    pub fn aliens_alive(&self) -> usize {
        self.aliens.iter().filter(|a| a.alive).count()
    }

    /// Step the player sideways, clamped to the screen
    pub fn move_player(&mut self, dir: super::Direction) {
        let dx = match dir {
            super::Direction::Left => -PLAYER_SPEED,
            super::Direction::Right => PLAYER_SPEED,
            super::Direction::Up | super::Direction::Down => return,
        };
        self.player.pos.x = (self.player.pos.x + dx)
            .min(self.width - self.player.width)
            .max(0.0);
    }

    /// Fire from the cannon unless two shots are already in flight
    pub fn player_shoot(&mut self) -> bool {
        if self.game_over || self.player_bullets.len() >= MAX_PLAYER_BULLETS {
            return false;
        }
        self.player_bullets.push(Bullet {
            pos: Vec2::new(
                self.player.pos.x + self.player.width / 2.0,
                self.player.pos.y - 4.0,
            ),
            vy: -BULLET_SPEED,
        });
        true
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<InvadersEvent> {
        let mut events = Vec::new();
        if self.game_over {
            return events;
        }

        for b in self.player_bullets.iter_mut().chain(self.alien_bullets.iter_mut()) {
            b.pos.y += b.vy;
        }
        self.cull_bullets();

        self.advance_fleet();

        if rng.random_bool(ALIEN_FIRE_CHANCE) {
            self.alien_fire(rng);
        }

        // Player bullets: first live alien under the bullet dies
        let aliens = &mut self.aliens;
        let score = &mut self.score;
        self.player_bullets.retain(|bullet| {
            match aliens
                .iter_mut()
                .find(|a| a.alive && a.hitbox().contains(bullet.pos))
            {
                Some(alien) => {
                    alien.alive = false;
                    *score += alien.points();
                    events.push(InvadersEvent::AlienHit);
                    false
                }
                None => true,
            }
        });

        // Any bullet landing on a standing shield pixel is absorbed
        let shields = &mut self.shields;
        let mut absorbed = |bullet: &Bullet| {
            let hit = shields.iter_mut().any(|s| s.absorb(bullet.pos));
            if hit {
                events.push(InvadersEvent::ShieldHit);
            }
            !hit
        };
        self.player_bullets.retain(|b| absorbed(b));
        self.alien_bullets.retain(|b| absorbed(b));

        // At most one alien bullet can hit the player per tick
        let hitbox = self.player.hitbox();
        if let Some(i) = self.alien_bullets.iter().position(|b| hitbox.contains(b.pos)) {
            self.alien_bullets.remove(i);
            self.lives = self.lives.saturating_sub(1);
            events.push(InvadersEvent::PlayerHit);
            if self.lives == 0 {
                self.game_over = true;
                log::info!("Invaders game over with score {}", self.score);
            } else {
                log::debug!("Player hit, {} lives left", self.lives);
            }
        }

        if self
            .aliens
            .iter()
            .any(|a| a.alive && a.pos.y + ALIEN_SIZE >= self.player.pos.y)
        {
            self.game_over = true;
            events.push(InvadersEvent::Overrun);
            log::info!("Invaders overran the player with score {}", self.score);
        }

        if self.aliens.iter().all(|a| !a.alive) {
            self.won = true;
            self.game_over = true;
            events.push(InvadersEvent::Won);
            log::info!("Invaders fleet destroyed, score {}", self.score);
        }

        self.cull_bullets();
        events
    }

    fn cull_bullets(&mut self) {
        let height = self.height;
        self.player_bullets.retain(|b| b.pos.y > 0.0);
        self.alien_bullets.retain(|b| b.pos.y < height);
    }

    /// March sideways, or turn around and drop half a row at a wall
    fn advance_fleet(&mut self) {
        self.fleet_timer += 1;
        if self.fleet_timer < self.fleet_period {
            return;
        }
        self.fleet_timer = 0;

        let width = self.width;
        let dir = self.fleet_dir;
        let at_edge = self.aliens.iter().filter(|a| a.alive).any(|a| {
            (dir > 0.0 && a.pos.x + ALIEN_SIZE >= width - EDGE_MARGIN)
                || (dir < 0.0 && a.pos.x <= EDGE_MARGIN)
        });

        if at_edge {
            self.fleet_dir = -self.fleet_dir;
            for alien in &mut self.aliens {
                alien.pos.y += ALIEN_SIZE / 2.0;
            }
            self.fleet_period = self
                .fleet_period
                .saturating_sub(FLEET_SPEEDUP)
                .max(FLEET_MIN_PERIOD);
            log::debug!("Fleet descends, move period now {}", self.fleet_period);
        } else {
            for alien in self.aliens.iter_mut().filter(|a| a.alive) {
                alien.pos.x += dir * FLEET_STEP;
            }
        }
    }

    fn alien_fire<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let alive: Vec<&Alien> = self.aliens.iter().filter(|a| a.alive).collect();
        if alive.is_empty() {
            return;
        }
        let shooter = alive[rng.random_range(0..alive.len())];
        let bullet = Bullet {
            pos: Vec2::new(shooter.pos.x + ALIEN_SIZE / 2.0, shooter.pos.y + ALIEN_SIZE),
            vy: ALIEN_BULLET_SPEED,
        };
        self.alien_bullets.push(bullet);
    }

    /// Destroyed every alien
    pub fn perfect_game(&self) -> bool {
        self.won
    }
}

impl GameSession for InvadersState {
    fn game_id(&self) -> GameId {
        GameId::Invaders
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
            no_lives_lost: self.lives == START_LIVES,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;
    use crate::sim::rng::seeded;

    fn state() -> InvadersState {
        InvadersState::new(400.0, 500.0)
    }

    #[test]
    fn test_new_layout() {
        let s = state();
        assert_eq!(s.aliens.len(), 32);
        assert_eq!(s.aliens[0].tier, 2);
        assert_eq!(s.aliens[8].tier, 1);
        assert_eq!(s.aliens[31].tier, 0);
        assert_eq!(s.aliens[0].pos, Vec2::new(72.0, 40.0));
        assert_eq!(s.shields.len(), 3);
        assert_eq!(s.shields[0].rect.pos, Vec2::new(80.0, 400.0));
        assert_eq!(s.shields[0].intact_pixels(), SHIELD_WIDTH * SHIELD_HEIGHT);
        assert_eq!(s.player.pos, Vec2::new(182.0, 460.0));
        assert_eq!((s.fleet_dir, s.fleet_period, s.fleet_timer), (1.0, 30, 0));
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let mut s = state();
        s.move_player(Direction::Left);
        assert_eq!(s.player.pos.x, 177.0);
        for _ in 0..100 {
            s.move_player(Direction::Right);
        }
        assert_eq!(s.player.pos.x, 400.0 - PLAYER_WIDTH);
    }

    #[test]
    fn test_shots_capped_at_two() {
        let mut s = state();
        assert!(s.player_shoot());
        assert!(s.player_shoot());
        assert!(!s.player_shoot());
        assert_eq!(s.player_bullets.len(), 2);
    }

    #[test]
    fn test_bullet_kills_one_alien_for_tier_points() {
        let mut s = state();
        let target = s.aliens[0];
        s.player_bullets.push(Bullet {
            pos: target.pos + Vec2::new(12.0, 12.0 + BULLET_SPEED),
            vy: -BULLET_SPEED,
        });
        let events = s.tick(&mut seeded(1));
        assert_eq!(events.iter().filter(|e| **e == InvadersEvent::AlienHit).count(), 1);
        assert!(!s.aliens[0].alive);
        assert_eq!(s.aliens_alive(), 31);
        assert_eq!(s.score, 30);
        assert!(s.player_bullets.is_empty());
    }

    #[test]
    fn test_bullets_leave_screen() {
        let mut s = state();
        s.player_bullets.push(Bullet {
            pos: Vec2::new(5.0, 3.0),
            vy: -BULLET_SPEED,
        });
        s.alien_bullets.push(Bullet {
            pos: Vec2::new(5.0, 499.0),
            vy: ALIEN_BULLET_SPEED,
        });
        s.tick(&mut seeded(2));
        assert!(s.player_bullets.is_empty());
        assert!(s.alien_bullets.iter().all(|b| b.pos.y < 500.0));
    }

    #[test]
    fn test_fleet_marches_on_timer() {
        let mut s = state();
        let x0 = s.aliens[0].pos.x;
        for _ in 0..FLEET_START_PERIOD - 1 {
            s.tick(&mut seeded(3));
        }
        assert_eq!(s.aliens[0].pos.x, x0);
        s.tick(&mut seeded(3));
        assert_eq!(s.aliens[0].pos.x, x0 + FLEET_STEP);
        assert_eq!(s.fleet_timer, 0);
    }

    #[test]
    fn test_fleet_turns_and_descends_at_edge() {
        let mut s = state();
        s.aliens[7].pos.x = 400.0 - EDGE_MARGIN - ALIEN_SIZE;
        s.fleet_timer = s.fleet_period - 1;
        let y0 = s.aliens[0].pos.y;
        s.tick(&mut seeded(4));
        assert_eq!(s.fleet_dir, -1.0);
        assert_eq!(s.aliens[0].pos.y, y0 + ALIEN_SIZE / 2.0);
        assert_eq!(s.fleet_period, FLEET_START_PERIOD - 2);
    }

    #[test]
    fn test_fleet_period_has_floor() {
        let mut s = state();
        s.fleet_period = FLEET_MIN_PERIOD;
        s.fleet_timer = FLEET_MIN_PERIOD - 1;
        s.fleet_dir = -1.0;
        s.aliens[0].pos.x = 5.0;
        s.tick(&mut seeded(5));
        assert_eq!(s.fleet_period, FLEET_MIN_PERIOD);
        assert_eq!(s.fleet_dir, 1.0);
    }

    #[test]
    fn test_shield_erodes_and_absorbs() {
        let mut s = state();
        let shield = s.shields[1].rect;
        let impact = Vec2::new(shield.left() + 20.0, shield.top() + 10.0);
        s.alien_bullets.push(Bullet {
            pos: impact - Vec2::new(0.0, ALIEN_BULLET_SPEED),
            vy: ALIEN_BULLET_SPEED,
        });
        let events = s.tick(&mut seeded(6));
        assert!(events.contains(&InvadersEvent::ShieldHit));
        assert_eq!(s.shields[1].intact_pixels(), SHIELD_WIDTH * SHIELD_HEIGHT - 25);
        assert!(!s.shields[1].pixels[10][20]);
        assert!(!s.shields[1].pixels[12][22]);
        assert!(s.shields[1].pixels[13][20]);
        assert!(!s.alien_bullets.iter().any(|b| shield.contains(b.pos)));
    }

    #[test]
    fn test_bullet_passes_through_hole() {
        let mut s = state();
        let shield = s.shields[0].rect;
        for row in s.shields[0].pixels.iter_mut() {
            row[5] = false;
        }
        s.alien_bullets.push(Bullet {
            pos: Vec2::new(shield.left() + 5.0, shield.top() + 2.0),
            vy: ALIEN_BULLET_SPEED,
        });
        let events = s.tick(&mut seeded(7));
        assert!(!events.contains(&InvadersEvent::ShieldHit));
        assert_eq!(s.shields[0].intact_pixels(), (SHIELD_WIDTH - 1) * SHIELD_HEIGHT);
    }

    #[test]
    fn test_player_hit_costs_a_life() {
        let mut s = state();
        s.alien_bullets.push(Bullet {
            pos: s.player.pos + Vec2::new(10.0, 5.0 - ALIEN_BULLET_SPEED),
            vy: ALIEN_BULLET_SPEED,
        });
        let events = s.tick(&mut seeded(8));
        assert!(events.contains(&InvadersEvent::PlayerHit));
        assert_eq!(s.lives, 2);
        assert!(!s.game_over);

        s.lives = 1;
        s.alien_bullets.push(Bullet {
            pos: s.player.pos + Vec2::new(10.0, 5.0 - ALIEN_BULLET_SPEED),
            vy: ALIEN_BULLET_SPEED,
        });
        s.tick(&mut seeded(8));
        assert_eq!(s.lives, 0);
        assert!(s.game_over);
    }

    #[test]
    fn test_overrun_ends_game_with_lives_left() {
        let mut s = state();
        s.aliens[20].pos.y = s.player.pos.y - ALIEN_SIZE;
        let events = s.tick(&mut seeded(9));
        assert!(events.contains(&InvadersEvent::Overrun));
        assert!(s.game_over);
        assert_eq!(s.lives, START_LIVES);
        assert!(!s.won);
    }

    #[test]
    fn test_last_alien_wins() {
        let mut s = state();
        for alien in s.aliens.iter_mut().skip(1) {
            alien.alive = false;
        }
        let target = s.aliens[0];
        s.player_bullets.push(Bullet {
            pos: target.pos + Vec2::new(12.0, 12.0 + BULLET_SPEED),
            vy: -BULLET_SPEED,
        });
        let events = s.tick(&mut seeded(10));
        assert!(events.contains(&InvadersEvent::Won));
        assert!(s.won && s.game_over);
        assert!(s.summary().perfect_game);
        assert!(!s.player_shoot());
    }

    #[test]
    fn test_fleet_fires_from_a_live_alien() {
        let mut s = state();
        let mut rng = seeded(11);
        for _ in 0..1000 {
            s.tick(&mut rng);
            if !s.alien_bullets.is_empty() {
                break;
            }
        }
        assert_eq!(s.alien_bullets.len(), 1);
        let bullet = s.alien_bullets[0];
        assert_eq!(bullet.vy, ALIEN_BULLET_SPEED);
        assert!(s.aliens.iter().any(|a| {
            a.alive && a.pos + Vec2::new(ALIEN_SIZE / 2.0, ALIEN_SIZE) == bullet.pos
        }));
    }

    #[test]
    fn test_empty_fleet_never_fires() {
        let mut s = state();
        for alien in s.aliens.iter_mut() {
            alien.alive = false;
        }
        assert_eq!(s.aliens_alive(), 0);
        let mut rng = seeded(12);
        for _ in 0..50 {
            s.alien_fire(&mut rng);
        }
        assert!(s.alien_bullets.is_empty());
    }
}
