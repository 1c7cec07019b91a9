//! Sound cues and screen flashes
//!
//! Engines report what happened; this module decides what the player should
//! hear and see. Every cue carries a procedural tone recipe so a host can
//! synthesize it without audio files.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{
    BreakoutEvent, EngineEvent, FlipOutcome, InvadersEvent, SnakeEvent, TetrisEvent,
};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Tetris piece shifted
    Move,
    Rotate,
    /// Hard drop
    Drop,
    LineClear,
    /// Four lines at once, or a cleared screen
    Fanfare,
    Eat,
    /// Life lost
    Die,
    GameOver,
    GameStart,
    Shoot,
    /// Alien destroyed or brick struck
    Hit,
    /// Player cannon destroyed
    Explosion,
    BrickBreak,
    Match,
    Flip,
    Merge,
    Slide,
    Achievement,
    HighScore,
    Pause,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Square,
    Triangle,
    Sawtooth,
}

/// One note of a cue, played after the previous one ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub freq: f32,
    /// Seconds
    pub duration: f32,
    pub wave: Waveform,
    /// Frequency to glide to by the end of the note
    pub ramp_to: Option<f32>,
    /// Per-note gain override
    pub volume: Option<f32>,
}

const fn note(freq: f32, duration: f32, wave: Waveform) -> Note {
    Note {
        freq,
        duration,
        wave,
        ramp_to: None,
        volume: None,
    }
}

const fn glide(freq: f32, duration: f32, wave: Waveform, ramp_to: f32) -> Note {
    Note {
        freq,
        duration,
        wave,
        ramp_to: Some(ramp_to),
        volume: None,
    }
}

use Waveform::{Sawtooth, Square, Triangle};

const MOVE: [Note; 1] = [note(200.0, 0.05, Square)];
const ROTATE: [Note; 1] = [note(300.0, 0.06, Square)];
const DROP: [Note; 1] = [glide(150.0, 0.1, Triangle, 80.0)];
const LINE_CLEAR: [Note; 3] = [
    note(523.0, 0.1, Square),
    note(659.0, 0.1, Square),
    note(784.0, 0.15, Square),
];
const FANFARE: [Note; 4] = [
    note(523.0, 0.08, Square),
    note(659.0, 0.08, Square),
    note(784.0, 0.08, Square),
    note(1047.0, 0.2, Square),
];
const EAT: [Note; 2] = [note(440.0, 0.05, Square), note(660.0, 0.08, Square)];
const DIE: [Note; 2] = [
    glide(400.0, 0.15, Sawtooth, 100.0),
    glide(200.0, 0.2, Sawtooth, 50.0),
];
const GAME_OVER: [Note; 3] = [
    note(392.0, 0.2, Square),
    note(330.0, 0.2, Square),
    note(262.0, 0.4, Square),
];
const GAME_START: [Note; 4] = [
    note(262.0, 0.1, Square),
    note(330.0, 0.1, Square),
    note(392.0, 0.1, Square),
    note(523.0, 0.2, Square),
];
const SHOOT: [Note; 1] = [glide(800.0, 0.08, Square, 200.0)];
const HIT: [Note; 2] = [note(300.0, 0.06, Square), note(500.0, 0.06, Square)];
const EXPLOSION: [Note; 1] = [Note {
    freq: 100.0,
    duration: 0.3,
    wave: Sawtooth,
    ramp_to: None,
    volume: Some(0.15),
}];
const BRICK_BREAK: [Note; 2] = [note(500.0, 0.05, Square), note(700.0, 0.05, Square)];
const MATCH: [Note; 2] = [note(523.0, 0.08, Triangle), note(784.0, 0.12, Triangle)];
const FLIP: [Note; 1] = [note(400.0, 0.04, Triangle)];
const MERGE: [Note; 2] = [note(350.0, 0.06, Square), note(500.0, 0.08, Square)];
const SLIDE: [Note; 1] = [note(250.0, 0.04, Triangle)];
const ACHIEVEMENT: [Note; 4] = [
    note(523.0, 0.1, Square),
    note(659.0, 0.1, Square),
    note(784.0, 0.1, Square),
    note(1047.0, 0.3, Square),
];
const HIGH_SCORE: [Note; 3] = [
    note(784.0, 0.15, Square),
    note(1047.0, 0.15, Square),
    note(1319.0, 0.25, Square),
];
const PAUSE: [Note; 1] = [note(200.0, 0.1, Triangle)];

impl SoundCue {
    /// Tone recipe for this cue
    pub fn notes(self) -> &'static [Note] {
        match self {
            SoundCue::Move => &MOVE,
            SoundCue::Rotate => &ROTATE,
            SoundCue::Drop => &DROP,
            SoundCue::LineClear => &LINE_CLEAR,
            SoundCue::Fanfare => &FANFARE,
            SoundCue::Eat => &EAT,
            SoundCue::Die => &DIE,
            SoundCue::GameOver => &GAME_OVER,
            SoundCue::GameStart => &GAME_START,
            SoundCue::Shoot => &SHOOT,
            SoundCue::Hit => &HIT,
            SoundCue::Explosion => &EXPLOSION,
            SoundCue::BrickBreak => &BRICK_BREAK,
            SoundCue::Match => &MATCH,
            SoundCue::Flip => &FLIP,
            SoundCue::Merge => &MERGE,
            SoundCue::Slide => &SLIDE,
            SoundCue::Achievement => &ACHIEVEMENT,
            SoundCue::HighScore => &HIGH_SCORE,
            SoundCue::Pause => &PAUSE,
        }
    }

    /// Total length in seconds
    pub fn duration(self) -> f32 {
        self.notes().iter().map(|n| n.duration).sum()
    }
}

/// Brief full-screen tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flash {
    /// Something good: points, clears, matches
    Score,
    /// Something bad: a life lost, the game ending
    Danger,
}

/// Sound for an engine event, before any mute or volume settings
pub fn sound_for(event: &EngineEvent) -> Option<SoundCue> {
    match *event {
        EngineEvent::Started(_) => Some(SoundCue::GameStart),
        EngineEvent::GameOver(_) => Some(SoundCue::GameOver),

        EngineEvent::Snake(SnakeEvent::Moved) => None,
        EngineEvent::Snake(SnakeEvent::Ate) => Some(SoundCue::Eat),
        EngineEvent::Snake(SnakeEvent::Died) => Some(SoundCue::Die),

        EngineEvent::PieceShifted => Some(SoundCue::Move),
        EngineEvent::PieceRotated => Some(SoundCue::Rotate),
        EngineEvent::PieceDropped => Some(SoundCue::Drop),
        EngineEvent::Tetris(TetrisEvent::Fell) => None,
        EngineEvent::Tetris(TetrisEvent::Locked { lines: 0 }) => None,
        EngineEvent::Tetris(TetrisEvent::Locked { lines: 1..=3 }) => Some(SoundCue::LineClear),
        EngineEvent::Tetris(TetrisEvent::Locked { .. }) => Some(SoundCue::Fanfare),
        EngineEvent::Tetris(TetrisEvent::ToppedOut) => None,

        EngineEvent::Breakout(BreakoutEvent::BrickHit) => Some(SoundCue::Hit),
        EngineEvent::Breakout(BreakoutEvent::BrickBroken) => Some(SoundCue::BrickBreak),
        EngineEvent::Breakout(BreakoutEvent::Died) => Some(SoundCue::Die),
        EngineEvent::Breakout(BreakoutEvent::Won) => Some(SoundCue::Fanfare),

        EngineEvent::Shot => Some(SoundCue::Shoot),
        EngineEvent::Invaders(InvadersEvent::AlienHit) => Some(SoundCue::Hit),
        EngineEvent::Invaders(InvadersEvent::PlayerHit) => Some(SoundCue::Explosion),
        EngineEvent::Invaders(InvadersEvent::ShieldHit) => None,
        EngineEvent::Invaders(InvadersEvent::Overrun) => Some(SoundCue::Explosion),
        EngineEvent::Invaders(InvadersEvent::Won) => Some(SoundCue::Fanfare),

        EngineEvent::Slid { merged: false } => Some(SoundCue::Slide),
        EngineEvent::Slid { merged: true } => Some(SoundCue::Merge),

        EngineEvent::Memory(FlipOutcome::Flip) => Some(SoundCue::Flip),
        EngineEvent::Memory(FlipOutcome::Match) => Some(SoundCue::Match),
        EngineEvent::Memory(FlipOutcome::Mismatch) => Some(SoundCue::Flip),
        EngineEvent::Memory(FlipOutcome::Ignore) => None,
    }
}

/// Screen flash for an engine event, before the reduced-motion setting
pub fn flash_for(event: &EngineEvent) -> Option<Flash> {
    match *event {
        EngineEvent::Snake(SnakeEvent::Ate)
        | EngineEvent::Tetris(TetrisEvent::Locked { lines: 1.. })
        | EngineEvent::Breakout(BreakoutEvent::BrickBroken | BreakoutEvent::Won)
        | EngineEvent::Invaders(InvadersEvent::AlienHit | InvadersEvent::Won)
        | EngineEvent::Memory(FlipOutcome::Match) => Some(Flash::Score),

        EngineEvent::Snake(SnakeEvent::Died)
        | EngineEvent::Breakout(BreakoutEvent::Died)
        | EngineEvent::Invaders(InvadersEvent::PlayerHit | InvadersEvent::Overrun)
        | EngineEvent::GameOver(_) => Some(Flash::Danger),

        _ => None,
    }
}

/// A cue ready for the host to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    pub cue: SoundCue,
    /// Gain 0.0 - 1.0
    pub volume: f32,
}

/// Applies the player's audio and motion preferences to engine events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueMixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    reduced_motion: bool,
}

impl Default for CueMixer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CueMixer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            master_volume: settings.effective_master_volume(),
            sfx_volume: settings.effective_sfx_volume(),
            muted: settings.muted,
            reduced_motion: !settings.effective_flashes(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Cue to play directly, e.g. pause or a new high score
    pub fn play(&self, cue: SoundCue) -> Option<Playback> {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return None;
        }
        Some(Playback { cue, volume })
    }

    pub fn sound(&self, event: &EngineEvent) -> Option<Playback> {
        sound_for(event).and_then(|cue| self.play(cue))
    }

    pub fn flash(&self, event: &EngineEvent) -> Option<Flash> {
        if self.reduced_motion {
            return None;
        }
        flash_for(event)
    }
}
