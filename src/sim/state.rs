//! Run state and core simulation types
//!
//! Everything a run needs to be reproduced lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use crate::consts::*;
use crate::tuning::Tuning;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start command, no physics runs
    #[default]
    Ready,
    /// Active gameplay
    Running,
    /// Run ended, score frozen until restart
    Over,
}

/// The player's body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Top-left corner in world units (y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
}

impl PlayerBody {
    /// Fixed half-extents of the body
    pub const HALF_EXTENTS: Vec2 = Vec2::splat(PLAYER_HALF_EXTENT);

    /// Body at rest at the spawn point for the given canvas
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                tuning.canvas_width / 2.0 - PLAYER_HALF_EXTENT,
                tuning.canvas_height - SPAWN_RISE,
            ),
            vel: Vec2::ZERO,
            grounded: false,
        }
    }

    /// Y of the body's bottom edge
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + PLAYER_SIZE
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Self::HALF_EXTENTS
    }
}

/// A climbable platform. Immutable once generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

impl Platform {
    pub const HEIGHT: f32 = PLATFORM_HEIGHT;

    pub fn new(x: f32, y: f32, width: f32) -> Self {
        Self { x, y, width }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether a body spanning `[left, left + PLAYER_SIZE)` overlaps this platform horizontally
    #[inline]
    pub fn overlaps_x(&self, left: f32) -> bool {
        left + PLAYER_SIZE > self.x && left < self.right()
    }
}

/// Score and combo for a run. Both only ever grow while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Highest platform reached, in meters
    pub score: u32,
    /// Number of times a new highest platform was reached
    pub combo: u32,
}

impl Scoreboard {
    /// Register a landing at `height` meters. Returns true on a new best.
    pub fn register_height(&mut self, height: u32) -> bool {
        if height > self.score {
            self.score = height;
            self.combo += 1;
            true
        } else {
            false
        }
    }

    /// Reward for this score and combo
    pub fn reward(&self, combo_bonus: f64) -> u64 {
        crate::reward_for(self.score, self.combo, combo_bonus)
    }
}

/// Something noteworthy that happened during a tick (for audio/HUD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player left the ground
    Jumped,
    /// Player landed on the platform at this index
    Landed { platform_index: usize },
    /// A new highest platform was reached
    NewHeight { score: u32, combo: u32 },
    /// Run ended
    GameOver { score: u32, reward: u64 },
}

/// Snapshot reported to the host after every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    pub phase: GamePhase,
    pub score: u32,
    pub combo: u32,
    /// Current height of the player's feet above the canvas bottom
    pub height_meters: u32,
}

impl TickResult {
    /// Result reported before any run has started
    pub fn ready() -> Self {
        Self {
            phase: GamePhase::Ready,
            score: 0,
            combo: 0,
            height_meters: 0,
        }
    }
}

/// Frozen outcome of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub score: u32,
    pub combo: u32,
    pub reward: u64,
    /// Ticks simulated before the run ended
    pub ticks: u64,
}

/// All mutable state of one run (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Seed the platforms were generated from
    pub seed: u64,
    pub tuning: Tuning,
    pub player: PlayerBody,
    /// Ordered platforms, ground first
    pub platforms: Vec<Platform>,
    pub camera: Camera,
    pub scoreboard: Scoreboard,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Jump action state sampled last tick (for edge detection)
    pub jump_was_held: bool,
}

impl RunState {
    /// Fresh run over an already generated level
    pub fn new(seed: u64, tuning: Tuning, platforms: Vec<Platform>) -> Self {
        Self {
            seed,
            player: PlayerBody::spawn(&tuning),
            tuning,
            platforms,
            camera: Camera::default(),
            scoreboard: Scoreboard::default(),
            time_ticks: 0,
            jump_was_held: false,
        }
    }

    /// Current height of the player in meters
    pub fn height_meters(&self) -> u32 {
        crate::height_meters(self.tuning.canvas_height, self.player.bottom())
    }

    pub fn result(&self, phase: GamePhase) -> TickResult {
        TickResult {
            phase,
            score: self.scoreboard.score,
            combo: self.scoreboard.combo,
            height_meters: self.height_meters(),
        }
    }
}
