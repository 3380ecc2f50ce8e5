//! Sky Climb - A vertical-climbing arcade mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platforms, physics, collisions, session)
//! - `tuning`: Data-driven world constants
//! - `settings`: Host preferences (audio, HUD)
//! - `highscores`: Host-side leaderboard

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Player body is a square of this side length (world units)
    pub const PLAYER_SIZE: f32 = 80.0;
    /// Half-extents of the player body
    pub const PLAYER_HALF_EXTENT: f32 = PLAYER_SIZE / 2.0;
    /// Every platform shares this thickness
    pub const PLATFORM_HEIGHT: f32 = 15.0;

    /// Default canvas dimensions
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 700.0;

    /// Horizontal movement
    pub const MOVE_ACCEL: f32 = 0.5;
    pub const MAX_SPEED: f32 = 8.0;
    pub const GROUND_FRICTION: f32 = 0.88;
    pub const AIR_FRICTION: f32 = 0.95;

    /// Vertical movement (y grows downward, so jumping is negative)
    pub const GRAVITY: f32 = 0.8;
    pub const JUMP_VELOCITY: f32 = -16.0;

    /// Platform generation
    pub const PLATFORM_COUNT: u32 = 50;
    pub const GROUND_INSET: f32 = 50.0;
    pub const PLATFORM_GAP_MIN: f32 = 80.0;
    pub const PLATFORM_GAP_RANGE: f32 = 40.0;
    pub const PLATFORM_BASE_WIDTH: f32 = 120.0;
    pub const PLATFORM_WIDTH_STEP: f32 = 1.5;
    pub const PLATFORM_MIN_WIDTH: f32 = 60.0;

    /// Extra band below a platform's thickness that still counts as a landing
    pub const LANDING_TOLERANCE: f32 = 5.0;

    /// Camera keeps the player at this fraction of the canvas height
    pub const CAMERA_ANCHOR: f32 = 0.6;
    pub const CAMERA_SMOOTHING: f32 = 0.1;

    /// How far below the visible bottom edge the player may fall before the run ends
    pub const FALL_MARGIN: f32 = 100.0;

    /// Reward multiplier added per combo step
    pub const COMBO_BONUS: f64 = 0.1;

    /// World units per displayed meter
    pub const UNITS_PER_METER: f32 = 10.0;

    /// Spawn offset above the canvas bottom
    pub const SPAWN_RISE: f32 = 150.0;
}

/// Height in meters of a world-space y coordinate, measured from the canvas bottom.
///
/// Negative heights clamp to zero.
#[inline]
pub fn height_meters(canvas_height: f32, y: f32) -> u32 {
    ((canvas_height - y) / consts::UNITS_PER_METER).floor().max(0.0) as u32
}

/// Final reward for a finished run: `floor(score * (1 + combo * bonus))`
#[inline]
pub fn reward_for(score: u32, combo: u32, combo_bonus: f64) -> u64 {
    (score as f64 * (1.0 + combo as f64 * combo_bonus)).floor() as u64
}

/// HUD combo text; empty until a second consecutive new height
pub fn combo_label(combo: u32) -> String {
    if combo > 1 {
        format!("x{}", combo)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_label_clears_on_new_run() {
        assert_eq!(combo_label(3), "x3");
        assert_eq!(combo_label(1), "");
        assert_eq!(combo_label(0), "");
    }

    #[test]
    fn test_height_meters_clamps_below_ground() {
        assert_eq!(height_meters(700.0, 650.0), 5);
        assert_eq!(height_meters(700.0, 720.0), 0);
    }
}
