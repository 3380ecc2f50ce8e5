//! Data-driven world tuning
//!
//! Every constant the simulation reads lives here so a run can be replayed
//! with exactly the values it was played with. Values that are out of range
//! are clamped by [`Tuning::sanitized`] rather than rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Largest platform count accepted from external tuning
pub const MAX_PLATFORM_COUNT: u32 = 10_000;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("Invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// World constants for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Horizontal ===
    pub move_accel: f32,
    pub max_speed: f32,
    pub ground_friction: f32,
    pub air_friction: f32,

    // === Vertical ===
    pub gravity: f32,
    pub jump_velocity: f32,

    // === Platforms ===
    pub platform_count: u32,
    pub ground_inset: f32,
    pub gap_min: f32,
    pub gap_range: f32,
    pub base_width: f32,
    pub width_step: f32,
    pub min_width: f32,
    pub landing_tolerance: f32,

    // === Camera / scoring ===
    pub camera_anchor: f32,
    pub camera_smoothing: f32,
    pub fall_margin: f32,
    pub combo_bonus: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            move_accel: MOVE_ACCEL,
            max_speed: MAX_SPEED,
            ground_friction: GROUND_FRICTION,
            air_friction: AIR_FRICTION,

            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,

            platform_count: PLATFORM_COUNT,
            ground_inset: GROUND_INSET,
            gap_min: PLATFORM_GAP_MIN,
            gap_range: PLATFORM_GAP_RANGE,
            base_width: PLATFORM_BASE_WIDTH,
            width_step: PLATFORM_WIDTH_STEP,
            min_width: PLATFORM_MIN_WIDTH,
            landing_tolerance: LANDING_TOLERANCE,

            camera_anchor: CAMERA_ANCHOR,
            camera_smoothing: CAMERA_SMOOTHING,
            fall_margin: FALL_MARGIN,
            combo_bonus: COMBO_BONUS,
        }
    }
}

/// Replace non-finite values with a fallback, then clamp into range
fn clamp_finite(value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    let v = if value.is_finite() { value } else { fallback };
    v.clamp(min, max)
}

impl Tuning {
    /// Tuning for a canvas of the given size, all other values default
    pub fn for_canvas(width: f32, height: f32) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            ..Self::default()
        }
        .sanitized()
    }

    /// Parse tuning from JSON. Missing fields take their defaults and the
    /// result is sanitized.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    pub fn to_json(&self) -> String {
        // Plain-data struct: serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Clamp every value into the range the simulation can handle
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let min_canvas = PLAYER_SIZE * 2.0;

        let min_width = clamp_finite(self.min_width, d.min_width, 1.0, f32::MAX);
        let landing_tolerance =
            clamp_finite(self.landing_tolerance, d.landing_tolerance, 0.0, f32::MAX);
        let out = Self {
            canvas_width: clamp_finite(self.canvas_width, d.canvas_width, min_canvas, f32::MAX),
            canvas_height: clamp_finite(self.canvas_height, d.canvas_height, min_canvas, f32::MAX),

            move_accel: clamp_finite(self.move_accel, d.move_accel, 0.0, f32::MAX),
            max_speed: clamp_finite(self.max_speed, d.max_speed, 0.0, f32::MAX),
            ground_friction: clamp_finite(self.ground_friction, d.ground_friction, 0.0, 1.0),
            air_friction: clamp_finite(self.air_friction, d.air_friction, 0.0, 1.0),

            gravity: clamp_finite(self.gravity, d.gravity, 0.0, f32::MAX),
            jump_velocity: clamp_finite(self.jump_velocity, d.jump_velocity, f32::MIN, 0.0),

            platform_count: self.platform_count.min(MAX_PLATFORM_COUNT),
            ground_inset: clamp_finite(self.ground_inset, d.ground_inset, 0.0, f32::MAX),
            // Keep gaps wider than the landing window so at most one platform
            // can ever accept a landing in a single tick.
            gap_min: clamp_finite(
                self.gap_min,
                d.gap_min,
                PLATFORM_HEIGHT + landing_tolerance + 1.0,
                f32::MAX,
            ),
            gap_range: clamp_finite(self.gap_range, d.gap_range, 0.0, f32::MAX),
            base_width: clamp_finite(self.base_width, d.base_width, min_width, f32::MAX),
            width_step: clamp_finite(self.width_step, d.width_step, 0.0, f32::MAX),
            min_width,
            landing_tolerance,

            camera_anchor: clamp_finite(self.camera_anchor, d.camera_anchor, 0.0, 1.0),
            camera_smoothing: clamp_finite(self.camera_smoothing, d.camera_smoothing, 0.0, 1.0),
            fall_margin: clamp_finite(self.fall_margin, d.fall_margin, 0.0, f32::MAX),
            combo_bonus: if self.combo_bonus.is_finite() {
                self.combo_bonus.max(0.0)
            } else {
                d.combo_bonus
            },
        };

        if out != self {
            log::warn!("Tuning values out of range were clamped");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_already_sane() {
        let t = Tuning::default();
        assert_eq!(t.sanitized(), t);
    }

    #[test]
    fn test_negative_max_speed_clamped() {
        let t = Tuning {
            max_speed: -3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(t.max_speed, 0.0);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        let t = Tuning {
            gravity: f32::NAN,
            air_friction: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(t.gravity, GRAVITY);
        assert_eq!(t.air_friction, 1.0);
    }

    #[test]
    fn test_gap_kept_wider_than_landing_window() {
        let t = Tuning {
            gap_min: 4.0,
            ..Default::default()
        }
        .sanitized();
        assert!(t.gap_min > PLATFORM_HEIGHT + t.landing_tolerance);
    }

    #[test]
    fn test_from_json_partial() {
        let t = Tuning::from_json(r#"{ "canvas_width": 600, "gravity": 1.0 }"#).unwrap();
        assert_eq!(t.canvas_width, 600.0);
        assert_eq!(t.gravity, 1.0);
        assert_eq!(t.jump_velocity, JUMP_VELOCITY);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let t = Tuning::for_canvas(500.0, 900.0);
        assert_eq!(Tuning::from_json(&t.to_json()).unwrap(), t);
    }
}
