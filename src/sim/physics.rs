//! Player body integration
//!
//! The order of the steps in [`step_body`] is part of the contract: changing
//! it changes every trajectory.

use super::input::InputState;
use super::state::PlayerBody;
use crate::consts::PLAYER_SIZE;
use crate::tuning::Tuning;

/// Launch the body upward if it is standing on something.
///
/// Returns true when the jump fired.
pub fn try_jump(body: &mut PlayerBody, tuning: &Tuning) -> bool {
    if !body.grounded {
        return false;
    }
    body.vel.y = tuning.jump_velocity;
    body.grounded = false;
    true
}

/// Horizontal acceleration, speed clamp and friction
pub fn apply_horizontal(body: &mut PlayerBody, input: &InputState, tuning: &Tuning) {
    if input.left {
        body.vel.x -= tuning.move_accel;
    }
    if input.right {
        body.vel.x += tuning.move_accel;
    }

    body.vel.x = body.vel.x.clamp(-tuning.max_speed, tuning.max_speed);

    body.vel.x *= if body.grounded {
        tuning.ground_friction
    } else {
        tuning.air_friction
    };
}

/// Teleport across the horizontal edges (the world is a cylinder)
#[inline]
pub fn wrap_x(x: f32, canvas_width: f32) -> f32 {
    if x < -PLAYER_SIZE {
        canvas_width
    } else if x > canvas_width {
        -PLAYER_SIZE
    } else {
        x
    }
}

/// Advance the body one tick: horizontal input, gravity, integration, wrap
pub fn step_body(body: &mut PlayerBody, input: &InputState, tuning: &Tuning) {
    apply_horizontal(body, input, tuning);

    body.vel.y += tuning.gravity;

    body.pos += body.vel;
    body.pos.x = wrap_x(body.pos.x, tuning.canvas_width);

    debug_assert!(
        body.pos.is_finite() && body.vel.is_finite(),
        "non-finite player state: pos={:?} vel={:?}",
        body.pos,
        body.vel
    );
}
