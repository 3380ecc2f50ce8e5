//! Idle/demo controller
//!
//! Picks the next platform above the player, steers under it and jumps once
//! lined up. Purely a function of the run state, so autopilot runs stay
//! deterministic and replayable.

use super::input::InputState;
use super::state::{Platform, RunState};

/// Highest a jump can lift the player's feet with the given tuning
pub fn jump_reach(run: &RunState) -> f32 {
    let t = &run.tuning;
    if t.gravity <= 0.0 {
        return f32::INFINITY;
    }
    t.jump_velocity * t.jump_velocity / (2.0 * t.gravity)
}

/// Nearest platform above the player's feet that a jump can still reach
pub fn next_target(run: &RunState) -> Option<(usize, &Platform)> {
    let feet = run.player.bottom();
    let reach = jump_reach(run);
    run.platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| p.y < feet - 1.0 && feet - p.y <= reach)
        .max_by(|(_, a), (_, b)| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
}

/// Horizontal speed below which the autopilot is willing to jump
const BRAKE_SPEED: f32 = 1.0;

/// Input that moves the player toward the next platform.
///
/// Only steers while grounded; in the air the body coasts so it comes down
/// where it was lined up.
pub fn steer(run: &RunState) -> InputState {
    let player = &run.player;
    if !player.grounded {
        return InputState::NONE;
    }
    let Some((_, target)) = next_target(run) else {
        return InputState::NONE;
    };

    let player_center = player.center().x;
    let target_center = target.x + target.width / 2.0;
    let dx = target_center - player_center;
    let dead_zone = (target.width / 4.0).max(4.0);
    let vx = player.vel.x;

    let mut input = InputState::NONE;
    if dx > dead_zone {
        input.right = true;
    } else if dx < -dead_zone {
        input.left = true;
    } else if vx > BRAKE_SPEED {
        input.left = true;
    } else if vx < -BRAKE_SPEED {
        input.right = true;
    }

    // Release for a tick after every press so the next press is a new edge
    input.jump = dx.abs() <= dead_zone && vx.abs() <= BRAKE_SPEED && !run.jump_was_held;
    input
}
