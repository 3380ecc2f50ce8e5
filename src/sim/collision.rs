//! Landing detection and scoring
//!
//! The player only ever collides with the top face of a platform, and only
//! while falling. A small band below the face absorbs the overshoot of a
//! single tick.

use super::state::{Platform, PlayerBody, Scoreboard};
use crate::consts::PLAYER_SIZE;
use crate::tuning::Tuning;

/// Outcome of resolving one tick's landings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    /// Index of the platform the player was snapped onto
    pub platform_index: usize,
    /// Height of that platform in meters
    pub height: u32,
}

/// Whether a body falls onto `platform` this tick
pub fn lands_on(body: &PlayerBody, platform: &Platform, tolerance: f32) -> bool {
    let bottom = body.bottom();
    body.vel.y > 0.0
        && bottom >= platform.y
        && bottom <= platform.y + Platform::HEIGHT + tolerance
        && platform.overlaps_x(body.pos.x)
}

/// Snap the body onto any platform it fell onto.
///
/// Every platform is tested against the body as it was before any snap, and
/// the last one that accepts the landing wins. Clears `grounded` when nothing
/// was hit.
pub fn resolve_landing(
    body: &mut PlayerBody,
    platforms: &[Platform],
    tuning: &Tuning,
) -> Option<Landing> {
    let probe = *body;
    let mut landed = None;

    for (index, platform) in platforms.iter().enumerate() {
        if lands_on(&probe, platform, tuning.landing_tolerance) {
            body.pos.y = platform.y - PLAYER_SIZE;
            body.vel.y = 0.0;
            body.grounded = true;
            landed = Some(index);
        }
    }

    match landed {
        Some(index) => Some(Landing {
            platform_index: index,
            height: crate::height_meters(tuning.canvas_height, platforms[index].y),
        }),
        None => {
            body.grounded = false;
            None
        }
    }
}

/// Credit a landing to the scoreboard. Returns true on a new best height.
pub fn score_landing(scoreboard: &mut Scoreboard, landing: &Landing) -> bool {
    scoreboard.register_height(landing.height)
}

/// Whether the body has fallen far enough below the view to end the run
pub fn has_fallen_out(body: &PlayerBody, camera_offset_y: f32, tuning: &Tuning) -> bool {
    body.pos.y > tuning.canvas_height + camera_offset_y + tuning.fall_margin
}
