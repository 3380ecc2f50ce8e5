//! Smoothed vertical camera

use serde::{Deserialize, Serialize};

/// Vertical viewport offset following the player.
///
/// Only [`Camera::follow`] moves the offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    offset_y: f32,
}

impl Camera {
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    /// Target offset that places `player_y` at `anchor` of the canvas height.
    /// Never scrolls below the starting view.
    pub fn target_for(player_y: f32, canvas_height: f32, anchor: f32) -> f32 {
        (player_y - canvas_height * anchor).max(0.0)
    }

    /// Ease the offset toward the target by `smoothing` of the remaining distance
    pub fn follow(&mut self, player_y: f32, canvas_height: f32, anchor: f32, smoothing: f32) {
        let target = Self::target_for(player_y, canvas_height, anchor);
        self.offset_y += (target - self.offset_y) * smoothing;
    }

    /// Convert a world y to screen y
    #[inline]
    pub fn to_screen(&self, world_y: f32) -> f32 {
        world_y - self.offset_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_never_negative() {
        assert_eq!(Camera::target_for(100.0, 700.0, 0.6), 0.0);
        assert_eq!(Camera::target_for(520.0, 700.0, 0.6), 100.0);
    }

    #[test]
    fn test_follow_eases_toward_target() {
        let mut cam = Camera::default();
        cam.follow(520.0, 700.0, 0.6, 0.1);
        assert!((cam.offset_y() - 10.0).abs() < 1e-4);
        cam.follow(520.0, 700.0, 0.6, 0.1);
        assert!((cam.offset_y() - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_offset_pinned_at_origin_while_above_anchor() {
        // y shrinks while climbing, so the target stays clamped at zero
        let mut cam = Camera::default();
        for _ in 0..50 {
            cam.follow(-2000.0, 700.0, 0.6, 0.1);
        }
        assert_eq!(cam.offset_y(), 0.0);
    }

    #[test]
    fn test_to_screen() {
        let mut cam = Camera::default();
        cam.follow(1520.0, 700.0, 0.6, 1.0);
        assert_eq!(cam.to_screen(1200.0), 100.0);
    }
}
