//! Procedural level generation
//!
//! A level is a ground platform followed by a column of narrowing platforms,
//! each a random gap above the previous one. The random source is always
//! passed in so a level can be regenerated exactly from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Platform;
use crate::tuning::Tuning;

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Values are clamped into `[0, 1)`; an empty list always yields 0
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f32::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// Seeded generator used for real runs
pub fn rng_for_seed(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Width of the platform at `index` (ground excluded)
pub fn platform_width(tuning: &Tuning, index: u32) -> f32 {
    (tuning.base_width - index as f32 * tuning.width_step)
        .max(tuning.min_width)
        .min(tuning.canvas_width)
}

/// Generate the full level for a run.
///
/// Per platform the gap is drawn before the horizontal position.
pub fn generate_platforms<R: RandomSource + ?Sized>(tuning: &Tuning, rng: &mut R) -> Vec<Platform> {
    let w = tuning.canvas_width;
    let mut platforms = Vec::with_capacity(tuning.platform_count as usize + 1);

    let ground = Platform::new(0.0, tuning.canvas_height - tuning.ground_inset, w);
    platforms.push(ground);

    let mut y = ground.y;
    for i in 1..=tuning.platform_count {
        let gap = tuning.gap_min + rng.next_unit() * tuning.gap_range;
        // At most one platform may sit inside a single tick's landing window
        debug_assert!(
            gap > Platform::HEIGHT + tuning.landing_tolerance,
            "gap {gap} at platform {i} fits inside the landing window"
        );
        y -= gap;
        let width = platform_width(tuning, i);
        let x = rng.next_unit() * (w - width);

        debug_assert!(
            x.is_finite() && y.is_finite() && width > 0.0,
            "degenerate platform {i}: x={x} y={y} width={width}"
        );
        platforms.push(Platform::new(x, y, width));
    }

    platforms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_platform() {
        let tuning = Tuning::for_canvas(400.0, 700.0);
        let platforms = generate_platforms(&tuning, &mut ScriptedRandom::new([0.5]));
        assert_eq!(platforms.len(), 51);
        assert_eq!(platforms[0], Platform::new(0.0, 650.0, 400.0));
    }

    #[test]
    fn test_scripted_stream_layout() {
        let tuning = Tuning::for_canvas(400.0, 700.0);
        // gap draw, x draw, gap draw, x draw...
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.5, 1.0 - f32::EPSILON, 0.25, 0.5]);
        let platforms = generate_platforms(&tuning, &mut rng);

        assert_eq!(platforms[1].y, 570.0);
        assert_eq!(platforms[1].x, 0.0);
        assert_eq!(platforms[1].width, 118.5);

        assert_eq!(platforms[2].y, 470.0);
        assert_eq!(platforms[2].width, 117.0);
        assert!((platforms[2].x - (400.0 - 117.0)).abs() < 0.01);

        assert_eq!(platforms[3].y, 380.0);
        assert!((platforms[3].x - 0.5 * (400.0 - 115.5)).abs() < 1e-4);
    }

    #[test]
    fn test_width_floor() {
        let tuning = Tuning::default();
        assert_eq!(platform_width(&tuning, 1), 118.5);
        assert_eq!(platform_width(&tuning, 40), 60.0);
        assert_eq!(platform_width(&tuning, 50), 60.0);
    }

    #[test]
    fn test_same_seed_same_level() {
        let tuning = Tuning::default();
        let a = generate_platforms(&tuning, &mut rng_for_seed(7));
        let b = generate_platforms(&tuning, &mut rng_for_seed(7));
        let c = generate_platforms(&tuning, &mut rng_for_seed(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_platforms_fit_canvas() {
        let tuning = Tuning::default();
        let platforms = generate_platforms(&tuning, &mut rng_for_seed(1234));
        for p in &platforms {
            assert!(p.x >= 0.0);
            assert!(p.right() <= tuning.canvas_width + 1e-3);
        }
    }

    #[test]
    fn test_empty_script_yields_zero() {
        let mut rng = ScriptedRandom::new(Vec::new());
        assert_eq!(rng.next_unit(), 0.0);
    }
}
