//! Property tests over the simulation core

use proptest::prelude::*;

use sky_climb::consts::PLAYER_SIZE;
use sky_climb::sim::physics::wrap_x;
use sky_climb::sim::platforms::platform_width;
use sky_climb::sim::{
    GamePhase, InputState, RunState, Session, generate_platforms, rng_for_seed, tick,
};
use sky_climb::{Tuning, reward_for};

fn tuning() -> Tuning {
    Tuning::for_canvas(400.0, 700.0)
}

fn inputs(max_len: usize) -> impl Strategy<Value = Vec<InputState>> {
    prop::collection::vec(
        (any::<bool>(), any::<bool>(), any::<bool>())
            .prop_map(|(l, r, j)| InputState::horizontal(l, r).with_jump(j)),
        0..max_len,
    )
}

proptest! {
    #[test]
    fn level_is_a_pure_function_of_the_seed(seed in any::<u64>()) {
        let t = tuning();
        let a = generate_platforms(&t, &mut rng_for_seed(seed));
        let b = generate_platforms(&t, &mut rng_for_seed(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn level_climbs_and_narrows(seed in any::<u64>()) {
        let t = tuning();
        let platforms = generate_platforms(&t, &mut rng_for_seed(seed));
        prop_assert_eq!(platforms.len(), t.platform_count as usize + 1);

        for (i, pair) in platforms.windows(2).enumerate() {
            let gap = pair[0].y - pair[1].y;
            prop_assert!(gap >= t.gap_min - 1e-3, "gap {} at {}", gap, i + 1);
            prop_assert!(gap <= t.gap_min + t.gap_range + 1e-3, "gap {} at {}", gap, i + 1);
        }

        for (i, p) in platforms.iter().enumerate().skip(1) {
            prop_assert_eq!(p.width, platform_width(&t, i as u32));
            prop_assert!(p.width >= t.min_width);
            prop_assert!(p.x >= 0.0);
            prop_assert!(p.x + p.width <= t.canvas_width + 1e-3);
        }
    }

    #[test]
    fn wrap_stays_inside_the_band(x in -2000.0f32..2000.0, width in 160.0f32..1200.0) {
        let wrapped = wrap_x(x, width);
        prop_assert!(wrapped >= -PLAYER_SIZE);
        prop_assert!(wrapped <= width);
        if (-PLAYER_SIZE..=width).contains(&x) {
            prop_assert_eq!(wrapped, x);
        }
    }

    #[test]
    fn score_and_combo_never_decrease(seed in any::<u64>(), script in inputs(600)) {
        let mut session = Session::new(tuning(), seed);
        session.start();

        let mut last = session.last_result();
        for input in &script {
            let result = session.tick_with(input);
            prop_assert!(result.score >= last.score);
            prop_assert!(result.combo >= last.combo);
            if last.phase == GamePhase::Over {
                prop_assert_eq!(result, last);
            }
            last = result;
        }
    }

    #[test]
    fn grounded_body_rests_on_a_platform(seed in any::<u64>(), script in inputs(300)) {
        let mut session = Session::new(tuning(), seed);
        session.start();

        for input in &script {
            session.tick_with(input);
            let Some(run) = session.run() else { break };
            prop_assert!(run.camera.offset_y() >= 0.0);
            if run.player.grounded {
                let bottom = run.player.bottom();
                prop_assert!(
                    run.platforms.iter().any(|p| (p.y - bottom).abs() < 1e-3),
                    "grounded at {} with no platform there",
                    bottom
                );
                prop_assert_eq!(run.player.vel.y, 0.0);
            }
        }
    }

    #[test]
    fn finished_run_pays_the_combo_reward(
        score in 0u32..100_000,
        combo in 0u32..10_000,
        script in inputs(40),
    ) {
        // Nothing to land on, so the body drops out of view within a few dozen ticks
        let mut run = RunState::new(0, tuning(), Vec::new());
        run.scoreboard.score = score;
        run.scoreboard.combo = combo;

        let mut summary = None;
        for input in script.iter().chain(std::iter::repeat(&InputState::NONE)).take(200) {
            summary = tick(&mut run, input).game_over;
            if summary.is_some() {
                break;
            }
        }

        let summary = summary.expect("run never ended");
        prop_assert_eq!(summary.score, score);
        prop_assert_eq!(summary.combo, combo);
        prop_assert_eq!(summary.reward, reward_for(score, combo, 0.1));
        prop_assert_eq!(summary.ticks, run.time_ticks);
    }
}
