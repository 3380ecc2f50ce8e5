//! Session lifecycle: `Ready -> Running -> Over`
//!
//! The session owns the current run, buffers host input between ticks and
//! reports the final reward exactly once when a run ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::autopilot;
use super::input::InputState;
use super::platforms::{RandomSource, generate_platforms, rng_for_seed};
use super::replay::Replay;
use super::state::{GameEvent, GameOverSummary, GamePhase, Platform, RunState, TickResult};
use super::tick::tick;
use crate::tuning::Tuning;

/// Receives the outcome of every finished run
pub trait GameEndListener {
    fn on_game_end(&mut self, score: u32, reward: u64);
}

impl<F: FnMut(u32, u64)> GameEndListener for F {
    fn on_game_end(&mut self, score: u32, reward: u64) {
        self(score, reward)
    }
}

/// Shared "stop requested" flag. While set, ticks leave all state untouched.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One player's game session
pub struct Session {
    tuning: Tuning,
    seed: u64,
    phase: GamePhase,
    run: Option<RunState>,
    /// Held horizontal intent, sampled at the top of each tick
    intent: InputState,
    /// One-shot jump request consumed by the next tick
    jump_requested: bool,
    last_result: TickResult,
    last_events: Vec<GameEvent>,
    summary: Option<GameOverSummary>,
    high_score: u32,
    new_best: bool,
    stop: StopHandle,
    listener: Option<Box<dyn GameEndListener>>,
    recording: Option<Vec<InputState>>,
    /// Level of the current run did not come from `seed`
    injected_level: bool,
    /// Demo mode: the autopilot replaces host input
    autopilot: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("seed", &self.seed)
            .field("phase", &self.phase)
            .field("last_result", &self.last_result)
            .field("high_score", &self.high_score)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            tuning: tuning.sanitized(),
            seed,
            phase: GamePhase::Ready,
            run: None,
            intent: InputState::NONE,
            jump_requested: false,
            last_result: TickResult::ready(),
            last_events: Vec::new(),
            summary: None,
            high_score: 0,
            new_best: false,
            stop: StopHandle::default(),
            listener: None,
            recording: None,
            injected_level: false,
            autopilot: false,
        }
    }

    /// Register the callback invoked when a run ends
    pub fn set_game_end_listener(&mut self, listener: impl GameEndListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Best score supplied by the host (display only)
    pub fn set_high_score(&mut self, high_score: u32) {
        self.high_score = high_score;
    }

    /// Seed for the next run's level
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Record every tick's input so the next run can be exported as a replay
    pub fn set_recording(&mut self, enabled: bool) {
        self.recording = enabled.then(Vec::new);
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn is_autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Whether the last finished run beat the supplied high score
    pub fn is_new_best(&self) -> bool {
        self.new_best
    }

    /// Frozen outcome of the last run, once it is over
    pub fn summary(&self) -> Option<&GameOverSummary> {
        self.summary.as_ref()
    }

    /// Events produced by the most recent tick
    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    pub fn last_result(&self) -> TickResult {
        self.last_result
    }

    /// `Ready -> Running` with a level generated from the session seed
    pub fn start(&mut self) {
        if !self.can_start() {
            return;
        }
        let platforms = generate_platforms(&self.tuning, &mut rng_for_seed(self.seed));
        self.begin(platforms, false);
    }

    /// `Ready -> Running` with a level drawn from the given source
    pub fn start_with_rng<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        if !self.can_start() {
            return;
        }
        let platforms = generate_platforms(&self.tuning, rng);
        self.begin(platforms, true);
    }

    /// `Ready -> Running` on an already generated level
    pub fn start_with_level(&mut self, platforms: Vec<Platform>) {
        if !self.can_start() {
            return;
        }
        self.begin(platforms, true);
    }

    fn can_start(&self) -> bool {
        if self.phase != GamePhase::Ready {
            log::debug!("start ignored in {:?}", self.phase);
            return false;
        }
        true
    }

    fn begin(&mut self, platforms: Vec<Platform>, injected_level: bool) {
        let run = RunState::new(self.seed, self.tuning, platforms);

        self.intent = InputState::NONE;
        self.jump_requested = false;
        self.injected_level = injected_level;
        self.last_events.clear();
        self.summary = None;
        self.new_best = false;
        if let Some(recording) = self.recording.as_mut() {
            recording.clear();
        }
        self.last_result = run.result(GamePhase::Running);
        self.run = Some(run);
        self.phase = GamePhase::Running;

        log::info!("Run started with seed: {}", self.seed);
    }

    /// Discard any run and return to `Ready`
    pub fn reset(&mut self) {
        self.run = None;
        self.phase = GamePhase::Ready;
        self.intent = InputState::NONE;
        self.jump_requested = false;
        self.last_result = TickResult::ready();
        self.last_events.clear();
        self.summary = None;
        self.new_best = false;
    }

    /// `Over -> Running` through a fresh start. Ignored in any other phase.
    pub fn restart(&mut self) {
        if self.phase != GamePhase::Over {
            return;
        }
        self.reset();
        self.start();
    }

    /// Ask for a jump on the next tick. No-op unless running and grounded.
    pub fn request_jump(&mut self) {
        let grounded = self.run.as_ref().is_some_and(|r| r.player.grounded);
        if self.phase == GamePhase::Running && grounded {
            self.jump_requested = true;
        }
    }

    /// Replace the held horizontal intent. Ignored once the run is over.
    pub fn set_horizontal_intent(&mut self, left: bool, right: bool) {
        if self.phase == GamePhase::Over {
            return;
        }
        self.intent.left = left;
        self.intent.right = right;
    }

    /// Advance one frame using the buffered host input
    pub fn tick(&mut self) -> TickResult {
        if self.stop.is_stop_requested() || self.phase != GamePhase::Running {
            return self.last_result;
        }
        let requested = std::mem::take(&mut self.jump_requested);
        let input = match (&self.run, self.autopilot) {
            (Some(run), true) => autopilot::steer(run),
            _ => self.intent.with_jump(requested),
        };
        self.tick_with(&input)
    }

    /// Advance one frame with an explicit input snapshot
    pub fn tick_with(&mut self, input: &InputState) -> TickResult {
        if self.stop.is_stop_requested() {
            return self.last_result;
        }
        if self.phase != GamePhase::Running {
            return self.last_result;
        }
        let Some(run) = self.run.as_mut() else {
            return self.last_result;
        };

        if let Some(recording) = self.recording.as_mut() {
            recording.push(*input);
        }

        let report = tick(run, input);
        self.last_events = report.events;

        match report.game_over {
            Some(summary) => {
                self.phase = GamePhase::Over;
                self.last_result = run.result(GamePhase::Over);
                self.summary = Some(summary);
                self.finish(summary);
            }
            None => {
                self.last_result = run.result(GamePhase::Running);
            }
        }

        self.last_result
    }

    fn finish(&mut self, summary: GameOverSummary) {
        log::info!(
            "Game over: score {} combo {} reward {} after {} ticks",
            summary.score,
            summary.combo,
            summary.reward,
            summary.ticks
        );

        if summary.score > self.high_score {
            self.high_score = summary.score;
            self.new_best = true;
        }

        if let Some(listener) = self.listener.as_mut() {
            listener.on_game_end(summary.score, summary.reward);
        }
    }

    /// Export the recorded inputs of the current or last run
    pub fn replay(&self) -> Option<Replay> {
        if self.phase == GamePhase::Ready {
            return None;
        }
        let inputs = self.recording.as_ref()?;
        let run = self.run.as_ref()?;
        Some(Replay {
            seed: run.seed,
            platforms: self.injected_level.then(|| run.platforms.clone()),
            tuning: self.tuning,
            inputs: inputs.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> Session {
        Session::new(Tuning::for_canvas(400.0, 700.0), 42)
    }

    /// Tick until the player first stands on something
    fn settle(session: &mut Session) {
        for _ in 0..60 {
            session.tick();
            if session.run().is_some_and(|r| r.player.grounded) {
                return;
            }
        }
        panic!("player never landed");
    }

    #[test]
    fn test_ready_does_not_simulate() {
        let mut s = session();
        let result = s.tick();
        assert_eq!(result, TickResult::ready());
        assert!(s.run().is_none());
    }

    #[test]
    fn test_start_initializes_run() {
        let mut s = session();
        s.start();
        assert_eq!(s.phase(), GamePhase::Running);
        let run = s.run().unwrap();
        assert_eq!(run.platforms.len(), 51);
        assert_eq!(run.player.pos.x, 160.0);
        assert_eq!(run.player.pos.y, 550.0);
        assert_eq!(run.camera.offset_y(), 0.0);
        assert_eq!(run.scoreboard.score, 0);
    }

    #[test]
    fn test_jump_request_ignored_when_airborne() {
        let mut s = session();
        s.request_jump();
        s.start();
        // Spawn is in mid-air
        s.request_jump();
        s.tick();
        assert!(!s.last_events().contains(&GameEvent::Jumped));

        settle(&mut s);
        s.request_jump();
        s.tick();
        assert!(s.last_events().contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_game_over_freezes_and_notifies_once() {
        let ended: Rc<RefCell<Vec<(u32, u64)>>> = Rc::default();
        let sink = ended.clone();

        let mut s = session();
        s.set_game_end_listener(move |score, reward| sink.borrow_mut().push((score, reward)));
        s.start();
        settle(&mut s);

        // Walk off the ground's edge is impossible (full width), so push
        // the body below the view directly.
        if let Some(run) = s.run.as_mut() {
            run.player.pos.y = 2000.0;
            run.player.grounded = false;
        }
        let result = s.tick();
        assert_eq!(result.phase, GamePhase::Over);

        let frozen = s.tick();
        assert_eq!(frozen, result);
        s.set_horizontal_intent(true, false);
        s.request_jump();
        assert_eq!(s.tick(), result);

        let summary = *s.summary().unwrap();
        assert_eq!(summary.score, 5);
        assert_eq!(summary.reward, crate::reward_for(5, 1, 0.1));
        assert_eq!(ended.borrow().as_slice(), &[(5, summary.reward)]);
        assert!(s.is_new_best());
    }

    #[test]
    fn test_stop_flag_pauses_without_side_effects() {
        let mut s = session();
        s.start();
        s.tick();
        let before = s.run().unwrap().clone();
        let handle = s.stop_handle();

        handle.request_stop();
        for _ in 0..10 {
            s.tick();
        }
        let after = s.run().unwrap();
        assert_eq!(after.time_ticks, before.time_ticks);
        assert_eq!(after.player, before.player);

        handle.resume();
        s.tick();
        assert_eq!(s.run().unwrap().time_ticks, before.time_ticks + 1);
    }

    #[test]
    fn test_restart_only_from_over() {
        let mut s = session();
        s.start();
        s.tick();
        s.restart();
        assert_eq!(s.run().unwrap().time_ticks, 1);

        s.start();
        assert_eq!(s.run().unwrap().time_ticks, 1);
    }

    #[test]
    fn test_autopilot_climbs() {
        let mut s = session();
        s.set_autopilot(true);
        s.start();
        for _ in 0..600 {
            if s.tick().phase == GamePhase::Over {
                break;
            }
        }
        assert!(s.last_result().score > 5);
    }

    #[test]
    fn test_high_score_supplied_by_host() {
        let mut s = session();
        s.set_high_score(500);
        s.start();
        settle(&mut s);
        if let Some(run) = s.run.as_mut() {
            run.player.pos.y = 2000.0;
        }
        s.tick();
        assert_eq!(s.phase(), GamePhase::Over);
        assert!(!s.is_new_best());
        assert_eq!(s.high_score(), 500);
    }
}
