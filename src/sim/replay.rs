//! Recorded runs
//!
//! A replay is the seed, the tuning and one input snapshot per tick. Because
//! the simulation is deterministic that is enough to reproduce a run exactly.
//! Levels that were not generated from the seed travel with the replay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::input::InputState;
use super::session::Session;
use super::state::{GamePhase, Platform, TickResult};
use crate::tuning::Tuning;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Invalid replay JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u64,
    pub tuning: Tuning,
    /// Recorded level, present when it was not drawn from `seed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,
    pub inputs: Vec<InputState>,
}

/// Where a replayed run ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub result: TickResult,
    /// Present when the run reached `Over` within the recorded inputs
    pub reward: Option<u64>,
    pub ticks: u64,
}

impl Replay {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let mut replay: Replay = serde_json::from_str(json)?;
        replay.tuning = replay.tuning.sanitized();
        Ok(replay)
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Re-simulate the run, stopping early if it ends before the inputs do
    pub fn run(&self) -> ReplayOutcome {
        let mut session = self.start_session();

        let mut result = session.last_result();
        for input in &self.inputs {
            result = session.tick_with(input);
            if result.phase == GamePhase::Over {
                break;
            }
        }

        ReplayOutcome {
            result,
            reward: session.summary().map(|s| s.reward),
            ticks: session.run().map(|r| r.time_ticks).unwrap_or(0),
        }
    }

    /// Per-tick results, for comparing two runs tick by tick
    pub fn trace(&self) -> Vec<TickResult> {
        let mut session = self.start_session();
        self.inputs
            .iter()
            .map(|input| session.tick_with(input))
            .collect()
    }

    fn start_session(&self) -> Session {
        let mut session = Session::new(self.tuning, self.seed);
        match &self.platforms {
            Some(platforms) => session.start_with_level(platforms.clone()),
            None => session.start(),
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platforms::ScriptedRandom;

    fn sample_inputs() -> Vec<InputState> {
        (0..200)
            .map(|t| InputState {
                left: t % 50 < 10,
                right: (20..45).contains(&(t % 50)),
                jump: t % 25 == 12,
            })
            .collect()
    }

    #[test]
    fn test_replay_reproduces_recorded_session() {
        let mut session = Session::new(Tuning::default(), 77);
        session.set_recording(true);
        session.start();
        let mut last = session.last_result();
        for input in sample_inputs() {
            last = session.tick_with(&input);
        }

        let replay = session.replay().expect("recording enabled");
        assert_eq!(replay.inputs.len(), session.run().unwrap().time_ticks as usize);
        let outcome = replay.run();
        assert_eq!(outcome.result, last);
    }

    #[test]
    fn test_replay_json() {
        let replay = Replay {
            seed: 3,
            tuning: Tuning::default(),
            platforms: None,
            inputs: sample_inputs(),
        };
        let parsed = Replay::from_json(&replay.to_json().unwrap()).unwrap();
        assert_eq!(parsed.trace(), replay.trace());
    }

    #[test]
    fn test_scripted_level_travels_with_replay() {
        let mut session = Session::new(Tuning::default(), 77);
        session.set_recording(true);
        session.start_with_rng(&mut ScriptedRandom::new([0.5]));
        let live: Vec<TickResult> = sample_inputs()
            .iter()
            .map(|input| session.tick_with(input))
            .collect();

        let replay = session.replay().expect("recording enabled");
        assert_eq!(replay.platforms.as_deref(), Some(&session.run().unwrap().platforms[..]));

        let parsed = Replay::from_json(&replay.to_json().unwrap()).unwrap();
        assert_eq!(parsed.trace(), live);
        assert_eq!(parsed.run().result, session.last_result());
    }

    #[test]
    fn test_seeded_replay_omits_level() {
        let mut session = Session::new(Tuning::default(), 5);
        session.set_recording(true);
        session.start();
        session.tick();
        let replay = session.replay().expect("recording enabled");
        assert_eq!(replay.platforms, None);
        assert!(!replay.to_json().unwrap().contains("platforms"));
    }

    #[test]
    fn test_replay_rejects_garbage() {
        assert!(matches!(Replay::from_json("[1, 2"), Err(ReplayError::Parse(_))));
    }

    #[test]
    fn test_no_replay_without_recording() {
        let mut session = Session::new(Tuning::default(), 1);
        session.start();
        assert!(session.replay().is_none());
    }
}
