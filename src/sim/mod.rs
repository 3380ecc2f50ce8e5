//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick, in a fixed order
//! - Injected random source only
//! - Stable iteration order (platforms by index)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod camera;
pub mod collision;
pub mod input;
pub mod physics;
pub mod platforms;
pub mod replay;
pub mod session;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{Landing, has_fallen_out, resolve_landing};
pub use input::{Action, InputBridge, InputEvent, InputSender, InputState};
pub use platforms::{RandomSource, ScriptedRandom, generate_platforms, rng_for_seed};
pub use replay::{Replay, ReplayError, ReplayOutcome};
pub use session::{GameEndListener, Session, StopHandle};
pub use state::{
    GameEvent, GameOverSummary, GamePhase, Platform, PlayerBody, RunState, Scoreboard, TickResult,
};
pub use tick::{TickReport, tick};
