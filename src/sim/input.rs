//! Player input for the simulation
//!
//! The simulation reads one [`InputState`] per tick. Hosts that receive key
//! events on another thread push them through an [`InputBridge`] channel and
//! drain it once at the top of each tick.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

/// Logical actions the player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
}

impl Action {
    /// Default keyboard mapping (`KeyboardEvent.key` values)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Action::Left),
            "ArrowRight" | "d" | "D" => Some(Action::Right),
            "ArrowUp" | " " | "w" | "W" => Some(Action::Jump),
            _ => None,
        }
    }
}

/// A press or release of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Press(Action),
    Release(Action),
}

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    /// Jump action pressed this tick. A jump fires on the tick this turns on.
    pub jump: bool,
}

impl InputState {
    pub const NONE: InputState = InputState {
        left: false,
        right: false,
        jump: false,
    };

    pub fn horizontal(left: bool, right: bool) -> Self {
        Self {
            left,
            right,
            jump: false,
        }
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }

    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Jump => self.jump = held,
        }
    }
}

/// Sending half of an [`InputBridge`]; cheap to clone into event handlers
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Queue an event. Never blocks; events sent after the bridge is dropped are discarded.
    pub fn send(&self, event: InputEvent) {
        let _ = self.tx.send(event);
    }

    pub fn press(&self, action: Action) {
        self.send(InputEvent::Press(action));
    }

    pub fn release(&self, action: Action) {
        self.send(InputEvent::Release(action));
    }
}

/// Single-consumer end of the input channel, owned by the tick loop
#[derive(Debug)]
pub struct InputBridge {
    rx: Receiver<InputEvent>,
    held: InputState,
    /// A jump pressed since the last snapshot, even if already released
    jump_latched: bool,
}

impl InputBridge {
    pub fn channel() -> (InputSender, InputBridge) {
        let (tx, rx) = mpsc::channel();
        (
            InputSender { tx },
            InputBridge {
                rx,
                held: InputState::NONE,
                jump_latched: false,
            },
        )
    }

    /// Apply every queued event and return this tick's snapshot
    pub fn snapshot(&mut self) -> InputState {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                InputEvent::Press(action) => {
                    if action == Action::Jump {
                        self.jump_latched = true;
                    }
                    self.held.set(action, true);
                }
                InputEvent::Release(action) => self.held.set(action, false),
            }
        }

        let snapshot = InputState {
            jump: self.held.jump || self.jump_latched,
            ..self.held
        };
        self.jump_latched = false;
        snapshot
    }

    /// Forget held actions (after pause or restart)
    pub fn clear(&mut self) {
        while self.rx.try_recv().is_ok() {}
        self.held = InputState::NONE;
        self.jump_latched = false;
    }
}
