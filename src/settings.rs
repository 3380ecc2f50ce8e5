//! Host preferences
//!
//! Persisted separately from the leaderboard in LocalStorage. Nothing here
//! reaches the simulation, so changing a setting never alters a run.

use serde::{Deserialize, Serialize};

/// Host settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
    /// Show the leaderboard on the game over screen
    pub show_leaderboard: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Behaviour ===
    /// Pause the run when the tab is hidden or the window loses focus
    pub auto_pause: bool,
    /// Start in demo mode with the autopilot playing
    pub demo_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_fps: false,
            show_leaderboard: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            auto_pause: true,
            demo_mode: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sky_climb_settings";

    /// Effective volume for sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Clamp volumes into range
    pub fn sanitized(mut self) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
        self.master_volume = clamp(self.master_volume);
        self.sfx_volume = clamp(self.sfx_volume);
        self
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings.sanitized();
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
