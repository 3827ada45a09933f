//! Game settings and preferences
//!
//! Persisted separately from game state in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::consts::*;
use crate::platform::MicNotice;
use crate::sim::{LoudnessGate, Tuning};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Play death/victory cues
    pub sound_enabled: bool,
    /// Ask for the microphone on load
    pub microphone_enabled: bool,
    /// Loudness (0-100) above which a sound wave fires; updated by calibration
    pub loudness_threshold: f32,

    // === Difficulty ===
    /// Passive reveal radius around the player
    pub passive_reveal_radius: f32,
    /// How long revealed entities stay drawn (ms)
    pub reveal_window_ms: Millis,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            microphone_enabled: true,
            loudness_threshold: DEFAULT_LOUDNESS_THRESHOLD,
            passive_reveal_radius: PASSIVE_REVEAL_RADIUS,
            reveal_window_ms: REVEAL_WINDOW_MS,
        }
    }
}

impl Settings {
    /// Simulation tunables derived from these settings
    pub fn tuning(&self) -> Tuning {
        Tuning {
            passive_reveal_radius: self.passive_reveal_radius.max(0.0),
            reveal_window: self.reveal_window_ms,
            ..Tuning::default()
        }
    }

    /// Loudness gate using the persisted (possibly calibrated) threshold
    pub fn loudness_gate(&self) -> LoudnessGate {
        LoudnessGate::new(self.loudness_threshold)
    }

    /// Remember whether the microphone may be requested on the next load.
    /// Only the browser's answer changes it. Returns `true` if it changed.
    pub fn record_microphone(&mut self, notice: MicNotice) -> bool {
        let granted = notice == MicNotice::Enabled;
        let changed = self.microphone_enabled != granted;
        self.microphone_enabled = granted;
        changed
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    /// Label for the sound toggle button
    pub fn sound_label(&self) -> &'static str {
        if self.sound_enabled {
            "Sound: On"
        } else {
            "Sound: Off"
        }
    }

    /// Parse settings JSON, falling back to defaults for anything missing
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sonar_dodge_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
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

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
