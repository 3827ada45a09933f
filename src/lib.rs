//! Sonar Dodge - a dodging game played in the dark
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (movement, collisions, reveal logic, level flow)
//! - `renderer`: Draw command list built from game state, plus the canvas backend
//! - `platform`: Keyboard intents and the microphone loudness source
//! - `settings`: Persisted player preferences

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Millisecond timestamp from the host clock (`performance.now()` on the web).
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use super::Millis;

    /// Fixed simulation step (movement speeds below are per step)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Play surface dimensions
    pub const SURFACE_WIDTH: f32 = 800.0;
    pub const SURFACE_HEIGHT: f32 = 400.0;

    /// Player defaults - spawns in the bottom-left corner
    pub const PLAYER_RADIUS: f32 = 25.0;
    pub const PLAYER_SPEED: f32 = 1.75;
    pub const PLAYER_SPAWN_X: f32 = 50.0;
    pub const PLAYER_SPAWN_Y: f32 = SURFACE_HEIGHT - 50.0;

    /// Hazards are square saw blades
    pub const HAZARD_SIZE: f32 = 40.0;

    /// Passive reveal: anything this close to the player shows up
    pub const PASSIVE_REVEAL_RADIUS: f32 = 100.0;
    /// How long a revealed entity stays drawn
    pub const REVEAL_WINDOW_MS: Millis = 3000;

    /// Sound wave pulse
    pub const PULSE_DURATION_MS: Millis = 1500;
    pub const PULSE_COOLDOWN_MS: Millis = 1500;
    pub const PULSE_MAX_RADIUS: f32 = 200.0;

    /// Respawn grace period and its flash cadence
    pub const RESPAWN_FLASH_DURATION_MS: Millis = 2000;
    pub const RESPAWN_FLASH_INTERVAL_MS: Millis = 150;

    /// Square safe zone centred on the spawn point
    pub const SPAWN_ZONE_SIZE: f32 = 80.0;

    /// Goal flag in the top-right corner
    pub const GOAL_X: f32 = SURFACE_WIDTH - 70.0;
    pub const GOAL_Y: f32 = 20.0;
    pub const GOAL_SIZE: f32 = 50.0;
    /// Padding of the highlighted pad drawn behind the goal
    pub const GOAL_PAD: f32 = 6.0;

    /// Hazard sprite frame length (two frames, spinning saw)
    pub const HAZARD_SPRITE_FRAME_MS: Millis = 150;

    /// Microphone loudness (0-100 scale)
    pub const DEFAULT_LOUDNESS_THRESHOLD: f32 = 80.0;
    pub const CALIBRATION_FACTOR: f32 = 1.5;
    pub const CALIBRATION_FLOOR: f32 = 45.0;
    pub const CALIBRATION_WINDOW_MS: Millis = 2000;
    pub const CALIBRATION_SAMPLE_INTERVAL_MS: Millis = 100;
}

/// Milliseconds elapsed since `since`, saturating at zero if the clock stepped back.
#[inline]
pub fn elapsed_ms(now: Millis, since: Millis) -> Millis {
    now.saturating_sub(since)
}
