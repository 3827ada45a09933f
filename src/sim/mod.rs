//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Time comes in as millisecond timestamps from the caller
//! - Movement runs on a fixed step, reveal checks once per frame
//! - Level templates are never mutated; loading always copies

pub mod collision;
pub mod levels;
pub mod loudness;
pub mod pulse;
pub mod reveal;
pub mod state;
pub mod tick;

pub use collision::{PushOut, PushSide, Rect, circle_rect_overlap, push_out};
pub use levels::{
    HazardTemplate, LevelError, LevelTemplate, WallTemplate, builtin_levels, parse_level_pack,
};
pub use loudness::{Calibration, CalibrationSession, LoudnessGate, calibrate_threshold};
pub use pulse::{PulseConfig, SoundWave};
pub use reveal::{RevealState, is_rendered, should_reveal};
pub use state::{GameEvent, GamePhase, GameState, Hazard, Player, Tuning, Wall};
pub use tick::{TickInput, tick, update_visibility};
