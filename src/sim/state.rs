//! Game state and level flow
//!
//! Everything the simulation mutates lives in [`GameState`]; the front end
//! only feeds it input and timestamps and reads it back for drawing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::levels::{HazardTemplate, LevelError, LevelTemplate, WallTemplate, builtin_levels};
use super::loudness::{CalibrationSession, LoudnessGate};
use super::pulse::{PulseConfig, SoundWave};
use super::reveal::RevealState;
use crate::consts::*;
use crate::{Millis, elapsed_ms};

/// Level lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level loaded, waiting for the start action
    NotStarted,
    /// Active gameplay
    Running,
    /// Drawing continues, simulation is frozen
    Paused,
    /// Goal reached, waiting for the continue action
    Won,
}

/// Things that happened during a tick or action, for sound cues and HUD updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelLoaded { level: usize },
    Started,
    Paused,
    Resumed,
    Died { deaths: u32 },
    LevelComplete { level: usize, next_level: usize },
    PulseTriggered,
    LevelReset,
    DeathsReset,
    Calibrated { threshold: f32, clamped_to_floor: bool },
    CalibrationFailed,
}

/// Reveal and respawn tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub passive_reveal_radius: f32,
    pub reveal_window: Millis,
    pub pulse: PulseConfig,
    pub respawn_flash_duration: Millis,
    pub respawn_flash_interval: Millis,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            passive_reveal_radius: PASSIVE_REVEAL_RADIUS,
            reveal_window: REVEAL_WINDOW_MS,
            pulse: PulseConfig::default(),
            respawn_flash_duration: RESPAWN_FLASH_DURATION_MS,
            respawn_flash_interval: RESPAWN_FLASH_INTERVAL_MS,
        }
    }
}

/// A patrolling saw blade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    /// Top-left corner
    pub pos: Vec2,
    /// Displacement per simulation step
    pub vel: Vec2,
    pub reveal: RevealState,
}

impl Hazard {
    pub fn from_template(t: &HazardTemplate) -> Self {
        Self {
            pos: Vec2::new(t.x, t.y),
            vel: Vec2::new(t.vx, t.vy),
            reveal: RevealState::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, HAZARD_SIZE, HAZARD_SIZE)
    }
}

/// A static obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub rect: Rect,
    pub reveal: RevealState,
}

impl Wall {
    pub fn from_template(t: &WallTemplate) -> Self {
        Self {
            rect: Rect::new(t.x, t.y, t.width, t.height),
            reveal: RevealState::default(),
        }
    }
}

/// The player circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Centre
    pub pos: Vec2,
    pub radius: f32,
    /// Distance per simulation step
    pub speed: f32,
    pub spawn: Vec2,
}

impl Default for Player {
    fn default() -> Self {
        let spawn = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
        Self {
            pos: spawn,
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            spawn,
        }
    }
}

impl Player {
    pub fn return_to_spawn(&mut self) {
        self.pos = self.spawn;
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed used to pick the starting level
    pub seed: u64,
    /// Index of the level being played
    pub level_index: usize,
    /// Set when the goal is reached
    pub next_level_index: Option<usize>,
    pub deaths: u32,
    pub phase: GamePhase,
    pub player: Player,
    pub hazards: Vec<Hazard>,
    pub walls: Vec<Wall>,
    /// Start of the current invincibility window
    pub respawned_at: Option<Millis>,
    pub pulse: SoundWave,
    pub loudness: LoudnessGate,
    pub calibration: Option<CalibrationSession>,
    pub tuning: Tuning,
    levels: Vec<LevelTemplate>,
}

impl GameState {
    /// New game on the built-in campaign, starting at a seeded random level
    pub fn new(seed: u64) -> Self {
        Self::build(seed, builtin_levels())
    }

    /// New game on a custom level list
    pub fn with_levels(seed: u64, levels: Vec<LevelTemplate>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(Self::build(seed, levels))
    }

    fn build(seed: u64, levels: Vec<LevelTemplate>) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let start = rng.random_range(0..levels.len());

        let mut state = Self {
            seed,
            level_index: start,
            next_level_index: None,
            deaths: 0,
            phase: GamePhase::NotStarted,
            player: Player::default(),
            hazards: Vec::new(),
            walls: Vec::new(),
            respawned_at: None,
            pulse: SoundWave::default(),
            loudness: LoudnessGate::default(),
            calibration: None,
            tuning: Tuning::default(),
            levels,
        };
        state.load_level(start);
        state
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Immutable template of a level
    pub fn template(&self, index: usize) -> Option<&LevelTemplate> {
        self.levels.get(index)
    }

    /// Replace hazards and walls with fresh copies of a level template and
    /// put the player back on the spawn point. Indices wrap around.
    pub fn load_level(&mut self, index: usize) -> GameEvent {
        let index = index % self.levels.len();
        let template = &self.levels[index];

        self.hazards = template.hazards.iter().map(Hazard::from_template).collect();
        self.walls = template.walls.iter().map(Wall::from_template).collect();
        self.level_index = index;
        self.next_level_index = None;
        self.player.return_to_spawn();

        log::info!(
            "Loaded level {} ({} hazards, {} walls)",
            index + 1,
            self.hazards.len(),
            self.walls.len()
        );
        GameEvent::LevelLoaded { level: index }
    }

    pub fn is_started(&self) -> bool {
        self.phase != GamePhase::NotStarted
    }

    /// Within `[respawned_at, respawned_at + flash duration)`
    pub fn is_invincible(&self, now: Millis) -> bool {
        self.respawned_at
            .is_some_and(|t| elapsed_ms(now, t) < self.tuning.respawn_flash_duration)
    }

    /// Respawn flash phase (0 = highlighted, 1 = normal), `None` outside the window
    pub fn flash_phase(&self, now: Millis) -> Option<u32> {
        if !self.is_invincible(now) {
            return None;
        }
        let elapsed = elapsed_ms(now, self.respawned_at?);
        let interval = self.tuning.respawn_flash_interval.max(1);
        Some(((elapsed / interval) % 2) as u32)
    }

    /// Safe zone around the spawn point: hazards are kept out of it and the
    /// player is confined to it while invincible
    pub fn spawn_zone(&self) -> Rect {
        Rect::centered(self.player.spawn, SPAWN_ZONE_SIZE)
    }

    pub fn goal(&self) -> Rect {
        Rect::new(GOAL_X, GOAL_Y, GOAL_SIZE, GOAL_SIZE)
    }

    // === Actions ===

    /// Begin play from the NotStarted phase, opening an invincibility window
    pub fn start(&mut self, now: Millis) -> Option<GameEvent> {
        if self.phase != GamePhase::NotStarted {
            return None;
        }
        self.phase = GamePhase::Running;
        self.respawned_at = Some(now);
        log::info!("Level {} started", self.level_index + 1);
        Some(GameEvent::Started)
    }

    /// Running <-> Paused. Ignored before start and on the win screen.
    pub fn toggle_pause(&mut self) -> Option<GameEvent> {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                log::info!("Paused");
                Some(GameEvent::Paused)
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                log::info!("Resumed");
                Some(GameEvent::Resumed)
            }
            GamePhase::NotStarted | GamePhase::Won => None,
        }
    }

    /// Leave the win screen for the next level
    pub fn continue_to_next_level(&mut self, now: Millis) -> Option<GameEvent> {
        if self.phase != GamePhase::Won {
            return None;
        }
        let target = self
            .next_level_index
            .unwrap_or((self.level_index + 1) % self.levels.len());
        let event = self.load_level(target);
        self.phase = GamePhase::Running;
        self.respawned_at = Some(now);
        Some(event)
    }

    /// Reload the current level from its template and wait for start again.
    /// Deaths and the level position are kept.
    pub fn reset_level(&mut self) -> GameEvent {
        self.load_level(self.level_index);
        self.phase = GamePhase::NotStarted;
        self.respawned_at = None;
        GameEvent::LevelReset
    }

    pub fn reset_deaths(&mut self) -> GameEvent {
        self.deaths = 0;
        GameEvent::DeathsReset
    }

    /// Fire a sound wave if running and off cooldown
    pub fn trigger_pulse(&mut self, now: Millis) -> Option<GameEvent> {
        if self.phase != GamePhase::Running {
            return None;
        }
        self.pulse.update(now, &self.tuning.pulse);
        if self.pulse.try_trigger(now, &self.tuning.pulse) {
            log::debug!("Sound wave triggered at {}", now);
            Some(GameEvent::PulseTriggered)
        } else {
            None
        }
    }

    /// Start sampling loudness to recalibrate the threshold
    pub fn begin_calibration(&mut self, now: Millis) {
        self.calibration = Some(CalibrationSession::start(now));
    }

    /// Record a death: count it, send the player home, open a new
    /// invincibility window
    pub(crate) fn kill_player(&mut self, now: Millis) -> GameEvent {
        self.deaths += 1;
        self.player.return_to_spawn();
        self.respawned_at = Some(now);
        log::info!("Player hit a hazard (deaths: {})", self.deaths);
        GameEvent::Died {
            deaths: self.deaths,
        }
    }

    /// Freeze on the win screen and remember which level comes next
    pub(crate) fn complete_level(&mut self) -> GameEvent {
        let next_level = (self.level_index + 1) % self.levels.len();
        self.next_level_index = Some(next_level);
        self.phase = GamePhase::Won;
        log::info!("Level {} complete", self.level_index + 1);
        GameEvent::LevelComplete {
            level: self.level_index,
            next_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_not_started() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert!(!state.is_started());
        assert!(state.level_index < state.level_count());
        assert_eq!(state.player.pos, state.player.spawn);
        assert!(state.respawned_at.is_none());
    }

    #[test]
    fn test_same_seed_same_start_level() {
        assert_eq!(
            GameState::new(42).level_index,
            GameState::new(42).level_index
        );
    }

    #[test]
    fn test_with_levels_rejects_empty() {
        assert!(matches!(
            GameState::with_levels(1, Vec::new()),
            Err(LevelError::Empty)
        ));
    }

    #[test]
    fn test_loaded_entities_do_not_alias_template() {
        let mut state = GameState::new(3);
        let index = state.level_index;
        let pristine = state.template(index).unwrap().clone();

        state.hazards[0].pos += Vec2::new(123.0, 45.0);
        state.hazards[0].reveal.reveal(999);
        state.walls.clear();

        assert_eq!(state.template(index).unwrap(), &pristine);

        state.reset_level();
        assert_eq!(state.hazards[0].pos.x, pristine.hazards[0].x);
        assert_eq!(state.hazards[0].pos.y, pristine.hazards[0].y);
        assert!(!state.hazards[0].reveal.visible);
        assert_eq!(state.walls.len(), pristine.walls.len());
    }

    #[test]
    fn test_invincibility_window_bounds() {
        let mut state = GameState::new(1);
        assert!(state.start(10_000).is_some());

        assert!(state.is_invincible(10_000));
        assert!(state.is_invincible(11_999));
        assert!(!state.is_invincible(12_000));
    }

    #[test]
    fn test_flash_phase_alternates() {
        let mut state = GameState::new(1);
        state.start(1_000);

        assert_eq!(state.flash_phase(1_000), Some(0));
        assert_eq!(state.flash_phase(1_149), Some(0));
        assert_eq!(state.flash_phase(1_150), Some(1));
        assert_eq!(state.flash_phase(1_300), Some(0));
        assert_eq!(state.flash_phase(3_000), None);
    }

    #[test]
    fn test_pause_transitions() {
        let mut state = GameState::new(1);
        assert_eq!(state.toggle_pause(), None);

        state.start(0);
        assert_eq!(state.toggle_pause(), Some(GameEvent::Paused));
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.toggle_pause(), Some(GameEvent::Resumed));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_continue_wraps_to_first_level() {
        let mut state = GameState::new(1);
        state.load_level(state.level_count() - 1);
        state.start(0);

        state.complete_level();
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.next_level_index, Some(0));

        assert_eq!(
            state.continue_to_next_level(5_000),
            Some(GameEvent::LevelLoaded { level: 0 })
        );
        assert_eq!(state.level_index, 0);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.respawned_at, Some(5_000));
    }

    #[test]
    fn test_reset_level_keeps_deaths_and_position_in_sequence() {
        let mut state = GameState::new(9);
        let level = state.level_index;
        state.start(0);
        assert!(state.is_started());
        state.kill_player(100);
        state.player.pos = Vec2::new(300.0, 300.0);

        state.reset_level();
        assert!(!state.is_started());
        assert_eq!(state.deaths, 1);
        assert_eq!(state.level_index, level);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.player.pos, state.player.spawn);
        assert!(state.respawned_at.is_none());
    }

    #[test]
    fn test_pulse_requires_running() {
        let mut state = GameState::new(1);
        assert!(state.trigger_pulse(10_000).is_none());

        state.start(10_000);
        assert_eq!(state.trigger_pulse(10_000), Some(GameEvent::PulseTriggered));

        state.toggle_pause();
        state.pulse.update(20_000, &state.tuning.pulse);
        assert!(state.trigger_pulse(20_000).is_none());
    }
}
