//! Fixed timestep simulation tick
//!
//! `tick` advances gameplay by one step; `update_visibility` runs the reveal
//! pass once per rendered frame, in every phase.

use glam::Vec2;

use super::collision::{PushSide, circle_hits_any, circle_rect_overlap, push_out};
use super::reveal::update_reveal;
use super::state::{GameEvent, GamePhase, GameState, Wall};
use crate::Millis;
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement directions
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Start / continue after a win (one-shot)
    pub confirm: bool,
    /// Manually fire a sound wave (one-shot)
    pub pulse: bool,
    /// Reload the current level (one-shot)
    pub reset_level: bool,
    /// Zero the death counter (one-shot)
    pub reset_deaths: bool,
    /// Start a loudness recalibration (one-shot)
    pub recalibrate: bool,
    /// Microphone loudness this frame (0-100), `None` without a microphone
    pub loudness: Option<f32>,
}

impl TickInput {
    /// Drop one-shot actions after they have been consumed
    pub fn clear_one_shots(&mut self) {
        self.pause = false;
        self.confirm = false;
        self.pulse = false;
        self.reset_level = false;
        self.reset_deaths = false;
        self.recalibrate = false;
    }
}

/// Advance the game by one fixed step
pub fn tick(state: &mut GameState, input: &TickInput, now: Millis) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.reset_deaths {
        events.push(state.reset_deaths());
    }
    if input.reset_level {
        events.push(state.reset_level());
    }

    if input.pause {
        events.extend(state.toggle_pause());
    }

    if input.confirm {
        let event = match state.phase {
            GamePhase::NotStarted => state.start(now),
            GamePhase::Won => state.continue_to_next_level(now),
            GamePhase::Paused => state.toggle_pause(),
            GamePhase::Running => None,
        };
        events.extend(event);
    }

    if input.recalibrate {
        state.begin_calibration(now);
    }
    update_calibration(state, input.loudness, now, &mut events);

    // Sound wave: manual request, or loudness over threshold while not calibrating
    let loud = state.calibration.is_none()
        && input.loudness.is_some_and(|level| state.loudness.is_loud(level));
    if input.pulse || loud {
        events.extend(state.trigger_pulse(now));
    }

    if state.phase != GamePhase::Running {
        return events;
    }

    move_player(state, input, now);
    move_hazards(state);
    check_collisions(state, now, &mut events);

    events
}

/// Expire the sound wave and reveal everything within range of the player
pub fn update_visibility(state: &mut GameState, now: Millis) {
    let tuning = state.tuning;
    state.pulse.update(now, &tuning.pulse);
    let pulse_radius = state.pulse.reveal_radius(now, &tuning.pulse);
    let center = state.player.pos;

    for hazard in &mut state.hazards {
        let dist = hazard.rect().distance_to(center);
        update_reveal(
            &mut hazard.reveal,
            dist,
            tuning.passive_reveal_radius,
            pulse_radius,
            now,
        );
    }

    for wall in &mut state.walls {
        let dist = wall.rect.distance_to(center);
        update_reveal(
            &mut wall.reveal,
            dist,
            tuning.passive_reveal_radius,
            pulse_radius,
            now,
        );
    }
}

fn update_calibration(
    state: &mut GameState,
    loudness: Option<f32>,
    now: Millis,
    events: &mut Vec<GameEvent>,
) {
    let Some(session) = state.calibration.as_mut() else {
        return;
    };

    if let Some(level) = loudness {
        session.sample(now, level);
    }
    if !session.is_done(now) {
        return;
    }

    match session.finish(now) {
        Some(calibration) => {
            state.loudness.apply(calibration);
            if calibration.clamped_to_floor {
                log::info!(
                    "Too quiet to calibrate, using minimum threshold {:.1}",
                    calibration.threshold
                );
            } else {
                log::info!("Calibrated loudness threshold to {:.1}", calibration.threshold);
            }
            events.push(GameEvent::Calibrated {
                threshold: calibration.threshold,
                clamped_to_floor: calibration.clamped_to_floor,
            });
        }
        None => {
            log::warn!("Calibration finished without microphone samples");
            events.push(GameEvent::CalibrationFailed);
        }
    }
    state.calibration = None;
}

fn blocked_by_walls(walls: &[Wall], center: Vec2, radius: f32) -> bool {
    circle_hits_any(center, radius, walls.iter().map(|w| &w.rect))
}

/// Move the player one step per held direction. Each axis is checked against
/// the walls separately so the player can slide along them.
fn move_player(state: &mut GameState, input: &TickInput, now: Millis) {
    let radius = state.player.radius;
    let speed = state.player.speed;

    // Confined to the spawn zone while invincible
    let bounds = if state.is_invincible(now) {
        state.spawn_zone()
    } else {
        super::collision::Rect::new(0.0, 0.0, SURFACE_WIDTH, SURFACE_HEIGHT)
    };
    let (min_x, max_x) = (bounds.left() + radius, bounds.right() - radius);
    let (min_y, max_y) = (bounds.top() + radius, bounds.bottom() - radius);

    let walls = &state.walls;
    let player = &mut state.player;

    if input.left {
        let candidate = Vec2::new((player.pos.x - speed).max(min_x), player.pos.y);
        if !blocked_by_walls(walls, candidate, radius) {
            player.pos = candidate;
        }
    }
    if input.right {
        let candidate = Vec2::new((player.pos.x + speed).min(max_x), player.pos.y);
        if !blocked_by_walls(walls, candidate, radius) {
            player.pos = candidate;
        }
    }
    if input.up {
        let candidate = Vec2::new(player.pos.x, (player.pos.y - speed).max(min_y));
        if !blocked_by_walls(walls, candidate, radius) {
            player.pos = candidate;
        }
    }
    if input.down {
        let candidate = Vec2::new(player.pos.x, (player.pos.y + speed).min(max_y));
        if !blocked_by_walls(walls, candidate, radius) {
            player.pos = candidate;
        }
    }
}

/// Patrol step: bounce off the surface edges and walls, stay out of the spawn zone
fn move_hazards(state: &mut GameState) {
    let zone = state.spawn_zone();
    let walls = &state.walls;

    for hazard in &mut state.hazards {
        let old = hazard.pos;
        hazard.pos += hazard.vel;

        let rect = hazard.rect();
        if rect.left() < 0.0 || rect.right() > SURFACE_WIDTH {
            hazard.vel.x = -hazard.vel.x;
            hazard.pos.x = old.x;
        }
        if rect.top() < 0.0 || rect.bottom() > SURFACE_HEIGHT {
            hazard.vel.y = -hazard.vel.y;
            hazard.pos.y = old.y;
        }

        let rect = hazard.rect();
        if walls.iter().any(|w| rect.overlaps_inclusive(&w.rect)) {
            hazard.vel = -hazard.vel;
            hazard.pos = old;
        }

        if let Some(push) = push_out(&hazard.rect(), &zone) {
            hazard.pos = push.position;
            match push.side {
                PushSide::Left => hazard.vel.x = -hazard.vel.x.abs(),
                PushSide::Right => hazard.vel.x = hazard.vel.x.abs(),
                PushSide::Top => hazard.vel.y = -hazard.vel.y.abs(),
                PushSide::Bottom => hazard.vel.y = hazard.vel.y.abs(),
            }
        }
    }
}

fn check_collisions(state: &mut GameState, now: Millis, events: &mut Vec<GameEvent>) {
    if !state.is_invincible(now) {
        let center = state.player.pos;
        let radius = state.player.radius;
        let hit = state
            .hazards
            .iter()
            .any(|h| circle_rect_overlap(center, radius, &h.rect()));
        if hit {
            events.push(state.kill_player(now));
        }
    }

    if circle_rect_overlap(state.player.pos, state.player.radius, &state.goal()) {
        events.push(state.complete_level());
    }
}
