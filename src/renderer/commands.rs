//! Frame description as a flat list of 2D draw commands
//!
//! `build_frame` is pure: it reads the game state and returns what to draw, in
//! painter's order. The canvas backend (or a test) consumes the list.

use glam::Vec2;

use crate::Millis;
use crate::consts::*;
use crate::sim::{GameState, Rect, is_rendered};

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Colors for game elements
pub mod colors {
    use super::Color;

    const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Color {
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
    }

    pub const BACKGROUND: Color = rgba(0x33, 0x33, 0x33, 1.0);
    pub const SPAWN_ZONE: Color = rgba(0, 123, 255, 0.25);
    pub const GOAL_PAD: Color = rgba(255, 193, 7, 0.25);
    pub const PLAYER: Color = rgba(0xff, 0xcc, 0x00, 1.0);
    pub const PLAYER_FLASH: Color = rgba(0x4c, 0xaf, 0x50, 1.0);
    pub const COOLDOWN: Color = rgba(147, 51, 234, 0.5);
    pub const PULSE_CENTER: Color = rgba(0, 200, 255, 0.0);
    pub const PULSE_BAND: Color = rgba(0, 200, 255, 0.3);
    pub const PULSE_EDGE: Color = rgba(0, 200, 255, 0.6);
    pub const PULSE_RING: Color = rgba(0, 200, 255, 0.8);
    pub const HAZARD: Color = rgba(255, 0, 0, 1.0);
    pub const WALL_FILL: Color = rgba(240, 240, 240, 0.95);
    pub const WALL_STROKE: Color = rgba(200, 200, 200, 1.0);
    pub const GOAL: Color = rgba(255, 193, 7, 1.0);
}

/// Bitmap sprites; the backend falls back to `fallback` colour if not loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    /// Spinning saw, two alternating frames
    Saw { frame: u8 },
    Flag,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        line_width: f32,
    },
    /// Circle filled with a radial gradient; stops are (offset 0..=1, color)
    FillRadialGradient {
        center: Vec2,
        radius: f32,
        stops: Vec<(f32, Color)>,
    },
    Sprite {
        sprite: Sprite,
        rect: Rect,
        fallback: Color,
    },
}

/// Describe one frame of the game
pub fn build_frame(state: &GameState, now: Millis) -> Vec<DrawCommand> {
    let mut cmds = Vec::with_capacity(8 + state.hazards.len() + state.walls.len() * 2);
    let tuning = &state.tuning;
    let player = &state.player;
    let invincible = state.is_invincible(now);

    cmds.push(DrawCommand::Clear {
        color: colors::BACKGROUND,
    });
    cmds.push(DrawCommand::FillRect {
        rect: state.spawn_zone(),
        color: colors::SPAWN_ZONE,
    });
    cmds.push(DrawCommand::FillRect {
        rect: state.goal().inflate(GOAL_PAD),
        color: colors::GOAL_PAD,
    });

    let player_color = match state.flash_phase(now) {
        Some(0) => colors::PLAYER_FLASH,
        _ => colors::PLAYER,
    };
    cmds.push(DrawCommand::FillCircle {
        center: player.pos,
        radius: player.radius,
        color: player_color,
    });

    // Recharge indicator fills the player from the centre outward
    if let Some(progress) = state.pulse.cooldown_progress(now, &tuning.pulse) {
        cmds.push(DrawCommand::FillCircle {
            center: player.pos,
            radius: player.radius * progress,
            color: colors::COOLDOWN,
        });
    }

    let pulse_radius = state.pulse.radius(now, &tuning.pulse);
    if pulse_radius > 0.0 {
        cmds.push(DrawCommand::FillRadialGradient {
            center: player.pos,
            radius: pulse_radius,
            stops: vec![
                (0.0, colors::PULSE_CENTER),
                (0.7, colors::PULSE_BAND),
                (1.0, colors::PULSE_EDGE),
            ],
        });
        cmds.push(DrawCommand::StrokeCircle {
            center: player.pos,
            radius: pulse_radius,
            color: colors::PULSE_RING,
            line_width: 3.0,
        });
    }

    let frame = ((now / HAZARD_SPRITE_FRAME_MS) % 2) as u8;
    for hazard in &state.hazards {
        if is_rendered(&hazard.reveal, now, tuning.reveal_window, invincible) {
            cmds.push(DrawCommand::Sprite {
                sprite: Sprite::Saw { frame },
                rect: hazard.rect(),
                fallback: colors::HAZARD,
            });
        }
    }

    for wall in &state.walls {
        if is_rendered(&wall.reveal, now, tuning.reveal_window, invincible) {
            cmds.push(DrawCommand::FillRect {
                rect: wall.rect,
                color: colors::WALL_FILL,
            });
            cmds.push(DrawCommand::StrokeRect {
                rect: wall.rect,
                color: colors::WALL_STROKE,
                line_width: 2.0,
            });
        }
    }

    cmds.push(DrawCommand::Sprite {
        sprite: Sprite::Flag,
        rect: state.goal(),
        fallback: colors::GOAL,
    });

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{LevelTemplate, WallTemplate, update_visibility};

    fn count_saws(cmds: &[DrawCommand]) -> usize {
        cmds.iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Sprite {
                        sprite: Sprite::Saw { .. },
                        ..
                    }
                )
            })
            .count()
    }

    fn count_walls(cmds: &[DrawCommand]) -> usize {
        cmds.iter()
            .filter(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .count()
    }

    #[test]
    fn test_hidden_until_revealed() {
        let mut state = GameState::new(5);
        state.start(0);

        // Invincible right after start: everything drawn
        let cmds = build_frame(&state, 100);
        assert_eq!(count_saws(&cmds), state.hazards.len());
        assert_eq!(count_walls(&cmds), state.walls.len());

        // After the window nothing has been revealed yet (player far from all)
        state.player.pos = Vec2::new(-1_000.0, -1_000.0);
        let cmds = build_frame(&state, 10_000);
        assert_eq!(count_saws(&cmds), 0);
        assert_eq!(count_walls(&cmds), 0);
    }

    #[test]
    fn test_revealed_wall_drawn_for_window() {
        let mut state = GameState::with_levels(
            1,
            vec![LevelTemplate {
                hazards: vec![],
                walls: vec![WallTemplate {
                    x: 100.0,
                    y: 340.0,
                    width: 10.0,
                    height: 10.0,
                }],
            }],
        )
        .unwrap();

        update_visibility(&mut state, 10_000);
        assert_eq!(count_walls(&build_frame(&state, 10_000)), 1);

        // Player walks away; the wall fades after the reveal window
        state.player.pos = Vec2::new(700.0, 100.0);
        update_visibility(&mut state, 12_000);
        assert_eq!(count_walls(&build_frame(&state, 13_000)), 1);
        assert_eq!(count_walls(&build_frame(&state, 13_001)), 0);
    }

    #[test]
    fn test_respawn_flash_color() {
        let mut state = GameState::new(5);
        state.start(1_000);

        let player_color = |cmds: &[DrawCommand]| {
            cmds.iter().find_map(|c| match c {
                DrawCommand::FillCircle { radius, color, .. } if *radius == PLAYER_RADIUS => {
                    Some(*color)
                }
                _ => None,
            })
        };

        assert_eq!(
            player_color(&build_frame(&state, 1_000)),
            Some(colors::PLAYER_FLASH)
        );
        assert_eq!(
            player_color(&build_frame(&state, 1_200)),
            Some(colors::PLAYER)
        );
        assert_eq!(
            player_color(&build_frame(&state, 5_000)),
            Some(colors::PLAYER)
        );
    }

    #[test]
    fn test_pulse_ring_drawn_while_expanding() {
        let mut state = GameState::new(5);
        state.start(0);
        state.trigger_pulse(10_000);

        let has_ring = |cmds: &[DrawCommand]| {
            cmds.iter()
                .any(|c| matches!(c, DrawCommand::StrokeCircle { .. }))
        };
        assert!(has_ring(&build_frame(&state, 10_500)));

        update_visibility(&mut state, 11_600);
        assert!(!has_ring(&build_frame(&state, 11_600)));
    }
}
