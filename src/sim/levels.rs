//! Level templates
//!
//! Levels are immutable data: a list of patrolling hazards and a list of
//! walls. Loading a level copies the template into fresh mutable entities.
//! The built-in campaign has ten hand-authored levels; external packs can be
//! supplied as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A hazard spawn: top-left position and per-step velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardTemplate {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// A wall rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallTemplate {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelTemplate {
    #[serde(alias = "enemies")]
    pub hazards: Vec<HazardTemplate>,
    #[serde(default)]
    pub walls: Vec<WallTemplate>,
}

/// Level pack loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// JSON could not be parsed
    Parse(String),
    /// The pack contained no levels
    Empty,
    /// A coordinate or velocity was NaN or infinite
    NonFinite { level: usize },
    /// A wall with zero or negative extent
    DegenerateWall { level: usize, wall: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Parse(msg) => write!(f, "Invalid level pack: {}", msg),
            LevelError::Empty => write!(f, "Level pack contains no levels"),
            LevelError::NonFinite { level } => {
                write!(f, "Level {} contains a non-finite number", level + 1)
            }
            LevelError::DegenerateWall { level, wall } => write!(
                f,
                "Level {} wall {} has non-positive size",
                level + 1,
                wall + 1
            ),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e.to_string())
    }
}

impl LevelTemplate {
    fn validate(&self, level: usize) -> Result<(), LevelError> {
        let hazards_finite = self
            .hazards
            .iter()
            .all(|h| [h.x, h.y, h.vx, h.vy].iter().all(|v| v.is_finite()));
        let walls_finite = self
            .walls
            .iter()
            .all(|w| [w.x, w.y, w.width, w.height].iter().all(|v| v.is_finite()));
        if !hazards_finite || !walls_finite {
            return Err(LevelError::NonFinite { level });
        }

        if let Some(wall) = self
            .walls
            .iter()
            .position(|w| w.width <= 0.0 || w.height <= 0.0)
        {
            return Err(LevelError::DegenerateWall { level, wall });
        }

        Ok(())
    }
}

/// Parse and validate a JSON array of levels
pub fn parse_level_pack(json: &str) -> Result<Vec<LevelTemplate>, LevelError> {
    let levels: Vec<LevelTemplate> = serde_json::from_str(json)?;
    if levels.is_empty() {
        return Err(LevelError::Empty);
    }
    for (i, level) in levels.iter().enumerate() {
        level.validate(i)?;
    }
    log::info!("Loaded level pack with {} levels", levels.len());
    Ok(levels)
}

const fn h(x: f32, y: f32, vx: f32, vy: f32) -> HazardTemplate {
    HazardTemplate { x, y, vx, vy }
}

const fn w(x: f32, y: f32, width: f32, height: f32) -> WallTemplate {
    WallTemplate {
        x,
        y,
        width,
        height,
    }
}

/// The built-in campaign, in play order
pub fn builtin_levels() -> Vec<LevelTemplate> {
    vec![
        // Horizontal lanes with a blocking wall
        LevelTemplate {
            hazards: vec![
                h(50.0, 100.0, 1.0, 0.0),
                h(200.0, 100.0, 1.0, 0.0),
                h(350.0, 100.0, 1.0, 0.0),
                h(50.0, 200.0, 1.0, 0.0),
                h(200.0, 200.0, 1.0, 0.0),
            ],
            walls: vec![w(120.0, 140.0, 560.0, 12.0), w(380.0, 60.0, 12.0, 80.0)],
        },
        // Vertical lanes split by a tall wall
        LevelTemplate {
            hazards: vec![
                h(150.0, 50.0, 0.0, 1.0),
                h(150.0, 150.0, 0.0, 1.0),
                h(150.0, 250.0, 0.0, 1.0),
                h(300.0, 50.0, 0.0, 1.0),
                h(300.0, 150.0, 0.0, 1.0),
                h(300.0, 250.0, 0.0, 1.0),
            ],
            walls: vec![w(240.0, 20.0, 12.0, 300.0)],
        },
        // Central barrier with two pillars
        LevelTemplate {
            hazards: vec![
                h(50.0, 120.0, 1.0, 0.0),
                h(200.0, 120.0, 1.0, 0.0),
                h(400.0, 50.0, 0.0, 1.0),
                h(400.0, 200.0, 0.0, 1.0),
                h(600.0, 150.0, 0.0, 1.0),
            ],
            walls: vec![
                w(180.0, 140.0, 440.0, 12.0),
                w(340.0, 40.0, 12.0, 40.0),
                w(460.0, 140.0, 12.0, 40.0),
            ],
        },
        // Staggered pillars forming corridors
        LevelTemplate {
            hazards: vec![
                h(50.0, 80.0, 1.0, 0.0),
                h(180.0, 80.0, 1.0, 0.0),
                h(310.0, 80.0, 1.0, 0.0),
                h(440.0, 150.0, 1.0, 0.0),
                h(570.0, 150.0, 1.0, 0.0),
            ],
            walls: vec![
                w(140.0, 30.0, 16.0, 60.0),
                w(260.0, 100.0, 16.0, 60.0),
                w(380.0, 30.0, 16.0, 60.0),
            ],
        },
        // Vertical lanes with alternating horizontal blockers
        LevelTemplate {
            hazards: vec![
                h(120.0, 50.0, 0.0, 1.0),
                h(120.0, 150.0, 0.0, 1.0),
                h(120.0, 250.0, 0.0, 1.0),
                h(300.0, 100.0, 0.0, 1.0),
                h(300.0, 200.0, 0.0, 1.0),
            ],
            walls: vec![w(60.0, 110.0, 120.0, 10.0), w(260.0, 170.0, 120.0, 10.0)],
        },
        // Diagonal flow with staircase walls
        LevelTemplate {
            hazards: vec![
                h(50.0, 50.0, 1.0, 1.0),
                h(150.0, 50.0, 1.0, 1.0),
                h(250.0, 50.0, 1.0, 1.0),
                h(400.0, 100.0, 1.0, 1.0),
                h(500.0, 100.0, 1.0, 1.0),
            ],
            walls: vec![
                w(120.0, 80.0, 12.0, 60.0),
                w(200.0, 140.0, 12.0, 60.0),
                w(280.0, 80.0, 12.0, 60.0),
            ],
        },
        // U-shaped wall guarding the goal side
        LevelTemplate {
            hazards: vec![
                h(50.0, 100.0, 1.0, 0.0),
                h(200.0, 100.0, 1.0, 0.0),
                h(400.0, 50.0, 0.0, 1.0),
                h(400.0, 150.0, 0.0, 1.0),
                h(600.0, 100.0, 0.0, 1.0),
            ],
            walls: vec![
                w(480.0, 20.0, 12.0, 180.0),
                w(360.0, 20.0, 12.0, 180.0),
                w(360.0, 20.0, 132.0, 12.0),
            ],
        },
        // Centre maze corridor
        LevelTemplate {
            hazards: vec![
                h(50.0, 60.0, 1.0, 0.0),
                h(150.0, 60.0, 1.0, 0.0),
                h(250.0, 60.0, 1.0, 0.0),
                h(350.0, 120.0, 1.0, 0.0),
                h(450.0, 120.0, 1.0, 0.0),
                h(550.0, 120.0, 1.0, 0.0),
            ],
            walls: vec![
                w(260.0, 20.0, 12.0, 160.0),
                w(340.0, 60.0, 12.0, 160.0),
                w(300.0, 100.0, 80.0, 12.0),
            ],
        },
        // Tight vertical lanes with narrow passages
        LevelTemplate {
            hazards: vec![
                h(100.0, 50.0, 0.0, 1.0),
                h(100.0, 120.0, 0.0, 1.0),
                h(100.0, 190.0, 0.0, 1.0),
                h(200.0, 50.0, 0.0, 1.0),
                h(200.0, 120.0, 0.0, 1.0),
            ],
            walls: vec![w(140.0, 0.0, 12.0, 220.0), w(260.0, 80.0, 12.0, 220.0)],
        },
        // Mixed flow around a boxed centre
        LevelTemplate {
            hazards: vec![
                h(50.0, 50.0, 1.0, 1.0),
                h(150.0, 50.0, 1.0, 1.0),
                h(250.0, 50.0, 1.0, 1.0),
                h(400.0, 150.0, 1.0, 0.0),
                h(500.0, 150.0, 1.0, 0.0),
            ],
            walls: vec![
                w(300.0, 40.0, 12.0, 140.0),
                w(380.0, 40.0, 12.0, 140.0),
                w(300.0, 40.0, 92.0, 12.0),
                w(300.0, 172.0, 92.0, 12.0),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_valid() {
        let levels = builtin_levels();
        assert_eq!(levels.len(), 10);
        for (i, level) in levels.iter().enumerate() {
            assert!(level.validate(i).is_ok());
            assert!(!level.hazards.is_empty());
        }
    }

    #[test]
    fn test_parse_pack_with_legacy_enemy_key() {
        let json = r#"[
            { "enemies": [{ "x": 10, "y": 20, "vx": 1, "vy": 0 }] },
            { "hazards": [], "walls": [{ "x": 0, "y": 0, "width": 5, "height": 5 }] }
        ]"#;
        let levels = parse_level_pack(json).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].hazards[0], h(10.0, 20.0, 1.0, 0.0));
        assert!(levels[0].walls.is_empty());
        assert_eq!(levels[1].walls.len(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_level_pack("[]"), Err(LevelError::Empty));
        assert!(matches!(
            parse_level_pack("{ not json"),
            Err(LevelError::Parse(_))
        ));

        let json = r#"[{ "hazards": [], "walls": [{ "x": 0, "y": 0, "width": 0, "height": 5 }] }]"#;
        assert_eq!(
            parse_level_pack(json),
            Err(LevelError::DegenerateWall { level: 0, wall: 0 })
        );
    }

    #[test]
    fn test_error_display() {
        let err = LevelError::DegenerateWall { level: 2, wall: 0 };
        assert_eq!(err.to_string(), "Level 3 wall 1 has non-positive size");
    }
}
