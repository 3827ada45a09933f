//! Collision detection for circles and axis-aligned rectangles
//!
//! The player is a circle; hazards, walls, the goal and the spawn zone are all
//! axis-aligned rectangles with a top-left origin (y grows downward).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centred on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the rectangle by `pad` on every side
    pub fn inflate(&self, pad: f32) -> Self {
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    /// Point on (or inside) the rectangle nearest to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left(), self.right()),
            p.y.clamp(self.top(), self.bottom()),
        )
    }

    /// Euclidean distance from `p` to the rectangle (0 when inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }

    /// Touching edges count as overlap
    pub fn overlaps_inclusive(&self, other: &Rect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    /// Strict overlap: rectangles sharing only an edge do not overlap
    pub fn overlaps_strict(&self, other: &Rect) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }
}

/// Circle vs rectangle overlap (touching counts)
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    (center - rect.closest_point(center)).length_squared() <= radius * radius
}

/// Whether a circle at `center` would touch any of the rectangles
pub fn circle_hits_any<'a, I>(center: Vec2, radius: f32, rects: I) -> bool
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects
        .into_iter()
        .any(|r| circle_rect_overlap(center, radius, r))
}

/// Side of the obstacle a pushed rectangle ends up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Result of resolving an overlap along the axis of least penetration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushOut {
    pub side: PushSide,
    /// New top-left position of the moving rectangle
    pub position: Vec2,
}

/// Push `moving` out of `obstacle` along the axis of minimum penetration.
///
/// Returns `None` when the rectangles do not strictly overlap. Ties are broken
/// in the order left, right, top, bottom.
pub fn push_out(moving: &Rect, obstacle: &Rect) -> Option<PushOut> {
    if !moving.overlaps_strict(obstacle) {
        return None;
    }

    let overlap_left = moving.right() - obstacle.left();
    let overlap_right = obstacle.right() - moving.left();
    let overlap_top = moving.bottom() - obstacle.top();
    let overlap_bottom = obstacle.bottom() - moving.top();

    let min = overlap_left
        .min(overlap_right)
        .min(overlap_top)
        .min(overlap_bottom);

    let (side, position) = if min == overlap_left {
        (
            PushSide::Left,
            Vec2::new(obstacle.left() - moving.width, moving.y),
        )
    } else if min == overlap_right {
        (PushSide::Right, Vec2::new(obstacle.right(), moving.y))
    } else if min == overlap_top {
        (
            PushSide::Top,
            Vec2::new(moving.x, obstacle.top() - moving.height),
        )
    } else {
        (PushSide::Bottom, Vec2::new(moving.x, obstacle.bottom()))
    };

    Some(PushOut { side, position })
}
