//! Axis-aligned rectangle geometry on the integer pixel grid.
//!
//! Every collision decision in the resolver is made with the helpers in this
//! module. Rectangles live on whole pixels, so edge comparisons such as
//! "does the overlap end where the probe ends" are exact.
//!
//! The thresholded probes ([`h_box`], [`v_box`]) shrink a rectangle along one
//! axis by `trunc(extent * thresh)` while keeping its center. A contact that
//! only grazes a corner therefore misses one of the probes, which is what
//! lets [`intersect_dir`] pick a side.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector used for velocity and acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component (positive is right).
    pub x: f64,
    /// Vertical component (positive is down).
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector from its components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle. `(x, y)` is the top-left corner and `y` grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Horizontal center, rounded toward the left edge.
    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    /// Vertical center, rounded toward the top edge.
    #[inline]
    pub const fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Shift the rectangle in place.
    #[inline]
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Grow (or with negative arguments, shrink) the rectangle around its
    /// center. The origin moves by `-(dw / 2)`, truncating toward zero, so an
    /// odd shrink keeps the extra pixel on the right/bottom side.
    #[inline]
    pub fn inflate(self, dw: i32, dh: i32) -> Self {
        Self {
            x: self.x - dw / 2,
            y: self.y - dh / 2,
            w: self.w + dw,
            h: self.h + dh,
        }
    }

    /// Whether the interiors of the two rectangles overlap. Rectangles that
    /// only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// The overlapping region of the two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x, self.y, self.w, self.h)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The side of a body that touched another body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

impl Direction {
    /// The same contact seen from the other body.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Top => "TOP",
            Direction::Bottom => "BOTTOM",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Thresholded probes
// ---------------------------------------------------------------------------

/// Pixels to remove from an extent for the given threshold.
#[inline]
fn shrink_amount(extent: i32, thresh: f64) -> i32 {
    (f64::from(extent) * thresh) as i32
}

/// The rectangle shrunk vertically by `thresh` of its height. Used to probe
/// for horizontal (left/right) contact.
#[inline]
pub fn h_box(rect: Rect, thresh: f64) -> Rect {
    rect.inflate(0, -shrink_amount(rect.h, thresh))
}

/// The rectangle shrunk horizontally by `thresh` of its width. Used to probe
/// for vertical (top/bottom) contact.
#[inline]
pub fn v_box(rect: Rect, thresh: f64) -> Rect {
    rect.inflate(-shrink_amount(rect.w, thresh), 0)
}

/// True iff either thresholded probe of `probe` intersects `other`.
pub fn really_intersects(probe: Rect, other: Rect, thresh: f64) -> bool {
    h_box(probe, thresh).intersects(&other) || v_box(probe, thresh).intersects(&other)
}

/// The side of `reference` from which `other` collides with it, or `None`
/// when they do not really intersect at `thresh`.
///
/// Both probes of `reference` are intersected with `other`. When both hit,
/// the axis with the smaller penetration wins: the horizontal overlap width
/// is compared against the vertical overlap height, and the contact is
/// horizontal only when its width is strictly smaller.
pub fn intersect_dir(other: Rect, reference: Rect, thresh: f64) -> Option<Direction> {
    if !really_intersects(other, reference, thresh) {
        return None;
    }

    let hb = h_box(reference, thresh);
    let vb = v_box(reference, thresh);

    let mut h_hit = other.intersection(&hb);
    let mut v_hit = other.intersection(&vb);

    if let (Some(h), Some(v)) = (h_hit, v_hit) {
        if h.w < v.h {
            v_hit = None;
        } else {
            h_hit = None;
        }
    }

    match (h_hit, v_hit) {
        (Some(h), _) => {
            if h.center_x() - hb.center_x() > 0 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            }
        }
        (None, Some(v)) => {
            if v.center_y() - vb.center_y() > 0 {
                Some(Direction::Bottom)
            } else {
                Some(Direction::Top)
            }
        }
        // `other`'s probes hit `reference` but neither of `reference`'s
        // probes hit `other`; there is no side to report.
        (None, None) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
