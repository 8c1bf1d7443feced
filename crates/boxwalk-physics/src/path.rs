//! Position-over-time functions that drive moving blocks.
//!
//! A moving block never integrates velocity. Each tick it samples its
//! [`Trajectory`] at the elapsed tick count and jumps to that position,
//! carrying its riders along.

use std::f64::consts::PI;
use std::fmt;

use crate::PathError;

/// A pixel position as a function of elapsed ticks.
pub trait Trajectory: fmt::Debug {
    /// Position of the block's top-left corner after `elapsed` ticks.
    fn position(&self, elapsed: f64) -> (i32, i32);
}

/// Round half up to the nearest pixel.
#[inline]
fn to_pixel(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

// ---------------------------------------------------------------------------
// PointPath
// ---------------------------------------------------------------------------

/// Cyclic motion through a list of waypoints with cosine easing.
///
/// Each leg `i -> i+1` lasts `PI / (speed * 0.01)` ticks and follows
/// `p_i + (p_{i+1} - p_i) / 2 * (1 - cos(speed * 0.01 * t))`, so the block
/// starts and stops each leg at rest. After the last point the path returns
/// to the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPath {
    xs: Vec<i32>,
    ys: Vec<i32>,
    speed: f64,
}

impl PointPath {
    /// Speed used by levels that do not set one.
    pub const DEFAULT_SPEED: f64 = 3.0;

    /// Build a path through `(xs[i], ys[i])`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if either array has fewer than two points, the
    /// arrays differ in length, or `speed` is not a positive finite number.
    pub fn new(xs: Vec<i32>, ys: Vec<i32>, speed: f64) -> Result<Self, PathError> {
        if xs.len() < 2 || ys.len() < 2 || xs.len() != ys.len() {
            return Err(PathError::InvalidPointArrays {
                x_len: xs.len(),
                y_len: ys.len(),
            });
        }
        if !(speed.is_finite() && speed > 0.0) {
            return Err(PathError::InvalidSpeed { speed });
        }
        Ok(Self { xs, ys, speed })
    }

    /// Ticks spent on each leg.
    pub fn leg_duration(&self) -> f64 {
        PI / (self.speed * 0.01)
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false; a path has at least two points.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    fn ease(&self, from: i32, to: i32, t: f64) -> f64 {
        let d = f64::from(to - from);
        f64::from(from) + d / 2.0 * (1.0 - (self.speed * 0.01 * t).cos())
    }
}

impl Trajectory for PointPath {
    fn position(&self, elapsed: f64) -> (i32, i32) {
        let leg_len = self.leg_duration();
        let elapsed = elapsed.max(0.0);
        let legs_done = (elapsed / leg_len).floor();
        let t = elapsed - legs_done * leg_len;
        let from = (legs_done as usize) % self.xs.len();
        let to = (from + 1) % self.xs.len();
        (
            to_pixel(self.ease(self.xs[from], self.xs[to], t)),
            to_pixel(self.ease(self.ys[from], self.ys[to], t)),
        )
    }
}

// ---------------------------------------------------------------------------
// FnPath
// ---------------------------------------------------------------------------

type AxisFn = Box<dyn Fn(f64) -> f64>;

/// A trajectory defined by two arbitrary functions of time, such as those
/// produced by a level's path expressions. Output is rounded to the nearest
/// pixel.
pub struct FnPath {
    x: AxisFn,
    y: AxisFn,
}

impl FnPath {
    pub fn new(x: impl Fn(f64) -> f64 + 'static, y: impl Fn(f64) -> f64 + 'static) -> Self {
        Self {
            x: Box::new(x),
            y: Box::new(y),
        }
    }

    /// Straight-line motion from `origin` at `velocity` pixels per tick.
    pub fn linear(origin: (i32, i32), velocity: (f64, f64)) -> Self {
        let (x0, y0) = (f64::from(origin.0), f64::from(origin.1));
        let (vx, vy) = velocity;
        Self::new(move |t| x0 + vx * t, move |t| y0 + vy * t)
    }
}

impl fmt::Debug for FnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPath").finish_non_exhaustive()
    }
}

impl Trajectory for FnPath {
    fn position(&self, elapsed: f64) -> (i32, i32) {
        (to_pixel((self.x)(elapsed)), to_pixel((self.y)(elapsed)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
