//! One-tick motion integration.
//!
//! [`integrate`] advances a body's velocity and returns the whole-pixel
//! displacement for the tick. Applying the displacement (to the body and to
//! everything riding it) is left to the world, which owns the other bodies.

use crate::body::Body;
use crate::config::PhysicsConfig;

/// Convert a fractional displacement to whole pixels.
///
/// A non-zero displacement smaller than `min_motion` in magnitude is raised
/// to exactly `±min_motion` so that slow bodies still move every tick. The
/// result is then truncated toward zero.
#[inline]
pub fn snap_displacement(d: f64, min_motion: f64) -> i32 {
    let d = if d != 0.0 && d.abs() < min_motion {
        min_motion.copysign(d)
    } else {
        d
    };
    d.trunc() as i32
}

/// Advance `body` by `dt` ticks and return its pixel displacement.
///
/// Velocity gains `accel * dt` and is clamped to `±max_vx` / `±max_vy`.
/// A horizontal speed inside the dead zone produces no horizontal
/// displacement, though the stored speed is kept so it can keep building.
/// Bodies without physics never move here.
pub fn integrate(body: &mut Body, dt: u32, config: &PhysicsConfig) -> (i32, i32) {
    if !body.has_physics {
        return (0, 0);
    }
    let dt = f64::from(dt);
    let vx = body.vel.x + body.accel.x * dt;
    let vy = body.vel.y + body.accel.y * dt;
    body.set_vx(vx);
    body.set_vy(vy);

    let mut disp_vx = body.vel.x;
    if disp_vx.abs() < config.dead_zone {
        disp_vx = 0.0;
    }
    (
        snap_displacement(disp_vx * dt, config.min_motion),
        snap_displacement(body.vel.y * dt, config.min_motion),
    )
}
