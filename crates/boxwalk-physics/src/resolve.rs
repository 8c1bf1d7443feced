//! Collision resolution for one tick.
//!
//! [`resolve`] runs five passes in a fixed order over already-integrated
//! bodies. The order matters: contact flags must be derived after every
//! push-out has settled, and movable-vs-movable notification runs last so it
//! sees the final positions.
//!
//! 1. Classify solid bodies into immovables, movables, and actors.
//! 2. Push each movable out of the immovables it really intersects,
//!    vertically first, then horizontally. Landing on a body starts riding it.
//! 3. Mark actors crushed when an immovable touching them moves into them.
//! 4. Derive grounded / walled / toe flags from thin strips around actors.
//! 5. Notify overlapping movables of each other. Positions are not
//!    corrected here.
//!
//! Every pass walks bodies in ascending [`BodyId`] order.

use tracing::debug;

use crate::arena::{BodyId, BodySet};
use crate::config::PhysicsConfig;
use crate::contact::notify;
use crate::geom::{h_box, intersect_dir, really_intersects, v_box, Direction, Rect};
use crate::ride::{attach, detach};
use crate::world::PhysicsEvent;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Solid bodies partitioned for this tick. Never kept across ticks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Solid, not pushable.
    pub immovable: Vec<BodyId>,
    /// Solid, pushable.
    pub movable: Vec<BodyId>,
    /// The actors among `movable`.
    pub actors: Vec<BodyId>,
}

pub fn classify(bodies: &BodySet) -> Classified {
    let mut out = Classified::default();
    for (id, body) in bodies.iter() {
        if !body.is_solid {
            continue;
        }
        if body.is_pushable {
            out.movable.push(id);
            if body.is_actor() {
                out.actors.push(id);
            }
        } else {
            out.immovable.push(id);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Push-out
// ---------------------------------------------------------------------------

/// Separate `movable` from `immovable`, vertical axis first.
///
/// Vertically, the movable's rect shrunk horizontally by `push_thresh` is
/// intersected with the immovable. An overlap flush with the probe's bottom
/// is a landing: the movable moves up by the overlap height, loses downward
/// speed, and starts riding the immovable. An overlap flush with the probe's
/// top is a ceiling hit and moves it down. Horizontally, the moved rect
/// shrunk vertically is used the same way and both `vx` and `ax` are zeroed.
/// Each correction notifies both bodies with the side each one touched.
///
/// # Panics
///
/// Panics if `immovable` is pushable or `movable` is not.
pub fn solve_pushout(
    bodies: &mut BodySet,
    immovable: BodyId,
    movable: BodyId,
    config: &PhysicsConfig,
    events: &mut Vec<PhysicsEvent>,
) {
    let wall_rect = bodies[immovable].rect;
    assert!(
        !bodies[immovable].is_pushable && bodies[movable].is_pushable,
        "push-out needs an immovable and a movable body, got {immovable} and {movable}"
    );
    let thresh = config.push_thresh;

    // -- vertical --
    let probe = v_box(bodies[movable].rect, thresh);
    if let Some(overlap) = wall_rect.intersection(&probe) {
        if overlap.bottom() == probe.bottom() {
            let body = &mut bodies[movable];
            body.rect.translate(0, -overlap.h);
            if body.vy() > 0.0 {
                body.set_vy(0.0);
            }
            let previous = body.ride_parent;
            if previous != Some(immovable) {
                if let Some(parent) = previous {
                    detach(bodies, parent, movable);
                    events.push(PhysicsEvent::Detached {
                        parent,
                        child: movable,
                    });
                }
                attach(bodies, immovable, movable);
                events.push(PhysicsEvent::Attached {
                    parent: immovable,
                    child: movable,
                });
            }
            notify(bodies, movable, immovable, Direction::Bottom, events);
            notify(bodies, immovable, movable, Direction::Top, events);
        } else if overlap.top() == probe.top() {
            let body = &mut bodies[movable];
            body.rect.translate(0, overlap.h);
            if body.vy() < 0.0 {
                body.set_vy(0.0);
            }
            notify(bodies, movable, immovable, Direction::Top, events);
            notify(bodies, immovable, movable, Direction::Bottom, events);
        }
    }

    // -- horizontal --
    let probe = h_box(bodies[movable].rect, thresh);
    if let Some(overlap) = wall_rect.intersection(&probe) {
        let (shift, side) = if overlap.left() == probe.left() {
            (overlap.w, Direction::Left)
        } else if overlap.right() == probe.right() {
            (-overlap.w, Direction::Right)
        } else {
            return;
        };
        let body = &mut bodies[movable];
        body.rect.translate(shift, 0);
        body.set_vx(0.0);
        body.accel.x = 0.0;
        notify(bodies, movable, immovable, side, events);
        notify(bodies, immovable, movable, side.opposite(), events);
    }
}

// ---------------------------------------------------------------------------
// Crush detection
// ---------------------------------------------------------------------------

/// Whether `blocker`, touching the actor on the actor's `side`, moves into it.
fn moves_into(side: Direction, vx: f64, vy: f64) -> bool {
    match side {
        Direction::Top => vy > 0.0,
        Direction::Bottom => vy < 0.0,
        Direction::Left => vx > 0.0,
        Direction::Right => vx < 0.0,
    }
}

fn detect_crush(
    bodies: &mut BodySet,
    classes: &Classified,
    config: &PhysicsConfig,
    events: &mut Vec<PhysicsEvent>,
) {
    let thresh = config.push_thresh;
    for &actor_id in &classes.actors {
        let actor_rect = bodies[actor_id].rect;
        let crusher = classes.immovable.iter().copied().find(|&wall_id| {
            let wall = &bodies[wall_id];
            if !really_intersects(actor_rect, wall.rect, thresh) {
                return false;
            }
            intersect_dir(wall.rect, actor_rect, thresh)
                .is_some_and(|side| moves_into(side, wall.vx(), wall.vy()))
        });
        let Some(by) = crusher else {
            continue;
        };
        if let Some(actor) = bodies[actor_id].actor_state_mut() {
            if !actor.is_crushed {
                actor.is_crushed = true;
                debug!(body = %actor_id, %by, "crushed");
                events.push(PhysicsEvent::Crushed { body: actor_id, by });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Contact-state derivation
// ---------------------------------------------------------------------------

/// The thin strips just outside an actor used to feel for ground and walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeelerStrips {
    pub below: Rect,
    pub left: Rect,
    pub right: Rect,
}

impl FeelerStrips {
    pub fn around(rect: Rect, thresh: f64) -> Self {
        let shrink_w = (f64::from(rect.w) * thresh) as i32;
        let shrink_h = (f64::from(rect.h) * thresh) as i32;
        Self {
            below: Rect::new(rect.x, rect.bottom(), rect.w, 1).inflate(-shrink_w, 0),
            left: Rect::new(rect.x - 1, rect.y, 1, rect.h).inflate(0, -shrink_h),
            right: Rect::new(rect.right(), rect.y, 1, rect.h).inflate(0, -shrink_h),
        }
    }
}

fn derive_contacts(bodies: &mut BodySet, classes: &Classified, config: &PhysicsConfig) {
    let thresh = config.push_thresh;
    let margin = config.probe_margin * 2;
    for &actor_id in &classes.actors {
        let rect = bodies[actor_id].rect;
        let strips = FeelerStrips::around(rect, thresh);
        let reach = rect.inflate(margin, margin);

        let candidates: Vec<Rect> = classes
            .immovable
            .iter()
            .map(|&id| bodies[id].rect)
            .filter(|r| reach.intersects(r))
            .collect();

        let Some(actor) = bodies[actor_id].actor_state_mut() else {
            continue;
        };
        let flags = &mut actor.contacts;
        for r in &candidates {
            if let Some(touch) = r.intersection(&strips.below) {
                flags.grounded = true;
                if touch.left() == strips.below.left() {
                    flags.left_toe_grounded = true;
                }
                if touch.right() == strips.below.right() {
                    flags.right_toe_grounded = true;
                }
            }
            if r.intersects(&strips.left) {
                flags.left_walled = true;
            }
            if r.intersects(&strips.right) {
                flags.right_walled = true;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Movable-vs-movable notification
// ---------------------------------------------------------------------------

fn notify_movables(
    bodies: &mut BodySet,
    classes: &Classified,
    config: &PhysicsConfig,
    events: &mut Vec<PhysicsEvent>,
) {
    let thresh = config.notify_thresh;
    for &this in &classes.movable {
        for &other in &classes.movable {
            if this == other {
                continue;
            }
            let (this_rect, other_rect) = (bodies[this].rect, bodies[other].rect);
            if !really_intersects(this_rect, other_rect, thresh) {
                continue;
            }
            if let Some(side) = intersect_dir(other_rect, this_rect, thresh) {
                notify(bodies, this, other, side, events);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run every resolution pass over `bodies`.
pub fn resolve(bodies: &mut BodySet, config: &PhysicsConfig, events: &mut Vec<PhysicsEvent>) {
    let classes = classify(bodies);

    for &movable in &classes.movable {
        let rect = bodies[movable].rect;
        let touching: Vec<BodyId> = classes
            .immovable
            .iter()
            .copied()
            .filter(|&id| really_intersects(rect, bodies[id].rect, config.push_thresh))
            .collect();
        for immovable in touching {
            solve_pushout(bodies, immovable, movable, config, events);
        }
    }

    detect_crush(bodies, &classes, config, events);
    derive_contacts(bodies, &classes, config);
    notify_movables(bodies, &classes, config, events);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
