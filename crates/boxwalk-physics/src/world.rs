//! The physics world and its per-tick pipeline.
//!
//! [`World::step`] runs one tick:
//!
//! 1. Every body, in ascending id order, gets its own update. Enemies decide
//!    where to walk, actors do their pre-tick bookkeeping and integrate,
//!    moving blocks follow their trajectory, and ghosts step through their
//!    recording. Displacements carry ride children along.
//! 2. The resolver runs its passes ([`resolve`]).
//! 3. The ride graph drops riders that are no longer resting on their
//!    parent ([`fix_ride_graph`]).
//!
//! Input-driven actor controls ([`World::jump`], [`World::move_actor`],
//! [`World::apply_friction`]) are called *before* `step` and see the contact
//! flags from the previous tick. Removing dead bodies is left to the caller.
//!
//! # Example
//!
//! ```
//! use boxwalk_physics::prelude::*;
//!
//! let mut world = World::default();
//! world.insert(Body::block(Rect::new(0, 128, 128, 128)));
//! let player = world.insert(Body::player(32, 90));
//!
//! for _ in 0..20 {
//!     world.step(1);
//! }
//!
//! let actor = world.body(player).unwrap().actor_state().unwrap();
//! assert!(actor.contacts.grounded);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::arena::{BodyId, BodySet};
use crate::body::{Body, BodyKind, DeathCause};
use crate::config::PhysicsConfig;
use crate::enemy;
use crate::integrate::integrate;
use crate::resolve::resolve;
use crate::ride::{detach, fix_ride_graph};
use crate::view::BodyView;
use crate::ConfigError;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something noteworthy that happened during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsEvent {
    Killed { body: BodyId, cause: DeathCause },
    Crushed { body: BodyId, by: BodyId },
    FinishedLevel { body: BodyId },
    Attached { parent: BodyId, child: BodyId },
    Detached { parent: BodyId, child: BodyId },
}

/// Result of one [`World::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Events in the order they happened.
    pub events: Vec<PhysicsEvent>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// All bodies of a level plus the tunables they are simulated with.
#[derive(Debug, Default)]
pub struct World {
    bodies: BodySet,
    config: PhysicsConfig,
}

impl World {
    /// Create an empty world after validating `config`.
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            bodies: BodySet::new(),
            config,
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Add a body. Actors are given this world's gravity.
    pub fn insert(&mut self, mut body: Body) -> BodyId {
        if body.is_actor() {
            body.accel.y = self.config.gravity;
        }
        let id = self.bodies.insert(body);
        debug!(body = %id, kind = ?self.bodies[id].kind_tag(), "inserted");
        id
    }

    /// Remove a body, first unlinking it from its ride parent and children.
    /// Returns `None` for stale handles.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.get(id)?;
        let parent = body.ride_parent;
        let children: Vec<BodyId> = body.ride_children().collect();
        if let Some(parent) = parent {
            detach(&mut self.bodies, parent, id);
        }
        for child in children {
            detach(&mut self.bodies, id, child);
        }
        self.bodies.take(id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The first player actor, if any.
    pub fn player(&self) -> Option<BodyId> {
        self.bodies
            .iter()
            .find(|(_, body)| body.is_player())
            .map(|(id, _)| id)
    }

    /// Views of every body in id order.
    pub fn views(&self) -> Vec<BodyView> {
        self.bodies
            .iter()
            .map(|(id, body)| BodyView::of(id, body))
            .collect()
    }

    // -- Actor controls -----------------------------------------------------

    /// See [`Body::jump`]. False for unknown ids and non-actors.
    pub fn jump(&mut self, id: BodyId) -> bool {
        let config = &self.config;
        self.bodies.get_mut(id).is_some_and(|b| b.jump(config))
    }

    /// See [`Body::move_actor`].
    pub fn move_actor(&mut self, id: BodyId, dir: i32) -> bool {
        let config = &self.config;
        self.bodies
            .get_mut(id)
            .is_some_and(|b| b.move_actor(dir, config))
    }

    /// See [`Body::apply_friction`].
    pub fn apply_friction(&mut self, id: BodyId) -> bool {
        let config = &self.config;
        self.bodies
            .get_mut(id)
            .is_some_and(|b| b.apply_friction(config))
    }

    /// Revive an actor and place it at `(x, y)`. Any ride edge it had is
    /// dropped. Returns false for unknown ids and non-actors.
    pub fn reset_actor(&mut self, id: BodyId, x: i32, y: i32) -> bool {
        let Some(body) = self.bodies.get(id) else {
            return false;
        };
        if !body.is_actor() {
            return false;
        }
        if let Some(parent) = body.ride_parent {
            detach(&mut self.bodies, parent, id);
        }
        let gravity = self.config.gravity;
        let body = &mut self.bodies[id];
        body.reset_actor(gravity);
        body.rect.x = x;
        body.rect.y = y;
        true
    }

    // -- Stepping -----------------------------------------------------------

    /// Move a body and everything riding it by the same pixel delta.
    fn displace(&mut self, id: BodyId, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        let body = &mut self.bodies[id];
        body.rect.translate(dx, dy);
        let children: Vec<BodyId> = body.ride_children().collect();
        for child in children {
            self.bodies[child].rect.translate(dx, dy);
        }
    }

    fn update_body(&mut self, id: BodyId, dt: u32, events: &mut Vec<PhysicsEvent>) {
        let config = &self.config;
        let body = &mut self.bodies[id];
        let (dx, dy) = match &mut body.kind {
            BodyKind::Block | BodyKind::BadBlock | BodyKind::FinishBlock => (0, 0),
            BodyKind::MovingBlock(state) => {
                state.elapsed += dt;
                let (x, y) = state.trajectory.position(f64::from(state.elapsed));
                let (dx, dy) = (x - body.rect.x, y - body.rect.y);
                body.vel.x = f64::from(dx);
                body.vel.y = f64::from(dy);
                (dx, dy)
            }
            BodyKind::Ghost(playback) => {
                if !body.is_alive {
                    return;
                }
                playback.index += 1;
                match playback.points.get(playback.index) {
                    Some(&(x, y)) => (x - body.rect.x, y - body.rect.y),
                    None => {
                        body.is_alive = false;
                        return;
                    }
                }
            }
            BodyKind::Actor(_) => {
                body.pre_tick();
                integrate(body, dt, config)
            }
            BodyKind::Enemy(..) => {
                if !body.is_alive {
                    return;
                }
                enemy::think(body, config);
                body.pre_tick();
                integrate(body, dt, config)
            }
        };
        self.displace(id, dx, dy);

        let config = &self.config;
        if self.bodies[id].check_fall(config) {
            events.push(PhysicsEvent::Killed {
                body: id,
                cause: DeathCause::Fell,
            });
        }
    }

    /// Advance the world by `dt` ticks.
    pub fn step(&mut self, dt: u32) -> StepReport {
        let mut events = Vec::new();

        for id in self.bodies.ids() {
            self.update_body(id, dt, &mut events);
        }

        resolve(&mut self.bodies, &self.config, &mut events);

        for (parent, child) in self.fix_ride_graph() {
            events.push(PhysicsEvent::Detached { parent, child });
        }

        trace!(bodies = self.bodies.len(), events = events.len(), "step");
        StepReport { events }
    }

    /// Detach riders no longer resting on their parent. [`step`](Self::step)
    /// already does this once per tick.
    pub fn fix_ride_graph(&mut self) -> Vec<(BodyId, BodyId)> {
        fix_ride_graph(&mut self.bodies, self.config.ride_tolerance)
    }

    /// Remove dead bodies except players. Returns the removed ids.
    pub fn cull_dead(&mut self) -> Vec<BodyId> {
        let dead: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, body)| !body.is_alive && !body.is_player())
            .map(|(id, _)| id)
            .collect();
        for &id in &dead {
            self.remove(id);
        }
        dead
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
