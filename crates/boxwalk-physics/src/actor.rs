//! Actor controls: jumping, walking, friction, and lifecycle.
//!
//! Controls read the contact flags the resolver derived on the previous tick
//! and only touch velocity, acceleration, and counters. Calling them on a
//! body that is not an actor does nothing and returns `false`.

use tracing::info;

use crate::body::{Body, ContactFlags, DeathCause};
use crate::config::PhysicsConfig;
use crate::geom::Vec2;

impl Body {
    /// Jump, preferring a wall jump when airborne against a wall.
    ///
    /// A wall jump launches at `jump_speed` vertically and
    /// `wall_jump_factor * jump_speed` horizontally away from the wall, both
    /// through the clamping setters, and leaves `jump_count` untouched.
    /// Otherwise a jump spends one of `jump_count`. Returns whether the
    /// actor jumped.
    pub fn jump(&mut self, config: &PhysicsConfig) -> bool {
        let Some(actor) = self.actor_state() else {
            return false;
        };
        let jump_speed = actor.tuning.jump_speed;
        let contacts = actor.contacts;

        if !contacts.grounded {
            let away = if contacts.left_walled {
                Some(-1.0)
            } else if contacts.right_walled {
                Some(1.0)
            } else {
                None
            };
            if let Some(sign) = away {
                self.set_vy(jump_speed);
                self.set_vx(sign * config.wall_jump_factor * jump_speed);
                return true;
            }
        }

        match self.actor_state_mut() {
            Some(actor) if actor.jump_count > 0 => {
                actor.jump_count -= 1;
                self.set_vy(jump_speed);
                true
            }
            _ => false,
        }
    }

    /// Walk toward `dir` (its sign is used; zero does nothing).
    ///
    /// On the ground a slow actor starts at `move_speed` immediately and
    /// accelerates from there. In the air speed changes by `air_move_speed`
    /// per tick, except that pressing away from a wall the actor clings to
    /// only takes effect every `wall_release_ticks` ticks.
    pub fn move_actor(&mut self, dir: i32, config: &PhysicsConfig) -> bool {
        let dir = dir.signum();
        if dir == 0 {
            return false;
        }
        let Some(actor) = self.actor_state_mut() else {
            return false;
        };
        let tuning = actor.tuning;
        let contacts = actor.contacts;
        let d = f64::from(dir);

        if contacts.grounded {
            if self.vel.x.abs() < tuning.move_speed {
                self.vel.x = tuning.move_speed * d;
            }
            self.accel.x = config.ground_move_accel * d;
            return true;
        }

        let clinging = (contacts.left_walled && dir > 0) || (contacts.right_walled && dir < 0);
        if clinging {
            if actor.wall_stick_timer >= config.wall_release_ticks {
                actor.wall_stick_timer = 0;
            } else {
                actor.wall_stick_timer += 1;
                return true;
            }
        }
        let vx = self.vel.x + d * tuning.air_move_speed;
        self.set_vx(vx);
        true
    }

    /// Decay horizontal speed toward zero: `ground_friction` per tick on the
    /// ground, `air_friction` in the air, snapping to zero within one step.
    pub fn apply_friction(&mut self, config: &PhysicsConfig) -> bool {
        let Some(actor) = self.actor_state() else {
            return false;
        };
        let friction = if actor.contacts.grounded {
            config.ground_friction
        } else {
            config.air_friction
        };
        let vx = self.vel.x;
        let vx = if vx.abs() < friction {
            0.0
        } else {
            vx - friction.copysign(vx)
        };
        self.set_vx(vx);
        true
    }

    /// Bookkeeping before integration: a wall-free actor drops its stick
    /// timer, an airborne actor loses horizontal acceleration, and all
    /// contact flags are cleared for the resolver to reapply.
    pub(crate) fn pre_tick(&mut self) {
        let Some(actor) = self.actor_state_mut() else {
            return;
        };
        let contacts = actor.contacts;
        if !contacts.is_walled() {
            actor.wall_stick_timer = 0;
        }
        actor.contacts = ContactFlags::default();
        if !contacts.grounded {
            self.accel.x = 0.0;
        }
    }

    /// Kill actors that fell below the world.
    pub(crate) fn check_fall(&mut self, config: &PhysicsConfig) -> bool {
        self.is_actor() && self.rect.y >= config.world_depth && self.kill(DeathCause::Fell)
    }

    /// Mark the body dead. Returns `false` if it already was.
    pub fn kill(&mut self, cause: DeathCause) -> bool {
        if !self.is_alive {
            return false;
        }
        self.is_alive = false;
        if let Some(actor) = self.actor_state_mut() {
            actor.death = Some(cause);
        }
        info!(body = %self, %cause, "killed");
        true
    }

    /// Revive an actor with zero velocity, the given gravity, and all flags
    /// and counters cleared. This is the only way to clear `is_crushed`.
    pub fn reset_actor(&mut self, gravity: f64) {
        let Some(actor) = self.actor_state_mut() else {
            return;
        };
        actor.contacts = ContactFlags::default();
        actor.jump_count = 0;
        actor.wall_stick_timer = 0;
        actor.is_crushed = false;
        actor.finished_level = false;
        actor.death = None;
        self.is_alive = true;
        self.vel = Vec2::ZERO;
        self.accel = Vec2::new(0.0, gravity);
    }
}
