//! What happens when two bodies touch.
//!
//! The resolver reports a contact as "`this` touched `other` on `this`'s
//! `direction` side". [`contact_response`] maps the two kinds and the side to
//! a [`ContactResponse`] without mutating anything; [`notify`] applies it.
//!
//! | this            | other               | side          | effect                         |
//! |-----------------|---------------------|---------------|--------------------------------|
//! | actor / enemy   | any solid           | `Bottom`      | refill one jump                |
//! | enemy           | player              | `Top`         | enemy dies, player bounces     |
//! | enemy           | player              | other         | player dies                    |
//! | enemy           | solid, not an actor | `Left/Right`  | enemy turns around             |
//! | bad block       | actor               | any           | actor dies                     |
//! | finish block    | actor               | any           | actor finishes the level       |
//!
//! Dead enemies ignore every contact. Non-stompable enemies kill the player
//! from every side.

use tracing::info;

use crate::arena::{BodyId, BodySet};
use crate::body::{Body, BodyKind, DeathCause};
use crate::geom::Direction;
use crate::world::PhysicsEvent;

/// Effect applied to one of the two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAction {
    None,
    /// `this` enemy reverses its walking direction.
    ReverseDirection,
    /// `this` enemy dies and `other` (the player) bounces.
    Stomped,
    /// `other` dies.
    KillOther(DeathCause),
    /// `other` has reached the goal.
    FinishOther,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactResponse {
    /// Set `this` actor's jump count to 1.
    pub refill_jump: bool,
    pub action: ContactAction,
}

impl ContactResponse {
    pub const NONE: ContactResponse = ContactResponse {
        refill_jump: false,
        action: ContactAction::None,
    };
}

/// Look up the response of `this` touching `other` on its `direction` side.
pub fn contact_response(this: &Body, other: &Body, direction: Direction) -> ContactResponse {
    let lands_on_solid = other.is_solid && direction == Direction::Bottom;
    match &this.kind {
        BodyKind::Actor(_) => ContactResponse {
            refill_jump: lands_on_solid,
            action: ContactAction::None,
        },
        BodyKind::Enemy(_, enemy) => {
            if !this.is_alive {
                return ContactResponse::NONE;
            }
            let action = if other.is_actor() {
                if !other.is_player() {
                    ContactAction::None
                } else if enemy.is_stompable && direction == Direction::Top {
                    ContactAction::Stomped
                } else {
                    ContactAction::KillOther(DeathCause::Enemy)
                }
            } else if other.is_solid && direction.is_horizontal() {
                ContactAction::ReverseDirection
            } else {
                ContactAction::None
            };
            ContactResponse {
                refill_jump: lands_on_solid,
                action,
            }
        }
        BodyKind::BadBlock if other.is_actor() => ContactResponse {
            refill_jump: false,
            action: ContactAction::KillOther(DeathCause::BadBlock),
        },
        BodyKind::FinishBlock if other.is_actor() => ContactResponse {
            refill_jump: false,
            action: ContactAction::FinishOther,
        },
        _ => ContactResponse::NONE,
    }
}

/// Deliver the contact "`this` touched `other` on its `direction` side" and
/// apply the resulting response.
pub(crate) fn notify(
    bodies: &mut BodySet,
    this_id: BodyId,
    other_id: BodyId,
    direction: Direction,
    events: &mut Vec<PhysicsEvent>,
) {
    let response = contact_response(&bodies[this_id], &bodies[other_id], direction);
    if response == ContactResponse::NONE {
        return;
    }
    let Some((this, other)) = bodies.pair_mut(this_id, other_id) else {
        return;
    };

    if response.refill_jump {
        if let Some(actor) = this.actor_state_mut() {
            actor.jump_count = 1;
        }
    }

    match response.action {
        ContactAction::None => {}
        ContactAction::ReverseDirection => {
            if let Some(enemy) = this.enemy_state_mut() {
                enemy.direction = -enemy.direction;
            }
        }
        ContactAction::Stomped => {
            if this.kill(DeathCause::Stomped) {
                events.push(PhysicsEvent::Killed {
                    body: this_id,
                    cause: DeathCause::Stomped,
                });
            }
            if let Some(jump_speed) = other.actor_state().map(|a| a.tuning.jump_speed) {
                other.set_vy(jump_speed / 2.0);
            }
            if let Some(actor) = other.actor_state_mut() {
                if actor.jump_count == 0 {
                    actor.jump_count = 1;
                }
            }
        }
        ContactAction::KillOther(cause) => {
            if other.kill(cause) {
                events.push(PhysicsEvent::Killed {
                    body: other_id,
                    cause,
                });
            }
        }
        ContactAction::FinishOther => {
            if let Some(actor) = other.actor_state_mut() {
                if !actor.finished_level {
                    actor.finished_level = true;
                    info!(body = %other_id, "finished level");
                    events.push(PhysicsEvent::FinishedLevel { body: other_id });
                }
            }
        }
    }
}
