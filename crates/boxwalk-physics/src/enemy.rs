//! Walking enemies.
//!
//! An enemy is an actor that decides its own movement each tick: it turns
//! around at platform edges (unless it walks off them) and then keeps
//! walking. Its combat rules live in the contact table in
//! [`contact`](crate::contact).

use crate::body::{Body, Color, EnemyState};
use crate::config::PhysicsConfig;

/// A walker that follows its direction off any ledge.
pub fn walker(x: i32, y: i32, direction: i32) -> Body {
    Body::enemy(
        x,
        y,
        EnemyState {
            direction: direction.signum(),
            walks_off_platforms: true,
            is_stompable: true,
        },
        Color::MAGENTA,
    )
}

/// A walker that turns around at platform edges.
pub fn smart_walker(x: i32, y: i32, direction: i32) -> Body {
    let mut body = walker(x, y, direction).with_color(Color::TEAL);
    if let Some(enemy) = body.enemy_state_mut() {
        enemy.walks_off_platforms = false;
    }
    body
}

/// An enemy that cannot be stomped.
pub fn hazard(x: i32, y: i32, direction: i32, smart: bool) -> Body {
    let body = if smart {
        smart_walker(x, y, direction)
    } else {
        walker(x, y, direction)
    };
    let mut body = body.with_color(Color::RED);
    if let Some(enemy) = body.enemy_state_mut() {
        enemy.is_stompable = false;
    }
    body
}

/// Decide this tick's movement from the previous tick's contacts.
///
/// A grounded enemy that does not walk off platforms reverses when the toe
/// on its walking side has lost support. It then walks in its direction.
/// Dead enemies do nothing.
pub(crate) fn think(body: &mut Body, config: &PhysicsConfig) {
    if !body.is_alive {
        return;
    }
    let Some(contacts) = body.actor_state().map(|a| a.contacts) else {
        return;
    };
    let Some(enemy) = body.enemy_state_mut() else {
        return;
    };
    if !enemy.walks_off_platforms && contacts.grounded {
        let at_edge = (enemy.direction < 0 && !contacts.left_toe_grounded)
            || (enemy.direction > 0 && !contacts.right_toe_grounded);
        if at_edge {
            enemy.direction = -enemy.direction;
        }
    }
    let direction = enemy.direction;
    body.move_actor(direction, config);
}
