//! Read-only per-body views for renderers and snapshots.

use serde::{Deserialize, Serialize};

use crate::arena::BodyId;
use crate::body::{Body, Color, ContactFlags, KindTag};
use crate::geom::{Rect, Vec2};

/// Actor indicators shown next to the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorView {
    pub is_player: bool,
    pub contacts: ContactFlags,
    /// Whether at least one jump is left.
    pub has_jump: bool,
    pub is_crushed: bool,
    pub finished_level: bool,
}

/// Everything a renderer may read about one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub id: BodyId,
    pub kind: KindTag,
    pub rect: Rect,
    pub vel: Vec2,
    pub color: Color,
    pub is_alive: bool,
    pub actor: Option<ActorView>,
}

impl BodyView {
    pub fn of(id: BodyId, body: &Body) -> Self {
        Self {
            id,
            kind: body.kind_tag(),
            rect: body.rect,
            vel: body.vel,
            color: body.color,
            is_alive: body.is_alive,
            actor: body.actor_state().map(|a| ActorView {
                is_player: a.is_player,
                contacts: a.contacts,
                has_jump: a.jump_count > 0,
                is_crushed: a.is_crushed,
                finished_level: a.finished_level,
            }),
        }
    }
}
