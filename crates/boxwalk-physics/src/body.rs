//! The physical primitive: an axis-aligned rectangle with motion state,
//! solidity flags, ride-graph links, and a closed set of kinds.
//!
//! Kind-specific behavior (walking, stomping, killing, finishing) is not
//! spread across trait objects. [`BodyKind`] is a plain enum and every
//! interaction between two kinds is looked up in one table in
//! [`contact`](crate::contact).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::BodyId;
use crate::geom::{Rect, Vec2};
use crate::path::Trajectory;

/// Gravity given to bodies built without a world config at hand.
pub const DEFAULT_GRAVITY: f64 = 0.3;

/// Size of actors, enemies, and ghosts.
pub const ACTOR_SIZE: (i32, i32) = (24, 32);

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB display color. The simulation never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const GREY: Color = Color(128, 128, 128);
    pub const RED: Color = Color(255, 0, 0);
    pub const GREEN: Color = Color(0, 255, 0);
    pub const ACTOR: Color = Color(255, 128, 128);
    pub const MAGENTA: Color = Color(255, 0, 255);
    pub const TEAL: Color = Color(0, 125, 125);
    pub const GHOST: Color = Color(200, 128, 128);
}

// ---------------------------------------------------------------------------
// Actor state
// ---------------------------------------------------------------------------

/// Contact state derived by the resolver. Cleared before each integration
/// and reapplied only by the resolver, so during decision logic it always
/// describes the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFlags {
    pub grounded: bool,
    pub left_walled: bool,
    pub right_walled: bool,
    pub left_toe_grounded: bool,
    pub right_toe_grounded: bool,
}

impl ContactFlags {
    pub fn is_walled(&self) -> bool {
        self.left_walled || self.right_walled
    }
}

/// Per-actor movement feel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTuning {
    /// Vertical velocity of a jump (negative is up).
    pub jump_speed: f64,
    /// "Dash" speed a grounded actor starts walking at.
    pub move_speed: f64,
    /// Per-tick horizontal speed change from air control.
    pub air_move_speed: f64,
}

impl Default for ActorTuning {
    fn default() -> Self {
        Self {
            jump_speed: -7.0,
            move_speed: 2.0,
            air_move_speed: 0.5,
        }
    }
}

/// Why an actor stopped being alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Fell below the world depth.
    Fell,
    /// Touched a bad block.
    BadBlock,
    /// Touched an enemy from a side it cannot be stomped from.
    Enemy,
    /// Landed on by the player.
    Stomped,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeathCause::Fell => "falling too far",
            DeathCause::BadBlock => "touching a bad block",
            DeathCause::Enemy => "an enemy",
            DeathCause::Stomped => "being stomped",
        })
    }
}

/// State shared by actors and enemies.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorState {
    pub is_player: bool,
    pub contacts: ContactFlags,
    /// Remaining jumps; refilled to 1 on landing.
    pub jump_count: u32,
    pub wall_stick_timer: u32,
    /// Set by the resolver when converging blocks trap the actor. Only
    /// [`Body::reset_actor`] clears it.
    pub is_crushed: bool,
    pub finished_level: bool,
    pub death: Option<DeathCause>,
    pub tuning: ActorTuning,
}

impl ActorState {
    pub fn new(tuning: ActorTuning) -> Self {
        Self {
            is_player: false,
            contacts: ContactFlags::default(),
            jump_count: 0,
            wall_stick_timer: 0,
            is_crushed: false,
            finished_level: false,
            death: None,
            tuning,
        }
    }
}

/// Walking-enemy traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyState {
    /// `-1` walks left, `+1` walks right.
    pub direction: i32,
    /// When false the enemy turns around at platform edges.
    pub walks_off_platforms: bool,
    /// Whether landing on it from above kills it.
    pub is_stompable: bool,
}

/// A block driven by a trajectory.
#[derive(Debug)]
pub struct MovingBlockState {
    pub trajectory: Box<dyn Trajectory>,
    /// Ticks advanced so far.
    pub elapsed: u32,
}

/// Recorded positions a ghost steps through, one per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostPlayback {
    pub points: Vec<(i32, i32)>,
    pub index: usize,
}

// ---------------------------------------------------------------------------
// BodyKind
// ---------------------------------------------------------------------------

/// What a body is, with the state that only that kind carries.
#[derive(Debug)]
pub enum BodyKind {
    Block,
    MovingBlock(MovingBlockState),
    BadBlock,
    FinishBlock,
    Actor(ActorState),
    Enemy(ActorState, EnemyState),
    Ghost(GhostPlayback),
}

/// Fieldless mirror of [`BodyKind`] for views and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindTag {
    Block,
    MovingBlock,
    BadBlock,
    FinishBlock,
    Actor,
    Enemy,
    Ghost,
}

impl BodyKind {
    pub fn tag(&self) -> KindTag {
        match self {
            BodyKind::Block => KindTag::Block,
            BodyKind::MovingBlock(_) => KindTag::MovingBlock,
            BodyKind::BadBlock => KindTag::BadBlock,
            BodyKind::FinishBlock => KindTag::FinishBlock,
            BodyKind::Actor(_) => KindTag::Actor,
            BodyKind::Enemy(..) => KindTag::Enemy,
            BodyKind::Ghost(_) => KindTag::Ghost,
        }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// A simulated rectangle.
///
/// Solid, non-pushable bodies are *immovable*; solid, pushable bodies are
/// *movable*. Non-solid bodies take no part in collision resolution.
#[derive(Debug)]
pub struct Body {
    pub rect: Rect,
    pub vel: Vec2,
    pub accel: Vec2,
    pub max_vx: f64,
    pub max_vy: f64,
    pub is_solid: bool,
    pub is_pushable: bool,
    pub has_physics: bool,
    pub is_alive: bool,
    pub color: Color,
    pub kind: BodyKind,
    pub(crate) ride_parent: Option<BodyId>,
    pub(crate) ride_children: BTreeSet<BodyId>,
}

impl Body {
    /// A static block: solid, immovable, no physics.
    fn static_block(rect: Rect, color: Color, kind: BodyKind) -> Self {
        Self {
            rect,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            max_vx: 5.0,
            max_vy: 10.0,
            is_solid: true,
            is_pushable: false,
            has_physics: false,
            is_alive: true,
            color,
            kind,
            ride_parent: None,
            ride_children: BTreeSet::new(),
        }
    }

    pub fn block(rect: Rect) -> Self {
        Self::static_block(rect, Color::GREY, BodyKind::Block)
    }

    /// A block that kills any actor touching it.
    pub fn bad_block(rect: Rect) -> Self {
        Self::static_block(rect, Color::RED, BodyKind::BadBlock)
    }

    /// A 16x16 goal block at `(x, y)`.
    pub fn finish_block(x: i32, y: i32) -> Self {
        Self::static_block(Rect::new(x, y, 16, 16), Color::GREEN, BodyKind::FinishBlock)
    }

    /// A `w` x `h` block placed at its trajectory's starting point.
    pub fn moving_block(w: i32, h: i32, trajectory: Box<dyn Trajectory>) -> Self {
        let (x, y) = trajectory.position(0.0);
        Self::static_block(
            Rect::new(x, y, w, h),
            Color::GREY,
            BodyKind::MovingBlock(MovingBlockState {
                trajectory,
                elapsed: 0,
            }),
        )
    }

    fn actor_shaped(x: i32, y: i32, color: Color, kind: BodyKind) -> Self {
        Self {
            rect: Rect::new(x, y, ACTOR_SIZE.0, ACTOR_SIZE.1),
            vel: Vec2::ZERO,
            accel: Vec2::new(0.0, DEFAULT_GRAVITY),
            max_vx: 4.0,
            max_vy: 10.0,
            is_solid: true,
            is_pushable: true,
            has_physics: true,
            is_alive: true,
            color,
            kind,
            ride_parent: None,
            ride_children: BTreeSet::new(),
        }
    }

    /// A non-player actor at `(x, y)`.
    pub fn actor(x: i32, y: i32) -> Self {
        Self::actor_shaped(
            x,
            y,
            Color::ACTOR,
            BodyKind::Actor(ActorState::new(ActorTuning::default())),
        )
    }

    /// The player-controlled actor at `(x, y)`.
    pub fn player(x: i32, y: i32) -> Self {
        let mut body = Self::actor(x, y);
        if let Some(actor) = body.actor_state_mut() {
            actor.is_player = true;
        }
        body
    }

    /// A walking enemy. See [`crate::enemy`] for the preset variants.
    pub fn enemy(x: i32, y: i32, enemy: EnemyState, color: Color) -> Self {
        let tuning = ActorTuning {
            move_speed: 0.5,
            ..ActorTuning::default()
        };
        let mut body = Self::actor_shaped(
            x,
            y,
            color,
            BodyKind::Enemy(ActorState::new(tuning), enemy),
        );
        body.max_vx = 1.0;
        body
    }

    /// A non-solid replay of recorded positions, placed at the first one.
    /// Dies once it runs out of points.
    pub fn ghost(points: Vec<(i32, i32)>, color: Color) -> Self {
        let (x, y) = points.first().copied().unwrap_or_default();
        let mut body = Self::actor_shaped(
            x,
            y,
            color,
            BodyKind::Ghost(GhostPlayback { points, index: 0 }),
        );
        body.is_solid = false;
        body.is_pushable = false;
        body.has_physics = false;
        body.accel = Vec2::ZERO;
        body
    }

    /// Replace the body's color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    // -- Velocity -----------------------------------------------------------

    #[inline]
    pub fn vx(&self) -> f64 {
        self.vel.x
    }

    #[inline]
    pub fn vy(&self) -> f64 {
        self.vel.y
    }

    /// Set horizontal velocity, clamped to `±max_vx`.
    pub fn set_vx(&mut self, vx: f64) {
        self.vel.x = vx.clamp(-self.max_vx, self.max_vx);
    }

    /// Set vertical velocity, clamped to `±max_vy`.
    pub fn set_vy(&mut self, vy: f64) {
        self.vel.y = vy.clamp(-self.max_vy, self.max_vy);
    }

    // -- Classification -----------------------------------------------------

    pub fn is_immovable(&self) -> bool {
        self.is_solid && !self.is_pushable
    }

    pub fn is_movable(&self) -> bool {
        self.is_solid && self.is_pushable
    }

    pub fn kind_tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// True for actors and enemies.
    pub fn is_actor(&self) -> bool {
        self.actor_state().is_some()
    }

    pub fn is_player(&self) -> bool {
        self.actor_state().is_some_and(|a| a.is_player)
    }

    pub fn actor_state(&self) -> Option<&ActorState> {
        match &self.kind {
            BodyKind::Actor(a) | BodyKind::Enemy(a, _) => Some(a),
            _ => None,
        }
    }

    pub fn actor_state_mut(&mut self) -> Option<&mut ActorState> {
        match &mut self.kind {
            BodyKind::Actor(a) | BodyKind::Enemy(a, _) => Some(a),
            _ => None,
        }
    }

    pub fn enemy_state(&self) -> Option<&EnemyState> {
        match &self.kind {
            BodyKind::Enemy(_, e) => Some(e),
            _ => None,
        }
    }

    pub fn enemy_state_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.kind {
            BodyKind::Enemy(_, e) => Some(e),
            _ => None,
        }
    }

    // -- Ride graph (read-only) ---------------------------------------------

    /// The body this one is riding, if any.
    pub fn ride_parent(&self) -> Option<BodyId> {
        self.ride_parent
    }

    /// Bodies riding this one, in handle order.
    pub fn ride_children(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.ride_children.iter().copied()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.is_player() {
            "Player".to_string()
        } else {
            format!("{:?}", self.kind_tag())
        };
        write!(f, "{name}({}, {})", self.rect.x, self.rect.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
