//! Boxwalk physics -- rectangle-body physics and collision resolution for a
//! 2D platformer.
//!
//! Bodies are axis-aligned integer rectangles stored in a generational arena.
//! Each [`World::step`](world::World::step) integrates motion, pushes movable
//! bodies out of immovable ones, detects crushing, derives actor contact
//! flags (grounded, walled, toe-grounded), reports movable-vs-movable
//! contacts, and maintains the ride graph of bodies carried by platforms.
//! The simulation is single-threaded and fully deterministic.
//!
//! # Quick Start
//!
//! ```
//! use boxwalk_physics::prelude::*;
//!
//! let mut world = World::default();
//! world.insert(Body::block(Rect::new(0, 128, 128, 32)));
//! let player = world.insert(Body::player(32, 96));
//!
//! world.step(1);
//! world.jump(player);
//! world.step(1);
//!
//! assert!(world.body(player).unwrap().vy() < 0.0);
//! ```

#![deny(unsafe_code)]

pub mod actor;
pub mod arena;
pub mod body;
pub mod config;
pub mod contact;
pub mod enemy;
pub mod geom;
pub mod integrate;
pub mod path;
pub mod resolve;
pub mod ride;
pub mod view;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors in physics tunables.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A tunable is outside the range the simulation can work with.
    #[error("config field '{field}' = {value} must be {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// The config document could not be parsed.
    #[error("malformed physics config: {0}")]
    Malformed(String),
}

/// Errors building a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Fewer than two points, or x/y arrays of different lengths.
    #[error("path given arrays of invalid lengths: x_points={x_len}, y_points={y_len}")]
    InvalidPointArrays { x_len: usize, y_len: usize },

    /// Speed must be positive and finite.
    #[error("path speed must be positive and finite, got {speed}")]
    InvalidSpeed { speed: f64 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::arena::{BodyId, BodySet};
    pub use crate::body::{
        ActorState, ActorTuning, Body, BodyKind, Color, ContactFlags, DeathCause, EnemyState,
        KindTag,
    };
    pub use crate::config::PhysicsConfig;
    pub use crate::contact::{contact_response, ContactAction, ContactResponse};
    pub use crate::enemy;
    pub use crate::geom::{intersect_dir, really_intersects, Direction, Rect, Vec2};
    pub use crate::path::{FnPath, PointPath, Trajectory};
    pub use crate::view::{ActorView, BodyView};
    pub use crate::world::{PhysicsEvent, StepReport, World};
    pub use crate::{ConfigError, PathError};
}
