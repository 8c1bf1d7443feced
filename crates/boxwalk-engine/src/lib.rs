//! Boxwalk engine -- deterministic simulation driver for boxwalk levels.
//!
//! This crate builds on [`boxwalk_physics`] to provide the game-facing layer:
//! a fixed-step [`Simulation`](tick::Simulation) that turns per-tick input into
//! actor controls, steps the physics world, and culls dead bodies; BLAKE3
//! state hashing for determinism checks; replay logs; and ghost recordings.
//!
//! # Quick Start
//!
//! ```
//! use boxwalk_engine::prelude::*;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! sim.world_mut().insert(Body::block(Rect::new(0, 128, 128, 128)));
//! sim.world_mut().insert(Body::player(32, 96));
//!
//! sim.set_input(InputFrame { right: true, ..Default::default() });
//! sim.run_ticks(30);
//!
//! assert_eq!(sim.tick_count(), 30);
//! assert_eq!(sim.outcome(), Outcome::Playing);
//! ```

#![deny(unsafe_code)]

pub mod ghost;
pub mod replay;
pub mod snapshot;
pub mod tick;

use tracing_subscriber::EnvFilter;

/// Re-export the physics crate for convenience.
pub use boxwalk_physics;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors loading or building a ghost track.
#[derive(Debug, thiserror::Error)]
pub enum GhostError {
    /// The track has no points to play back.
    #[error("ghost track is empty")]
    EmptyTrack,

    /// The x and y arrays differ in length.
    #[error("ghost track has {x_len} x points but {y_len} y points")]
    MismatchedTrack { x_len: usize, y_len: usize },

    /// The track document could not be parsed.
    #[error("malformed ghost track: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Install a global `fmt` subscriber. `RUST_LOG` wins over `default_filter`
/// when set.
///
/// # Errors
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn install_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use boxwalk_physics::prelude::*;

    pub use crate::ghost::{GhostRecorder, GhostTrack};
    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::snapshot::FrameSnapshot;
    pub use crate::tick::{InputFrame, Outcome, SimConfig, Simulation, TickReport};
    pub use crate::{install_tracing, GhostError};
}
