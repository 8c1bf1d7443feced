//! Frame snapshots with BLAKE3 hashing.
//!
//! A [`FrameSnapshot`] is the renderer-visible state of every body at a tick,
//! plus a BLAKE3 content hash. Two simulations that agree on every hash saw
//! the same positions, velocities, and actor flags.
//!
//! ```
//! use boxwalk_engine::prelude::*;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! sim.world_mut().insert(Body::player(0, 0));
//! sim.run_ticks(3);
//!
//! let snapshot = sim.snapshot();
//! assert_eq!(snapshot.tick, 3);
//! assert_eq!(snapshot.hash.len(), 64); // BLAKE3 hex digest
//! assert!(snapshot.verify());
//! ```
//!
//! Trajectories are closures and are not captured, so a snapshot cannot
//! rebuild a world. Replays start from a freshly built level instead.

use boxwalk_physics::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FrameSnapshot
// ---------------------------------------------------------------------------

/// Serializable state of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Ticks run before this frame was captured.
    pub tick: u64,
    /// Every body in id order.
    pub bodies: Vec<BodyView>,
    /// BLAKE3 hex digest (64 lowercase hex chars) of `tick` and `bodies`.
    pub hash: String,
}

impl FrameSnapshot {
    pub fn capture(tick: u64, world: &World) -> Self {
        let bodies = world.views();
        let hash = compute_hash(tick, &bodies);
        Self { tick, bodies, hash }
    }

    /// Recompute the hash and compare it to the stored one.
    pub fn verify(&self) -> bool {
        compute_hash(self.tick, &self.bodies) == self.hash
    }
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

fn compute_hash(tick: u64, bodies: &[BodyView]) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        tick: u64,
        bodies: &'a [BodyView],
    }

    let json_bytes = serde_json::to_vec(&HashableState { tick, bodies })
        .expect("frame state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut world = World::default();
        world.insert(Body::block(Rect::new(0, 100, 128, 32)));
        world.insert(Body::player(10, 40));
        world
    }

    #[test]
    fn same_state_same_hash() {
        let a = FrameSnapshot::capture(0, &world());
        let b = FrameSnapshot::capture(0, &world());
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn tick_is_part_of_the_hash() {
        let w = world();
        assert_ne!(
            FrameSnapshot::capture(0, &w).hash,
            FrameSnapshot::capture(1, &w).hash
        );
    }

    #[test]
    fn motion_changes_the_hash() {
        let mut w = world();
        let before = FrameSnapshot::capture(0, &w);
        w.step(1);
        let after = FrameSnapshot::capture(0, &w);
        assert_ne!(before.hash, after.hash);
    }

    #[test]
    fn tampered_snapshot_fails_verification() {
        let mut snapshot = FrameSnapshot::capture(5, &world());
        assert!(snapshot.verify());
        snapshot.bodies[1].rect.x += 1;
        assert!(!snapshot.verify());
    }

    #[test]
    fn snapshot_survives_json() {
        let snapshot = FrameSnapshot::capture(2, &world());
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: FrameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert!(back.verify());
    }
}
