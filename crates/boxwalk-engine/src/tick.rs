//! Fixed-step simulation driver.
//!
//! A [`Simulation`] owns a physics [`World`] and drives it forward one tick at
//! a time. Each tick:
//!
//! 1. The current [`InputFrame`] is applied to the player: `jump` jumps,
//!    exactly one of `left`/`right` walks, anything else applies friction.
//! 2. The world is stepped by `dt`.
//! 3. Dead non-player bodies are removed.
//! 4. The tick counter advances.
//!
//! Walking input stays in effect until replaced with [`Simulation::set_input`],
//! so a held key is a single `set_input` call. `jump` is a key press and is
//! consumed by the tick that applies it.
//!
//! # Example
//!
//! ```
//! use boxwalk_engine::tick::{InputFrame, Outcome, SimConfig, Simulation};
//! use boxwalk_physics::prelude::*;
//!
//! let mut sim = Simulation::new(SimConfig::default()).unwrap();
//! sim.world_mut().insert(Body::block(Rect::new(0, 100, 200, 32)));
//! sim.world_mut().insert(Body::finish_block(80, 84));
//! sim.world_mut().insert(Body::player(10, 68));
//!
//! sim.set_input(InputFrame { right: true, ..Default::default() });
//! while sim.outcome() == Outcome::Playing && sim.tick_count() < 100 {
//!     sim.tick();
//! }
//! assert_eq!(sim.outcome(), Outcome::Finished);
//! ```

use boxwalk_physics::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::snapshot::FrameSnapshot;

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Ticks of physics time per simulation tick. Must be at least 1.
    pub dt: u32,
    /// Tunables handed to the physics world.
    pub physics: PhysicsConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1,
            physics: PhysicsConfig::default(),
        }
    }
}

impl SimConfig {
    /// Check `dt` and the physics tunables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dt == 0 {
            return Err(ConfigError::OutOfRange {
                field: "dt",
                value: 0.0,
                expected: "at least 1",
            });
        }
        self.physics.validate()
    }
}

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// Player input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    pub jump: bool,
    pub left: bool,
    pub right: bool,
}

impl InputFrame {
    /// True when no key is held.
    pub fn is_empty(&self) -> bool {
        !(self.jump || self.left || self.right)
    }

    /// `-1`, `+1`, or `0` when neither or both directions are held.
    pub fn direction(&self) -> i32 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// TickReport / Outcome
// ---------------------------------------------------------------------------

/// What happened during one [`Simulation::tick`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick count after this tick.
    pub tick: u64,
    pub events: Vec<PhysicsEvent>,
    /// Bodies removed because they died.
    pub culled: Vec<BodyId>,
}

/// Game-state signal derived from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Playing,
    /// The player is dead or crushed, or there is no player at all.
    Died,
    Finished,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The deterministic fixed-step driver around a physics [`World`].
///
/// Same level + same inputs = same state hash at every tick.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    config: SimConfig,
    tick_counter: u64,
    current_input: InputFrame,
    last_outcome: Outcome,
}

impl Simulation {
    /// Create a simulation with an empty world.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = World::new(config.physics.clone())?;
        Ok(Self {
            world,
            config,
            tick_counter: 0,
            current_input: InputFrame::default(),
            last_outcome: Outcome::Playing,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for level building.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn current_input(&self) -> InputFrame {
        self.current_input
    }

    /// Replace the input used by following ticks.
    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    pub fn player(&self) -> Option<BodyId> {
        self.world.player()
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickReport {
        if let Some(player) = self.world.player() {
            let input = self.current_input;
            if input.jump {
                self.world.jump(player);
                self.current_input.jump = false;
            }
            match input.direction() {
                0 => self.world.apply_friction(player),
                dir => self.world.move_actor(player, dir),
            };
        }

        let step = self.world.step(self.config.dt);
        let culled = self.world.cull_dead();
        self.tick_counter += 1;

        let outcome = self.outcome();
        if outcome != self.last_outcome {
            info!(tick = self.tick_counter, ?outcome, "outcome changed");
            self.last_outcome = outcome;
        }

        TickReport {
            tick: self.tick_counter,
            events: step.events,
            culled,
        }
    }

    /// Run `n` ticks with the current input, returning the last report.
    pub fn run_ticks(&mut self, n: u64) -> Option<TickReport> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.tick());
        }
        last
    }

    pub fn outcome(&self) -> Outcome {
        let Some(state) = self
            .world
            .player()
            .and_then(|id| self.world.body(id))
            .filter(|body| body.is_alive)
            .and_then(|body| body.actor_state())
        else {
            return Outcome::Died;
        };
        if state.is_crushed {
            Outcome::Died
        } else if state.finished_level {
            Outcome::Finished
        } else {
            Outcome::Playing
        }
    }

    /// Revive the player at `(x, y)`. False when there is no player.
    pub fn reset_player(&mut self, x: i32, y: i32) -> bool {
        let reset = self
            .world
            .player()
            .is_some_and(|id| self.world.reset_actor(id, x, y));
        if reset {
            self.last_outcome = Outcome::Playing;
        }
        reset
    }

    /// Capture the current frame with its hash.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self.tick_counter, &self.world)
    }

    /// BLAKE3 hex digest of the current frame.
    pub fn state_hash(&self) -> String {
        self.snapshot().hash
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Simulation {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.world_mut()
            .insert(Body::block(Rect::new(0, 100, 400, 32)));
        sim.world_mut().insert(Body::player(10, 68));
        sim
    }

    // -- 1. Construction -----------------------------------------------------

    #[test]
    fn zero_dt_is_rejected() {
        let config = SimConfig {
            dt: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(ConfigError::OutOfRange { field: "dt", .. })
        ));
    }

    #[test]
    fn config_loads_from_partial_json() {
        let config: SimConfig = serde_json::from_str(r#"{"dt": 2}"#).unwrap();
        assert_eq!(config.dt, 2);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    // -- 2. Input ------------------------------------------------------------

    #[test]
    fn input_direction_needs_exactly_one_key() {
        let both = InputFrame {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.direction(), 0);
        assert_eq!(
            InputFrame {
                left: true,
                ..Default::default()
            }
            .direction(),
            -1
        );
        assert!(InputFrame::default().is_empty());
    }

    #[test]
    fn held_right_walks_player_right() {
        let mut sim = level();
        let player = sim.player().unwrap();
        let start = sim.world().body(player).unwrap().rect.x;
        sim.set_input(InputFrame {
            right: true,
            ..Default::default()
        });
        sim.run_ticks(20);
        assert!(sim.world().body(player).unwrap().rect.x > start + 20);
    }

    #[test]
    fn releasing_keys_applies_friction() {
        let mut sim = level();
        let player = sim.player().unwrap();
        sim.set_input(InputFrame {
            right: true,
            ..Default::default()
        });
        sim.run_ticks(10);
        sim.set_input(InputFrame::default());
        sim.run_ticks(10);
        let stopped_at = sim.world().body(player).unwrap().rect.x;
        sim.run_ticks(10);
        assert_eq!(sim.world().body(player).unwrap().rect.x, stopped_at);
    }

    #[test]
    fn jump_is_consumed_by_one_tick() {
        let mut sim = level();
        sim.tick();
        sim.set_input(InputFrame {
            jump: true,
            ..Default::default()
        });
        sim.tick();
        assert!(!sim.current_input().jump);
        let player = sim.player().unwrap();
        assert!(sim.world().body(player).unwrap().vy() < 0.0);
    }

    // -- 3. Ticking ----------------------------------------------------------

    #[test]
    fn tick_report_counts_ticks() {
        let mut sim = level();
        assert_eq!(sim.tick().tick, 1);
        assert_eq!(sim.run_ticks(4).unwrap().tick, 5);
        assert_eq!(sim.tick_count(), 5);
        assert!(sim.run_ticks(0).is_none());
    }

    #[test]
    fn dead_enemies_are_culled() {
        let mut sim = level();
        let enemy = sim.world_mut().insert(enemy::walker(200, 68, 1));
        sim.world_mut().body_mut(enemy).unwrap().is_alive = false;
        let report = sim.tick();
        assert_eq!(report.culled, vec![enemy]);
        assert!(sim.world().body(enemy).is_none());
    }

    // -- 4. Outcome ----------------------------------------------------------

    #[test]
    fn dead_player_stays_and_reports_died() {
        let mut sim = level();
        let player = sim.player().unwrap();
        sim.world_mut()
            .body_mut(player)
            .unwrap()
            .kill(DeathCause::Enemy);
        let report = sim.tick();
        assert!(report.culled.is_empty());
        assert_eq!(sim.outcome(), Outcome::Died);

        assert!(sim.reset_player(10, 68));
        assert_eq!(sim.outcome(), Outcome::Playing);
    }

    #[test]
    fn no_player_means_died() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        assert_eq!(sim.outcome(), Outcome::Died);
    }

    #[test]
    fn reset_player_without_player_is_false() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        assert!(!sim.reset_player(0, 0));
    }
}
