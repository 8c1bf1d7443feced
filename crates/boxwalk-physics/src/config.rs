//! Physics tunables.
//!
//! Every constant the integrator, resolver, and actor controls consult lives
//! in [`PhysicsConfig`]. A world owns one config for its whole lifetime, so
//! tests can run the same scene under alternate tunables without any global
//! state.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tunables for one physics world.
///
/// Loadable from JSON; missing fields take their default values.
///
/// ```
/// use boxwalk_physics::config::PhysicsConfig;
///
/// let config = PhysicsConfig::from_json_str(r#"{ "gravity": 0.5 }"#).unwrap();
/// assert_eq!(config.gravity, 0.5);
/// assert_eq!(config.push_thresh, 0.4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Probe shrink factor for push-out, crush, and ground detection.
    pub push_thresh: f64,
    /// Probe shrink factor for movable-vs-movable contact notification.
    pub notify_thresh: f64,
    /// Horizontal speeds below this produce no displacement.
    pub dead_zone: f64,
    /// Non-zero per-tick displacements are at least this many pixels.
    pub min_motion: f64,
    /// Ticks an airborne actor stays stuck to a wall while pressing away.
    pub wall_release_ticks: u32,
    /// Maximum distance between a rider's bottom and its parent's top.
    pub ride_tolerance: f64,
    /// Margin around an actor when gathering ground/wall candidates.
    pub probe_margin: i32,
    /// Downward acceleration given to physics bodies and actors.
    pub gravity: f64,
    /// Actors whose `y` reaches this depth fall out of the world.
    pub world_depth: i32,
    /// Per-tick horizontal speed decay on the ground.
    pub ground_friction: f64,
    /// Per-tick horizontal speed decay in the air.
    pub air_friction: f64,
    /// Horizontal acceleration of an actor walking on the ground.
    pub ground_move_accel: f64,
    /// Multiplier of `jump_speed` for the horizontal part of a wall jump.
    pub wall_jump_factor: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            push_thresh: 0.4,
            notify_thresh: 0.2,
            dead_zone: 1.0,
            min_motion: 1.0,
            wall_release_ticks: 5,
            ride_tolerance: 0.5,
            probe_margin: 2,
            gravity: 0.3,
            world_depth: 2048,
            ground_friction: 1.0,
            air_friction: 0.1,
            ground_move_accel: 0.4,
            wall_jump_factor: 10.0,
        }
    }
}

impl PhysicsConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PhysicsConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every tunable is within its meaningful range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn unit_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && (0.0..1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field: name,
                    value,
                    expected: "in [0, 1)",
                })
            }
        }
        fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field: name,
                    value,
                    expected: "finite and >= 0",
                })
            }
        }
        fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field: name,
                    value,
                    expected: "finite",
                })
            }
        }

        unit_fraction("push_thresh", self.push_thresh)?;
        unit_fraction("notify_thresh", self.notify_thresh)?;
        non_negative("dead_zone", self.dead_zone)?;
        non_negative("min_motion", self.min_motion)?;
        non_negative("ride_tolerance", self.ride_tolerance)?;
        non_negative("probe_margin", f64::from(self.probe_margin))?;
        finite("gravity", self.gravity)?;
        non_negative("ground_friction", self.ground_friction)?;
        non_negative("air_friction", self.air_friction)?;
        finite("ground_move_accel", self.ground_move_accel)?;
        finite("wall_jump_factor", self.wall_jump_factor)?;
        Ok(())
    }
}
