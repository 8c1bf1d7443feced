//! Ghost recordings of a player's run.
//!
//! A [`GhostRecorder`] samples the player's position after every tick while
//! it is alive. The track turns into a non-solid Ghost body that replays the
//! run one point per tick and dies when the points run out. Tracks are stored
//! as JSON:
//!
//! ```json
//! {"x_points": [32, 33, 35], "y_points": [96, 96, 96], "color": [0, 0, 255]}
//! ```

use boxwalk_physics::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tick::Simulation;
use crate::GhostError;

// ---------------------------------------------------------------------------
// GhostTrack
// ---------------------------------------------------------------------------

/// A stored run: parallel coordinate arrays plus a display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostTrack {
    pub x_points: Vec<i32>,
    pub y_points: Vec<i32>,
    pub color: Color,
}

impl GhostTrack {
    pub fn from_json_str(json: &str) -> Result<Self, GhostError> {
        let track: Self = serde_json::from_str(json)?;
        track.points()?;
        Ok(track)
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).expect("ghost track should always be JSON-serializable")
    }

    pub fn len(&self) -> usize {
        self.x_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_points.is_empty()
    }

    fn points(&self) -> Result<Vec<(i32, i32)>, GhostError> {
        let (x_len, y_len) = (self.x_points.len(), self.y_points.len());
        if x_len != y_len {
            return Err(GhostError::MismatchedTrack { x_len, y_len });
        }
        if x_len == 0 {
            return Err(GhostError::EmptyTrack);
        }
        Ok(self
            .x_points
            .iter()
            .copied()
            .zip(self.y_points.iter().copied())
            .collect())
    }

    /// Build a Ghost body placed at the first point.
    pub fn to_ghost(&self) -> Result<Body, GhostError> {
        Ok(Body::ghost(self.points()?, self.color))
    }
}

// ---------------------------------------------------------------------------
// GhostRecorder
// ---------------------------------------------------------------------------

/// Samples a player's position once per tick.
#[derive(Debug, Clone, Default)]
pub struct GhostRecorder {
    x_points: Vec<i32>,
    y_points: Vec<i32>,
    color: Option<Color>,
}

impl GhostRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the player of `sim`. Nothing is recorded while it is dead or
    /// missing.
    pub fn record(&mut self, sim: &Simulation) {
        let Some(player) = sim.player().and_then(|id| sim.world().body(id)) else {
            return;
        };
        if !player.is_alive {
            return;
        }
        self.x_points.push(player.rect.x);
        self.y_points.push(player.rect.y);
        self.color = Some(player.color);
    }

    pub fn len(&self) -> usize {
        self.x_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_points.is_empty()
    }

    /// Forget everything, e.g. when the level restarts.
    pub fn clear(&mut self) {
        self.x_points.clear();
        self.y_points.clear();
    }

    pub fn track(&self) -> GhostTrack {
        GhostTrack {
            x_points: self.x_points.clone(),
            y_points: self.y_points.clone(),
            color: self.color.unwrap_or(Color::GHOST),
        }
    }

    pub fn to_ghost(&self) -> Result<Body, GhostError> {
        self.track().to_ghost()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::{InputFrame, SimConfig};

    fn level() -> Simulation {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.world_mut()
            .insert(Body::block(Rect::new(0, 100, 400, 32)));
        sim.world_mut().insert(Body::player(10, 68));
        sim
    }

    #[test]
    fn recorder_samples_live_player() {
        let mut sim = level();
        let mut recorder = GhostRecorder::new();
        sim.set_input(InputFrame {
            right: true,
            ..Default::default()
        });
        for _ in 0..5 {
            sim.tick();
            recorder.record(&sim);
        }
        assert_eq!(recorder.len(), 5);
        let track = recorder.track();
        assert_eq!(track.color, Color::ACTOR);
        assert!(track.x_points.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn dead_player_is_not_sampled() {
        let mut sim = level();
        let player = sim.player().unwrap();
        sim.world_mut()
            .body_mut(player)
            .unwrap()
            .kill(DeathCause::Fell);
        let mut recorder = GhostRecorder::new();
        recorder.record(&sim);
        assert!(recorder.is_empty());
    }

    #[test]
    fn empty_recorder_cannot_make_a_ghost() {
        assert!(matches!(
            GhostRecorder::new().to_ghost(),
            Err(GhostError::EmptyTrack)
        ));
    }

    #[test]
    fn track_json_uses_color_triples() {
        let track = GhostTrack {
            x_points: vec![1, 2],
            y_points: vec![3, 4],
            color: Color(1, 2, 3),
        };
        let json = track.to_json_string();
        assert!(json.contains(r#""color":[1,2,3]"#));
        assert_eq!(GhostTrack::from_json_str(&json).unwrap(), track);
    }

    #[test]
    fn mismatched_track_is_rejected() {
        let err = GhostTrack::from_json_str(r#"{"x_points":[1,2],"y_points":[1],"color":[0,0,0]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            GhostError::MismatchedTrack { x_len: 2, y_len: 1 }
        ));
    }

    #[test]
    fn malformed_track_is_rejected() {
        assert!(matches!(
            GhostTrack::from_json_str("{not json"),
            Err(GhostError::Malformed(_))
        ));
    }

    #[test]
    fn ghost_body_starts_at_first_point() {
        let track = GhostTrack {
            x_points: vec![7, 8],
            y_points: vec![9, 10],
            color: Color::GHOST,
        };
        let ghost = track.to_ghost().unwrap();
        assert_eq!((ghost.rect.x, ghost.rect.y), (7, 9));
        assert!(!ghost.is_solid);
        assert_eq!(ghost.kind_tag(), KindTag::Ghost);
    }
}
