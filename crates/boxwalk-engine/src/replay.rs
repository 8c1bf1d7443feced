//! Deterministic replay with input recording and checkpoint verification.
//!
//! A [`ReplayRecorder`] captures the non-empty [`InputFrame`]s of a run and a
//! state hash every `checkpoint_interval` ticks, producing a [`ReplayLog`].
//! [`replay`] feeds the log to a freshly built [`Simulation`] of the same
//! level and compares hashes at each checkpoint.
//!
//! # Recording and replaying
//!
//! ```
//! use boxwalk_engine::prelude::*;
//!
//! fn level() -> Simulation {
//!     let mut sim = Simulation::new(SimConfig::default()).unwrap();
//!     sim.world_mut().insert(Body::block(Rect::new(0, 100, 400, 32)));
//!     sim.world_mut().insert(Body::player(10, 68));
//!     sim
//! }
//!
//! let mut sim = level();
//! let mut recorder = ReplayRecorder::new(&sim, 10);
//! sim.set_input(InputFrame { right: true, ..Default::default() });
//! for _ in 0..50 {
//!     recorder.record(&sim);
//!     sim.tick();
//! }
//! let log = recorder.finish();
//!
//! let result = replay(&mut level(), &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tick::{InputFrame, Simulation};

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A recorded run: where it started plus inputs and checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Tick count of the simulation when recording started.
    pub start_tick: u64,
    /// State hash of the simulation when recording started. The replay
    /// target must match it.
    pub start_hash: String,
    /// Number of ticks replay executes.
    pub total_ticks: u64,
    pub entries: Vec<ReplayEntry>,
}

// ---------------------------------------------------------------------------
// ReplayEntry
// ---------------------------------------------------------------------------

/// An input frame or a state hash checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// Input in effect for the tick.
    Input { tick: u64, input: InputFrame },
    /// State hash taken before the tick ran.
    Checkpoint { tick: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// False when replay stopped at a divergence.
    pub completed: bool,
    pub ticks_replayed: u64,
    /// The first checkpoint whose hash did not match.
    pub first_divergence: Option<ReplayDivergence>,
}

/// Where a replay stopped agreeing with its recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] tick by tick.
///
/// Call [`record`](Self::record) (or [`record_tick`](Self::record_tick))
/// **before** each tick, then [`finish`](Self::finish).
#[derive(Debug)]
pub struct ReplayRecorder {
    log: ReplayLog,
    /// Checkpoint every this many ticks. Zero checkpoints whenever a hash is
    /// supplied.
    checkpoint_interval: u64,
    ticks_recorded: u64,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Start recording from the current state of `sim`.
    pub fn new(sim: &Simulation, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                start_tick: sim.tick_count(),
                start_hash: sim.state_hash(),
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            ticks_recorded: 0,
            last_tick: None,
        }
    }

    fn checkpoint_due(&self, tick: u64) -> bool {
        self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0
    }

    /// Record the tick `sim` is about to run. The state is only hashed when
    /// a checkpoint is due.
    pub fn record(&mut self, sim: &Simulation) {
        let tick = sim.tick_count();
        let hash = self.checkpoint_due(tick).then(|| sim.state_hash());
        self.record_tick(tick, &sim.current_input(), hash);
    }

    /// Record one tick's input and, if one is due, a checkpoint with
    /// `state_hash`.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not strictly greater than the previous one.
    pub fn record_tick(&mut self, tick: u64, input: &InputFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not strictly greater than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.ticks_recorded += 1;

        if !input.is_empty() {
            self.log.entries.push(ReplayEntry::Input {
                tick,
                input: *input,
            });
        }

        if let Some(state_hash) = state_hash {
            if self.checkpoint_due(tick) {
                self.log
                    .entries
                    .push(ReplayEntry::Checkpoint { tick, state_hash });
            }
        }
    }

    pub fn finish(mut self) -> ReplayLog {
        self.log.total_ticks = self.ticks_recorded;
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `sim`, stopping at the first checkpoint that disagrees.
///
/// `sim` must be the level the log was recorded from, at the tick and state
/// recording started at.
///
/// # Errors
///
/// Malformed logs (duplicate entries, tick range overflow) and a `sim` whose
/// tick or hash differs from the log's start. All checks run before any tick,
/// so on error `sim` is untouched.
pub fn replay(sim: &mut Simulation, log: &ReplayLog) -> anyhow::Result<ReplayResult> {
    let mut inputs: BTreeMap<u64, InputFrame> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if inputs.insert(*tick, *input).is_some() {
                    anyhow::bail!("replay log contains duplicate Input entry at tick {tick}");
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoints.insert(*tick, state_hash.as_str()).is_some() {
                    anyhow::bail!("replay log contains duplicate Checkpoint entry at tick {tick}");
                }
            }
        }
    }

    let start_tick = log.start_tick;
    let total_ticks = log.total_ticks;
    let end_tick = start_tick.checked_add(total_ticks).ok_or_else(|| {
        anyhow::anyhow!(
            "tick range overflow: start_tick ({start_tick}) + total_ticks ({total_ticks}) exceeds u64::MAX"
        )
    })?;

    if sim.tick_count() != start_tick {
        anyhow::bail!(
            "replay starts at tick {start_tick} but the simulation is at tick {}",
            sim.tick_count()
        );
    }
    let actual = sim.state_hash();
    if actual != log.start_hash {
        anyhow::bail!(
            "simulation state does not match the replay start: expected {}, got {actual}",
            log.start_hash
        );
    }

    let mut ticks_replayed = 0;
    for tick in start_tick..end_tick {
        sim.set_input(inputs.get(&tick).copied().unwrap_or_default());

        if let Some(&expected) = checkpoints.get(&tick) {
            let actual_hash = sim.state_hash();
            if actual_hash != expected {
                warn!(tick, expected, actual = %actual_hash, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected.to_owned(),
                        actual_hash,
                    }),
                });
            }
        }

        sim.tick();
        ticks_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::SimConfig;
    use boxwalk_physics::prelude::*;

    fn level() -> Simulation {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.world_mut()
            .insert(Body::block(Rect::new(0, 100, 400, 32)));
        sim.world_mut().insert(Body::player(10, 68));
        sim
    }

    fn right() -> InputFrame {
        InputFrame {
            right: true,
            ..Default::default()
        }
    }

    // -- 1. Recorder ---------------------------------------------------------

    #[test]
    fn recorder_skips_empty_input_and_checkpoints_on_interval() {
        let sim = level();
        let mut recorder = ReplayRecorder::new(&sim, 2);
        recorder.record_tick(0, &InputFrame::default(), Some("h0".into()));
        recorder.record_tick(1, &right(), Some("h1".into()));
        recorder.record_tick(2, &InputFrame::default(), Some("h2".into()));
        let log = recorder.finish();

        assert_eq!(log.total_ticks, 3);
        assert_eq!(
            log.entries,
            vec![
                ReplayEntry::Checkpoint {
                    tick: 0,
                    state_hash: "h0".into()
                },
                ReplayEntry::Input {
                    tick: 1,
                    input: right()
                },
                ReplayEntry::Checkpoint {
                    tick: 2,
                    state_hash: "h2".into()
                },
            ]
        );
    }

    #[test]
    #[should_panic(expected = "not strictly greater")]
    fn recorder_rejects_out_of_order_ticks() {
        let sim = level();
        let mut recorder = ReplayRecorder::new(&sim, 1);
        recorder.record_tick(3, &right(), None);
        recorder.record_tick(3, &right(), None);
    }

    // -- 2. Validation -------------------------------------------------------

    #[test]
    fn duplicate_entries_are_rejected_before_ticking() {
        let mut sim = level();
        let mut log = ReplayRecorder::new(&sim, 1).finish();
        log.total_ticks = 5;
        log.entries = vec![
            ReplayEntry::Input {
                tick: 1,
                input: right(),
            },
            ReplayEntry::Input {
                tick: 1,
                input: right(),
            },
        ];
        let err = replay(&mut sim, &log).unwrap_err();
        assert!(err.to_string().contains("duplicate Input"));
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn tick_overflow_is_rejected() {
        let mut sim = level();
        let mut log = ReplayRecorder::new(&sim, 1).finish();
        log.start_tick = u64::MAX;
        log.total_ticks = 1;
        let err = replay(&mut sim, &log).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn wrong_start_state_is_rejected() {
        let mut recorded = level();
        let log = {
            let mut recorder = ReplayRecorder::new(&recorded, 1);
            recorder.record(&recorded);
            recorded.tick();
            recorder.finish()
        };

        let mut other = level();
        other.world_mut().insert(Body::block(Rect::new(300, 0, 8, 8)));
        let err = replay(&mut other, &log).unwrap_err();
        assert!(err.to_string().contains("does not match"));
        assert_eq!(other.tick_count(), 0);

        let mut late = level();
        late.tick();
        assert!(replay(&mut late, &log).is_err());
    }

    #[test]
    fn empty_log_replays_trivially() {
        let mut sim = level();
        let log = ReplayRecorder::new(&sim, 1).finish();
        let result = replay(&mut sim, &log).unwrap();
        assert!(result.completed);
        assert_eq!(result.ticks_replayed, 0);
    }
}
