//! Determinism tests: identical levels fed identical inputs must agree on
//! every frame hash.
//!
//! Levels are generated from a seeded `rand_pcg` RNG and input scripts from
//! `proptest`, so each case covers a different mix of platforms, enemies,
//! and hazards.

use boxwalk_engine::prelude::*;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn random_level(seed: u64) -> Simulation {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut sim = Simulation::new(SimConfig::default()).unwrap();
    let world = sim.world_mut();
    world.insert(Body::block(Rect::new(0, 200, 640, 32)));
    for _ in 0..rng.gen_range(2..8) {
        let x = rng.gen_range(0..600);
        let y = rng.gen_range(40..190);
        let w = rng.gen_range(16..128);
        match rng.gen_range(0..4) {
            0 => world.insert(Body::bad_block(Rect::new(x, y, w, 16))),
            1 => {
                let to = rng.gen_range(0..600);
                let path = PointPath::new(vec![x, to], vec![y, y], rng.gen_range(1.0..5.0));
                match path {
                    Ok(path) => world.insert(Body::moving_block(w, 12, Box::new(path))),
                    Err(e) => panic!("generated path rejected: {e}"),
                }
            }
            _ => world.insert(Body::block(Rect::new(x, y, w, 16))),
        };
    }
    for _ in 0..rng.gen_range(0..4) {
        let x = rng.gen_range(0..600);
        let dir = if rng.gen_bool(0.5) { 1 } else { -1 };
        let enemy = match rng.gen_range(0..3) {
            0 => enemy::walker(x, 0, dir),
            1 => enemy::smart_walker(x, 0, dir),
            _ => enemy::hazard(x, 0, dir, rng.gen_bool(0.5)),
        };
        world.insert(enemy);
    }
    world.insert(Body::player(rng.gen_range(0..600), 0));
    sim
}

fn input_strategy() -> impl Strategy<Value = InputFrame> {
    prop_oneof![
        Just(InputFrame::default()),
        Just(InputFrame {
            left: true,
            ..Default::default()
        }),
        Just(InputFrame {
            right: true,
            ..Default::default()
        }),
        Just(InputFrame {
            jump: true,
            ..Default::default()
        }),
        Just(InputFrame {
            jump: true,
            right: true,
            left: false,
        }),
    ]
}

// -- 1. Fixed levels -----------------------------------------------------------

#[test]
fn same_seed_same_initial_hash() {
    assert_eq!(random_level(7).state_hash(), random_level(7).state_hash());
}

#[test]
fn two_runs_agree_every_tick() {
    let mut a = random_level(42);
    let mut b = random_level(42);
    a.set_input(InputFrame {
        right: true,
        ..Default::default()
    });
    b.set_input(a.current_input());
    for _ in 0..300 {
        let ra = a.tick();
        let rb = b.tick();
        assert_eq!(ra, rb);
        assert_eq!(a.state_hash(), b.state_hash());
    }
}

// -- 2. Random inputs ----------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identical_inputs_identical_hashes(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..200),
    ) {
        let mut a = random_level(seed);
        let mut b = random_level(seed);
        for input in inputs {
            a.set_input(input);
            b.set_input(input);
            let ra = a.tick();
            let rb = b.tick();
            prop_assert_eq!(ra, rb);
            prop_assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    #[test]
    fn snapshots_always_verify(
        seed in any::<u64>(),
        ticks in 0u64..120,
    ) {
        let mut sim = random_level(seed);
        sim.run_ticks(ticks);
        let snapshot = sim.snapshot();
        prop_assert_eq!(snapshot.tick, ticks);
        prop_assert!(snapshot.verify());
    }
}
