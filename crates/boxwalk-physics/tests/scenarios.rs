//! End-to-end gameplay scenarios driven through `World::step`.
//!
//! Each test builds a tiny level, runs a handful of ticks, and checks the
//! contact state, velocities, and events gameplay depends on.

use boxwalk_physics::prelude::*;

fn actor_state(world: &World, id: BodyId) -> &ActorState {
    world.body(id).unwrap().actor_state().unwrap()
}

// -- 1. Landing --------------------------------------------------------------

#[test]
fn actor_lands_on_block_below() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 128, 32)));
    let actor = world.insert(Body::actor(10, 68));

    world.step(1);

    let state = actor_state(&world, actor);
    assert!(state.contacts.grounded);
    assert_eq!(state.jump_count, 1);
    assert_eq!(world.body(actor).unwrap().vy(), 0.0);
    assert_eq!(world.body(actor).unwrap().rect.bottom(), 100);
}

#[test]
fn falling_actor_settles_and_stays_grounded() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 128, 128, 128)));
    let player = world.insert(Body::player(32, 40));

    for _ in 0..60 {
        world.step(1);
    }
    let body = world.body(player).unwrap();
    assert_eq!(body.rect.bottom(), 128);
    assert!(body.actor_state().unwrap().contacts.grounded);
    assert!(body.is_alive);
}

// -- 2. Wall jump ------------------------------------------------------------

fn actor_against_right_wall(max_vx: f64) -> (World, BodyId) {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(100, 0, 32, 300)));
    let mut body = Body::player(76, 100);
    body.max_vx = max_vx;
    let actor = world.insert(body);
    world.step(1);
    let contacts = actor_state(&world, actor).contacts;
    assert!(contacts.right_walled && !contacts.grounded);
    (world, actor)
}

#[test]
fn wall_jump_launches_up_and_away() {
    let (mut world, actor) = actor_against_right_wall(4.0);
    assert!(world.jump(actor));
    let body = world.body(actor).unwrap();
    assert_eq!(body.vel, Vec2::new(-4.0, -7.0));
}

#[test]
fn wall_jump_horizontal_speed_is_ten_jump_speeds() {
    let (mut world, actor) = actor_against_right_wall(100.0);
    world.jump(actor);
    assert_eq!(world.body(actor).unwrap().vel, Vec2::new(-70.0, -7.0));
}

// -- 3. Stomp ----------------------------------------------------------------

#[test]
fn player_stomps_enemy_from_above() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 200, 32)));
    let enemy = world.insert(enemy::walker(50, 68, -1));
    let mut player = Body::player(50, 40);
    player.set_vy(3.0);
    let player = world.insert(player);

    let report = world.step(1);

    let enemy_body = world.body(enemy).unwrap();
    assert!(!enemy_body.is_alive);
    assert_eq!(enemy_body.actor_state().unwrap().death, Some(DeathCause::Stomped));
    let player_body = world.body(player).unwrap();
    assert!(player_body.is_alive);
    assert_eq!(player_body.vy(), -3.5);
    assert_eq!(player_body.actor_state().unwrap().jump_count, 1);
    assert!(report.events.contains(&PhysicsEvent::Killed {
        body: enemy,
        cause: DeathCause::Stomped
    }));

    assert_eq!(world.cull_dead(), vec![enemy]);
}

#[test]
fn walking_into_enemy_kills_player() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 200, 32)));
    let player = world.insert(Body::player(20, 68));
    world.insert(enemy::walker(60, 68, -1));

    for _ in 0..40 {
        world.move_actor(player, 1);
        world.step(1);
        if !world.body(player).unwrap().is_alive {
            break;
        }
    }
    let state = actor_state(&world, player);
    assert_eq!(state.death, Some(DeathCause::Enemy));
}

// -- 4. Crush ----------------------------------------------------------------

#[test]
fn converging_blocks_crush_actor() {
    let mut world = World::default();
    let left = world.insert(Body::moving_block(
        32,
        200,
        Box::new(FnPath::linear((8, 0), (2.0, 0.0))),
    ));
    world.insert(Body::moving_block(
        32,
        200,
        Box::new(FnPath::linear((64, 0), (-2.0, 0.0))),
    ));
    let actor = world.insert(Body::player(40, 50));

    let report = world.step(1);

    assert!(actor_state(&world, actor).is_crushed);
    assert!(report.events.contains(&PhysicsEvent::Crushed { body: actor, by: left }));

    // Crush sticks until the actor is reset.
    world.step(1);
    assert!(actor_state(&world, actor).is_crushed);
    world.reset_actor(actor, 300, 0);
    assert!(!actor_state(&world, actor).is_crushed);
}

/// A press descending 2px per tick onto a player resting on a floor, with the
/// press inserted before or after the floor.
fn press_over_player(press_first: bool) -> (World, BodyId, BodyId) {
    let mut world = World::default();
    let floor = Body::block(Rect::new(0, 100, 200, 128));
    let press = Body::moving_block(64, 32, Box::new(FnPath::linear((30, 30), (0.0, 2.0))));
    let press_id = if press_first {
        let id = world.insert(press);
        world.insert(floor);
        id
    } else {
        world.insert(floor);
        world.insert(press)
    };
    let player = world.insert(Body::player(50, 68));
    (world, player, press_id)
}

#[test]
fn press_inserted_before_floor_crushes_player() {
    let (mut world, player, press) = press_over_player(true);
    let mut crushed_by = None;
    for _ in 0..20 {
        let report = world.step(1);
        crushed_by = report.events.iter().find_map(|event| match event {
            PhysicsEvent::Crushed { body, by } if *body == player => Some(*by),
            _ => None,
        });
        if crushed_by.is_some() {
            break;
        }
    }
    assert_eq!(crushed_by, Some(press));
    assert!(actor_state(&world, player).is_crushed);
}

#[test]
fn press_inserted_after_floor_passes_through_player() {
    let (mut world, player, _) = press_over_player(false);
    for _ in 0..60 {
        let report = world.step(1);
        assert!(!report
            .events
            .iter()
            .any(|event| matches!(event, PhysicsEvent::Crushed { .. })));
        assert!(!actor_state(&world, player).is_crushed);
    }
    // The press has sunk below the floor top; the player is back on the floor.
    assert_eq!(world.body(player).unwrap().rect.bottom(), 100);
}

// -- 5. Riding ---------------------------------------------------------------

#[test]
fn rider_moves_with_platform() {
    let mut world = World::default();
    let platform = world.insert(Body::moving_block(
        128,
        16,
        Box::new(FnPath::linear((0, 100), (5.0, 0.0))),
    ));
    let actor = world.insert(Body::actor(10, 68));

    world.step(1);
    assert_eq!(world.body(actor).unwrap().ride_parent(), Some(platform));
    let before = world.body(actor).unwrap().rect;

    world.step(1);
    let after = world.body(actor).unwrap().rect;
    assert_eq!((after.x - before.x, after.y - before.y), (5, 0));
    assert_eq!(world.body(actor).unwrap().ride_parent(), Some(platform));
}

#[test]
fn jumping_off_platform_detaches() {
    let mut world = World::default();
    let platform = world.insert(Body::block(Rect::new(0, 100, 128, 16)));
    let actor = world.insert(Body::player(10, 68));
    world.step(1);
    assert_eq!(world.body(actor).unwrap().ride_parent(), Some(platform));

    world.jump(actor);
    let report = world.step(1);
    assert_eq!(world.body(actor).unwrap().ride_parent(), None);
    assert!(report.events.contains(&PhysicsEvent::Detached {
        parent: platform,
        child: actor
    }));
}

// -- 6. Enemies and special blocks -------------------------------------------

#[test]
fn smart_walker_never_leaves_its_platform() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 64, 16)));
    let smart = world.insert(enemy::smart_walker(30, 68, 1));

    let mut directions = Vec::new();
    for _ in 0..300 {
        world.step(1);
        directions.push(world.body(smart).unwrap().enemy_state().unwrap().direction);
    }
    let body = world.body(smart).unwrap();
    assert_eq!(body.rect.bottom(), 100);
    assert!(body.is_alive);
    assert!(directions.contains(&-1) && directions.contains(&1), "never turned");
}

#[test]
fn plain_walker_walks_off_the_edge() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 64, 16)));
    let walker = world.insert(enemy::walker(30, 68, 1));
    for _ in 0..120 {
        world.step(1);
    }
    assert!(world.body(walker).unwrap().rect.top() > 100);
}

#[test]
fn enemy_turns_at_wall() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 200, 32)));
    world.insert(Body::block(Rect::new(100, 0, 16, 100)));
    let walker = world.insert(enemy::walker(60, 68, 1));
    for _ in 0..60 {
        world.step(1);
    }
    assert_eq!(world.body(walker).unwrap().enemy_state().unwrap().direction, -1);
}

#[test]
fn bad_block_kills_on_touch() {
    let mut world = World::default();
    world.insert(Body::bad_block(Rect::new(0, 100, 64, 16)));
    let player = world.insert(Body::player(10, 60));
    let mut events = Vec::new();
    for _ in 0..20 {
        events.extend(world.step(1).events);
    }
    assert_eq!(actor_state(&world, player).death, Some(DeathCause::BadBlock));
    assert!(events.contains(&PhysicsEvent::Killed {
        body: player,
        cause: DeathCause::BadBlock
    }));
}

#[test]
fn reaching_finish_block_finishes_level() {
    let mut world = World::default();
    world.insert(Body::block(Rect::new(0, 100, 200, 32)));
    world.insert(Body::finish_block(80, 84));
    let player = world.insert(Body::player(10, 68));

    let mut finished_at = None;
    for tick in 0..60 {
        world.move_actor(player, 1);
        let report = world.step(1);
        if report
            .events
            .contains(&PhysicsEvent::FinishedLevel { body: player })
        {
            finished_at = Some(tick);
            break;
        }
    }
    assert!(finished_at.is_some(), "player never reached the finish block");
    assert!(actor_state(&world, player).finished_level);
}

#[test]
fn point_path_platform_cycles_back_to_start() {
    let path = PointPath::new(vec![0, 100], vec![50, 50], PointPath::DEFAULT_SPEED).unwrap();
    let cycle = (2.0 * path.leg_duration()).round() as u32;
    let mut world = World::default();
    let block = world.insert(Body::moving_block(32, 8, Box::new(path)));
    let mut max_x = 0;
    for _ in 0..cycle {
        world.step(1);
        max_x = max_x.max(world.body(block).unwrap().rect.x);
    }
    assert_eq!(max_x, 100);
    assert!(world.body(block).unwrap().rect.x <= 1);
}
