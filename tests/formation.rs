//! Frame-driven tests over a headless app, with a manually advanced clock
//! for deterministic deltas.

use std::time::Duration;

use bevy::ecs::system::CommandQueue;
use bevy::prelude::*;

use phalanx::boid::steering::{AngularRoutineOutput, LinearRoutineOutput};
use phalanx::math::*;
use phalanx::{
    spawn_formation, BoidConfig, FormationAnchor, FormationLayout, FormationMembers,
    FormationMindPlugin, ObstacleIndex, PlaceObstacleEvent, SetFormationTarget, Steering,
};

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(FormationMindPlugin);
    app
}

fn spawn(app: &mut App, offsets: Vec<TVec3>, facings: Vec<TVec3>, origin: TVec3) -> Entity {
    let layout = FormationLayout::new(offsets, facings).unwrap();
    let mut queue = CommandQueue::default();
    let mut commands = Commands::new(&mut queue, &app.world);
    let formation = spawn_formation(&mut commands, layout, &BoidConfig::default(), origin).unwrap();
    queue.apply(&mut app.world);
    formation
}

fn members_of(app: &mut App, formation: Entity) -> Vec<Entity> {
    app.world
        .get::<FormationMembers>(formation)
        .unwrap()
        .to_vec()
}

/// Advances the clock by `dt` then runs one frame.
fn tick(app: &mut App, dt: f32) {
    app.world
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(dt));
    app.update();
}

const QUAD_OFFSETS: [TVec3; 4] = [
    TVec3::new(-3., 0., -1.5),
    TVec3::new(3., 0., -1.5),
    TVec3::new(-3., 0., 1.5),
    TVec3::new(3., 0., 1.5),
];

#[test]
fn spawn_places_boids_on_their_slots() {
    let mut app = test_app();
    let origin = TVec3::new(1., 0., 2.);
    let formation = spawn(
        &mut app,
        QUAD_OFFSETS.to_vec(),
        vec![-TVec3::Z; 4],
        origin,
    );
    let members = members_of(&mut app, formation);
    assert_eq!(members.len(), 4);
    for (member, offset) in members.iter().zip(QUAD_OFFSETS) {
        let xform = app.world.get::<Transform>(*member).unwrap();
        assert!((xform.translation - (origin + offset)).length() < 1e-6);
        let steering = app.world.get::<Steering>(*member).unwrap();
        assert!((steering.facing() - -TVec3::Z).length() < 1e-6);
    }
}

#[test]
fn dispatch_updates_every_member_in_slot_order() {
    let mut app = test_app();
    let formation = spawn(
        &mut app,
        QUAD_OFFSETS.to_vec(),
        vec![-TVec3::Z; 4],
        TVec3::ZERO,
    );
    let point = TVec3::new(10., 0., 10.);
    app.world.send_event(SetFormationTarget { formation, point });
    tick(&mut app, 0.);

    let anchor = app.world.get::<FormationAnchor>(formation).unwrap();
    assert!((anchor.point - point).length() < 1e-6);
    for (member, offset) in members_of(&mut app, formation).iter().zip(QUAD_OFFSETS) {
        let steering = app.world.get::<Steering>(*member).unwrap();
        assert!((steering.destination() - (point + offset)).length() < 1e-6);
        assert!(!steering.arrived());
    }
}

#[test]
fn target_event_for_non_formation_entity_is_ignored() {
    let mut app = test_app();
    spawn(&mut app, vec![TVec3::ZERO], vec![-TVec3::Z], TVec3::ZERO);
    app.world.send_event(SetFormationTarget {
        formation: Entity::from_raw(9999),
        point: TVec3::X,
    });
    // must not panic
    tick(&mut app, 0.1);
}

#[test]
fn clamped_seek_reaches_the_slot() {
    let mut app = test_app();
    // boid ends up at the origin; its destination becomes (7, 0, 8.5)
    let formation = spawn(
        &mut app,
        vec![TVec3::new(-3., 0., -1.5)],
        vec![-TVec3::Z],
        TVec3::new(3., 0., 1.5),
    );
    let point = TVec3::new(10., 0., 10.);
    app.world.send_event(SetFormationTarget { formation, point });
    tick(&mut app, 0.);

    let boid = members_of(&mut app, formation)[0];
    let dest = TVec3::new(7., 0., 8.5);
    // remaining distance over time_to_target exceeds max_speed, so the
    // output is capped at magnitude 5 with direction preserved
    let vel = app.world.get::<LinearRoutineOutput>(boid).unwrap().0;
    assert!((vel.length() - 5.).abs() < 1e-4);
    assert!(vel.normalize().dot(dest.normalize()) > 1. - 1e-5);

    for _ in 0..40 {
        tick(&mut app, 0.1);
    }
    let steering = app.world.get::<Steering>(boid).unwrap();
    assert!(steering.arrived());
    let pos = app.world.get::<Transform>(boid).unwrap().translation;
    assert!(flatten(dest - pos).length() < 0.5);
    assert!(app.world.get::<LinearRoutineOutput>(boid).unwrap().0.length() < 1e-6);
}

#[test]
fn arrival_latches_and_reports_zero_velocity_the_same_tick() {
    let mut app = test_app();
    let formation = spawn(&mut app, vec![TVec3::ZERO], vec![-TVec3::Z], TVec3::ZERO);
    // within the satisfaction radius from the start
    app.world.send_event(SetFormationTarget {
        formation,
        point: TVec3::new(0.3, 0., 0.2),
    });
    tick(&mut app, 0.1);

    let boid = members_of(&mut app, formation)[0];
    let steering = app.world.get::<Steering>(boid).unwrap();
    assert!(steering.arrived());
    assert!(app.world.get::<LinearRoutineOutput>(boid).unwrap().0.length() < 1e-6);
    // the boid never moved
    let pos = app.world.get::<Transform>(boid).unwrap().translation;
    assert!(pos.length() < 1e-6);
}

#[test]
fn re_setting_the_same_destination_re_seeks_for_one_tick() {
    let mut app = test_app();
    let formation = spawn(&mut app, vec![TVec3::ZERO], vec![-TVec3::Z], TVec3::ZERO);
    app.world.send_event(SetFormationTarget {
        formation,
        point: TVec3::new(0.3, 0., 0.2),
    });
    tick(&mut app, 0.1);
    let boid = members_of(&mut app, formation)[0];
    assert!(app.world.get::<Steering>(boid).unwrap().arrived());

    // re-issuing the exact same destination clears the latch...
    let mut steering = app.world.get_mut::<Steering>(boid).unwrap();
    let dest = steering.destination();
    steering.set_destination(dest);
    assert!(!steering.arrived());

    // ...and the next tick re-arrives with zero velocity output
    tick(&mut app, 0.1);
    let steering = app.world.get::<Steering>(boid).unwrap();
    assert!(steering.arrived());
    assert!(app.world.get::<LinearRoutineOutput>(boid).unwrap().0.length() < 1e-6);
}

#[test]
fn settle_rotation_is_monotone_while_arrived() {
    let mut app = test_app();
    let facing = TVec3::X;
    let formation = spawn(&mut app, vec![TVec3::ZERO], vec![facing], TVec3::ZERO);
    app.world.send_event(SetFormationTarget {
        formation,
        point: TVec3::new(0.1, 0., 0.1),
    });
    tick(&mut app, 0.1);
    let boid = members_of(&mut app, formation)[0];
    assert!(app.world.get::<Steering>(boid).unwrap().arrived());

    let target = planar_heading(facing);
    let mut gap = app
        .world
        .get::<Transform>(boid)
        .unwrap()
        .rotation
        .angle_between(target);
    assert!(gap > 1.); // starts ~90 degrees off
    for _ in 0..30 {
        tick(&mut app, 0.1);
        let rotation = app.world.get::<Transform>(boid).unwrap().rotation;
        let new_gap = rotation.angle_between(target);
        assert!(new_gap <= gap + 1e-5);
        assert!(app.world.get::<LinearRoutineOutput>(boid).unwrap().0.length() < 1e-6);
        gap = new_gap;
    }
    assert!(gap < 0.02);
}

#[test]
fn obstacles_add_lateral_dodges_and_suppress_turning() {
    let mut app = test_app();
    let formation = spawn(&mut app, vec![TVec3::ZERO], vec![-TVec3::Z], TVec3::ZERO);
    app.world.send_event(SetFormationTarget {
        formation,
        point: TVec3::new(7., 0., 0.),
    });
    app.world.send_event(PlaceObstacleEvent {
        point: TVec3::new(0.5, 0., 0.),
    });
    app.world.send_event(PlaceObstacleEvent {
        point: TVec3::new(0.4, 0., 0.3),
    });

    // frame 1: obstacles spawn but aren't indexed yet
    tick(&mut app, 0.);
    let boid = members_of(&mut app, formation)[0];
    let vel = app.world.get::<LinearRoutineOutput>(boid).unwrap().0;
    assert!((vel - TVec3::new(5., 0., 0.)).length() < 1e-4);

    // frame 2: both obstacles qualify and their dodges stack
    tick(&mut app, 0.);
    assert_eq!(app.world.resource::<ObstacleIndex>().len(), 2);
    let vel = app.world.get::<LinearRoutineOutput>(boid).unwrap().0;
    assert!((vel - TVec3::new(5., 0., -5.)).length() < 1e-4);
    let steering = app.world.get::<Steering>(boid).unwrap();
    assert!(steering.avoiding());
    // heading updates are skipped while dodging
    let rotation = app.world.get::<AngularRoutineOutput>(boid).unwrap().0;
    assert!(rotation.angle_between(TQuat::IDENTITY) < 1e-6);
}
