//! Headless scenarios for the full [`WrapArenaPlugin`].
//!
//! These tests use [`MinimalPlugins`] with no window and no Rapier.  The arena
//! falls back to the configured 1200 × 680 viewport, so it spans
//! x ∈ [-600, 600], y ∈ [-340, 340].  Bodies are positioned by hand, and
//! overlaps are injected as `CollisionEvent`s.
//!
//! Covered scenarios:
//! 1. Ghost counts: none inside, one across an edge, three at a corner.
//! 2. Bodies still flying in are never mirrored.
//! 3. Ghosts copy the parent's rotation and velocity; the diagonal follows
//!    the live horizontal/vertical pair.
//! 4. Entry detection, then wrap relocation with ghosts rebuilt in the same
//!    tick and the body's motion untouched.
//! 5. A hit on a ghost destroys the parent and the whole ghost set.
//! 6. Orphaned ghosts are swept.
//! 7. Ship overlaps are reported against the authority.
//! 8. Clearing a wave starts the next, larger one, even when some asteroids
//!    were despawned by outside code.
//! 9. Reset clears everything and restarts wave 0.

use bevy::ecs::message::Messages;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionEvent, Velocity};
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wraparound::asteroid::{spawn_asteroid, Asteroid, AsteroidSize, AsteroidSpawn, EntryTracker};
use wraparound::collision::{Projectile, Ship, ShipHit};
use wraparound::config::ArenaConfig;
use wraparound::ghost::{GhostSet, GhostSlot};
use wraparound::wave::{authoritative_count, ResetArena, WaveState};
use wraparound::WrapArenaPlugin;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Headless app with the arena plugin, past its Startup schedule.
fn arena_app(spawn_first_wave: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(WrapArenaPlugin { spawn_first_wave });
    app.update();
    app
}

fn spawn_at(app: &mut App, size: AsteroidSize, position: Vec2, entered: bool) -> Entity {
    spawn_with(
        app,
        AsteroidSpawn {
            size,
            position,
            rotation: 0.0,
            linvel: Vec2::ZERO,
            angvel: 0.0,
            entered,
        },
    )
}

fn spawn_with(app: &mut App, spawn: AsteroidSpawn) -> Entity {
    app.world_mut()
        .run_system_once(move |mut commands: Commands, config: Res<ArenaConfig>| {
            spawn_asteroid(&mut commands, &spawn, &config, &mut StdRng::seed_from_u64(7))
        })
        .unwrap()
}

fn asteroid_count(world: &mut World) -> usize {
    world
        .query_filtered::<(), With<Asteroid>>()
        .iter(world)
        .count()
}

fn ghosts_of(app: &App, parent: Entity) -> GhostSet {
    app.world().get::<GhostSet>(parent).unwrap().clone()
}

fn authorities(world: &mut World) -> Vec<Entity> {
    world
        .query_filtered::<Entity, (With<Asteroid>, With<GhostSet>)>()
        .iter(world)
        .collect()
}

fn hit(app: &mut App, asteroid: Entity, other: Entity) {
    app.world_mut().write_message(CollisionEvent::Started(
        asteroid,
        other,
        CollisionEventFlags::SENSOR,
    ));
}

fn shoot(app: &mut App, asteroid: Entity) {
    let bullet = app.world_mut().spawn(Projectile).id();
    hit(app, asteroid, bullet);
}

// ── Ghost topology ────────────────────────────────────────────────────────────

#[test]
fn body_well_inside_has_no_ghosts() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::ZERO, true);
    app.update();

    assert!(ghosts_of(&app, a).is_empty());
    assert_eq!(asteroid_count(app.world_mut()), 1);
}

#[test]
fn body_across_right_edge_has_one_left_ghost() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 0.0), true);
    app.update();

    let ghosts = ghosts_of(&app, a);
    assert_eq!(ghosts.len(), 1);
    let left = ghosts.get(GhostSlot::Left).expect("left ghost");
    assert!(left.offset.abs_diff_eq(Vec2::new(-1200.0, 0.0), 1e-3));
    assert!(!ghosts.is_live(GhostSlot::Diagonal));

    let ghost_pos = app.world().get::<Transform>(left.entity).unwrap().translation;
    assert!((ghost_pos.x - (590.0 - 1200.0)).abs() < 1e-3);
    assert_eq!(asteroid_count(app.world_mut()), 2);
}

#[test]
fn body_at_corner_has_two_cardinal_ghosts_and_a_diagonal() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 330.0), true);
    app.update();

    let ghosts = ghosts_of(&app, a);
    assert!(ghosts.is_live(GhostSlot::Left));
    assert!(ghosts.is_live(GhostSlot::Bottom));
    assert!(!ghosts.is_live(GhostSlot::Right));
    assert!(!ghosts.is_live(GhostSlot::Top));
    let diagonal = ghosts.get(GhostSlot::Diagonal).expect("diagonal ghost");
    assert!(diagonal.offset.abs_diff_eq(Vec2::new(-1200.0, -680.0), 1e-3));
    assert_eq!(asteroid_count(app.world_mut()), 4);

    // Stable from tick to tick while the body stays put.
    app.update();
    assert_eq!(ghosts_of(&app, a), ghosts);
    assert_eq!(asteroid_count(app.world_mut()), 4);
}

#[test]
fn ghosts_disappear_when_body_moves_inside() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 330.0), true);
    app.update();
    assert_eq!(ghosts_of(&app, a).len(), 3);

    app.world_mut().get_mut::<Transform>(a).unwrap().translation = Vec3::new(0.0, 0.0, 0.05);
    app.update();
    assert!(ghosts_of(&app, a).is_empty());
    assert_eq!(asteroid_count(app.world_mut()), 1);
}

#[test]
fn ghost_copies_parent_rotation_and_velocity() {
    let mut app = arena_app(false);
    let rotation = 0.7;
    let a = spawn_with(
        &mut app,
        AsteroidSpawn {
            size: AsteroidSize::Large,
            position: Vec2::new(0.0, 335.0),
            rotation,
            linvel: Vec2::new(-12.0, 30.0),
            angvel: 1.25,
            entered: true,
        },
    );
    app.update();

    let bottom = ghosts_of(&app, a).get(GhostSlot::Bottom).expect("bottom ghost");
    let parent_tf = *app.world().get::<Transform>(a).unwrap();
    let ghost_tf = *app.world().get::<Transform>(bottom.entity).unwrap();
    assert!(ghost_tf.rotation.abs_diff_eq(parent_tf.rotation, 1e-6));
    assert!(ghost_tf
        .translation
        .truncate()
        .abs_diff_eq(parent_tf.translation.truncate() + Vec2::new(0.0, -680.0), 1e-3));

    let parent_v = *app.world().get::<Velocity>(a).unwrap();
    let ghost_v = *app.world().get::<Velocity>(bottom.entity).unwrap();
    assert_eq!(ghost_v.linvel, parent_v.linvel);
    assert_eq!(ghost_v.angvel, parent_v.angvel);
    assert_eq!(ghost_v.linvel, Vec2::new(-12.0, 30.0));
    assert_eq!(ghost_v.angvel, 1.25);
}

#[test]
fn diagonal_is_replaced_when_vertical_partner_changes() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 330.0), true);
    app.update();
    let before = ghosts_of(&app, a).get(GhostSlot::Diagonal).expect("diagonal ghost");
    assert!(before.offset.abs_diff_eq(Vec2::new(-1200.0, -680.0), 1e-3));

    // Same right edge, opposite vertical edge: Left + Top instead of Left + Bottom.
    app.world_mut().get_mut::<Transform>(a).unwrap().translation.y = -330.0;
    app.update();

    let ghosts = ghosts_of(&app, a);
    assert!(ghosts.is_live(GhostSlot::Left));
    assert!(ghosts.is_live(GhostSlot::Top));
    assert!(!ghosts.is_live(GhostSlot::Bottom));
    let after = ghosts.get(GhostSlot::Diagonal).expect("diagonal ghost");
    assert!(after.offset.abs_diff_eq(Vec2::new(-1200.0, 680.0), 1e-3));
    assert_ne!(after.entity, before.entity);
    assert!(app.world().get_entity(before.entity).is_err());

    let diag_pos = app.world().get::<Transform>(after.entity).unwrap().translation;
    assert!(diag_pos
        .truncate()
        .abs_diff_eq(Vec2::new(590.0 - 1200.0, -330.0 + 680.0), 1e-3));
    assert_eq!(asteroid_count(app.world_mut()), 4);
}

#[test]
fn approaching_body_is_not_mirrored_or_wrapped() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(0.0, 360.0), false);
    app.update();

    assert!(ghosts_of(&app, a).is_empty());
    let pos = app.world().get::<Transform>(a).unwrap().translation;
    assert_eq!(pos.y, 360.0, "not entered, so no relocation");
}

// ── Entry and relocation ──────────────────────────────────────────────────────

#[test]
fn passing_closest_approach_enables_wrapping() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(0.0, 800.0), false);
    app.update(); // closest = 800

    let set_y = |app: &mut App, y: f32| {
        app.world_mut().get_mut::<Transform>(a).unwrap().translation.y = y;
        app.update();
    };
    set_y(&mut app, 700.0);
    assert!(!app.world().get::<EntryTracker>(a).unwrap().has_entered());

    // Moving away again: entered, and immediately wrapped to the bottom edge.
    set_y(&mut app, 750.0);
    assert!(app.world().get::<EntryTracker>(a).unwrap().has_entered());
    let pos = app.world().get::<Transform>(a).unwrap().translation;
    assert_eq!(pos.y, -340.0);
    assert_eq!(pos.x, 0.0);

    // Sitting on the bottom edge it pokes out below, so it is mirrored above.
    let ghosts = ghosts_of(&app, a);
    assert_eq!(ghosts.len(), 1);
    assert_eq!(
        ghosts.get(GhostSlot::Top).map(|g| g.offset),
        Some(Vec2::new(0.0, 680.0))
    );
}

#[test]
fn relocation_replaces_old_ghosts() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Medium, Vec2::new(590.0, 0.0), true);
    app.update();
    let old_left = ghosts_of(&app, a).get(GhostSlot::Left).unwrap().entity;

    app.world_mut().get_mut::<Transform>(a).unwrap().translation.x = 605.0;
    app.update();

    let pos = app.world().get::<Transform>(a).unwrap().translation;
    assert!((pos.x + 600.0).abs() < 1e-3);
    assert!(app.world().get_entity(old_left).is_err());
    let ghosts = ghosts_of(&app, a);
    assert_eq!(ghosts.len(), 1);
    let right = ghosts.get(GhostSlot::Right).expect("right ghost");
    assert!(right.offset.abs_diff_eq(Vec2::new(1200.0, 0.0), 1e-3));
    assert_eq!(asteroid_count(app.world_mut()), 2);
}

#[test]
fn relocation_keeps_velocity_and_crossing_axis() {
    let mut app = arena_app(false);
    let a = spawn_with(
        &mut app,
        AsteroidSpawn {
            size: AsteroidSize::Small,
            position: Vec2::new(0.0, 0.0),
            rotation: 0.3,
            linvel: Vec2::new(45.0, -7.5),
            angvel: -0.8,
            entered: true,
        },
    );
    app.update();
    app.world_mut().get_mut::<Transform>(a).unwrap().translation = Vec3::new(612.0, 123.0, 0.05);
    app.update();

    let tf = app.world().get::<Transform>(a).unwrap();
    assert!((tf.translation.x + 600.0).abs() < 1e-3, "wrapped to min_x");
    assert_eq!(tf.translation.y, 123.0);
    let v = app.world().get::<Velocity>(a).unwrap();
    assert_eq!(v.linvel, Vec2::new(45.0, -7.5));
    assert_eq!(v.angvel, -0.8);
}

// ── Destruction ───────────────────────────────────────────────────────────────

#[test]
fn shooting_a_ghost_cascades_to_parent() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 330.0), true);
    app.update();
    let ghosts: Vec<Entity> = ghosts_of(&app, a).entities().collect();
    assert_eq!(ghosts.len(), 3);

    shoot(&mut app, ghosts[0]);
    app.update();

    assert!(app.world().get_entity(a).is_err());
    for ghost in ghosts {
        assert!(app.world().get_entity(ghost).is_err());
    }
    let children = authorities(app.world_mut());
    assert_eq!(children.len(), 2);
    for child in children {
        assert_eq!(
            *app.world().get::<AsteroidSize>(child).unwrap(),
            AsteroidSize::Medium
        );
    }
}

#[test]
fn ghosts_of_a_parent_despawned_elsewhere_are_swept() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 330.0), true);
    app.update();
    assert_eq!(asteroid_count(app.world_mut()), 4);

    app.world_mut().despawn(a);
    app.update();
    assert_eq!(asteroid_count(app.world_mut()), 0);
}

#[test]
fn ship_touching_a_ghost_reports_the_parent() {
    let mut app = arena_app(false);
    let a = spawn_at(&mut app, AsteroidSize::Large, Vec2::new(590.0, 0.0), true);
    app.update();
    let ghost = ghosts_of(&app, a).get(GhostSlot::Left).unwrap().entity;
    let ship = app.world_mut().spawn(Ship { vulnerable: true }).id();

    hit(&mut app, ghost, ship);
    app.update();

    let hits: Vec<ShipHit> = app
        .world()
        .resource::<Messages<ShipHit>>()
        .iter_current_update_messages()
        .copied()
        .collect();
    assert_eq!(hits, vec![ShipHit { ship, asteroid: a }]);
    assert!(app.world().get_entity(a).is_ok(), "ship contact leaves the asteroid");
}

// ── Waves ─────────────────────────────────────────────────────────────────────

#[test]
fn first_wave_spawns_off_screen() {
    let mut app = arena_app(true);
    let state = app.world().resource::<WaveState>().clone();
    assert_eq!(state.index, 0);
    assert_eq!(state.remaining(), 4);
    assert_eq!(authoritative_count(app.world_mut()), 4);

    let mut q = app
        .world_mut()
        .query_filtered::<(&Transform, &EntryTracker), With<GhostSet>>();
    for (transform, tracker) in q.iter(app.world()) {
        let p = transform.translation.truncate();
        assert!(p.x.abs() > 600.0 || p.y.abs() > 340.0);
        assert!(!tracker.has_entered());
    }
}

#[test]
fn clearing_a_wave_starts_a_bigger_one() {
    let mut app = arena_app(true);

    // 4 Large → 8 Medium → 24 Small → cleared
    for _ in 0..3 {
        for asteroid in authorities(app.world_mut()) {
            shoot(&mut app, asteroid);
        }
        app.update();
    }

    let state = app.world().resource::<WaveState>().clone();
    assert_eq!(state.index, 1);
    assert_eq!(state.destroyed, 36);
    assert_eq!(state.score, 3600);
    assert_eq!(state.remaining(), 5);
    assert_eq!(authoritative_count(app.world_mut()), 5);
}

#[test]
fn remaining_follows_fragmentation() {
    let mut app = arena_app(true);
    let first = authorities(app.world_mut())[0];
    shoot(&mut app, first);
    app.update();

    // One Large gone, two Medium in its place.
    assert_eq!(app.world().resource::<WaveState>().remaining(), 5);
    assert_eq!(authoritative_count(app.world_mut()), 5);
}

#[test]
fn outside_despawns_still_let_the_wave_clear() {
    let mut app = arena_app(true);
    let wave = authorities(app.world_mut());
    assert_eq!(wave.len(), 4);

    app.world_mut().despawn(wave[0]);
    app.update();
    let state = app.world().resource::<WaveState>().clone();
    assert_eq!(state.remaining(), 3);
    assert_eq!(state.index, 0);

    for entity in &wave[1..] {
        app.world_mut().despawn(*entity);
    }
    app.update();
    let state = app.world().resource::<WaveState>().clone();
    assert_eq!(state.index, 1);
    assert_eq!(state.remaining(), 5);
    assert_eq!(state.destroyed, 0);
    assert_eq!(authoritative_count(app.world_mut()), 5);
}

#[test]
fn reset_restarts_wave_zero() {
    let mut app = arena_app(true);
    let first = authorities(app.world_mut())[0];
    shoot(&mut app, first);
    app.update();
    let before = authorities(app.world_mut());

    app.world_mut().write_message(ResetArena);
    app.update();

    let state = app.world().resource::<WaveState>().clone();
    assert_eq!(state.index, 0);
    assert_eq!(state.score, 0);
    assert_eq!(state.remaining(), 4);
    for old in before {
        assert!(app.world().get_entity(old).is_err());
    }
    assert_eq!(authoritative_count(app.world_mut()), 4);
}
