use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use wraparound::collision::Projectile;
use wraparound::wave::ResetArena;
use wraparound::{graphics, WrapArenaPlugin};

const SHOT_SPEED: f32 = 500.0;
const SHOT_RADIUS: f32 = 2.0;
const SHOT_LIFETIME: f32 = 1.5;

/// Demo shot fired from the centre toward the cursor.
#[derive(Component, Default)]
struct DemoShot {
    age: f32,
}

/// Configure Rapier physics: disable gravity for the space simulation.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

/// Left click fires a shot; `R` restarts from wave 1.
fn demo_input_system(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window>,
    mut reset: MessageWriter<ResetArena>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        reset.write(ResetArena);
    }
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    // Screen → world for a Camera2d at the origin
    let target = Vec2::new(
        cursor_pos.x - window.width() / 2.0,
        -(cursor_pos.y - window.height() / 2.0),
    );
    let Some(dir) = target.try_normalize() else {
        return;
    };

    commands.spawn((
        DemoShot::default(),
        Projectile,
        Transform::default(),
        RigidBody::KinematicVelocityBased,
        Velocity::linear(dir * SHOT_SPEED),
        Collider::ball(SHOT_RADIUS),
        Sensor,
        CollisionGroups::new(
            bevy_rapier2d::geometry::Group::GROUP_3,
            bevy_rapier2d::geometry::Group::GROUP_1,
        ),
        ActiveEvents::COLLISION_EVENTS,
        ActiveCollisionTypes::KINEMATIC_KINEMATIC,
    ));
}

fn demo_shot_system(
    mut commands: Commands,
    time: Res<Time>,
    mut shots: Query<(Entity, &mut DemoShot, &Transform)>,
    mut gizmos: Gizmos,
) {
    for (entity, mut shot, transform) in shots.iter_mut() {
        shot.age += time.delta_secs();
        if shot.age > SHOT_LIFETIME {
            commands.entity(entity).try_despawn();
            continue;
        }
        gizmos.circle_2d(
            transform.translation.truncate(),
            SHOT_RADIUS,
            Color::srgb(1.0, 1.0, 0.3),
        );
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Wraparound".into(),
            resolution: WindowResolution::new(1200, 680),
            resizable: false,
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    // pixels_per_meter(1.0) keeps Rapier units identical to screen pixels, so
    // arena bounds, velocities and collider sizes share one scale.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
    .add_plugins(WrapArenaPlugin::default())
    .add_systems(Startup, (graphics::setup_camera, setup_physics_config))
    .add_systems(
        Update,
        (
            demo_input_system,
            demo_shot_system,
            graphics::asteroid_gizmo_system,
        ),
    );

    app.run();
}
