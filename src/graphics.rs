use crate::asteroid::{Asteroid, Vertices};
use bevy::prelude::*;

/// Setup camera for 2D rendering
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d at scale 1.0 shows exactly the window area, which is
    // what the arena is measured from.
    commands.spawn(Camera2d);
    info!("Camera spawned");
}

/// Draw every asteroid outline, ghosts included, so a body crossing an edge
/// is visible on both sides.
pub fn asteroid_gizmo_system(
    mut gizmos: Gizmos,
    query: Query<(&Transform, &Vertices), With<Asteroid>>,
) {
    for (transform, vertices) in query.iter() {
        if vertices.0.len() < 2 {
            continue;
        }
        let pos = transform.translation.truncate();
        let rotation = transform.rotation;
        let world = |v: Vec2| pos + rotation.mul_vec3(v.extend(0.0)).truncate();

        for (i, v1) in vertices.0.iter().enumerate() {
            let v2 = vertices.0[(i + 1) % vertices.0.len()];
            gizmos.line_2d(world(*v1), world(v2), Color::WHITE);
        }
    }
}
