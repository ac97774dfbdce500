//! Asteroid components, spawning, and the per-body wrap bookkeeping.
//!
//! Every asteroid entity carries the [`Asteroid`] marker, a [`AsteroidSize`]
//! class and an [`AsteroidRole`]:
//!
//! - **Authoritative** bodies are the single source of truth for one logical
//!   asteroid.  They also carry an [`EntryTracker`] and a [`GhostSet`].
//! - **Ghost** bodies are offset copies straddling the opposite edge.  They
//!   hold a non-owning handle to their parent and nothing else refers to them
//!   except that parent's [`GhostSet`].
//!
//! Wave asteroids start off-screen and are exempt from edge relocation and
//! ghosting until they have passed their closest approach to the arena centre
//! ([`EntryTracker`]).

use crate::arena::{ArenaRect, ArenaTopology, Viewport};
use crate::config::ArenaConfig;
use crate::ghost::{GhostSet, GhostSlot};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

/// Marker component for any asteroid entity, authoritative or ghost.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Asteroid;

/// Size class.  Shrinks strictly on every fragmentation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// Child class and count produced when an asteroid of this class breaks.
    /// `None` for `Small`, which simply disappears.
    pub fn fragments(self) -> Option<(AsteroidSize, usize)> {
        match self {
            AsteroidSize::Large => Some((AsteroidSize::Medium, 2)),
            AsteroidSize::Medium => Some((AsteroidSize::Small, 3)),
            AsteroidSize::Small => None,
        }
    }

    /// Nominal outline radius for this class.
    pub fn radius(self, config: &ArenaConfig) -> f32 {
        match self {
            AsteroidSize::Large => config.large_radius,
            AsteroidSize::Medium => config.medium_radius,
            AsteroidSize::Small => config.small_radius,
        }
    }
}

/// Whether this entity is the real asteroid or a wrap ghost of one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsteroidRole {
    Authoritative,
    Ghost {
        /// Authoritative entity this ghost mirrors.  Non-owning.
        parent: Entity,
        /// Slot in the parent's [`GhostSet`] that owns this ghost.
        slot: GhostSlot,
    },
}

impl AsteroidRole {
    /// The entity that resolves interactions on behalf of `this`.
    #[inline]
    pub fn authority(self, this: Entity) -> Entity {
        match self {
            AsteroidRole::Authoritative => this,
            AsteroidRole::Ghost { parent, .. } => parent,
        }
    }

    #[inline]
    pub fn is_ghost(self) -> bool {
        matches!(self, AsteroidRole::Ghost { .. })
    }
}

/// Tracks whether an authoritative asteroid has been inside the arena yet.
///
/// Each observation is the distance from the arena centre.  The first one is
/// recorded as the closest approach; after that the closest value only
/// decreases, and the first observation farther than it marks the asteroid
/// as having entered.  The flag never reverts.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct EntryTracker {
    entered: bool,
    closest: Option<f32>,
}

impl EntryTracker {
    /// Tracker for a body still travelling in from off-screen.
    pub fn approaching() -> Self {
        Self::default()
    }

    /// Tracker for a body that starts inside (fragments).
    pub fn entered() -> Self {
        Self {
            entered: true,
            closest: None,
        }
    }

    #[inline]
    pub fn has_entered(&self) -> bool {
        self.entered
    }

    /// Closest recorded distance to the centre, if any has been recorded.
    #[inline]
    pub fn closest(&self) -> Option<f32> {
        self.closest
    }

    /// Feed the current distance to the centre.  Returns `true` on the single
    /// observation that flips the tracker to entered.
    pub fn observe(&mut self, distance: f32) -> bool {
        if self.entered {
            return false;
        }
        match self.closest {
            Some(closest) if distance > closest => {
                self.entered = true;
                true
            }
            _ => {
                self.closest = Some(distance);
                false
            }
        }
    }
}

/// Polygon vertices in local space.  Used for the collider, the shape bounds
/// and wireframe rendering.
#[derive(Component, Debug, Clone)]
pub struct Vertices(pub Vec<Vec2>);

/// Everything needed to put a new authoritative asteroid into the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsteroidSpawn {
    pub size: AsteroidSize,
    pub position: Vec2,
    /// Radians about +Z.
    pub rotation: f32,
    pub linvel: Vec2,
    /// Radians per second.
    pub angvel: f32,
    /// `false` for wave asteroids that start off-screen.
    pub entered: bool,
}

/// Spawn an authoritative asteroid with a freshly generated outline.
pub fn spawn_asteroid(
    commands: &mut Commands,
    spawn: &AsteroidSpawn,
    config: &ArenaConfig,
    rng: &mut impl Rng,
) -> Entity {
    let vertices = generate_outline(
        spawn.size.radius(config),
        config.outline_vertices,
        config.outline_jitter_min,
        rng,
    );
    let tracker = if spawn.entered {
        EntryTracker::entered()
    } else {
        EntryTracker::approaching()
    };
    let body = asteroid_body(&vertices);

    commands
        .spawn((
            (
                Transform::from_translation(spawn.position.extend(0.05))
                    .with_rotation(Quat::from_rotation_z(spawn.rotation)),
                Visibility::default(),
                Asteroid,
                spawn.size,
                AsteroidRole::Authoritative,
                tracker,
                GhostSet::default(),
                Vertices(vertices),
            ),
            body,
            Velocity {
                linvel: spawn.linvel,
                angvel: spawn.angvel,
            },
        ))
        .id()
}

/// Physics components shared by authoritative asteroids and ghosts.
///
/// Asteroids are velocity-driven kinematic sensors: Rapier integrates their
/// `Velocity` but applies no forces, so a ghost spawned with a copy of its
/// parent's velocity stays at a fixed offset for its whole life.
///
/// Collision groups:
/// - `GROUP_1`: asteroids belong to this group
/// - collide with `GROUP_2` (ship) and `GROUP_3` (projectiles); never with each other
pub fn asteroid_body(
    vertices: &[Vec2],
) -> (
    RigidBody,
    Collider,
    Sensor,
    CollisionGroups,
    ActiveEvents,
    ActiveCollisionTypes,
) {
    let fallback_radius = vertices
        .iter()
        .map(|v| v.length())
        .fold(1.0_f32, f32::max);
    (
        RigidBody::KinematicVelocityBased,
        Collider::convex_hull(vertices).unwrap_or_else(|| Collider::ball(fallback_radius)),
        Sensor,
        CollisionGroups::new(
            bevy_rapier2d::geometry::Group::GROUP_1,
            bevy_rapier2d::geometry::Group::GROUP_2 | bevy_rapier2d::geometry::Group::GROUP_3,
        ),
        ActiveEvents::COLLISION_EVENTS,
        // Kinematic sensors must opt in to overlaps with dynamic and kinematic bodies.
        ActiveCollisionTypes::DYNAMIC_KINEMATIC | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
    )
}

/// Irregular polygon: `vertex_count` evenly spaced spokes, each at
/// `radius × [jitter_min, 1.0]`.
pub fn generate_outline(
    radius: f32,
    vertex_count: usize,
    jitter_min: f32,
    rng: &mut impl Rng,
) -> Vec<Vec2> {
    let sides = vertex_count.max(3);
    (0..sides)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / sides as f32;
            let r = radius * rng.gen_range(jitter_min..=1.0);
            Vec2::new(r * angle.cos(), r * angle.sin())
        })
        .collect()
}

/// World-space axis-aligned bounds of the collision shape.
pub fn shape_bounds(transform: &Transform, vertices: &Vertices) -> Rect {
    let pos = transform.translation.truncate();
    let rot = transform.rotation;
    vertices
        .0
        .iter()
        .map(|v| pos + rot.mul_vec3(v.extend(0.0)).truncate())
        .fold(None, |acc: Option<Rect>, p| {
            Some(match acc {
                None => Rect::from_corners(p, p),
                Some(r) => r.union_point(p),
            })
        })
        .unwrap_or_else(|| Rect::from_corners(pos, pos))
}

/// Where a position that has left the arena is teleported to, or `None` while
/// it is still inside.  Each axis wraps independently to the opposite edge.
pub fn wrap_position(position: Vec2, arena: &ArenaRect) -> Option<Vec2> {
    if arena.contains(position) {
        return None;
    }
    let mut wrapped = position;
    if position.x > arena.max_x() {
        wrapped.x = arena.min_x();
    } else if position.x < arena.min_x() {
        wrapped.x = arena.max_x();
    }
    if position.y > arena.max_y() {
        wrapped.y = arena.min_y();
    } else if position.y < arena.min_y() {
        wrapped.y = arena.max_y();
    }
    Some(wrapped)
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Watch wave asteroids until they pass their closest approach to the centre.
pub fn track_arena_entry_system(
    mut topology: ResMut<ArenaTopology>,
    viewport: Res<Viewport>,
    mut query: Query<(Entity, &Transform, &mut EntryTracker), With<Asteroid>>,
) {
    let Ok(arena) = topology.ensure_initialized(&viewport) else {
        return;
    };
    let center = arena.center();

    for (entity, transform, mut tracker) in query.iter_mut() {
        if tracker.has_entered() {
            continue;
        }
        let distance = transform.translation.truncate().distance(center);
        if tracker.observe(distance) {
            debug!("{entity:?} entered the arena (closest approach passed)");
        }
    }
}

/// Teleport entered asteroids whose centre has left the arena to the opposite
/// edge.  Their ghosts are destroyed first; the ghost pass rebuilds them from
/// the new position.
pub fn wrap_relocation_system(
    mut commands: Commands,
    mut topology: ResMut<ArenaTopology>,
    viewport: Res<Viewport>,
    mut query: Query<(Entity, &mut Transform, &EntryTracker, &mut GhostSet), With<Asteroid>>,
) {
    let Ok(arena) = topology.ensure_initialized(&viewport) else {
        return;
    };

    for (entity, mut transform, tracker, mut ghosts) in query.iter_mut() {
        if !tracker.has_entered() {
            continue;
        }
        let Some(wrapped) = wrap_position(transform.translation.truncate(), &arena) else {
            continue;
        };
        ghosts.despawn_all(&mut commands);
        transform.translation.x = wrapped.x;
        transform.translation.y = wrapped.y;
        debug!("{entity:?} wrapped to ({:.1}, {:.1})", wrapped.x, wrapped.y);
    }
}
