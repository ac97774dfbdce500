//! Asteroid overlap handling and ghost → parent delegation.
//!
//! Rapier reports sensor overlaps as `CollisionEvent::Started`.  Only two
//! kinds of partner matter:
//!
//! | Partner      | Effect |
//! |--------------|--------|
//! | [`Projectile`] | projectile removed; the authority fragments and vanishes with all its ghosts |
//! | [`Ship`]       | [`ShipHit`] sent if the ship is vulnerable; the asteroid survives |
//!
//! A ghost never resolves anything itself.  Every interaction is redirected to
//! its authoritative parent, so the ghost that was actually hit is removed as
//! part of the parent's ghost cascade.
//!
//! ## Collision groups
//!
//! | Layer       | Group   | Collides with |
//! |-------------|---------|---------------|
//! | Asteroids   | GROUP_1 | GROUP_2, GROUP_3 |
//! | Ship        | GROUP_2 | GROUP_1 |
//! | Projectiles | GROUP_3 | GROUP_1 |

use crate::asteroid::{Asteroid, AsteroidRole, AsteroidSize};
use crate::config::ArenaConfig;
use crate::fragment::{fragment_asteroid, AsteroidDestroyed, FragmentTarget};
use crate::ghost::GhostSet;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

/// Marker for anything that breaks asteroids on contact.  Spawned and aged by
/// the weapon code; removed here on impact.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Projectile;

/// The player ship as seen by the arena.  Owned by the ship/lives code, which
/// keeps `vulnerable` false while the ship is dead or invincible.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ship {
    pub vulnerable: bool,
}

/// A vulnerable ship overlapped an asteroid or one of its ghosts.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipHit {
    pub ship: Entity,
    /// Authoritative asteroid, even when the overlap was with a ghost.
    pub asteroid: Entity,
}

/// Resolve asteroid overlaps reported by Rapier this frame.
///
/// Destruction is tracked in a per-pass tombstone set: once an authority has
/// been destroyed, later events naming it (or any of its ghosts) are skipped,
/// as are events for projectiles already spent.
#[allow(clippy::too_many_arguments)]
pub fn asteroid_hit_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    q_roles: Query<&AsteroidRole, With<Asteroid>>,
    q_authority: Query<(&AsteroidSize, &Transform, &Velocity, &GhostSet), With<Asteroid>>,
    q_projectiles: Query<(), With<Projectile>>,
    q_ships: Query<&Ship>,
    mut destroyed: MessageWriter<AsteroidDestroyed>,
    mut ship_hits: MessageWriter<ShipHit>,
    config: Res<ArenaConfig>,
) {
    let mut rng = rand::thread_rng();
    let mut destroyed_authorities: HashSet<Entity> = Default::default();
    let mut spent_projectiles: HashSet<Entity> = Default::default();

    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        // Identify which entity is the asteroid and which the partner
        let (asteroid, other) = if q_roles.contains(e1) {
            (e1, e2)
        } else if q_roles.contains(e2) {
            (e2, e1)
        } else {
            continue;
        };
        let Ok(role) = q_roles.get(asteroid) else {
            continue;
        };
        let authority = role.authority(asteroid);

        if q_projectiles.contains(other) {
            if !spent_projectiles.insert(other) {
                continue;
            }
            commands.entity(other).try_despawn();

            if destroyed_authorities.contains(&authority) {
                continue;
            }
            let Ok((size, transform, velocity, ghosts)) = q_authority.get(authority) else {
                continue; // Parent already gone; nothing left to break
            };
            destroyed_authorities.insert(authority);
            if role.is_ghost() {
                debug!("{asteroid:?} forwarded a projectile hit to {authority:?}");
            }

            fragment_asteroid(
                &mut commands,
                &mut destroyed,
                FragmentTarget {
                    entity: authority,
                    size: *size,
                    position: transform.translation.truncate(),
                    linvel: velocity.linvel,
                    ghosts,
                },
                &config,
                &mut rng,
            );
        } else if let Ok(ship) = q_ships.get(other) {
            if destroyed_authorities.contains(&authority) || !ship.vulnerable {
                continue;
            }
            ship_hits.write(ShipHit {
                ship: other,
                asteroid: authority,
            });
        }
    }
}
