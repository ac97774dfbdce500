//! Fragmentation: replacing a destroyed asteroid with smaller ones.
//!
//! | Destroyed | Children     |
//! |-----------|--------------|
//! | Large     | 2 × Medium   |
//! | Medium    | 3 × Small    |
//! | Small     | none         |
//!
//! Every child starts at the parent's position with the parent's velocity
//! scaled by a random factor, plus a sideways kick perpendicular to that
//! velocity (side picked at random).  Children start already inside the arena,
//! so they wrap and ghost from their first tick.

use crate::asteroid::{spawn_asteroid, AsteroidSize, AsteroidSpawn};
use crate::config::ArenaConfig;
use crate::ghost::{despawn_with_ghosts, GhostSet};
use bevy::prelude::*;
use rand::Rng;

/// Sent once per destroyed authoritative asteroid.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AsteroidDestroyed {
    pub size: AsteroidSize,
    pub position: Vec2,
    /// Number of children spawned in its place.
    pub children: u32,
}

/// The authoritative asteroid being broken up.
#[derive(Debug, Clone, Copy)]
pub struct FragmentTarget<'a> {
    pub entity: Entity,
    pub size: AsteroidSize,
    pub position: Vec2,
    pub linvel: Vec2,
    pub ghosts: &'a GhostSet,
}

/// Kinematics for the children of a `size` asteroid at `position` moving at
/// `linvel`.  Empty for `Small`.
pub fn plan_fragments(
    size: AsteroidSize,
    position: Vec2,
    linvel: Vec2,
    config: &ArenaConfig,
    rng: &mut impl Rng,
) -> Vec<AsteroidSpawn> {
    let Some((child_size, count)) = size.fragments() else {
        return Vec::new();
    };
    let side_axis = linvel.perp().normalize_or_zero();
    let angvel_range = config.angvel_range_deg.to_radians();

    (0..count)
        .map(|_| {
            let scale = rng.gen_range(
                config.fragment_speed_scale_min..=config.fragment_speed_scale_max,
            );
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let kick = rng.gen_range(
                config.fragment_side_impulse_min..=config.fragment_side_impulse_max,
            );
            AsteroidSpawn {
                size: child_size,
                position,
                rotation: rng.gen_range(0.0..std::f32::consts::TAU),
                linvel: linvel * scale + side_axis * side * kick,
                angvel: rng.gen_range(-angvel_range..=angvel_range),
                entered: true,
            }
        })
        .collect()
}

/// Break `target` apart: spawn its children, remove it with all its ghosts,
/// and report the destruction.  Returns the children.
pub fn fragment_asteroid(
    commands: &mut Commands,
    destroyed: &mut MessageWriter<AsteroidDestroyed>,
    target: FragmentTarget,
    config: &ArenaConfig,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let children: Vec<Entity> =
        plan_fragments(target.size, target.position, target.linvel, config, rng)
            .iter()
            .map(|spawn| spawn_asteroid(commands, spawn, config, rng))
            .collect();

    despawn_with_ghosts(commands, target.entity, target.ghosts);
    destroyed.write(AsteroidDestroyed {
        size: target.size,
        position: target.position,
        children: children.len() as u32,
    });
    debug!(
        "{:?} ({:?}) broke into {} fragments",
        target.entity,
        target.size,
        children.len()
    );
    children
}
