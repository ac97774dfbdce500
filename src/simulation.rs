//! Plugin wiring for the wrap arena.
//!
//! Per-tick order:
//!
//! 1. `Update`: entry tracking → wrap relocation → ghost sync → orphan sweep
//! 2. Rapier integrates velocities and reports sensor overlaps
//! 3. `PostUpdate`: hit resolution → wave progression → reset
//!
//! Relocation runs before ghost sync so a body that just teleported gets its
//! ghosts rebuilt from the new position in the same tick.

use crate::arena::{capture_viewport_system, initialize_topology_system, ArenaTopology, Viewport};
use crate::asteroid::{track_arena_entry_system, wrap_relocation_system};
use crate::collision::{asteroid_hit_system, ShipHit};
use crate::config::{load_arena_config, ArenaConfig};
use crate::fragment::AsteroidDestroyed;
use crate::ghost::{ghost_sync_system, prune_orphan_ghosts_system};
use crate::wave::{
    reset_arena_system, start_first_wave_system, wave_progression_system, ResetArena, WaveState,
};
use bevy::prelude::*;
use bevy_rapier2d::plugin::PhysicsSet;
use bevy_rapier2d::prelude::CollisionEvent;

/// Adds the arena resources, messages, and systems.
///
/// Does not add Rapier itself; the host registers `RapierPhysicsPlugin` (or,
/// in headless tests, writes `CollisionEvent`s by hand).
pub struct WrapArenaPlugin {
    /// Spawn wave 0 at startup.  Tests that place asteroids by hand turn
    /// this off.
    pub spawn_first_wave: bool,
}

impl Default for WrapArenaPlugin {
    fn default() -> Self {
        Self {
            spawn_first_wave: true,
        }
    }
}

impl Plugin for WrapArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaConfig>()
            .init_resource::<Viewport>()
            .init_resource::<ArenaTopology>()
            .init_resource::<WaveState>()
            .add_message::<CollisionEvent>()
            .add_message::<AsteroidDestroyed>()
            .add_message::<ShipHit>()
            .add_message::<ResetArena>()
            .add_systems(
                Startup,
                (
                    load_arena_config,
                    capture_viewport_system,
                    initialize_topology_system,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    track_arena_entry_system,
                    wrap_relocation_system,
                    ghost_sync_system,
                    prune_orphan_ghosts_system,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                (
                    asteroid_hit_system,
                    wave_progression_system,
                    reset_arena_system,
                )
                    .chain()
                    .after(PhysicsSet::Writeback),
            );

        if self.spawn_first_wave {
            app.add_systems(
                Startup,
                start_first_wave_system.after(initialize_topology_system),
            );
        }
    }
}
