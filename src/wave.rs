//! Waves: off-screen spawn placement, asteroid bookkeeping, and reset.
//!
//! ## Placement
//!
//! Wave `n` spawns `wave_base_count + n` Large asteroids on evenly spaced
//! bearings (`i × 360° / N`, measured clockwise from +Y) around the arena
//! centre.  Each sits a random distance beyond the centre→corner distance, so
//! it starts off-screen whatever the aspect ratio.  It is turned to face a
//! jittered point near the centre and pushed forward along its local +Y.
//!
//! ## Bookkeeping
//!
//! [`WaveState::remaining`] is an explicit count of live authoritative
//! asteroids: it grows by `N` when a wave spawns and by `children − 1` for
//! every [`AsteroidDestroyed`].  When it reaches zero the next wave starts.
//! Asteroids despawned by code outside the arena send no message, so the
//! counter is also clamped to the live authoritative count every tick.

use crate::arena::{ArenaRect, ArenaTopology, Viewport};
use crate::asteroid::{spawn_asteroid, Asteroid, AsteroidSize, AsteroidSpawn};
use crate::config::ArenaConfig;
use crate::error::WrapResult;
use crate::fragment::AsteroidDestroyed;
use crate::ghost::GhostSet;
use bevy::prelude::*;
use rand::Rng;

/// Progress of the current session.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveState {
    /// Zero-based wave number.
    pub index: u32,
    /// Points earned so far.
    pub score: u32,
    /// Authoritative asteroids destroyed so far.
    pub destroyed: u32,
    remaining: u32,
}

impl WaveState {
    /// Live authoritative asteroids in the current wave.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn record_spawned(&mut self, count: u32) {
        self.remaining += count;
    }

    /// Book one destruction.  Returns `true` when it cleared the wave.
    pub fn record_destroyed(&mut self, children: u32, points: u32) -> bool {
        self.score += points;
        self.destroyed += 1;
        let before = self.remaining;
        self.remaining = (self.remaining + children).saturating_sub(1);
        before > 0 && self.remaining == 0
    }

    /// Clamp the counter to the number of authoritative asteroids actually
    /// alive.  Returns `true` when that cleared the wave.
    pub fn reconcile(&mut self, live: u32) -> bool {
        if live >= self.remaining {
            return false;
        }
        let before = self.remaining;
        self.remaining = live;
        debug!("Wave counter corrected from {before} to {live}");
        live == 0
    }
}

/// Request to clear the arena and start again from wave 0.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResetArena;

/// Where and how one wave asteroid starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlacement {
    /// Bearing from the centre, degrees clockwise from +Y.
    pub bearing_deg: f32,
    pub position: Vec2,
    /// Radians about +Z.
    pub rotation: f32,
    pub linvel: Vec2,
    /// Radians per second.
    pub angvel: f32,
}

impl SpawnPlacement {
    pub fn into_spawn(self) -> AsteroidSpawn {
        AsteroidSpawn {
            size: AsteroidSize::Large,
            position: self.position,
            rotation: self.rotation,
            linvel: self.linvel,
            angvel: self.angvel,
            entered: false,
        }
    }
}

/// Number of asteroids in wave `index`.
#[inline]
pub fn wave_size(base_count: u32, index: u32) -> u32 {
    base_count + index
}

/// Point `distance` from `center` on a bearing measured clockwise from +Y.
pub fn bearing_position(center: Vec2, bearing_deg: f32, distance: f32) -> Vec2 {
    let (sin, cos) = bearing_deg.to_radians().sin_cos();
    center + Vec2::new(sin, cos) * distance
}

/// Rotation (degrees) that points a body's local +Y from `start` at `target`.
///
/// `atan2` gives the direction from target to start relative to +X; adding
/// 90° turns the "up" forward axis to face back along it.
pub fn facing_rotation_deg(start: Vec2, target: Vec2) -> f32 {
    90.0 + (start.y - target.y).atan2(start.x - target.x).to_degrees()
}

/// Local +Y in world space for a body rotated `rotation` radians.
#[inline]
pub fn forward(rotation: f32) -> Vec2 {
    let (sin, cos) = rotation.sin_cos();
    Vec2::new(-sin, cos)
}

/// Starting placements for wave `index` around `arena`.
pub fn plan_wave(
    index: u32,
    arena: &ArenaRect,
    config: &ArenaConfig,
    rng: &mut impl Rng,
) -> Vec<SpawnPlacement> {
    let count = wave_size(config.wave_base_count, index);
    let center = arena.center();
    let corner = arena.corner_distance();
    let jitter = config.spawn_target_jitter;
    let spin = config.angvel_range_deg.to_radians();

    (0..count)
        .map(|i| {
            let bearing_deg = i as f32 * 360.0 / count as f32;
            let distance = rng.gen_range(
                corner + config.spawn_margin_min..=corner + config.spawn_margin_max,
            );
            let position = bearing_position(center, bearing_deg, distance);
            let target = center
                + Vec2::new(
                    rng.gen_range(-jitter..=jitter),
                    rng.gen_range(-jitter..=jitter),
                );
            let rotation = facing_rotation_deg(position, target).to_radians();
            let speed = rng.gen_range(config.spawn_speed_min..=config.spawn_speed_max);
            SpawnPlacement {
                bearing_deg,
                position,
                rotation,
                linvel: forward(rotation) * speed,
                angvel: rng.gen_range(-spin..=spin),
            }
        })
        .collect()
}

/// Spawn wave `index`, initialising the arena first if nothing has yet.
pub fn spawn_wave(
    commands: &mut Commands,
    topology: &mut ArenaTopology,
    viewport: &Viewport,
    config: &ArenaConfig,
    index: u32,
    rng: &mut impl Rng,
) -> WrapResult<Vec<Entity>> {
    let arena = topology.ensure_initialized(viewport)?;
    let entities = plan_wave(index, &arena, config, rng)
        .into_iter()
        .map(|placement| spawn_asteroid(commands, &placement.into_spawn(), config, rng))
        .collect();
    Ok(entities)
}

/// [`spawn_wave`] plus bookkeeping.  Failures are logged and the wave skipped.
fn begin_wave(
    commands: &mut Commands,
    state: &mut WaveState,
    topology: &mut ArenaTopology,
    viewport: &Viewport,
    config: &ArenaConfig,
) {
    match spawn_wave(
        commands,
        topology,
        viewport,
        config,
        state.index,
        &mut rand::thread_rng(),
    ) {
        Ok(spawned) => {
            state.record_spawned(spawned.len() as u32);
            info!("Wave {} started with {} asteroids", state.index + 1, spawned.len());
        }
        Err(e) => warn!("Wave {} not spawned: {e}", state.index + 1),
    }
}

/// Live authoritative asteroids, counted directly from the world.
pub fn authoritative_count(world: &mut World) -> usize {
    world
        .query_filtered::<(), (With<Asteroid>, With<GhostSet>)>()
        .iter(world)
        .count()
}

/// Destroy every asteroid, authoritative and ghost.  Returns how many
/// despawns were queued.
pub fn despawn_all_asteroids(
    commands: &mut Commands,
    asteroids: &Query<Entity, With<Asteroid>>,
) -> usize {
    let mut removed = 0;
    for entity in asteroids.iter() {
        commands.entity(entity).try_despawn();
        removed += 1;
    }
    removed
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup system: spawn wave 0.
pub fn start_first_wave_system(
    mut commands: Commands,
    mut state: ResMut<WaveState>,
    mut topology: ResMut<ArenaTopology>,
    viewport: Res<Viewport>,
    config: Res<ArenaConfig>,
) {
    begin_wave(
        &mut commands,
        &mut state,
        &mut topology,
        &viewport,
        &config,
    );
}

/// Score destroyed asteroids and start the next wave once none are left.
///
/// Runs after the hit pass has applied its commands, so `live` already
/// includes this tick's fragments and excludes this tick's destructions.
pub fn wave_progression_system(
    mut commands: Commands,
    mut destroyed: MessageReader<AsteroidDestroyed>,
    live: Query<(), (With<Asteroid>, With<GhostSet>)>,
    mut state: ResMut<WaveState>,
    mut topology: ResMut<ArenaTopology>,
    viewport: Res<Viewport>,
    config: Res<ArenaConfig>,
) {
    let mut started = false;
    for event in destroyed.read() {
        if state.record_destroyed(event.children, config.points_per_asteroid) {
            advance_wave(&mut commands, &mut state, &mut topology, &viewport, &config);
            started = true;
        }
    }
    // A wave begun this tick is still queued in `commands` and not yet live.
    if !started && state.reconcile(live.iter().count() as u32) {
        advance_wave(&mut commands, &mut state, &mut topology, &viewport, &config);
    }
}

fn advance_wave(
    commands: &mut Commands,
    state: &mut WaveState,
    topology: &mut ArenaTopology,
    viewport: &Viewport,
    config: &ArenaConfig,
) {
    info!("Wave {} cleared (score {})", state.index + 1, state.score);
    state.index += 1;
    begin_wave(commands, state, topology, viewport, config);
}

/// Clear the arena and restart from wave 0 on [`ResetArena`].
pub fn reset_arena_system(
    mut commands: Commands,
    mut requests: MessageReader<ResetArena>,
    asteroids: Query<Entity, With<Asteroid>>,
    mut state: ResMut<WaveState>,
    mut topology: ResMut<ArenaTopology>,
    viewport: Res<Viewport>,
    config: Res<ArenaConfig>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let removed = despawn_all_asteroids(&mut commands, &asteroids);
    info!("Arena reset: {removed} asteroid entities removed");
    *state = WaveState::default();
    begin_wave(
        &mut commands,
        &mut state,
        &mut topology,
        &viewport,
        &config,
    );
}
