//! Centralised arena and gameplay constants.
//!
//! All tuneable values live here so they can be tuned in one place.
//! [`crate::config::ArenaConfig`] mirrors each of these and may override them
//! from `assets/arena.toml`.
//!
//! Angles are in degrees here because that is how they are tuned; systems
//! convert to radians at the point of use.

// ── Arena / Viewport ──────────────────────────────────────────────────────────

/// Half of the visible world height used when no window is available
/// (headless runs and tests).
///
/// With the default `Camera2d` one world unit is one logical pixel, so this is
/// half of the window height configured in `main.rs`.
pub const FALLBACK_HALF_HEIGHT: f32 = 340.0;

/// Width ÷ height used when no window is available.
pub const FALLBACK_ASPECT: f32 = 1200.0 / 680.0;

/// Orthographic scale applied to the window size when deriving the arena.
///
/// `1.0` matches Bevy's default `Camera2d` (one unit per logical pixel).
pub const CAMERA_SCALE: f32 = 1.0;

// ── Wave Spawning ─────────────────────────────────────────────────────────────

/// Large asteroids in wave 0.  Wave `n` spawns `WAVE_BASE_COUNT + n`.
pub const WAVE_BASE_COUNT: u32 = 4;

/// Extra distance beyond the centre→corner distance at which wave asteroids
/// appear.  Any value > 0 places the spawn point strictly off-screen
/// regardless of aspect ratio.
pub const SPAWN_MARGIN_MIN: f32 = 2.0;
pub const SPAWN_MARGIN_MAX: f32 = 5.0;

/// Half-extent of the square around the arena centre that wave asteroids aim at.
///
/// Small values send every asteroid straight through the middle; larger values
/// spread their paths.
pub const SPAWN_TARGET_JITTER: f32 = 3.0;

/// Forward impulse given to a freshly spawned wave asteroid (unit mass, u/s).
pub const SPAWN_SPEED_MIN: f32 = 40.0;
pub const SPAWN_SPEED_MAX: f32 = 80.0;

/// Angular velocity range for spawned and fragmented asteroids (°/s, symmetric).
pub const ANGVEL_RANGE_DEG: f32 = 90.0;

// ── Fragmentation ─────────────────────────────────────────────────────────────

/// Children inherit the parent's velocity multiplied by a factor in this range.
pub const FRAGMENT_SPEED_SCALE_MIN: f32 = 0.8;
pub const FRAGMENT_SPEED_SCALE_MAX: f32 = 1.6;

/// Sideways kick (perpendicular to the parent's velocity) given to each child.
///
/// Raising this makes fragments fan out wider; with very slow parents it
/// dominates the child's motion.
pub const FRAGMENT_SIDE_IMPULSE_MIN: f32 = 40.0;
pub const FRAGMENT_SIDE_IMPULSE_MAX: f32 = 60.0;

// ── Asteroid Geometry ─────────────────────────────────────────────────────────

/// Nominal outline radius per size class (world units).
///
/// Must strictly shrink Large → Medium → Small.  Keep Large well below half the
/// arena height, otherwise a body can overlap both opposite edges and the
/// ghost tests stop being mutually exclusive.
pub const LARGE_RADIUS: f32 = 42.0;
pub const MEDIUM_RADIUS: f32 = 24.0;
pub const SMALL_RADIUS: f32 = 12.0;

/// Vertex count of generated asteroid outlines.
pub const OUTLINE_VERTICES: usize = 10;

/// Each outline vertex sits at `radius × [OUTLINE_JITTER_MIN, 1.0]` from the centre.
pub const OUTLINE_JITTER_MIN: f32 = 0.72;

// ── Scoring ───────────────────────────────────────────────────────────────────

/// Points credited for every destroyed asteroid, whatever its size class.
pub const POINTS_PER_ASTEROID: u32 = 100;
