//! Runtime arena configuration loaded from `assets/arena.toml`.
//!
//! [`ArenaConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_arena_config`] reads
//! `assets/arena.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<ArenaConfig>` to any system parameter list and read values
//! with `config.spawn_speed_min`, `config.large_radius`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `ArenaConfig::default()`.

use crate::constants::*;
use crate::error::{validate_positive, validate_range, WrapError, WrapResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/arena.toml";

/// Runtime-tunable arena and gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // ── Arena / Viewport ─────────────────────────────────────────────────────
    pub fallback_half_height: f32,
    pub fallback_aspect: f32,
    pub camera_scale: f32,

    // ── Wave Spawning ────────────────────────────────────────────────────────
    pub wave_base_count: u32,
    pub spawn_margin_min: f32,
    pub spawn_margin_max: f32,
    pub spawn_target_jitter: f32,
    pub spawn_speed_min: f32,
    pub spawn_speed_max: f32,
    pub angvel_range_deg: f32,

    // ── Fragmentation ────────────────────────────────────────────────────────
    pub fragment_speed_scale_min: f32,
    pub fragment_speed_scale_max: f32,
    pub fragment_side_impulse_min: f32,
    pub fragment_side_impulse_max: f32,

    // ── Asteroid Geometry ────────────────────────────────────────────────────
    pub large_radius: f32,
    pub medium_radius: f32,
    pub small_radius: f32,
    pub outline_vertices: usize,
    pub outline_jitter_min: f32,

    // ── Scoring ──────────────────────────────────────────────────────────────
    pub points_per_asteroid: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            // Arena / Viewport
            fallback_half_height: FALLBACK_HALF_HEIGHT,
            fallback_aspect: FALLBACK_ASPECT,
            camera_scale: CAMERA_SCALE,
            // Wave Spawning
            wave_base_count: WAVE_BASE_COUNT,
            spawn_margin_min: SPAWN_MARGIN_MIN,
            spawn_margin_max: SPAWN_MARGIN_MAX,
            spawn_target_jitter: SPAWN_TARGET_JITTER,
            spawn_speed_min: SPAWN_SPEED_MIN,
            spawn_speed_max: SPAWN_SPEED_MAX,
            angvel_range_deg: ANGVEL_RANGE_DEG,
            // Fragmentation
            fragment_speed_scale_min: FRAGMENT_SPEED_SCALE_MIN,
            fragment_speed_scale_max: FRAGMENT_SPEED_SCALE_MAX,
            fragment_side_impulse_min: FRAGMENT_SIDE_IMPULSE_MIN,
            fragment_side_impulse_max: FRAGMENT_SIDE_IMPULSE_MAX,
            // Asteroid Geometry
            large_radius: LARGE_RADIUS,
            medium_radius: MEDIUM_RADIUS,
            small_radius: SMALL_RADIUS,
            outline_vertices: OUTLINE_VERTICES,
            outline_jitter_min: OUTLINE_JITTER_MIN,
            // Scoring
            points_per_asteroid: POINTS_PER_ASTEROID,
        }
    }
}

impl ArenaConfig {
    /// Parse a TOML override string and validate the result.
    pub fn from_toml_str(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = toml::from_str::<ArenaConfig>(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every range and size relationship the arena systems rely on.
    pub fn validate(&self) -> WrapResult<()> {
        validate_positive("fallback_half_height", self.fallback_half_height)?;
        validate_positive("fallback_aspect", self.fallback_aspect)?;
        validate_positive("camera_scale", self.camera_scale)?;
        if self.wave_base_count == 0 {
            return Err(WrapError::NonPositive {
                name: "wave_base_count",
                value: 0.0,
            });
        }
        validate_range("spawn_margin", self.spawn_margin_min, self.spawn_margin_max)?;
        // A zero margin would let a spawn point sit exactly on the visible corner.
        validate_positive("spawn_margin_min", self.spawn_margin_min)?;
        validate_range("spawn_speed", self.spawn_speed_min, self.spawn_speed_max)?;
        validate_range(
            "fragment_speed_scale",
            self.fragment_speed_scale_min,
            self.fragment_speed_scale_max,
        )?;
        validate_range(
            "fragment_side_impulse",
            self.fragment_side_impulse_min,
            self.fragment_side_impulse_max,
        )?;
        validate_range("angvel_range_deg", 0.0, self.angvel_range_deg)?;
        validate_range("spawn_target_jitter", 0.0, self.spawn_target_jitter)?;
        validate_range("outline_jitter", self.outline_jitter_min, 1.0)?;
        validate_positive("outline_jitter_min", self.outline_jitter_min)?;
        if self.outline_vertices < 3 {
            return Err(WrapError::NonPositive {
                name: "outline_vertices",
                value: self.outline_vertices as f32,
            });
        }
        validate_positive("small_radius", self.small_radius)?;
        if !(self.large_radius > self.medium_radius && self.medium_radius > self.small_radius) {
            return Err(WrapError::SizeOrdering);
        }
        Ok(())
    }
}

/// Startup system: attempt to load `assets/arena.toml` and overwrite the
/// `ArenaConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse or validation errors
/// are logged but do not abort the simulation.  A missing file is not an error
/// (defaults are already in place from `init_resource`).
pub fn load_arena_config(mut config: ResMut<ArenaConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match ArenaConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded arena config from {CONFIG_PATH}");
            }
            Err(e) => {
                warn!("Failed to load {CONFIG_PATH}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}
