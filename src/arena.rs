//! Arena topology: the visible rectangle and the wrap offsets derived from it.
//!
//! The arena is the camera's visible area in world units.  Everything that
//! leaves one edge reappears at the opposite one, so the rectangle also
//! defines the four offsets used to place ghosts:
//!
//! | Direction | Offset        | Used when the body overlaps… |
//! |-----------|---------------|------------------------------|
//! | Top       | `(0, +height)`| the bottom edge              |
//! | Bottom    | `(0, -height)`| the top edge                 |
//! | Right     | `(+width, 0)` | the left edge                |
//! | Left      | `(-width, 0)` | the right edge               |
//!
//! [`ArenaTopology`] is computed lazily and exactly once: any system that needs
//! bounds calls [`ArenaTopology::ensure_initialized`], so code that runs before
//! the startup initialisation still sees a valid rectangle.

use crate::config::ArenaConfig;
use crate::error::{WrapError, WrapResult};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// One of the four axis directions a ghost can be offset in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    Top,
    Bottom,
    Left,
    Right,
}

/// Camera parameters the arena is derived from.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// World-space point the camera looks at.
    pub center: Vec2,
    /// Half of the visible world height.
    pub half_height: f32,
    /// Width ÷ height of the window.
    pub aspect: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}

impl Viewport {
    /// Viewport used when no window exists (headless runs, tests).
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            center: Vec2::ZERO,
            half_height: config.fallback_half_height,
            aspect: config.fallback_aspect,
        }
    }

    /// Viewport of a default orthographic `Camera2d` looking at the origin.
    pub fn from_window(window: &Window, camera_scale: f32) -> Self {
        let height = window.height().max(f32::EPSILON);
        Self {
            center: Vec2::ZERO,
            half_height: height * 0.5 * camera_scale,
            aspect: window.width() / height,
        }
    }
}

/// Axis-aligned visible rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaRect {
    bounds: Rect,
}

impl ArenaRect {
    /// Build the rectangle from the camera half-height and aspect ratio
    /// (`width = height × aspect`).
    pub fn from_viewport(viewport: &Viewport) -> WrapResult<Self> {
        let Viewport {
            center,
            half_height,
            aspect,
        } = *viewport;
        let valid = half_height.is_finite()
            && half_height > 0.0
            && aspect.is_finite()
            && aspect > 0.0;
        if !valid {
            return Err(WrapError::DegenerateViewport {
                half_height,
                aspect,
            });
        }
        let height = half_height * 2.0;
        let size = Vec2::new(height * aspect, height);
        Ok(Self {
            bounds: Rect::from_center_size(center, size),
        })
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.bounds.min.x
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.bounds.max.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.bounds.min.y
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.bounds.max.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
    }

    /// Translation that carries a point to its wrapped copy in `direction`.
    pub fn offset(&self, direction: EdgeDirection) -> Vec2 {
        match direction {
            EdgeDirection::Top => Vec2::new(0.0, self.height()),
            EdgeDirection::Bottom => Vec2::new(0.0, -self.height()),
            EdgeDirection::Right => Vec2::new(self.width(), 0.0),
            EdgeDirection::Left => Vec2::new(-self.width(), 0.0),
        }
    }

    /// Distance from the centre to the `(max_x, max_y)` corner.
    ///
    /// Anything farther than this from the centre is off-screen whatever the
    /// aspect ratio.
    pub fn corner_distance(&self) -> f32 {
        (self.bounds.max - self.center()).length()
    }
}

/// Lazily-initialised arena rectangle shared by every arena system.
#[derive(Resource, Debug, Default, Clone)]
pub struct ArenaTopology {
    rect: Option<ArenaRect>,
}

impl ArenaTopology {
    /// Compute the rectangle on first call; later calls return the cached one
    /// and ignore `viewport`.
    pub fn ensure_initialized(&mut self, viewport: &Viewport) -> WrapResult<ArenaRect> {
        if let Some(rect) = self.rect {
            return Ok(rect);
        }
        let rect = ArenaRect::from_viewport(viewport)?;
        info!(
            "Arena initialised: {:.1} × {:.1} centred on ({:.1}, {:.1})",
            rect.width(),
            rect.height(),
            rect.center().x,
            rect.center().y
        );
        self.rect = Some(rect);
        Ok(rect)
    }

    /// The rectangle, if [`Self::ensure_initialized`] has succeeded.
    #[inline]
    pub fn rect(&self) -> Option<ArenaRect> {
        self.rect
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.rect.is_some()
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup system: take viewport parameters from the primary window when one
/// exists; otherwise keep the config fallback.
pub fn capture_viewport_system(
    mut viewport: ResMut<Viewport>,
    config: Res<ArenaConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    *viewport = match windows.single() {
        Ok(window) => Viewport::from_window(window, config.camera_scale),
        Err(_) => Viewport::from_config(&config),
    };
}

/// Startup system: compute the arena before any entity asks for it.
pub fn initialize_topology_system(mut topology: ResMut<ArenaTopology>, viewport: Res<Viewport>) {
    if let Err(e) = topology.ensure_initialized(&viewport) {
        warn!("Arena topology not initialised yet: {e}");
    }
}
