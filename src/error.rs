//! Arena error types.
//!
//! Nothing in the arena core is fatal: every error here is logged by the
//! caller and the affected operation is skipped, leaving the previous state in
//! place.

use std::fmt;

/// Top-level error enum for the wrap arena.
#[derive(Debug, Clone, PartialEq)]
pub enum WrapError {
    /// The viewport cannot produce a usable arena rectangle.
    DegenerateViewport {
        /// Half of the visible world height.
        half_height: f32,
        /// Width ÷ height.
        aspect: f32,
    },

    /// A configured `[min, max]` range is inverted or not finite.
    InvalidRange {
        /// Name of the range (for logging).
        name: &'static str,
        min: f32,
        max: f32,
    },

    /// A value that must be strictly positive was zero or negative.
    NonPositive {
        name: &'static str,
        value: f32,
    },

    /// Size-class radii do not strictly shrink Large → Medium → Small.
    SizeOrdering,
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapError::DegenerateViewport {
                half_height,
                aspect,
            } => write!(
                f,
                "viewport cannot form an arena: half-height {} with aspect {}",
                half_height, aspect
            ),
            WrapError::InvalidRange { name, min, max } => {
                write!(f, "range '{}' is invalid: [{}, {}]", name, min, max)
            }
            WrapError::NonPositive { name, value } => {
                write!(f, "'{}' must be > 0, got {}", name, value)
            }
            WrapError::SizeOrdering => write!(
                f,
                "asteroid radii must strictly shrink large > medium > small"
            ),
        }
    }
}

impl std::error::Error for WrapError {}

/// Convenience alias: a `Result` using `WrapError` as the error type.
pub type WrapResult<T> = Result<T, WrapError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `min <= max` and both ends are finite.
pub fn validate_range(name: &'static str, min: f32, max: f32) -> WrapResult<()> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(WrapError::InvalidRange { name, min, max })
    }
}

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> WrapResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WrapError::NonPositive { name, value })
    }
}
