//! Toroidal arena for an Asteroids-style game.
//!
//! Asteroids fly in from off-screen, then wrap around the visible area.  A
//! body straddling an edge is mirrored by up to five ghost copies so it
//! appears (and can be hit) on both sides; hits on a ghost are resolved on
//! its authoritative parent, which breaks into smaller asteroids.

pub mod arena;
pub mod asteroid;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod fragment;
pub mod ghost;
pub mod graphics;
pub mod simulation;
pub mod wave;

pub use simulation::WrapArenaPlugin;
