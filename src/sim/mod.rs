//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit time-step only (no wall-clock reads)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod state;
pub mod tick;

pub use state::{GamePhase, GameState, Obstacle, ObstacleKind, Particle, ParticleBurst};
pub use tick::{generate_wave, tick, TickInput};
