//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Per-tick physics; delta time only drives timers
//! - Injected RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod rng;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, actor_hitbox};
pub use rng::{RandomSource, RngState, ScriptedRandom};
pub use spawn::CoinPlacement;
pub use state::{
    Actor, Boss, Coin, EndCause, GameEvent, GameState, Obstacle, PlayField, Projectile,
    RoundState,
};
pub use tick::{TickInput, activate, autopilot, start_round, tick};
