//! Flappy Brielle - a side-scrolling Valentine's mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, boss)
//! - `engine`: Round lifecycle facade with snapshots for the presentation layer
//! - `tuning`: Data-driven game balance
//! - `highscores`: Top-10 leaderboard and its storage backends
//! - `ui`: Presentation-only screen flow (menu, name entry, leaderboard)
//! - `renderer`: Snapshot to draw commands, painted on a 2D canvas in the browser
//! - `platform`: Browser/native platform abstraction

pub mod engine;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use engine::{Engine, PlayerContext, Snapshot};
pub use highscores::{HighScores, LeaderboardError, ScoreEntry, ScoreStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Default tuning values, tuned for ~60 ticks per second
pub mod consts {
    /// Nominal host frame length (ms) used by headless runners
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Downward acceleration (px/tick², ~750 px/s² at 60 Hz)
    pub const GRAVITY: f32 = 0.21;
    /// Velocity set on activation (px/tick, ~330 px/s upward)
    pub const JUMP_STRENGTH: f32 = -5.5;
    /// Base horizontal scroll speed (px/tick, ~180 px/s)
    pub const SCROLL_SPEED: f32 = 3.0;

    /// Actor sprite
    pub const ACTOR_X: f32 = 100.0;
    pub const ACTOR_START_Y: f32 = 250.0;
    pub const ACTOR_SIZE: f32 = 180.0;
    /// Highest allowed sprite top (slight overshoot above the field)
    pub const CEILING_Y: f32 = -50.0;
    /// Distance from the field bottom the sprite top may not pass
    pub const FLOOR_MARGIN: f32 = 120.0;

    /// Forgiving hitbox inset inside the 180px sprite
    pub const HITBOX_LEFT: f32 = 25.0;
    pub const HITBOX_TOP: f32 = 40.0;
    pub const HITBOX_WIDTH: f32 = 110.0;
    pub const HITBOX_HEIGHT: f32 = 100.0;

    /// Fence geometry
    pub const OBSTACLE_GAP: f32 = 380.0;
    pub const OBSTACLE_WIDTH: f32 = 100.0;
    pub const MIN_SEGMENT_HEIGHT: f32 = 80.0;

    /// Spawn interval range (ms), drawn uniformly per spawn
    pub const SPAWN_INTERVAL_MIN_MS: f32 = 1500.0;
    pub const SPAWN_INTERVAL_MAX_MS: f32 = 2500.0;

    /// Entities at or left of this x are pruned
    pub const PRUNE_X: f32 = -150.0;

    /// Coin (milk bottle) geometry and placement
    pub const COIN_SIZE: f32 = 45.0;
    pub const COIN_VALUE: u32 = 1;
    pub const COIN_LEAD_DISTANCE: f32 = 300.0;
    pub const COIN_TRAIL_DISTANCE: f32 = 350.0;
    pub const COIN_GAP_OFFSET_X: f32 = 25.0;
    /// Vertical margin kept free above/below free-floating coins
    pub const COIN_EDGE_MARGIN: f32 = 75.0;

    /// Boss encounter
    pub const BOSS_DURATION_MS: f32 = 10_000.0;
    pub const BOSS_SIZE: f32 = 150.0;
    pub const BOSS_RIGHT_MARGIN: f32 = 200.0;
    pub const BOSS_AMPLITUDE: f32 = 150.0;
    /// Oscillation angular frequency (radians per second)
    pub const BOSS_FREQUENCY: f32 = 2.0;
    pub const PROJECTILE_SIZE: f32 = 40.0;
}
