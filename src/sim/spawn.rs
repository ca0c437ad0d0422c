//! Obstacle and coin spawning
//!
//! A tick-accumulated timer spawns a fence pair at the right edge whenever it
//! passes the current interval; each fence brings one coin along.

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{Coin, GameState, Obstacle, PlayField};
use crate::tuning::{DifficultyTier, Tuning};

/// Where a coin appears relative to its fence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinPlacement {
    /// Ahead of the fence, at a random height
    Before,
    /// Centred in the fence gap
    InGap,
    /// Behind the fence, at a random height
    After,
}

impl CoinPlacement {
    /// Map a uniform sample onto the three placements
    pub fn from_sample(sample: f32) -> Self {
        if sample < 1.0 / 3.0 {
            CoinPlacement::Before
        } else if sample < 2.0 / 3.0 {
            CoinPlacement::InGap
        } else {
            CoinPlacement::After
        }
    }
}

/// Draw an unscaled spawn interval (ms)
pub fn draw_spawn_interval(tuning: &Tuning, rng: &mut impl RandomSource) -> f32 {
    rng.range(tuning.spawn_interval_min_ms, tuning.spawn_interval_max_ms)
}

/// Advance the spawn timer and spawn when it runs out.
/// Returns true if a fence was spawned this tick.
pub fn update_spawner(
    state: &mut GameState,
    tuning: &Tuning,
    field: PlayField,
    tier: &DifficultyTier,
    dt_ms: f32,
    rng: &mut impl RandomSource,
) -> bool {
    state.spawn_timer_ms += dt_ms;
    let interval = state.spawn_interval_ms / tier.spawn_multiplier;
    if state.spawn_timer_ms <= interval {
        return false;
    }

    state.spawn_timer_ms = 0.0;
    state.spawn_interval_ms = draw_spawn_interval(tuning, rng);

    let obstacle = spawn_obstacle(state, tuning, field, rng);
    spawn_coin(state, tuning, field, &obstacle, rng);
    log::debug!(
        "Spawned fence {} (top {:.0}, bottom {:.0}), next in {:.0}ms",
        obstacle.id,
        obstacle.top_height,
        obstacle.bottom_height,
        state.spawn_interval_ms
    );
    state.obstacles.push(obstacle);
    true
}

/// Build a fence pair at the right edge with a random gap height
pub fn spawn_obstacle(
    state: &mut GameState,
    tuning: &Tuning,
    field: PlayField,
    rng: &mut impl RandomSource,
) -> Obstacle {
    let min = tuning.min_segment_height;
    let max = field.height - tuning.obstacle_gap - min;
    let top_height = rng.range(min, max);
    Obstacle {
        id: state.next_entity_id(),
        x: field.width,
        top_height,
        bottom_height: field.height - top_height - tuning.obstacle_gap,
    }
}

/// Place the coin that accompanies `obstacle`
pub fn spawn_coin(
    state: &mut GameState,
    tuning: &Tuning,
    field: PlayField,
    obstacle: &Obstacle,
    rng: &mut impl RandomSource,
) {
    let placement = CoinPlacement::from_sample(rng.next_unit());
    let pos = match placement {
        CoinPlacement::Before => Vec2::new(
            obstacle.x - tuning.coin_lead_distance,
            free_coin_y(tuning, field, rng),
        ),
        CoinPlacement::InGap => Vec2::new(
            obstacle.x + tuning.coin_gap_offset_x,
            obstacle.top_height + tuning.obstacle_gap / 2.0 - tuning.coin_size / 2.0,
        ),
        CoinPlacement::After => Vec2::new(
            obstacle.x + tuning.coin_trail_distance,
            free_coin_y(tuning, field, rng),
        ),
    };
    let id = state.next_entity_id();
    state.coins.push(Coin {
        id,
        pos,
        collected: false,
    });
}

fn free_coin_y(tuning: &Tuning, field: PlayField, rng: &mut impl RandomSource) -> f32 {
    rng.range(
        tuning.coin_edge_margin,
        field.height - tuning.coin_edge_margin,
    )
}

/// Scroll fences and coins left and drop the ones that left the screen
pub fn scroll(state: &mut GameState, tuning: &Tuning, speed: f32) {
    for obstacle in &mut state.obstacles {
        obstacle.x -= speed;
    }
    for coin in &mut state.coins {
        coin.pos.x -= speed;
    }
    state.obstacles.retain(|o| o.x > tuning.prune_x);
    state.coins.retain(|c| c.pos.x > tuning.prune_x);
}
