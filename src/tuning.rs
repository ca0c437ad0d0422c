//! Data-driven game balance
//!
//! Every gameplay constant lives in one immutable [`Tuning`] value handed to
//! the engine at construction, so alternate tunings can be tested and
//! replayed deterministically. Defaults come from [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("difficulty tier table is empty")]
    NoTiers,

    #[error("difficulty tiers must start at 0 and ascend strictly (got {0} after {1})")]
    UnsortedTiers(u32, u32),

    #[error("boss milestones must ascend strictly (got {0} after {1})")]
    UnsortedMilestones(u32, u32),

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

/// One row of the difficulty table, selected by score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    /// Minimum score at which this tier applies
    pub threshold: u32,
    /// Spawn interval is divided by this
    pub spawn_multiplier: f32,
    /// Scroll speed is multiplied by this
    pub speed_multiplier: f32,
    /// Boss shoot cadence (ms)
    pub shoot_interval_ms: f32,
    /// Boss projectile speed (px/tick)
    pub projectile_speed: f32,
}

impl DifficultyTier {
    pub const BASE: Self = Self {
        threshold: 0,
        spawn_multiplier: 1.0,
        speed_multiplier: 1.0,
        shoot_interval_ms: 1200.0,
        projectile_speed: 5.0,
    };
}

fn default_tiers() -> Vec<DifficultyTier> {
    let tier = |threshold, mult, shoot_interval_ms, projectile_speed| DifficultyTier {
        threshold,
        spawn_multiplier: mult,
        speed_multiplier: mult,
        shoot_interval_ms,
        projectile_speed,
    };
    vec![
        DifficultyTier::BASE,
        tier(100, 1.2, 1000.0, 6.0),
        tier(200, 1.4, 800.0, 7.0),
        tier(300, 1.6, 600.0, 8.0),
        tier(500, 1.6, 500.0, 9.0),
    ]
}

/// How coins are hit-tested against the actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoinHitShape {
    /// Axis-aligned overlap with the coin's square box
    Box,
    /// Centre-to-centre distance below `radius`
    Circle { radius: f32 },
}

/// Actor hitbox, relative to the sprite's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self {
            left: HITBOX_LEFT,
            top: HITBOX_TOP,
            width: HITBOX_WIDTH,
            height: HITBOX_HEIGHT,
        }
    }
}

/// Boss encounter balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTuning {
    /// Ascending score milestones, each triggers at most one arrival per round
    pub milestones: Vec<u32>,
    pub duration_ms: f32,
    pub size: f32,
    /// Distance of the boss sprite's left edge from the field's right edge
    pub right_margin: f32,
    pub amplitude: f32,
    /// Oscillation angular frequency (rad/s)
    pub frequency: f32,
    pub projectile_size: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            milestones: vec![50, 100, 200, 500, 1000],
            duration_ms: BOSS_DURATION_MS,
            size: BOSS_SIZE,
            right_margin: BOSS_RIGHT_MARGIN,
            amplitude: BOSS_AMPLITUDE,
            frequency: BOSS_FREQUENCY,
            projectile_size: PROJECTILE_SIZE,
        }
    }
}

/// Complete gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub gravity: f32,
    pub jump_strength: f32,
    pub scroll_speed: f32,

    // === Actor ===
    pub actor_x: f32,
    pub actor_start_y: f32,
    pub actor_size: f32,
    pub ceiling_y: f32,
    pub floor_margin: f32,
    pub hitbox: Hitbox,

    // === Obstacles ===
    pub obstacle_gap: f32,
    pub obstacle_width: f32,
    pub min_segment_height: f32,
    pub spawn_interval_min_ms: f32,
    pub spawn_interval_max_ms: f32,
    pub prune_x: f32,

    // === Coins ===
    pub coin_size: f32,
    pub coin_value: u32,
    pub coin_hit: CoinHitShape,
    pub coin_lead_distance: f32,
    pub coin_trail_distance: f32,
    pub coin_gap_offset_x: f32,
    pub coin_edge_margin: f32,

    // === Difficulty ===
    pub tiers: Vec<DifficultyTier>,

    /// Boss sub-encounter; `None` plays the plain variant
    pub boss: Option<BossTuning>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_strength: JUMP_STRENGTH,
            scroll_speed: SCROLL_SPEED,

            actor_x: ACTOR_X,
            actor_start_y: ACTOR_START_Y,
            actor_size: ACTOR_SIZE,
            ceiling_y: CEILING_Y,
            floor_margin: FLOOR_MARGIN,
            hitbox: Hitbox::default(),

            obstacle_gap: OBSTACLE_GAP,
            obstacle_width: OBSTACLE_WIDTH,
            min_segment_height: MIN_SEGMENT_HEIGHT,
            spawn_interval_min_ms: SPAWN_INTERVAL_MIN_MS,
            spawn_interval_max_ms: SPAWN_INTERVAL_MAX_MS,
            prune_x: PRUNE_X,

            coin_size: COIN_SIZE,
            coin_value: COIN_VALUE,
            coin_hit: CoinHitShape::Box,
            coin_lead_distance: COIN_LEAD_DISTANCE,
            coin_trail_distance: COIN_TRAIL_DISTANCE,
            coin_gap_offset_x: COIN_GAP_OFFSET_X,
            coin_edge_margin: COIN_EDGE_MARGIN,

            tiers: default_tiers(),
            boss: None,
        }
    }
}

impl Tuning {
    /// Default tuning with the boss encounter enabled
    pub fn with_boss() -> Self {
        Self {
            boss: Some(BossTuning::default()),
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON override; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check table ordering and value ranges
    pub fn validate(&self) -> Result<(), TuningError> {
        let first = self.tiers.first().ok_or(TuningError::NoTiers)?;
        if first.threshold != 0 {
            return Err(TuningError::UnsortedTiers(first.threshold, 0));
        }
        for pair in self.tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(TuningError::UnsortedTiers(pair[1].threshold, pair[0].threshold));
            }
        }
        for tier in &self.tiers {
            if tier.spawn_multiplier <= 0.0 {
                return Err(TuningError::InvalidValue {
                    field: "spawn_multiplier",
                    value: tier.spawn_multiplier,
                });
            }
        }

        if self.spawn_interval_min_ms <= 0.0 {
            return Err(TuningError::InvalidValue {
                field: "spawn_interval_min_ms",
                value: self.spawn_interval_min_ms,
            });
        }
        if self.spawn_interval_max_ms < self.spawn_interval_min_ms {
            return Err(TuningError::InvalidValue {
                field: "spawn_interval_max_ms",
                value: self.spawn_interval_max_ms,
            });
        }

        if let Some(boss) = &self.boss {
            for pair in boss.milestones.windows(2) {
                if pair[1] <= pair[0] {
                    return Err(TuningError::UnsortedMilestones(pair[1], pair[0]));
                }
            }
            if boss.duration_ms <= 0.0 {
                return Err(TuningError::InvalidValue {
                    field: "boss.duration_ms",
                    value: boss.duration_ms,
                });
            }
        }

        Ok(())
    }

    /// Difficulty tier for a score (highest threshold not above it)
    pub fn tier_for(&self, score: u32) -> DifficultyTier {
        self.tiers
            .iter()
            .rev()
            .find(|t| score >= t.threshold)
            .copied()
            .unwrap_or(DifficultyTier::BASE)
    }

    /// Largest sprite-top y before the actor counts as fallen out
    pub fn floor_y(&self, field_height: f32) -> f32 {
        field_height - self.floor_margin
    }
}
