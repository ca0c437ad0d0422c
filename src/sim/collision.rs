//! Collision detection
//!
//! Everything in the game is an axis-aligned box in screen space (y grows
//! downward). Coins may optionally use a circle test instead.

use glam::Vec2;

use super::state::{Coin, Obstacle, Projectile};
use crate::tuning::{CoinHitShape, Tuning};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            min: Vec2::new(left, top),
            max: Vec2::new(right, bottom),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Rects with no area never overlap anything
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// The actor's forgiving hitbox for a sprite top at `y`
pub fn actor_hitbox(tuning: &Tuning, y: f32) -> Rect {
    let hb = &tuning.hitbox;
    let left = tuning.actor_x + hb.left;
    let top = y + hb.top;
    Rect::new(left, top, left + hb.width, top + hb.height)
}

/// Top and bottom fence rects of an obstacle
pub fn obstacle_rects(tuning: &Tuning, obstacle: &Obstacle, field_height: f32) -> (Rect, Rect) {
    let right = obstacle.x + tuning.obstacle_width;
    let top = Rect::new(obstacle.x, 0.0, right, obstacle.top_height);
    let bottom = Rect::new(
        obstacle.x,
        field_height - obstacle.bottom_height,
        right,
        field_height,
    );
    (top, bottom)
}

pub fn obstacle_hit(
    tuning: &Tuning,
    hitbox: &Rect,
    obstacle: &Obstacle,
    field_height: f32,
) -> bool {
    let (top, bottom) = obstacle_rects(tuning, obstacle, field_height);
    hitbox.overlaps(&top) || hitbox.overlaps(&bottom)
}

pub fn coin_rect(tuning: &Tuning, coin: &Coin) -> Rect {
    Rect::from_pos_size(coin.pos, Vec2::splat(tuning.coin_size))
}

/// Whether an uncollected coin is touched; collected coins never hit
pub fn coin_hit(tuning: &Tuning, hitbox: &Rect, coin: &Coin) -> bool {
    if coin.collected {
        return false;
    }
    let rect = coin_rect(tuning, coin);
    match tuning.coin_hit {
        CoinHitShape::Box => hitbox.overlaps(&rect),
        CoinHitShape::Circle { radius } => hitbox.center().distance(rect.center()) < radius,
    }
}

pub fn projectile_hit(hitbox: &Rect, projectile: &Projectile, size: f32) -> bool {
    hitbox.overlaps(&Rect::from_pos_size(projectile.pos, Vec2::splat(size)))
}
