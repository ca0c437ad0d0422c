//! Scene building: snapshot -> flat list of draw commands
//!
//! Kept free of browser types so the layout can be checked natively.

use glam::Vec2;

use crate::engine::Snapshot;
use crate::sim::Rect;
use crate::sim::collision::{coin_rect, obstacle_rects};
use crate::sim::{PlayField, RoundState, actor_hitbox};
use crate::tuning::Tuning;

/// Valentine palette
pub mod palette {
    pub const SKY: &str = "#ffe4ec";
    pub const FENCE: &str = "#b5651d";
    pub const FENCE_CAP: &str = "#8b4513";
    pub const MILK: &str = "#fdfdfd";
    pub const MILK_CAP: &str = "#4da6ff";
    pub const ACTOR: &str = "#ff6f91";
    pub const ACTOR_WING: &str = "#ffffff";
    pub const BOSS: &str = "#6a0dad";
    pub const PROJECTILE: &str = "#e63946";
    pub const DIM: &str = "rgba(0, 0, 0, 0.35)";
}

/// Height of the darker band at the open end of each fence segment
const FENCE_CAP_HEIGHT: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect { rect: Rect, color: &'static str },
    Circle {
        center: Vec2,
        radius: f32,
        color: &'static str,
    },
}

/// Back-to-front draw list for one frame
pub fn build(snapshot: &Snapshot, tuning: &Tuning, field: PlayField) -> Vec<DrawCmd> {
    let mut cmds = Vec::with_capacity(
        4 + snapshot.obstacles.len() * 4 + snapshot.coins.len() * 2 + snapshot.projectiles.len(),
    );

    cmds.push(DrawCmd::Rect {
        rect: Rect::new(0.0, 0.0, field.width, field.height),
        color: palette::SKY,
    });

    for obstacle in &snapshot.obstacles {
        let (top, bottom) = obstacle_rects(tuning, obstacle, field.height);
        for (rect, cap_top) in [(top, top.max.y - FENCE_CAP_HEIGHT), (bottom, bottom.min.y)] {
            if rect.is_empty() {
                continue;
            }
            cmds.push(DrawCmd::Rect {
                rect,
                color: palette::FENCE,
            });
            cmds.push(DrawCmd::Rect {
                rect: Rect::new(rect.min.x, cap_top, rect.max.x, cap_top + FENCE_CAP_HEIGHT),
                color: palette::FENCE_CAP,
            });
        }
    }

    for coin in snapshot.coins.iter().filter(|c| !c.collected) {
        let rect = coin_rect(tuning, coin);
        let size = rect.max - rect.min;
        let neck_y = rect.min.y + size.y * 0.25;
        cmds.push(DrawCmd::Rect {
            rect: Rect::new(
                rect.min.x + size.x * 0.2,
                neck_y,
                rect.max.x - size.x * 0.2,
                rect.max.y,
            ),
            color: palette::MILK,
        });
        cmds.push(DrawCmd::Rect {
            rect: Rect::new(
                rect.min.x + size.x * 0.3,
                rect.min.y,
                rect.max.x - size.x * 0.3,
                neck_y,
            ),
            color: palette::MILK_CAP,
        });
    }

    let hitbox = actor_hitbox(tuning, snapshot.actor_y);
    let body = hitbox.center();
    let radius = (hitbox.max.y - hitbox.min.y) / 2.0;
    cmds.push(DrawCmd::Circle {
        center: body,
        radius,
        color: palette::ACTOR,
    });
    // Wing flips up while rising
    let wing_dy = if snapshot.actor_velocity < 0.0 {
        -radius * 0.4
    } else {
        radius * 0.2
    };
    cmds.push(DrawCmd::Circle {
        center: body + Vec2::new(-radius * 0.6, wing_dy),
        radius: radius * 0.35,
        color: palette::ACTOR_WING,
    });

    if let (Some(view), Some(boss)) = (&snapshot.boss, &tuning.boss) {
        cmds.push(DrawCmd::Rect {
            rect: Rect::from_pos_size(Vec2::new(view.x, view.y), Vec2::splat(boss.size)),
            color: palette::BOSS,
        });
    }

    let shot = tuning
        .boss
        .as_ref()
        .map_or(crate::consts::PROJECTILE_SIZE, |b| b.projectile_size);
    for p in &snapshot.projectiles {
        cmds.push(DrawCmd::Circle {
            center: p.pos + Vec2::splat(shot / 2.0),
            radius: shot / 2.0,
            color: palette::PROJECTILE,
        });
    }

    if snapshot.round_state == RoundState::Ended {
        cmds.push(DrawCmd::Rect {
            rect: Rect::new(0.0, 0.0, field.width, field.height),
            color: palette::DIM,
        });
    }

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::sim::{Coin, Obstacle, ScriptedRandom};

    fn snapshot() -> Snapshot {
        let engine = Engine::with_rng(Tuning::default(), ScriptedRandom::constant(0.5));
        engine.snapshot()
    }

    #[test]
    fn test_idle_scene() {
        let cmds = build(&snapshot(), &Tuning::default(), PlayField::default());
        // Sky, body, wing
        assert_eq!(cmds.len(), 3);
        assert!(matches!(cmds[0], DrawCmd::Rect { color: palette::SKY, .. }));
    }

    #[test]
    fn test_collected_coins_hidden() {
        let mut snap = snapshot();
        snap.coins = vec![
            Coin {
                id: 1,
                pos: Vec2::new(500.0, 200.0),
                collected: false,
            },
            Coin {
                id: 2,
                pos: Vec2::new(700.0, 200.0),
                collected: true,
            },
        ];
        let cmds = build(&snap, &Tuning::default(), PlayField::default());
        let milk = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { color: palette::MILK, .. }))
            .count();
        assert_eq!(milk, 1);
    }

    #[test]
    fn test_fence_segments() {
        let mut snap = snapshot();
        snap.obstacles.push(Obstacle {
            id: 1,
            x: 600.0,
            top_height: 100.0,
            bottom_height: 240.0,
        });
        let cmds = build(&snap, &Tuning::default(), PlayField::new(1280.0, 720.0));
        let fences: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Rect {
                    rect,
                    color: palette::FENCE,
                } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].max.y, 100.0);
        assert_eq!(fences[1].min.y, 480.0);
    }
}
