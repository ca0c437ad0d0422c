//! Per-frame simulation tick
//!
//! Physics is integrated per tick with fixed constants; the host's delta
//! time only feeds the spawn, shoot and boss timers.

use super::boss;
use super::collision::{actor_hitbox, coin_hit, obstacle_hit, projectile_hit};
use super::rng::RandomSource;
use super::spawn::{draw_spawn_interval, scroll, update_spawner};
use super::state::{EndCause, GameEvent, GameState, PlayField, RoundState};
use crate::consts::PROJECTILE_SIZE;
use crate::tuning::Tuning;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap/click/space
    pub activate: bool,
    /// Demo mode - the game flaps for itself
    pub autopilot: bool,
}

/// Reset everything and enter Playing. Pending events are kept.
pub fn start_round(state: &mut GameState, tuning: &Tuning, rng: &mut impl RandomSource) {
    let events = std::mem::take(&mut state.events);
    *state = GameState::new(tuning);
    state.events = events;
    state.round = RoundState::Playing;
    state.spawn_interval_ms = draw_spawn_interval(tuning, rng);
    state.events.push(GameEvent::RoundStarted);
}

/// Apply an activation: start from Idle, flap while Playing, ignore when Ended
pub fn activate(state: &mut GameState, tuning: &Tuning, rng: &mut impl RandomSource) {
    match state.round {
        RoundState::Idle => start_round(state, tuning, rng),
        RoundState::Playing => {
            state.actor.velocity = tuning.jump_strength;
            state.events.push(GameEvent::Jump);
        }
        RoundState::Ended => {}
    }
}

/// Advance the game state by one frame
pub fn tick(
    state: &mut GameState,
    tuning: &Tuning,
    input: &TickInput,
    field: PlayField,
    dt_ms: f32,
    rng: &mut impl RandomSource,
) {
    let wants_flap = if input.autopilot && state.is_playing() {
        autopilot(state, tuning, field)
    } else {
        input.activate
    };
    if wants_flap {
        activate(state, tuning, rng);
    }

    if !state.is_playing() {
        return;
    }

    state.ticks += 1;
    state.elapsed_ms += dt_ms;
    let tier = tuning.tier_for(state.score);

    // --- PHYSICS ---
    let next_y = state.actor.y + state.actor.velocity;
    if next_y < tuning.ceiling_y || next_y > tuning.floor_y(field.height) {
        state.end_round(EndCause::OutOfBounds);
        return;
    }
    state.actor.y = next_y;
    state.actor.velocity += tuning.gravity;

    // --- SPAWN & SCROLL ---
    update_spawner(state, tuning, field, &tier, dt_ms, rng);
    scroll(state, tuning, tuning.scroll_speed * tier.speed_multiplier);

    if let Some(boss_tuning) = &tuning.boss {
        boss::update(state, tuning, boss_tuning, field, &tier, dt_ms);
    }

    resolve_collisions(state, tuning, field);

    if state.is_playing() {
        if let Some(boss_tuning) = &tuning.boss {
            boss::check_milestones(state, boss_tuning, field);
        }
    }
}

/// Run every collision check independently, then end the round on any
/// fatal hit. Coins touched in the same tick are still credited.
fn resolve_collisions(state: &mut GameState, tuning: &Tuning, field: PlayField) {
    let hitbox = actor_hitbox(tuning, state.actor.y);
    let mut fatal = None;

    if state
        .obstacles
        .iter()
        .any(|o| obstacle_hit(tuning, &hitbox, o, field.height))
    {
        fatal = Some(EndCause::Obstacle);
    }

    for coin in &mut state.coins {
        if coin_hit(tuning, &hitbox, coin) {
            coin.collected = true;
            state.score = state.score.saturating_add(tuning.coin_value);
            state.events.push(GameEvent::CoinCollected {
                id: coin.id,
                score: state.score,
            });
        }
    }

    let shot_size = tuning
        .boss
        .as_ref()
        .map_or(PROJECTILE_SIZE, |b| b.projectile_size);
    if fatal.is_none()
        && state
            .projectiles
            .iter()
            .any(|p| projectile_hit(&hitbox, p, shot_size))
    {
        fatal = Some(EndCause::Projectile);
    }

    if let Some(cause) = fatal {
        state.end_round(cause);
    }
}

/// Demo pilot: flap when falling below the centre of the next gap
pub fn autopilot(state: &GameState, tuning: &Tuning, field: PlayField) -> bool {
    let hitbox = actor_hitbox(tuning, state.actor.y);
    let target = state
        .obstacles
        .iter()
        .find(|o| o.x + tuning.obstacle_width > hitbox.min.x)
        .map(|o| o.top_height + tuning.obstacle_gap / 2.0)
        .unwrap_or(field.height / 2.0);

    let center = hitbox.center().y;
    state.actor.velocity >= 0.0 && center > target + tuning.obstacle_gap / 8.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::rng::{RngState, ScriptedRandom};
    use crate::sim::state::{Coin, Obstacle, Projectile};
    use glam::Vec2;
    use proptest::prelude::*;

    const FIELD: PlayField = PlayField {
        width: 1280.0,
        height: 700.0,
    };

    fn playing(tuning: &Tuning) -> GameState {
        let mut state = GameState::new(tuning);
        start_round(&mut state, tuning, &mut ScriptedRandom::constant(0.5));
        state.events.clear();
        state
    }

    fn idle_input() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_activate_starts_then_flaps() {
        let tuning = Tuning::default();
        let mut state = GameState::new(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);

        activate(&mut state, &tuning, &mut rng);
        assert_eq!(state.round, RoundState::Playing);
        assert_eq!(state.spawn_interval_ms, 2000.0);
        assert_eq!(state.drain_events(), vec![GameEvent::RoundStarted]);

        state.actor.velocity = 3.0;
        activate(&mut state, &tuning, &mut rng);
        assert_eq!(state.actor.velocity, tuning.jump_strength);
        activate(&mut state, &tuning, &mut rng);
        assert_eq!(state.actor.velocity, tuning.jump_strength);
    }

    #[test]
    fn test_activate_ignored_when_ended() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        state.end_round(EndCause::Obstacle);
        state.actor.velocity = 2.0;
        activate(&mut state, &tuning, &mut ScriptedRandom::constant(0.5));
        assert_eq!(state.round, RoundState::Ended);
        assert_eq!(state.actor.velocity, 2.0);
    }

    #[test]
    fn test_physics_step() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        state.actor.velocity = 1.5;
        let (y0, v0) = (state.actor.y, state.actor.velocity);

        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.actor.y, y0 + v0);
        assert_eq!(state.actor.velocity, v0 + tuning.gravity);
        assert_eq!(state.ticks, 1);
    }

    #[test]
    fn test_out_of_bounds_freezes_position() {
        let tuning = Tuning::default();
        let mut rng = ScriptedRandom::constant(0.5);

        let mut state = playing(&tuning);
        state.actor.y = 579.0;
        state.actor.velocity = 2.0; // 581 > 700 - 120
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.round, RoundState::Ended);
        assert_eq!(state.actor.y, 579.0);
        assert_eq!(state.end_cause, Some(EndCause::OutOfBounds));

        let mut state = playing(&tuning);
        state.actor.y = -48.0;
        state.actor.velocity = -3.0; // -51 < -50
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.round, RoundState::Ended);
        assert_eq!(state.actor.y, -48.0);
    }

    #[test]
    fn test_free_fall_ends_within_bound() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);

        // Smallest n with start + g * n(n-1)/2 past the floor
        let drop = tuning.floor_y(FIELD.height) - tuning.actor_start_y;
        let mut bound = 1u64;
        while tuning.gravity * (bound * (bound - 1)) as f32 / 2.0 <= drop {
            bound += 1;
        }

        for _ in 0..1000 {
            tick(&mut state, &tuning, &idle_input(), FIELD, 16.0, &mut rng);
            if state.round == RoundState::Ended {
                break;
            }
        }
        assert_eq!(state.round, RoundState::Ended);
        assert_eq!(state.end_cause, Some(EndCause::OutOfBounds));
        assert_eq!(state.ticks, bound);
    }

    #[test]
    fn test_coin_credited_on_fatal_tick() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        state.actor.velocity = 0.0;
        let hitbox = actor_hitbox(&tuning, state.actor.y);
        let speed = tuning.scroll_speed;

        // Fence whose top segment reaches into the hitbox after scrolling
        state.obstacles.push(Obstacle {
            id: 100,
            x: hitbox.min.x + speed,
            top_height: hitbox.max.y,
            bottom_height: 0.0,
        });
        state.coins.push(Coin {
            id: 101,
            pos: Vec2::new(hitbox.min.x + speed, hitbox.min.y),
            collected: false,
        });

        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.round, RoundState::Ended);
        assert_eq!(state.end_cause, Some(EndCause::Obstacle));
        assert_eq!(state.score, tuning.coin_value);
        assert!(state.coins[0].collected);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::CoinCollected { id: 101, score: 1 }));
        assert!(events.contains(&GameEvent::RoundEnded {
            score: 1,
            cause: EndCause::Obstacle
        }));
    }

    #[test]
    fn test_coin_collected_only_once() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        let hitbox = actor_hitbox(&tuning, state.actor.y);
        state.coins.push(Coin {
            id: 7,
            pos: Vec2::new(hitbox.min.x + 40.0, hitbox.min.y + 20.0),
            collected: false,
        });

        for _ in 0..5 {
            tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
            assert!(state.coins[0].collected);
        }
        assert_eq!(state.score, 1);
        assert_eq!(state.round, RoundState::Playing);
    }

    #[test]
    fn test_projectile_overlap_ends_round() {
        let tuning = Tuning::with_boss();
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        state.actor.velocity = 0.0;
        let hitbox = actor_hitbox(&tuning, state.actor.y);
        let speed = tuning.tier_for(0).projectile_speed;

        state.projectiles.push(Projectile {
            id: 55,
            pos: Vec2::new(hitbox.min.x + speed, hitbox.min.y),
        });
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.round, RoundState::Ended);
        assert_eq!(state.end_cause, Some(EndCause::Projectile));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_boss_summoned_after_collisions() {
        let mut tuning = Tuning::with_boss();
        if let Some(boss) = tuning.boss.as_mut() {
            boss.milestones = vec![50, 100];
        }
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        state.score = 40;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert!(!state.boss.active);

        state.score = 120;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert!(state.boss.active);
        assert_eq!(state.boss.watermark, 100);
        assert_eq!(state.boss.milestone, 100);
    }

    #[test]
    fn test_second_milestone_waits_for_current_visit() {
        let mut tuning = Tuning::with_boss();
        if let Some(boss) = tuning.boss.as_mut() {
            boss.milestones = vec![50, 100];
        }
        let duration = tuning.boss.as_ref().map_or(0.0, |b| b.duration_ms);
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);

        state.score = 50;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert!(state.boss.active);
        let first = state.boss.activated_at_ms;

        // Next milestone reached halfway through the visit
        state.elapsed_ms = 5000.0;
        state.score = 100;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.boss.activated_at_ms, first);
        assert_eq!(state.boss.milestone, 50);
        assert_eq!(state.boss.watermark, 50);

        state.elapsed_ms = first + duration - 3.0 * FRAME_MS;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert!(state.boss.active);
        assert_eq!(state.boss.milestone, 50);
        state.events.clear();

        // First visit ends on schedule, then the held milestone fires
        state.elapsed_ms = first + duration;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::BossDeparted,
                GameEvent::BossArrived { milestone: 100 }
            ]
        );
        assert_eq!(state.boss.activated_at_ms, state.elapsed_ms);
        assert_eq!(state.boss.watermark, 100);
    }

    #[test]
    fn test_tier_scales_scroll_and_projectile_speed() {
        let mut tuning = Tuning::with_boss();
        if let Some(boss) = tuning.boss.as_mut() {
            boss.milestones.clear();
        }

        for (score, scroll, shot) in [(150, 3.6, 6.0), (300, 4.8, 8.0)] {
            let mut state = playing(&tuning);
            let mut rng = ScriptedRandom::constant(0.5);
            state.score = score;
            state.obstacles.push(Obstacle {
                id: 1,
                x: 1000.0,
                top_height: 100.0,
                bottom_height: 220.0,
            });
            state.coins.push(Coin {
                id: 2,
                pos: Vec2::new(900.0, 600.0),
                collected: false,
            });
            state.projectiles.push(Projectile {
                id: 3,
                pos: Vec2::new(900.0, 50.0),
            });

            tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
            assert!(state.is_playing());
            let close = |before: f32, after: f32, step: f32| (before - after - step).abs() < 1e-3;
            assert!(close(1000.0, state.obstacles[0].x, scroll), "score {score}");
            assert!(close(900.0, state.coins[0].pos.x, scroll), "score {score}");
            assert!(close(900.0, state.projectiles[0].pos.x, shot), "score {score}");
        }
    }

    #[test]
    fn test_score_saturates() {
        let mut tuning = Tuning::default();
        tuning.coin_value = 5;
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        state.score = u32::MAX - 2;
        state.coins.push(Coin {
            id: 1,
            pos: Vec2::new(150.0, 300.0),
            collected: false,
        });
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert_eq!(state.score, u32::MAX);
        assert!(state.coins[0].collected);
    }

    #[test]
    fn test_no_boss_without_tuning() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        let mut rng = ScriptedRandom::constant(0.5);
        state.score = 1000;
        tick(&mut state, &tuning, &idle_input(), FIELD, FRAME_MS, &mut rng);
        assert!(!state.boss.active);
    }

    #[test]
    fn test_autopilot_flaps_below_gap() {
        let tuning = Tuning::default();
        let mut state = playing(&tuning);
        state.obstacles.push(Obstacle {
            id: 1,
            x: 600.0,
            top_height: 100.0,
            bottom_height: 220.0,
        });
        // Gap centre at 290; hitbox centre at y + 90
        state.actor.y = 300.0;
        state.actor.velocity = 1.0;
        assert!(autopilot(&state, &tuning, FIELD));

        state.actor.y = 150.0;
        assert!(!autopilot(&state, &tuning, FIELD));

        state.actor.y = 300.0;
        state.actor.velocity = -2.0;
        assert!(!autopilot(&state, &tuning, FIELD));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let tuning = Tuning::with_boss();
        let mut rng1 = RngState::new(99999).to_rng();
        let mut rng2 = RngState::new(99999).to_rng();
        let mut state1 = GameState::new(&tuning);
        let mut state2 = GameState::new(&tuning);
        let input = TickInput {
            activate: true,
            autopilot: true,
        };

        for _ in 0..3000 {
            tick(&mut state1, &tuning, &input, FIELD, FRAME_MS, &mut rng1);
            tick(&mut state2, &tuning, &input, FIELD, FRAME_MS, &mut rng2);
        }

        assert_eq!(state1.ticks, state2.ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.round, state2.round);
        assert_eq!(state1.obstacles, state2.obstacles);
        assert_eq!(state1.actor, state2.actor);
    }

    proptest! {
        #[test]
        fn prop_coins_credited_once(
            seed in any::<u64>(),
            flaps in proptest::collection::vec(any::<bool>(), 600),
        ) {
            let tuning = Tuning::default();
            let mut rng = RngState::new(seed).to_rng();
            let mut state = GameState::new(&tuning);
            start_round(&mut state, &tuning, &mut rng);
            let mut collected = std::collections::BTreeSet::new();

            for (i, flap) in flaps.iter().enumerate() {
                // Autopilot most of the time so rounds live long enough to meet coins
                let input = TickInput {
                    activate: *flap,
                    autopilot: i % 7 != 0,
                };
                tick(&mut state, &tuning, &input, FIELD, FRAME_MS, &mut rng);

                for coin in &state.coins {
                    if collected.contains(&coin.id) {
                        prop_assert!(coin.collected);
                    } else if coin.collected {
                        collected.insert(coin.id);
                    }
                }
                for event in state.drain_events() {
                    if let GameEvent::CoinCollected { id, .. } = event {
                        prop_assert!(collected.contains(&id));
                    }
                }
                prop_assert_eq!(state.score, collected.len() as u32 * tuning.coin_value);
            }
        }
    }
}
