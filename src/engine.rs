//! Round lifecycle facade
//!
//! [`Engine`] owns the simulation state, the injected RNG and the current
//! play field. Hosts feed it activations and frame deltas, read a
//! [`Snapshot`] after every frame, and drain [`GameEvent`]s for sound cues.
//! When a round ends the final score is handed to the [`ScoreStore`]
//! exactly once; storage failures are logged and otherwise ignored.

use rand_pcg::Pcg32;
use serde::Serialize;

use crate::highscores::ScoreStore;
use crate::platform;
use crate::sim::{
    self, Coin, EndCause, GameEvent, GameState, Obstacle, PlayField, Projectile, RandomSource,
    RngState, RoundState, TickInput,
};
use crate::tuning::Tuning;

/// Log name for rounds started without a player
pub const ANONYMOUS: &str = "Anonymous";

/// Who is playing the round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerContext {
    pub name: String,
}

impl PlayerContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Boss as seen by the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossView {
    pub x: f32,
    pub y: f32,
    pub milestone: u32,
    pub remaining_ms: f32,
}

/// Read-only copy of everything the presentation layer draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub actor_y: f32,
    pub actor_velocity: f32,
    pub score: u32,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub boss: Option<BossView>,
    pub projectiles: Vec<Projectile>,
    pub round_state: RoundState,
    pub end_cause: Option<EndCause>,
    pub elapsed_ms: f32,
    pub ticks: u64,
}

/// The game simulation engine
pub struct Engine<R: RandomSource = Pcg32> {
    tuning: Tuning,
    state: GameState,
    rng: R,
    field: PlayField,
    player: Option<PlayerContext>,
    store: Option<Box<dyn ScoreStore>>,
    score_reported: bool,
    last_rank: Option<usize>,
    autopilot: bool,
}

impl Engine<Pcg32> {
    /// Engine with a seeded PCG generator
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(tuning, RngState::new(seed).to_rng())
    }
}

impl<R: RandomSource> Engine<R> {
    pub fn with_rng(tuning: Tuning, rng: R) -> Self {
        Self {
            state: GameState::new(&tuning),
            tuning,
            rng,
            field: PlayField::default(),
            player: None,
            store: None,
            score_reported: false,
            last_rank: None,
            autopilot: false,
        }
    }

    /// Attach the leaderboard collaborator
    pub fn set_score_store(&mut self, store: Box<dyn ScoreStore>) {
        self.store = Some(store);
    }

    pub fn score_store(&self) -> Option<&dyn ScoreStore> {
        self.store.as_deref()
    }

    /// Update the play field; read on every tick
    pub fn set_play_field(&mut self, field: PlayField) {
        self.field = field;
    }

    pub fn play_field(&self) -> PlayField {
        self.field
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Read-only view of the full state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn round_state(&self) -> RoundState {
        self.state.round
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn player(&self) -> Option<&PlayerContext> {
        self.player.as_ref()
    }

    /// Rank achieved by the last reported round, if it made the board
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Reset everything and enter Playing
    pub fn start(&mut self, player: Option<PlayerContext>) {
        if player.is_some() {
            self.player = player;
        }
        sim::start_round(&mut self.state, &self.tuning, &mut self.rng);
        self.score_reported = false;
        self.last_rank = None;
        log::info!(
            "Round started for {} (first spawn in {:.0}ms)",
            self.player_name(),
            self.state.spawn_interval_ms
        );
    }

    /// Restart with the same player
    pub fn reset(&mut self) {
        self.start(None);
    }

    /// Back to Idle (explicit menu action). Forgets the player, so demo
    /// rounds started from the menu are not recorded.
    pub fn menu(&mut self) {
        let events = self.state.drain_events();
        self.state = GameState::new(&self.tuning);
        self.state.events = events;
        self.player = None;
        self.score_reported = false;
    }

    /// Tap/click/space: start from Idle, flap while Playing, ignored when Ended
    pub fn activate(&mut self) {
        if self.state.round == RoundState::Idle {
            self.start(None);
        } else {
            sim::activate(&mut self.state, &self.tuning, &mut self.rng);
        }
    }

    /// Advance the simulation by one frame of `delta_ms`
    pub fn advance(&mut self, delta_ms: f32) {
        let input = TickInput {
            activate: false,
            autopilot: self.autopilot,
        };
        sim::tick(
            &mut self.state,
            &self.tuning,
            &input,
            self.field,
            delta_ms,
            &mut self.rng,
        );

        if self.state.round == RoundState::Ended && !self.score_reported {
            self.report_score();
        }
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let boss = match (&self.tuning.boss, state.boss.active) {
            (Some(boss), true) => Some(BossView {
                x: sim::boss::boss_x(boss, self.field),
                y: state.boss.y,
                milestone: state.boss.milestone,
                remaining_ms: (boss.duration_ms - (state.elapsed_ms - state.boss.activated_at_ms))
                    .max(0.0),
            }),
            _ => None,
        };
        Snapshot {
            actor_y: state.actor.y,
            actor_velocity: state.actor.velocity,
            score: state.score,
            obstacles: state.obstacles.clone(),
            coins: state.coins.clone(),
            boss,
            projectiles: state.projectiles.clone(),
            round_state: state.round,
            end_cause: state.end_cause,
            elapsed_ms: state.elapsed_ms,
            ticks: state.ticks,
        }
    }

    fn player_name(&self) -> &str {
        self.player.as_ref().map_or(ANONYMOUS, |p| p.name.as_str())
    }

    /// Hand the final score to the store, once per round
    fn report_score(&mut self) {
        self.score_reported = true;
        let score = self.state.score;
        log::info!(
            "Round over for {}: score {} ({:?})",
            self.player_name(),
            score,
            self.state.end_cause
        );

        let Some(name) = self.player.as_ref().map(|p| p.name.clone()) else {
            log::debug!("Round without a player, score not recorded");
            return;
        };
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.save_score(&name, score, &platform::timestamp()) {
            Ok(rank) => {
                self.last_rank = rank;
                if let Some(rank) = rank {
                    log::info!("{} placed #{} on the leaderboard", name, rank);
                }
            }
            Err(e) => log::warn!("Failed to save score: {}", e),
        }
    }
}
