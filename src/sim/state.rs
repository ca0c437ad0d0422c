//! Game state and core simulation types
//!
//! Everything a round owns lives in [`GameState`]; it is reset wholesale on
//! round start and read (never written) by the presentation layer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Lifecycle of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting for the first activation
    #[default]
    Idle,
    /// Simulation running
    Playing,
    /// Round over, score frozen
    Ended,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Flew above the ceiling or fell below the floor
    OutOfBounds,
    /// Hit a fence
    Obstacle,
    /// Hit a boss projectile
    Projectile,
}

/// Notifications produced by a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    Jump,
    CoinCollected { id: u32, score: u32 },
    BossArrived { milestone: u32 },
    BossDeparted,
    ProjectileFired { id: u32 },
    RoundEnded { score: u32, cause: EndCause },
}

/// Play field dimensions (px), owned by the host viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl PlayField {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// The player-controlled flyer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Sprite top (px)
    pub y: f32,
    /// px/tick, positive is downward
    pub velocity: f32,
}

/// A fence pair with a gap between the segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub top_height: f32,
    pub bottom_height: f32,
}

/// A milk-bottle coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub collected: bool,
}

/// Transient boss state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Boss {
    pub active: bool,
    /// Sprite top (px)
    pub y: f32,
    /// Round clock (ms) at arrival
    pub activated_at_ms: f32,
    /// Milestone that summoned the current visit
    pub milestone: u32,
    /// Highest milestone already used this round
    pub watermark: u32,
    /// Time since the last shot (ms)
    pub shoot_timer_ms: f32,
}

/// A boss shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub round: RoundState,
    pub score: u32,
    pub actor: Actor,
    /// Sorted by id (spawn order)
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub projectiles: Vec<Projectile>,
    pub boss: Boss,
    /// Time since the last obstacle spawn (ms)
    pub spawn_timer_ms: f32,
    /// Unscaled spawn interval drawn for the next obstacle (ms)
    pub spawn_interval_ms: f32,
    /// Round clock (ms), advanced by the host's delta time
    pub elapsed_ms: f32,
    pub ticks: u64,
    /// Set once the round's end has been reported
    pub end_cause: Option<EndCause>,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh Idle state with the actor at its start height
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            round: RoundState::Idle,
            score: 0,
            actor: Actor {
                y: tuning.actor_start_y,
                velocity: 0.0,
            },
            obstacles: Vec::new(),
            coins: Vec::new(),
            projectiles: Vec::new(),
            boss: Boss::default(),
            spawn_timer_ms: 0.0,
            spawn_interval_ms: tuning.spawn_interval_min_ms,
            elapsed_ms: 0.0,
            ticks: 0,
            end_cause: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.round == RoundState::Playing
    }

    /// Move to Ended and report it; later calls are no-ops
    pub fn end_round(&mut self, cause: EndCause) {
        if self.round != RoundState::Playing {
            return;
        }
        self.round = RoundState::Ended;
        self.end_cause = Some(cause);
        self.events.push(GameEvent::RoundEnded {
            score: self.score,
            cause,
        });
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
