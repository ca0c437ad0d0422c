//! Screen flow for the presentation layer
//!
//! Menu -> NameEntry -> Playing -> GameOver -> (Retry | Menu | Leaderboard).
//! The flow only drives the [`Engine`]; it never touches simulation state.

use thiserror::Error;

use crate::engine::{Engine, PlayerContext};
use crate::settings::{MAX_NAME_LEN, Settings};
use crate::sim::{RandomSource, RoundState};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Menu,
    NameEntry,
    Playing,
    GameOver,
    Leaderboard,
}

/// Button presses and form submissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// "Play" on the menu
    Play,
    SubmitName(String),
    Retry,
    Menu,
    ShowLeaderboard,
    /// Leave the leaderboard
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("please enter a name")]
    Empty,

    #[error("name is {len} characters, at most {max} allowed")]
    TooLong { len: usize, max: usize },
}

/// Trim and check a player name
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

/// Screen state machine
#[derive(Debug, Default)]
pub struct Ui {
    screen: Screen,
    /// Where "Back" leads from the leaderboard
    return_to: Screen,
}

impl Ui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Apply a user action. Actions that make no sense on the current
    /// screen are ignored.
    pub fn apply<R: RandomSource>(
        &mut self,
        action: UiAction,
        engine: &mut Engine<R>,
        settings: &mut Settings,
    ) -> Result<Screen, NameError> {
        let next = match (self.screen, action) {
            (Screen::Menu, UiAction::Play) => Screen::NameEntry,
            (Screen::NameEntry, UiAction::SubmitName(raw)) => {
                let name = validate_name(&raw)?;
                settings.remember_player(&name);
                settings.save();
                engine.set_autopilot(false);
                engine.start(Some(PlayerContext::new(name)));
                Screen::Playing
            }
            (Screen::GameOver, UiAction::Retry) => {
                engine.reset();
                Screen::Playing
            }
            (Screen::NameEntry | Screen::GameOver | Screen::Leaderboard, UiAction::Menu) => {
                engine.menu();
                Screen::Menu
            }
            (from @ (Screen::Menu | Screen::GameOver), UiAction::ShowLeaderboard) => {
                self.return_to = from;
                Screen::Leaderboard
            }
            (Screen::Leaderboard, UiAction::Back) => self.return_to,
            (screen, action) => {
                log::debug!("Ignoring {:?} on {:?}", action, screen);
                screen
            }
        };

        if next != self.screen {
            log::debug!("Screen {:?} -> {:?}", self.screen, next);
            self.screen = next;
        }
        Ok(next)
    }

    /// Follow the engine after a frame (round over -> game over screen)
    pub fn sync<R: RandomSource>(&mut self, engine: &Engine<R>) -> Screen {
        if self.screen == Screen::Playing && engine.round_state() == RoundState::Ended {
            self.screen = Screen::GameOver;
        }
        self.screen
    }
}
