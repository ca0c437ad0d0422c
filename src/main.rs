//! Flappy Brielle entry point
//!
//! Browser: wires DOM input, the canvas renderer, audio and LocalStorage to
//! the engine and runs the frame loop. Native: plays one seeded autopilot
//! round headless and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent,
    };

    use flappy_brielle::audio::AudioManager;
    use flappy_brielle::highscores::{LocalStorageStore, format_date};
    use flappy_brielle::renderer::CanvasRenderer;
    use flappy_brielle::sim::{PlayField, RoundState};
    use flappy_brielle::ui::{Screen, Ui, UiAction};
    use flappy_brielle::{Engine, Settings, Tuning, platform};

    /// Longest frame fed to the engine (ms); covers tab switches
    const MAX_FRAME_MS: f32 = 100.0;

    /// Panels toggled per screen
    const PANELS: [(&str, Screen); 4] = [
        ("menu", Screen::Menu),
        ("name-entry", Screen::NameEntry),
        ("game-over", Screen::GameOver),
        ("leaderboard", Screen::Leaderboard),
    ];

    /// Game instance holding all host state
    struct Game {
        engine: Engine,
        ui: Ui,
        settings: Settings,
        audio: AudioManager,
        renderer: CanvasRenderer,
        field: PlayField,
        last_time: f64,
        /// Screen the DOM currently reflects
        shown: Option<Screen>,
    }

    impl Game {
        /// One animation frame
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) as f32).min(MAX_FRAME_MS)
            } else {
                flappy_brielle::consts::FRAME_MS
            };
            self.last_time = time;

            // Demo round behind the menu
            if self.ui.screen() == Screen::Menu
                && self.settings.attract_mode
                && self.engine.round_state() != RoundState::Playing
            {
                self.engine.set_autopilot(true);
                self.engine.start(None);
            }

            self.engine.set_play_field(self.field);
            self.engine.advance(dt);

            let events = self.engine.drain_events();
            if self.ui.screen() == Screen::Playing {
                self.audio.play_events(&events);
            }
            self.ui.sync(&self.engine);

            let snapshot = self.engine.snapshot();
            self.renderer.render(&snapshot, self.engine.tuning(), self.field);
            self.update_dom();
        }

        fn activate(&mut self) {
            if self.ui.screen() == Screen::Playing {
                self.engine.activate();
            }
        }

        fn apply(&mut self, action: UiAction) {
            match self.ui.apply(action, &mut self.engine, &mut self.settings) {
                Ok(_) => set_text("name-error", ""),
                Err(e) => set_text("name-error", &e.to_string()),
            }
            self.update_dom();
        }

        fn submit_name(&mut self) {
            let raw = document()
                .and_then(|d| d.get_element_by_id("name-input"))
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            self.apply(UiAction::SubmitName(raw));
        }

        fn toggle_sound(&mut self) {
            let on = self.settings.toggle_sound();
            self.audio.apply_settings(&self.settings);
            self.settings.save();
            set_text("sound-toggle", if on { "Sound: on" } else { "Sound: off" });
        }

        /// Update HUD and panels in the DOM
        fn update_dom(&mut self) {
            let screen = self.ui.screen();
            set_text("hud-score", &self.engine.score().to_string());

            if self.shown == Some(screen) {
                return;
            }
            self.shown = Some(screen);

            for (id, panel) in PANELS {
                set_visible(id, screen == panel);
            }
            set_visible("hud", screen == Screen::Playing || screen == Screen::GameOver);

            match screen {
                Screen::NameEntry => {
                    let name = self.settings.last_player_name.clone().unwrap_or_default();
                    if let Some(input) = document()
                        .and_then(|d| d.get_element_by_id("name-input"))
                        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    {
                        input.set_value(&name);
                        let _ = input.focus();
                    }
                }
                Screen::GameOver => {
                    set_text("final-score", &self.engine.score().to_string());
                    let rank = match self.engine.last_rank() {
                        Some(rank) => format!("New high score! Rank #{}", rank),
                        None => String::new(),
                    };
                    set_text("final-rank", &rank);
                }
                Screen::Leaderboard => self.show_leaderboard(),
                Screen::Menu | Screen::Playing => {}
            }
        }

        fn show_leaderboard(&self) {
            let Some(document) = document() else { return };
            let Some(list) = document.get_element_by_id("leaderboard-list") else {
                return;
            };
            list.set_text_content(None);

            let entries = match self.engine.score_store().map(|s| s.load_scores()) {
                Some(Ok(entries)) => entries,
                Some(Err(e)) => {
                    log::warn!("Failed to load leaderboard: {}", e);
                    Vec::new()
                }
                None => Vec::new(),
            };
            if entries.is_empty() {
                list.set_text_content(Some("No scores yet"));
                return;
            }
            for (i, entry) in entries.iter().enumerate() {
                let Ok(item) = document.create_element("li") else {
                    continue;
                };
                item.set_text_content(Some(&format!(
                    "{}. {} {} ({})",
                    i + 1,
                    entry.name,
                    entry.score,
                    format_date(&entry.date)
                )));
                if let Err(e) = list.append_child(&item) {
                    log::warn!("Leaderboard row failed: {:?}", e);
                }
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Flappy Brielle starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let renderer = CanvasRenderer::new(canvas.clone())?;
        let field = renderer.resize(window.device_pixel_ratio());

        let settings = Settings::load();
        let seed = platform::clock_seed();
        let mut engine = Engine::new(Tuning::with_boss(), seed);
        engine.set_play_field(field);
        engine.set_score_store(Box::new(LocalStorageStore::new()));
        log::info!("Engine initialized with seed: {} ({}x{})", seed, field.width, field.height);

        let game = Rc::new(RefCell::new(Game {
            engine,
            ui: Ui::new(),
            audio: AudioManager::new(&settings),
            settings,
            renderer,
            field,
            last_time: 0.0,
            shown: None,
        }));

        setup_input_handlers(&canvas, &game)?;
        setup_buttons(&game);
        setup_resize(&game)?;

        request_animation_frame(game);

        log::info!("Flappy Brielle running!");
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: &Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Mouse click - flap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().activate();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch - flap without the synthetic mouse event
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().activate();
            });
            canvas.add_event_listener_with_callback(
                "touchstart",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let window = web_sys::window().ok_or("no window")?;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match (g.ui.screen(), event.key().as_str()) {
                    (Screen::Playing, " " | "ArrowUp") => {
                        event.prevent_default();
                        g.activate();
                    }
                    (Screen::NameEntry, "Enter") => g.submit_name(),
                    (Screen::NameEntry, "Escape") => g.apply(UiAction::Menu),
                    (Screen::GameOver, "Enter" | " ") => {
                        event.prevent_default();
                        g.apply(UiAction::Retry);
                    }
                    (Screen::Leaderboard, "Escape") => g.apply(UiAction::Back),
                    (Screen::Menu, "Enter") => g.apply(UiAction::Play),
                    (screen, "m" | "M") if screen != Screen::NameEntry => g.toggle_sound(),
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    /// Wire a DOM button to a game callback (missing buttons are skipped)
    fn on_click(id: &str, game: &Rc<RefCell<Game>>, action: impl Fn(&mut Game) + 'static) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::debug!("No #{} button", id);
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            action(&mut game.borrow_mut());
        });
        if let Err(e) =
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        {
            log::warn!("Failed to wire #{}: {:?}", id, e);
        }
        closure.forget();
    }

    fn setup_buttons(game: &Rc<RefCell<Game>>) {
        on_click("play-btn", game, |g| g.apply(UiAction::Play));
        on_click("name-submit", game, |g| g.submit_name());
        on_click("retry-btn", game, |g| g.apply(UiAction::Retry));
        on_click("menu-btn", game, |g| g.apply(UiAction::Menu));
        on_click("name-cancel", game, |g| g.apply(UiAction::Menu));
        on_click("leaderboard-btn", game, |g| g.apply(UiAction::ShowLeaderboard));
        on_click("game-over-leaderboard-btn", game, |g| {
            g.apply(UiAction::ShowLeaderboard)
        });
        on_click("back-btn", game, |g| g.apply(UiAction::Back));
        on_click("sound-toggle", game, |g| g.toggle_sound());
    }

    fn setup_resize(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let mut g = game.borrow_mut();
            g.field = g.renderer.resize(window.device_pixel_ratio());
            log::debug!("Play field resized to {}x{}", g.field.width, g.field.height);
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {:?}", e);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Five minutes of frames at 60 Hz
#[cfg(not(target_arch = "wasm32"))]
const MAX_HEADLESS_FRAMES: u32 = 60 * 60 * 5;

/// `flappy-brielle [seed] [tuning.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use flappy_brielle::highscores::MemoryStore;
    use flappy_brielle::sim::RoundState;
    use flappy_brielle::{Engine, PlayerContext, Tuning, consts, platform};

    env_logger::init();
    log::info!("Flappy Brielle (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 for the playable version");

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => platform::clock_seed(),
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::with_boss(),
    };

    let mut engine = Engine::new(tuning, seed);
    engine.set_score_store(Box::new(MemoryStore::new()));
    engine.set_autopilot(true);
    engine.start(Some(PlayerContext::new("Autopilot")));

    let mut frames = 0;
    while engine.round_state() == RoundState::Playing && frames < MAX_HEADLESS_FRAMES {
        engine.advance(consts::FRAME_MS);
        for event in engine.drain_events() {
            log::debug!("{:?}", event);
        }
        frames += 1;
    }

    let snapshot = engine.snapshot();
    log::info!(
        "Seed {}: score {} after {} ticks ({:.1}s), {:?}",
        seed,
        snapshot.score,
        snapshot.ticks,
        snapshot.elapsed_ms / 1000.0,
        snapshot.end_cause
    );
    println!("seed={} score={} ticks={}", seed, snapshot.score, snapshot.ticks);

    if let Some(store) = engine.score_store() {
        for (i, entry) in store.load_scores()?.iter().enumerate() {
            println!("{:>2}. {:<16} {}", i + 1, entry.name, entry.score);
        }
    }
    Ok(())
}
