//! Sonar Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlAudioElement, HtmlCanvasElement};

    use sonar_dodge::Millis;
    use sonar_dodge::Settings;
    use sonar_dodge::consts::*;
    use sonar_dodge::platform::{HeldKeys, MicState, Microphone, input, settle_quietly};
    use sonar_dodge::renderer::{CanvasPainter, build_frame};
    use sonar_dodge::sim::{GameEvent, GamePhase, GameState, TickInput, tick, update_visibility};

    /// How long a toast message stays up
    const TOAST_MS: i32 = 2000;

    fn load_sound(src: &str, volume: f64) -> Option<HtmlAudioElement> {
        let audio = HtmlAudioElement::new_with_src(src).ok()?;
        audio.set_preload("auto");
        audio.set_volume(volume);
        Some(audio)
    }

    fn play(sound: &Option<HtmlAudioElement>) {
        if let Some(audio) = sound {
            audio.set_current_time(0.0);
            // Autoplay rejections are not worth reporting
            if let Ok(promise) = audio.play() {
                settle_quietly(promise);
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Show a short message, hidden again after `TOAST_MS`
    fn show_toast(message: &str) {
        let Some(document) = document() else {
            return;
        };
        set_text(&document, "toast", message);
        set_hidden(&document, "toast", false);

        let closure = Closure::once(move || {
            if let Some(document) = self::document() {
                set_hidden(&document, "toast", true);
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                TOAST_MS,
            );
        }
        closure.forget();
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        painter: Option<CanvasPainter>,
        accumulator: f64,
        last_time: f64,
        input: TickInput,
        held: HeldKeys,
        microphone: Microphone,
        settings: Settings,
        death_sound: Option<HtmlAudioElement>,
        victory_sound: Option<HtmlAudioElement>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut state = GameState::new(seed);
            state.tuning = settings.tuning();
            state.loudness = settings.loudness_gate();
            Self {
                state,
                painter: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                held: HeldKeys::default(),
                microphone: Microphone::new(),
                settings,
                death_sound: load_sound("assets/death.mp3", 0.6),
                victory_sound: load_sound("assets/victory.mp3", 0.4),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt_ms: f64, now: Millis) {
            // Clamp long frames (tab switches) so we don't fast-forward
            self.accumulator += dt_ms.min(100.0);
            self.held.apply(&mut self.input);
            self.poll_microphone();
            self.input.loudness = self.microphone.loudness();

            let mut substeps = 0;
            while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                let events = tick(&mut self.state, &input, now);
                self.accumulator -= SIM_DT_MS;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear_one_shots();

                for event in events {
                    self.on_event(event);
                }
            }

            update_visibility(&mut self.state, now);
        }

        fn on_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::Died { deaths } => {
                    log::info!("Player died ({} deaths)", deaths);
                    if self.settings.sound_enabled {
                        play(&self.death_sound);
                    }
                }
                GameEvent::LevelComplete { level, next_level } => {
                    log::info!("Level {} complete, next is {}", level + 1, next_level + 1);
                    if self.settings.sound_enabled {
                        play(&self.victory_sound);
                    }
                }
                GameEvent::LevelReset => show_toast("Level reset"),
                GameEvent::Calibrated {
                    threshold,
                    clamped_to_floor,
                } => {
                    self.settings.loudness_threshold = threshold;
                    self.settings.save();
                    if clamped_to_floor {
                        show_toast(&format!(
                            "Calibrated! Threshold set to minimum {:.1}",
                            threshold
                        ));
                    } else {
                        show_toast(&format!("Calibrated! Threshold set to {:.1}", threshold));
                    }
                }
                GameEvent::CalibrationFailed => {
                    show_toast("Calibration failed, no microphone input");
                }
                other => log::debug!("{:?}", other),
            }
        }

        /// Render the current frame
        fn render(&self, now: Millis) {
            if let Some(ref painter) = self.painter {
                painter.paint(&build_frame(&self.state, now));
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else {
                return;
            };

            set_text(&document, "death-count", &self.state.deaths.to_string());
            set_text(
                &document,
                "level-number",
                &(self.state.level_index + 1).to_string(),
            );
            set_text(&document, "start-btn", start_button_label(self.state.phase));
            set_text(&document, "sound-btn", self.settings.sound_label());

            set_hidden(&document, "pause-overlay", self.state.phase != GamePhase::Paused);
            set_hidden(&document, "win-overlay", self.state.phase != GamePhase::Won);
            set_hidden(&document, "start-prompt", self.state.is_started());
            set_hidden(&document, "calibrating", self.state.calibration.is_none());
        }

        fn toggle_sound(&mut self) {
            let enabled = self.settings.toggle_sound();
            self.settings.save();
            log::info!("Sound {}", if enabled { "enabled" } else { "disabled" });
        }

        /// Surface the answer to a microphone request and remember a grant
        fn poll_microphone(&mut self) {
            let Some(notice) = self.microphone.take_notice() else {
                return;
            };
            show_toast(notice.message());
            if self.settings.record_microphone(notice) {
                self.settings.save();
            }
        }

        fn recalibrate(&mut self) {
            match self.microphone.state() {
                MicState::Live => {
                    self.input.recalibrate = true;
                    show_toast("Recalibrating... Speak at normal volume");
                }
                MicState::Pending => show_toast("Waiting for microphone permission"),
                MicState::Off | MicState::Denied => {
                    if self.microphone.request() {
                        show_toast("Requesting microphone access");
                    }
                }
            }
        }
    }

    fn start_button_label(phase: GamePhase) -> &'static str {
        match phase {
            GamePhase::NotStarted => "Start Game",
            GamePhase::Running => "Pause",
            GamePhase::Paused => "Resume",
            GamePhase::Won => "Next Level",
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Sonar Dodge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(SURFACE_WIDTH as u32);
        canvas.set_height(SURFACE_HEIGHT as u32);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let mic_wanted = settings.microphone_enabled;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        game.borrow_mut().painter = CanvasPainter::new(&canvas);
        if game.borrow().painter.is_none() {
            log::error!("Canvas 2D context unavailable");
        }

        log::info!(
            "Game initialized with seed {} on level {}",
            seed,
            game.borrow().state.level_index + 1
        );

        if mic_wanted {
            game.borrow().microphone.request();
        }

        setup_input_handlers(game.clone())?;
        setup_buttons(game.clone(), &document)?;

        set_hidden(&document, "hud", false);

        // Start game loop
        request_animation_frame(game);

        log::info!("Sonar Dodge running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                if let Some(intent) = input::key_down(&event.key(), &mut g.held, &mut g.input) {
                    // Keep arrows and space from scrolling the page
                    if intent.is_movement() || event.key() == " " {
                        event.prevent_default();
                    }
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                input::key_up(&event.key(), &mut game.borrow_mut().held);
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// Wire a click handler onto a button, if the page has it
    fn on_click(
        document: &Document,
        id: &str,
        game: &Rc<RefCell<Game>>,
        action: fn(&mut Game),
    ) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return Ok(());
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&mut *game.borrow_mut());
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_buttons(game: Rc<RefCell<Game>>, document: &Document) -> Result<(), JsValue> {
        // Start / pause / resume in one button
        on_click(document, "start-btn", &game, |g| {
            if g.state.phase == GamePhase::Running {
                g.input.pause = true;
            } else {
                g.input.confirm = true;
            }
        })?;
        on_click(document, "resume-btn", &game, |g| g.input.confirm = true)?;
        on_click(document, "next-level-btn", &game, |g| g.input.confirm = true)?;
        on_click(document, "reset-level-btn", &game, |g| g.input.reset_level = true)?;
        on_click(document, "reset-deaths-btn", &game, |g| g.input.reset_deaths = true)?;
        on_click(document, "sound-btn", &game, Game::toggle_sound)?;
        on_click(document, "recalibrate-btn", &game, Game::recalibrate)?;
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                SIM_DT_MS
            };
            g.last_time = time;

            let now = time.max(0.0) as Millis;
            g.update(dt, now);
            g.render(now);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sonar Dodge (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    headless_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a short scripted session and log what happens
#[cfg(not(target_arch = "wasm32"))]
fn headless_run() {
    use sonar_dodge::Millis;
    use sonar_dodge::consts::SIM_DT_MS;
    use sonar_dodge::renderer::build_frame;
    use sonar_dodge::sim::{GameState, TickInput, tick, update_visibility};

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut state = GameState::new(seed);
    log::info!(
        "Seed {} picked level {} of {}",
        seed,
        state.level_index + 1,
        state.level_count()
    );

    let mut input = TickInput {
        confirm: true,
        ..TickInput::default()
    };
    let mut deaths = 0;

    // Ten simulated seconds: drift up and right, pulsing every two seconds
    for step in 0..600u32 {
        let now = (step as f64 * SIM_DT_MS) as Millis;
        input.right = true;
        input.up = step % 120 < 60;
        input.pulse = step % 120 == 0;

        for event in tick(&mut state, &input, now) {
            log::info!("[{:>5} ms] {:?}", now, event);
            if matches!(event, sonar_dodge::sim::GameEvent::Died { .. }) {
                deaths += 1;
            }
        }
        update_visibility(&mut state, now);
        input.clear_one_shots();

        if step % 60 == 0 {
            let visible = build_frame(&state, now).len();
            log::debug!("[{:>5} ms] {} draw commands", now, visible);
        }
    }

    println!(
        "Headless run finished: phase {:?}, {} deaths, player at ({:.0}, {:.0})",
        state.phase, deaths, state.player.pos.x, state.player.pos.y
    );
}
