//! Tower Stack entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    use tower_stack::Settings;
    use tower_stack::sim::{GameEvent, GameSession, Pilot, TickInput, tick};

    // The page owns the 3D renderer; hand it each frame's scene
    #[wasm_bindgen(inline_js = "
        export function present_scene(json) {
            if (window.renderTowerScene) {
                window.renderTowerScene(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn present_scene(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        input: TickInput,
    }

    impl Game {
        fn new(settings: Settings, seed: u64) -> Self {
            let mut session = GameSession::new(settings, seed);
            session.start_demo();
            Self {
                session,
                input: TickInput::default(),
            }
        }

        /// Run one frame
        fn update(&mut self, time: f64) {
            tick(&mut self.session, &self.input, time);
            self.input.clear();
        }

        /// Hand the scene to the page renderer
        fn render(&self) {
            match serde_json::to_string(&self.session.snapshot()) {
                Ok(json) => present_scene(&json),
                Err(e) => log::warn!("Snapshot error: {}", e),
            }
        }

        /// Update score and overlays in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            for event in self.session.drain_events() {
                match event {
                    GameEvent::Started { pilot: Pilot::Manual } => {
                        for id in ["instructions", "results"] {
                            if let Some(el) = document.get_element_by_id(id) {
                                let _ = el.set_attribute("class", "hidden");
                            }
                        }
                        if let Some(el) = document.get_element_by_id("score") {
                            el.set_text_content(Some("0"));
                        }
                    }
                    GameEvent::Started { pilot: Pilot::Autopilot } => {}
                    GameEvent::Placed { score } => {
                        if let Some(el) = document.get_element_by_id("score") {
                            el.set_text_content(Some(&score.to_string()));
                        }
                    }
                    GameEvent::Missed { score, pilot } => {
                        // The demo ending is not the player's result
                        if pilot == Pilot::Manual {
                            if let Some(el) = document.get_element_by_id("results") {
                                let _ = el.set_attribute("class", "");
                            }
                            if let Some(el) = document.get_element_by_id("scoreLoser") {
                                el.set_text_content(Some(&score.to_string()));
                            }
                        }
                    }
                }
            }
        }

        fn resize(&mut self) {
            if let Some(aspect) = window_aspect() {
                self.session.camera.resize(aspect);
            }
        }
    }

    fn window_aspect() -> Option<f32> {
        let window = web_sys::window()?;
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        (height > 0.0).then(|| (width / height) as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Tower Stack starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(Settings::load(), seed)));
        game.borrow_mut().resize();

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone());
        setup_restart_button(&window, game.clone());

        request_animation_frame(game);

        log::info!("Tower Stack running!");
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Mouse down - drop (or leave the demo)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.interact = true;
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - same as mouse down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().input.interact = true;
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        g.input.interact = true;
                    }
                    "r" | "R" => {
                        event.prevent_default();
                        g.input.restart = true;
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize - keep the view width, refit the height
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let Some(document) = window.document() else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restartBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.restart = true;
                log::info!("Restart requested");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    native::run(std::env::args().skip(1))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless runner: plays autopilot demo rounds at a simulated 60 fps
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::{Context, Result, bail};

    use tower_stack::Settings;
    use tower_stack::sim::{GameEvent, GamePhase, GameSession, TickInput, tick};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Ten simulated minutes per round at most
    const MAX_FRAMES: usize = 60 * 60 * 10;

    struct Options {
        settings: Settings,
        rounds: u32,
        seed: u64,
    }

    fn parse_args(args: impl Iterator<Item = String>) -> Result<Options> {
        let mut options = Options {
            settings: Settings::default(),
            rounds: 5,
            seed: 1,
        };

        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--rounds" => {
                    let value = args.next().context("--rounds needs a value")?;
                    options.rounds = value
                        .parse()
                        .with_context(|| format!("invalid --rounds value: {}", value))?;
                }
                "--seed" => {
                    let value = args.next().context("--seed needs a value")?;
                    options.seed = value
                        .parse()
                        .with_context(|| format!("invalid --seed value: {}", value))?;
                }
                path if !path.starts_with("--") => {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("reading settings from {}", path))?;
                    options.settings = Settings::from_json(&json)
                        .with_context(|| format!("parsing settings in {}", path))?;
                }
                other => bail!("unknown option: {}", other),
            }
        }
        Ok(options)
    }

    pub fn run(args: impl Iterator<Item = String>) -> Result<()> {
        let options = parse_args(args)?;
        log::info!("Tower Stack (native) starting...");
        log::info!("Native mode is headless - serve the wasm build for the playable game");

        let mut session = GameSession::new(options.settings, options.seed);
        let mut best = 0;
        for round in 1..=options.rounds {
            session.start_demo();
            let mut time = 0.0;
            for _ in 0..MAX_FRAMES {
                tick(&mut session, &TickInput::default(), time);
                time += FRAME_MS;
                if session.phase == GamePhase::Ended {
                    break;
                }
            }

            let placed = session
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Placed { .. }))
                .count();
            best = best.max(session.score);
            println!(
                "round {:>3}: score {:>3} ({} drops, {:.1}s)",
                round,
                session.score,
                placed,
                time / 1000.0
            );
        }
        println!("best: {}", best);
        Ok(())
    }
}
