//! Neon Rush entry point
//!
//! Wires the browser (input, HUD, audio) to the deterministic sim and runs
//! the frame loop. The native build runs a headless smoke flight instead.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    use neon_rush::audio::AudioManager;
    use neon_rush::consts::*;
    use neon_rush::sim::{Difficulty, Session, SessionEvent, TickInput, tick};
    use neon_rush::ui::Hud;
    use neon_rush::{Settings, world};

    /// Raw pressed-key state, folded into a `TickInput` once per frame
    #[derive(Debug, Default)]
    struct KeyState {
        yaw_left: bool,
        yaw_right: bool,
        pitch_up: bool,
        pitch_down: bool,
        ascend: bool,
        descend: bool,
        boost: bool,
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        keys: KeyState,
        hud: Hud,
        audio: AudioManager,
        settings: Settings,
        last_time: f64,
        // Middle-mouse pan drag
        panning: bool,
        last_pan: (f32, f32),
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, hud: Hud, settings: Settings) -> Self {
            let mut session = Session::new(seed);
            session.register_obstacles(world::city_obstacles());

            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);

            Self {
                session,
                keys: KeyState::default(),
                hud,
                audio,
                settings,
                last_time: 0.0,
                panning: false,
                last_pan: (0.0, 0.0),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Map the key state to logical actions for this frame
        fn tick_input(&self) -> TickInput {
            let (up, down) = if self.settings.invert_pitch {
                (self.keys.pitch_down, self.keys.pitch_up)
            } else {
                (self.keys.pitch_up, self.keys.pitch_down)
            };
            TickInput {
                yaw_left: self.keys.yaw_left,
                yaw_right: self.keys.yaw_right,
                pitch_up: up,
                pitch_down: down,
                ascend: self.keys.ascend,
                descend: self.keys.descend,
                boost: self.keys.boost,
            }
        }

        /// Advance the sim one frame and notify the collaborators
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (((time - self.last_time) / 1000.0) as f32).min(0.1)
            } else {
                1.0 / 60.0
            };
            self.last_time = time;

            let input = self.tick_input();
            tick(&mut self.session, &input, dt);

            for event in self.session.drain_events() {
                match event {
                    SessionEvent::RingCollected { combo, .. } => {
                        self.audio.play_collect();
                        self.audio.play_combo(combo);
                    }
                    SessionEvent::OrbCollected { .. } => {
                        self.audio.play_collect();
                    }
                    SessionEvent::BoostStarted => {
                        self.audio.play_boost_start();
                    }
                    SessionEvent::PhaseAdvanced { phase } => {
                        log::info!("Phase {} underway", phase);
                    }
                    SessionEvent::GameOver {
                        score,
                        phase,
                        elapsed,
                    } => {
                        self.audio.play_game_over();
                        self.hud.show_game_over(score, phase, elapsed);
                    }
                }
            }

            self.hud.update_hud(
                self.session.score,
                self.session.time_remaining,
                self.session.boost_remaining,
                self.session.combo_count,
                self.session.phase,
                self.session.phase_target(),
                self.session.elapsed_time,
                self.session.phase_time_remaining(),
            );

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
            if self.settings.show_fps {
                self.hud.update_fps(self.fps);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let hud = Hud::new(&document);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, hud, settings)));
        log::info!("Session initialized with seed: {}", seed);

        setup_difficulty_buttons(&document, game.clone());
        setup_replay_button(&document, game.clone());
        setup_input_handlers(game.clone());
        setup_blur_mute(game.clone());

        request_animation_frame(game);

        log::info!("Neon Rush running!");
    }

    fn setup_difficulty_buttons(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        let buttons = match document.query_selector_all(".menu-btn") {
            Ok(list) => list,
            Err(_) => return,
        };

        for i in 0..buttons.length() {
            let Some(node) = buttons.item(i) else { continue };
            let Ok(button) = node.dyn_into::<web_sys::Element>() else {
                continue;
            };

            let level = button
                .get_attribute("data-difficulty")
                .unwrap_or_else(|| "hard".to_string());
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.session.set_difficulty(Difficulty::from_name(&level));
                g.hud.hide_menu();
                // Audio needs a user gesture before it may start
                g.audio.resume();
            });
            let _ = button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_replay_button(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("replay-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                // Back to the menu; the next difficulty pick resets the run
                game.borrow().hud.show_menu();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                set_key(&mut game.borrow_mut().keys, &event.code(), true);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                set_key(&mut game.borrow_mut().keys, &event.code(), false);
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Middle-mouse drag pans the camera
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 1 {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    g.panning = true;
                    g.last_pan = (event.client_x() as f32, event.client_y() as f32);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 1 {
                    game.borrow_mut().panning = false;
                }
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if !g.panning || g.settings.reduced_motion {
                    return;
                }
                let x = event.client_x() as f32;
                let y = event.client_y() as f32;
                let dx = x - g.last_pan.0;
                let dy = y - g.last_pan.1;
                g.last_pan = (x, y);
                g.session
                    .camera
                    .add_pan(-dx * CAMERA_PAN_SPEED, dy * CAMERA_PAN_SPEED);
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_blur_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().audio.set_muted(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn set_key(keys: &mut KeyState, code: &str, pressed: bool) {
        match code {
            "KeyA" => keys.yaw_left = pressed,
            "KeyD" => keys.yaw_right = pressed,
            "KeyW" => keys.pitch_up = pressed,
            "KeyS" => keys.pitch_down = pressed,
            "KeyQ" => keys.ascend = pressed,
            "KeyE" => keys.descend = pressed,
            "ShiftLeft" | "ShiftRight" => keys.boost = pressed,
            _ => {}
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use neon_rush::format_mmss;
    use neon_rush::sim::{Difficulty, RunState, Session, TickInput, tick};
    use neon_rush::world;

    env_logger::init();
    log::info!("Neon Rush (native) starting headless smoke flight...");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);

    let mut session = Session::new(seed);
    session.register_obstacles(world::city_obstacles());
    session.set_difficulty(Difficulty::Normal);

    // Weave through the city at 60 Hz until the run ends
    let dt = 1.0 / 60.0;
    let mut frame = 0u64;
    while session.state == RunState::Playing && frame < 60 * 240 {
        let input = TickInput {
            yaw_left: (frame / 180) % 2 == 0,
            yaw_right: (frame / 180) % 2 == 1,
            boost: (frame / 300) % 4 == 0,
            ..Default::default()
        };
        tick(&mut session, &input, dt);
        session.drain_events();
        frame += 1;

        if frame % 600 == 0 {
            log::info!(
                "t={} score={} phase={} time={:.1}s boost={:.1}s rings={} orbs={}",
                format_mmss(session.elapsed_time),
                session.score,
                session.phase,
                session.time_remaining,
                session.boost_remaining,
                session.rings.len(),
                session.orbs.len(),
            );
        }
    }

    log::info!(
        "Smoke flight over: score={} phase={} elapsed={}",
        session.score,
        session.phase,
        format_mmss(session.elapsed_time),
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
