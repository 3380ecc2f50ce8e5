//! Sky Climb entry point
//!
//! On the web this hosts the session on a 2D canvas. Natively it is a
//! headless CLI for autopilot runs and replays.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use sky_climb::audio::{AudioManager, SoundEffect};
    use sky_climb::consts::*;
    use sky_climb::sim::{Action, GamePhase, InputState, Session};
    use sky_climb::{HighScores, Settings, Tuning};

    /// Points ledger key; the reward of every run is credited here
    const POINTS_KEY: &str = "sky_climb_points";

    /// Game instance holding all host state
    struct Game {
        session: Session,
        ctx: CanvasRenderingContext2d,
        audio: AudioManager,
        settings: Settings,
        high_scores: HighScores,
        /// Actions currently held on the keyboard
        keys: InputState,
        accumulator: f32,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(ctx: CanvasRenderingContext2d, tuning: Tuning, seed: u64, points: Rc<Cell<u64>>) -> Self {
            let settings = Settings::load();
            let high_scores = HighScores::load();

            let mut session = Session::new(tuning, seed);
            session.set_high_score(high_scores.top_score());
            session.set_autopilot(settings.demo_mode);
            session.set_game_end_listener(move |score: u32, reward: u64| {
                points.set(points.get() + reward);
                save_points(points.get());
                log::info!("Credited {} points for {}m", reward, score);
            });

            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);

            Self {
                session,
                ctx,
                audio,
                settings,
                high_scores,
                keys: InputState::NONE,
                accumulator: 0.0,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_phase: GamePhase::Ready,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let before = self.session.run().map(|r| (r.time_ticks, r.player.grounded));
                self.session.tick();
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Paused, finished and not-yet-started sessions keep their last events
                let ticks = self.session.run().map(|r| r.time_ticks);
                let Some((ticks_before, was_grounded)) = before else {
                    continue;
                };
                if ticks == Some(ticks_before) {
                    continue;
                }
                for event in self.session.last_events() {
                    if let Some(effect) = SoundEffect::for_event(event, was_grounded) {
                        self.audio.play(effect);
                    }
                }
            }
            if substeps == MAX_SUBSTEPS {
                self.accumulator = 0.0;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            let phase = self.session.phase();
            if phase != self.last_phase {
                if phase == GamePhase::Over {
                    self.on_game_over();
                }
                self.last_phase = phase;
            }
        }

        fn on_game_over(&mut self) {
            let Some(summary) = self.session.summary().copied() else {
                return;
            };
            if self.session.is_new_best() {
                self.audio.play(SoundEffect::HighScore);
            }
            if let Some(rank) = self.high_scores.add_run(&summary, js_sys::Date::now()) {
                log::info!("Leaderboard rank {}", rank);
                self.high_scores.save();
            }
        }

        /// Draw the current frame
        fn render(&self) {
            let tuning = self.session.tuning();
            let ctx = &self.ctx;

            ctx.set_fill_style_str("#0b1020");
            ctx.fill_rect(0.0, 0.0, tuning.canvas_width as f64, tuning.canvas_height as f64);

            let Some(run) = self.session.run() else {
                return;
            };
            let cam = &run.camera;

            ctx.set_fill_style_str("#3fb37f");
            for p in &run.platforms {
                let y = cam.to_screen(p.y);
                if y < -PLATFORM_HEIGHT || y > tuning.canvas_height {
                    continue;
                }
                ctx.fill_rect(p.x as f64, y as f64, p.width as f64, PLATFORM_HEIGHT as f64);
            }

            let body = &run.player;
            ctx.set_fill_style_str(if body.grounded { "#ffd166" } else { "#ef476f" });
            ctx.fill_rect(
                body.pos.x as f64,
                cam.to_screen(body.pos.y) as f64,
                PLAYER_SIZE as f64,
                PLAYER_SIZE as f64,
            );
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let result = self.session.last_result();

            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set("#hud-score .hud-value", &result.score.to_string());
            set("#hud-height .hud-value", &result.height_meters.to_string());
            set("#hud-best .hud-value", &self.session.high_score().to_string());
            set("#hud-combo .hud-value", &sky_climb::combo_label(result.combo));
            if self.settings.show_fps {
                set("#hud-fps .hud-value", &self.fps.to_string());
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                match self.session.summary() {
                    Some(summary) => {
                        let _ = el.set_attribute("class", "");
                        set("#final-score", &summary.score.to_string());
                        set("#final-combo", &summary.combo.to_string());
                        set("#final-reward", &summary.reward.to_string());
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            if self.settings.show_leaderboard && self.session.summary().is_some() {
                let rows: Vec<String> = self
                    .high_scores
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| format!("{}. {}m x{} ({} pts)", i + 1, e.score, e.combo, e.reward))
                    .collect();
                set("#leaderboard", &rows.join("\n"));
            }
        }

        /// Press or release an action from the keyboard
        fn on_key(&mut self, action: Action, pressed: bool, repeat: bool) {
            match action {
                Action::Jump => {
                    if pressed && !repeat {
                        self.session.request_jump();
                    }
                }
                Action::Left | Action::Right => {
                    self.keys.set(action, pressed);
                    self.session
                        .set_horizontal_intent(self.keys.left, self.keys.right);
                }
            }
        }

        /// Hand the controls to the autopilot (or take them back) and remember it
        fn toggle_demo_mode(&mut self) {
            let enabled = !self.session.is_autopilot();
            self.session.set_autopilot(enabled);
            self.settings.demo_mode = enabled;
            self.settings.save();
            log::info!("Autopilot: {}", enabled);
        }

        /// Start, or restart with a new seed once the run is over
        fn start_or_restart(&mut self) {
            let seed = js_sys::Date::now() as u64;
            match self.session.phase() {
                GamePhase::Ready => {
                    self.session.set_seed(seed);
                    self.session.start();
                }
                GamePhase::Over => {
                    self.session.set_seed(seed);
                    self.session.restart();
                    self.session.set_high_score(self.high_scores.top_score());
                }
                GamePhase::Running => return,
            }
            self.session
                .set_horizontal_intent(self.keys.left, self.keys.right);
            self.audio.resume();
        }
    }

    fn load_points() -> u64 {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(POINTS_KEY).ok().flatten())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    fn save_points(points: u64) {
        if let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        {
            let _ = storage.set_item(POINTS_KEY, &points.to_string());
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Sky Climb starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("no canvas");
            return;
        };

        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("2d context unavailable");
            return;
        };

        let tuning = Tuning::for_canvas(canvas.width() as f32, canvas.height() as f32);
        let seed = js_sys::Date::now() as u64;
        let points = Rc::new(Cell::new(load_points()));
        let game = Rc::new(RefCell::new(Game::new(ctx, tuning, seed, points)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        setup_auto_pause(game.clone());

        {
            let mut g = game.borrow_mut();
            if g.settings.demo_mode {
                g.start_or_restart();
            }
        }

        request_animation_frame(game);

        log::info!("Sky Climb running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                if let Some(action) = Action::from_key(&key) {
                    event.prevent_default();
                    g.on_key(action, true, event.repeat());
                    return;
                }
                match key.as_str() {
                    "Enter" | "r" | "R" => g.start_or_restart(),
                    "i" | "I" => g.toggle_demo_mode(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(action) = Action::from_key(&event.key()) {
                    game.borrow_mut().on_key(action, false, false);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().start_or_restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Tab visibility change
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = web_sys::window()
                    .and_then(|w| w.document())
                    .map(|d| d.visibility_state() == web_sys::VisibilityState::Hidden)
                    .unwrap_or(false);
                let mut g = game.borrow_mut();
                if hidden && g.settings.auto_pause {
                    g.session.stop_handle().request_stop();
                    log::info!("Auto-paused (tab hidden)");
                } else if !hidden {
                    g.session.stop_handle().resume();
                    // Don't let the hidden time turn into a burst of ticks
                    g.last_time = 0.0;
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.auto_pause {
                    g.session.stop_handle().request_stop();
                    log::info!("Auto-paused (window blur)");
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
                // Keys released while unfocused never reach us
                g.keys = InputState::NONE;
                g.session.set_horizontal_intent(false, false);
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.session.stop_handle().resume();
                g.audio.set_muted(false);
                g.last_time = 0.0;
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::{Parser, Subcommand};
    use thiserror::Error;

    use sky_climb::sim::{GameOverSummary, GamePhase, Replay, ReplayError, Session, TickResult};
    use sky_climb::{Tuning, TuningError};

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error(transparent)]
        Replay(#[from] ReplayError),
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    #[derive(Parser)]
    #[command(name = "sky-climb", about = "Sky Climb headless simulator")]
    pub struct Cli {
        /// Optional tuning JSON file (missing fields use defaults)
        #[arg(long, global = true)]
        tuning: Option<PathBuf>,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Play one run with the autopilot
        Run {
            /// Seed for platform generation
            #[arg(long, default_value_t = 42)]
            seed: u64,

            /// Stop after this many ticks even if the run is still going
            #[arg(long, default_value_t = 20_000)]
            max_ticks: u64,

            /// Output path for replay JSON
            #[arg(long)]
            output: Option<PathBuf>,
        },

        /// Re-simulate a recorded replay
        Replay {
            /// Path to the replay JSON file
            path: PathBuf,
        },

        /// Run the autopilot over many seeds and rank them by height
        Sweep {
            /// Number of seeds, starting at 0
            #[arg(long, default_value_t = 20)]
            runs: u64,

            #[arg(long, default_value_t = 20_000)]
            max_ticks: u64,
        },
    }

    fn load_tuning(path: Option<&Path>) -> Result<Tuning, CliError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                Ok(Tuning::from_json(&json)?)
            }
            None => Ok(Tuning::default()),
        }
    }

    /// Play one autopilot run, returning the session when it ended or ran out of ticks
    fn autopilot_run(tuning: Tuning, seed: u64, max_ticks: u64, record: bool) -> Session {
        let mut session = Session::new(tuning, seed);
        session.set_autopilot(true);
        session.set_recording(record);
        session.start();
        for _ in 0..max_ticks {
            if session.tick().phase == GamePhase::Over {
                break;
            }
        }
        session
    }

    pub fn execute(cli: Cli) -> Result<(), CliError> {
        let tuning = load_tuning(cli.tuning.as_deref())?;

        match cli.command {
            Commands::Run {
                seed,
                max_ticks,
                output,
            } => cmd_run(tuning, seed, max_ticks, output),
            Commands::Replay { path } => cmd_replay(&path),
            Commands::Sweep { runs, max_ticks } => {
                cmd_sweep(tuning, runs, max_ticks);
                Ok(())
            }
        }
    }

    fn cmd_run(tuning: Tuning, seed: u64, max_ticks: u64, output: Option<PathBuf>) -> Result<(), CliError> {
        println!("Running autopilot (seed={})", seed);

        let session = autopilot_run(tuning, seed, max_ticks, output.is_some());
        let result = session.last_result();

        println!();
        println!("=== Run Result ===");
        println!("Phase:   {:?}", result.phase);
        println!("Score:   {}m", result.score);
        println!("Combo:   {}", result.combo);
        if let Some(summary) = session.summary() {
            println!("Reward:  {}", summary.reward);
            println!("Ticks:   {}", summary.ticks);
        } else {
            println!("Height:  {}m (still climbing after {} ticks)", result.height_meters, max_ticks);
        }

        if let (Some(path), Some(replay)) = (output, session.replay()) {
            std::fs::write(&path, replay.to_json()?)?;
            println!("\nReplay written to {}", path.display());
        }
        Ok(())
    }

    fn cmd_replay(path: &Path) -> Result<(), CliError> {
        let json = std::fs::read_to_string(path)?;
        let replay = Replay::from_json(&json)?;
        let outcome = replay.run();

        println!("Replay seed={} inputs={}", replay.seed, replay.inputs.len());
        println!("Phase:   {:?}", outcome.result.phase);
        println!("Score:   {}m", outcome.result.score);
        println!("Combo:   {}", outcome.result.combo);
        println!("Ticks:   {}", outcome.ticks);
        if let Some(reward) = outcome.reward {
            println!("Reward:  {}", reward);
        }
        Ok(())
    }

    fn cmd_sweep(tuning: Tuning, runs: u64, max_ticks: u64) {
        let mut rows: Vec<(u64, TickResult, Option<GameOverSummary>)> = (0..runs)
            .map(|seed| {
                let session = autopilot_run(tuning, seed, max_ticks, false);
                (seed, session.last_result(), session.summary().copied())
            })
            .collect();
        rows.sort_by(|a, b| b.1.score.cmp(&a.1.score).then(a.0.cmp(&b.0)));

        println!("=== Autopilot Sweep ({} seeds, {} ticks max) ===", runs, max_ticks);
        println!("{:<6} {:>8} {:>8} {:>6} {:>8}", "Seed", "Phase", "Score", "Combo", "Reward");
        println!("{:-<6} {:-<8} {:-<8} {:-<6} {:-<8}", "", "", "", "", "");
        for (seed, result, summary) in &rows {
            let reward = summary
                .map(|s| s.reward.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<6} {:>8} {:>8} {:>6} {:>8}",
                seed,
                format!("{:?}", result.phase),
                result.score,
                result.combo,
                reward
            );
        }

        if let Some(best) = rows.first() {
            println!("\nBest: seed {} reached {}m", best.0, best.1.score);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), cli::CliError> {
    use clap::Parser;

    env_logger::init();
    log::info!("Sky Climb (native) starting...");

    cli::execute(cli::Cli::parse())
}
