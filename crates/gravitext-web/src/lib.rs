//! `#[wasm_bindgen]` surface for the Gravitext page.
//!
//! wasm-bindgen cannot export the runner itself, so it lives in a
//! `thread_local!` and every export is a free function over it. Player actions
//! are queued and applied on the next `game_tick`; accessors return JSON
//! strings the page parses.

pub mod clock;
pub mod runner;
pub mod storage;

use std::cell::RefCell;

use gravitext::{command_words, GameConfig, GravityDirection, Gravitext, InputEvent};
use wasm_bindgen::prelude::*;

pub use clock::JsClock;
pub use runner::GameRunner;
pub use storage::LocalStorage;

thread_local! {
    static RUNNER: RefCell<Option<GameRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. Before `game_init` this logs and returns `None`.
fn with_runner<R>(f: impl FnOnce(&mut GameRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("Game not initialized; call game_init() first");
                None
            }
        }
    })
}

fn push(event: InputEvent) {
    with_runner(|r| r.push_input(event));
}

#[wasm_bindgen]
pub fn game_init(width: f32, height: f32) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = GameConfig {
        world_width: width.max(1.0),
        world_height: height.max(1.0),
        seed: clock::now_seed(),
        ..GameConfig::default()
    };
    let game = Gravitext::new(config, Box::new(LocalStorage::open()), Box::new(JsClock));
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(GameRunner::new(game));
    });
    log::info!("gravitext: initialized");
}

#[wasm_bindgen]
pub fn game_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

/// The page was hidden; forget the backlog instead of fast-forwarding.
#[wasm_bindgen]
pub fn game_resume() {
    with_runner(|r| r.reset_clock());
}

// ---- Player actions ----

#[wasm_bindgen]
pub fn game_submit_word(text: &str, x: f32, y: f32) {
    push(InputEvent::SubmitWord {
        text: text.to_string(),
        x,
        y,
    });
}

#[wasm_bindgen]
pub fn game_toggle_gravity() {
    push(InputEvent::ToggleGravity);
}

/// `direction` is one of `up`, `down`, `left`, `right`.
#[wasm_bindgen]
pub fn game_set_gravity_direction(direction: &str) {
    match direction.parse::<GravityDirection>() {
        Ok(d) => push(InputEvent::SetGravityDirection(d)),
        Err(err) => log::warn!("{err}"),
    }
}

#[wasm_bindgen]
pub fn game_set_gravity_strength(strength: f32) {
    push(InputEvent::SetGravityStrength(strength));
}

#[wasm_bindgen]
pub fn game_select_mode(name: &str) {
    push(InputEvent::SelectMode(name.to_string()));
}

#[wasm_bindgen]
pub fn game_clear_all() {
    push(InputEvent::ClearAll);
}

#[wasm_bindgen]
pub fn game_close_tutorial() {
    push(InputEvent::CloseTutorial);
}

#[wasm_bindgen]
pub fn game_toggle_sound() {
    push(InputEvent::ToggleSound);
}

#[wasm_bindgen]
pub fn game_toggle_music() {
    push(InputEvent::ToggleMusic);
}

#[wasm_bindgen]
pub fn game_set_volume(volume: f32) {
    with_runner(|r| r.game_mut().set_volume(volume));
}

#[wasm_bindgen]
pub fn game_set_music_volume(volume: f32) {
    with_runner(|r| r.game_mut().set_music_volume(volume));
}

#[wasm_bindgen]
pub fn game_reset_achievements() {
    with_runner(|r| r.game_mut().reset_achievements());
}

#[wasm_bindgen]
pub fn game_resize(width: f32, height: f32) {
    push(InputEvent::Resize { width, height });
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_tutorial_shown() -> bool {
    with_runner(|r| r.game().tutorial_shown()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn get_labels_json() -> String {
    with_runner(|r| r.labels_json()).unwrap_or_else(|| "[]".into())
}

/// Events since the last call. Each call empties the outbox.
#[wasm_bindgen]
pub fn get_events_json() -> String {
    with_runner(|r| r.events_json()).unwrap_or_else(|| "[]".into())
}

#[wasm_bindgen]
pub fn get_achievements_json() -> String {
    with_runner(|r| r.achievements_json()).unwrap_or_else(|| "[]".into())
}

#[wasm_bindgen]
pub fn get_achievement_progress_json() -> String {
    with_runner(|r| r.achievement_progress_json()).unwrap_or_else(|| "{}".into())
}

#[wasm_bindgen]
pub fn get_challenges_json() -> String {
    with_runner(|r| r.challenges_json()).unwrap_or_else(|| "[]".into())
}

#[wasm_bindgen]
pub fn get_challenge_progress_json() -> String {
    with_runner(|r| r.challenge_progress_json()).unwrap_or_else(|| "{}".into())
}

#[wasm_bindgen]
pub fn get_stats_json() -> String {
    with_runner(|r| r.stats_json()).unwrap_or_else(|| "{}".into())
}

#[wasm_bindgen]
pub fn get_audio_json() -> String {
    with_runner(|r| r.audio_json()).unwrap_or_else(|| "{}".into())
}

/// Reserved command words for the help panel. Available before init.
#[wasm_bindgen]
pub fn get_command_words_json() -> String {
    serde_json::to_string(&command_words()).unwrap_or_else(|_| "[]".into())
}

#[wasm_bindgen]
pub fn get_world_width() -> f32 {
    with_runner(|r| r.world_width()).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_world_height() -> f32 {
    with_runner(|r| r.world_height()).unwrap_or(0.0)
}
