//! Browser glue
//!
//! `WebHarness` is the wasm-bindgen surface the page script drives: it feeds
//! input, advances time and reads the JSON snapshot back for rendering and
//! automated play-testing.

use wasm_bindgen::prelude::*;

use super::HostIntent;
use crate::audio::AudioManager;
use crate::game::Game;
use crate::highscores::{HighScores, ScoreEntry};
use crate::persistence::{FallbackStore, MemoryStore, ScoreStore, StoreError};
use crate::settings::Settings;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
}

/// Read a LocalStorage item; `None` when missing or storage is blocked
pub fn storage_get(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Write a LocalStorage item. Returns false if storage refused it.
pub fn storage_set(key: &str, value: &str) -> bool {
    match local_storage() {
        Some(storage) => storage.set_item(key, value).is_ok(),
        None => false,
    }
}

/// Leaderboard in `window.localStorage`
pub struct LocalStorageStore {
    key: &'static str,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        Self {
            key: "neon_rift_highscores",
        }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        local_storage().ok_or(StoreError::Unavailable("localStorage"))
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for LocalStorageStore {
    fn name(&self) -> &'static str {
        "localStorage"
    }

    fn load(&self) -> Result<HighScores, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(self.key) {
            Ok(Some(json)) => Ok(HighScores::from_json(&json)),
            Ok(None) => Ok(HighScores::new()),
            Err(_) => Err(StoreError::Unavailable("localStorage read")),
        }
    }

    fn save(&mut self, entry: ScoreEntry) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let mut scores = self.load()?;
        scores.add(entry);
        let json = scores.to_json()?;
        storage
            .set_item(self.key, &json)
            .map_err(|_| StoreError::Unavailable("localStorage write"))?;
        log::info!("High scores saved ({} entries)", scores.len());
        Ok(())
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Neon Rift core loaded");
}

#[wasm_bindgen]
pub struct WebHarness {
    game: Game,
    fullscreen_requested: bool,
}

#[wasm_bindgen]
impl WebHarness {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> WebHarness {
        let settings = Settings::load();
        let audio = Box::new(AudioManager::new(settings.muted));
        let store = FallbackStore::new(
            Box::new(LocalStorageStore::new()),
            Box::new(MemoryStore::new()),
        );
        let seed = if seed.is_finite() && seed > 0.0 {
            seed as u64
        } else {
            js_sys::Date::now() as u64
        };
        WebHarness {
            game: Game::new(seed, settings, audio, store),
            fullscreen_requested: false,
        }
    }

    /// Advance by a display-frame delta in seconds
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.apply_intents();
        self.game.frame(dt)
    }

    /// Deterministic stepping for automated tests
    pub fn advance_time(&mut self, ms: f64) -> u32 {
        self.apply_intents();
        self.game.advance_time(ms)
    }

    pub fn render_game_to_text(&self) -> String {
        self.game.snapshot_text()
    }

    pub fn key_down(&mut self, code: &str) {
        self.game.input.key_down(code);
    }

    pub fn key_up(&mut self, code: &str) {
        self.game.input.key_up(code);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.game.input.pointer_move(x, y);
    }

    pub fn pointer_button(&mut self, down: bool) {
        self.game.input.pointer_button(down);
    }

    pub fn focus_lost(&mut self) {
        self.game.on_focus_lost();
    }

    /// `seed <= 0` keeps the current seed
    pub fn start_run(&mut self, seed: f64) {
        let seed = (seed.is_finite() && seed > 0.0).then_some(seed as u64);
        self.game.start_run(seed);
    }

    pub fn choose_draft(&mut self, slot: usize) -> bool {
        self.game.choose_draft(slot)
    }

    pub fn choose_relic(&mut self, id: &str) -> bool {
        self.game.choose_relic(id)
    }

    pub fn skip_draft(&mut self) {
        self.game.skip_draft();
    }

    /// 1-based rank the finished run would take, or 0
    pub fn pending_rank(&self) -> usize {
        self.game.pending_rank().unwrap_or(0)
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.game.autopilot = on;
    }

    /// Save the pending score; returns the status line for the UI
    pub fn submit_score(&mut self, name: &str) -> String {
        let status = self.game.submit_score(name);
        self.game.settings.save();
        status.message()
    }

    /// JSON array of the best entries, for one level or overall (`level == 0`)
    pub fn highscores_json(&self, level: u32, limit: usize) -> String {
        let board = &self.game.highscores;
        let top = if level == 0 {
            board.overall_top(limit)
        } else {
            board.level_top(level, limit)
        };
        serde_json::to_string(&top).unwrap_or_else(|_| "[]".into())
    }

    pub fn player_name(&self) -> String {
        self.game.settings.player_name.clone()
    }

    pub fn is_muted(&self) -> bool {
        self.game.is_muted()
    }

    /// True once after F was pressed; the page owns the Fullscreen API
    pub fn take_fullscreen_request(&mut self) -> bool {
        std::mem::take(&mut self.fullscreen_requested)
    }
}

impl WebHarness {
    fn apply_intents(&mut self) {
        let muted = self.game.settings.muted;
        for intent in self.game.process_intents() {
            if intent == HostIntent::ToggleFullscreen {
                self.fullscreen_requested = true;
            }
        }
        if muted != self.game.settings.muted {
            self.game.settings.save();
        }
    }
}
