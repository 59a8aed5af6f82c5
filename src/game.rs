//! Tick driver
//!
//! Owns the run state and everything around it: the fixed-step clock, input,
//! the audio sink and the score store. Hosts call `frame` once per display
//! refresh (or `advance_time` from a test harness) and read snapshots back.

use crate::audio::{AudioSink, SilentAudio};
use crate::consts::{FIXED_DT, HARNESS_MS_PER_TICK};
use crate::highscores::{HighScores, ScoreEntry};
use crate::persistence::{FallbackStore, SaveStatus};
use crate::platform::{HostIntent, InputState};
use crate::settings::Settings;
use crate::sim::{
    FixedStepClock, GameState, Mode, RelicId, TickInput, flow, render_game_to_text, tick,
};

pub struct Game {
    pub state: GameState,
    clock: FixedStepClock,
    pub input: InputState,
    audio: Box<dyn AudioSink>,
    store: FallbackStore,
    pub highscores: HighScores,
    pub settings: Settings,
    /// Pending score already submitted this run
    score_saved: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

impl Game {
    pub fn new(
        seed: u64,
        settings: Settings,
        mut audio: Box<dyn AudioSink>,
        store: FallbackStore,
    ) -> Self {
        audio.set_muted(settings.muted);
        let highscores = store.load();
        log::info!(
            "Game initialized with seed {} ({} high scores)",
            seed,
            highscores.len()
        );
        Self {
            state: GameState::with_config(seed, settings.to_sim_config()),
            clock: FixedStepClock::default(),
            input: InputState::new(),
            audio,
            store,
            highscores,
            settings,
            score_saved: false,
            autopilot: false,
        }
    }

    /// Silent, memory-backed game for tools and tests
    pub fn headless(seed: u64) -> Self {
        let settings = Settings::default();
        let audio = Box::new(SilentAudio::new(settings.muted));
        Self::new(seed, settings, audio, FallbackStore::in_memory())
    }

    /// Start (or restart) a run. `seed` replaces the current one when given.
    pub fn start_run(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.state.seed = seed;
        }
        self.state.config = self.settings.to_sim_config();
        flow::start_run(&mut self.state);
        self.score_saved = false;
        self.clock.reset();
        self.input.consume_one_shots();
        self.sync_audio();
    }

    /// Advance by a wall-clock frame delta (seconds). Returns ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        if !self.state.mode.ticks() {
            return 0;
        }
        let steps = self.clock.advance(dt);
        for _ in 0..steps {
            self.step();
        }
        self.sync_audio();
        steps
    }

    /// Harness time advance: `max(1, round(ms / 16.67))` ticks unless the run
    /// is in the menu or paused. Returns ticks run.
    pub fn advance_time(&mut self, ms: f64) -> u32 {
        if !self.state.mode.ticks() {
            return 0;
        }
        let steps = (ms / HARNESS_MS_PER_TICK).round().max(1.0) as u32;
        for _ in 0..steps {
            self.step();
        }
        self.sync_audio();
        steps
    }

    /// One fixed tick with the current input. One-shots stay queued until
    /// a tick actually runs.
    fn step(&mut self) {
        let input = TickInput {
            autopilot: self.autopilot,
            ..self.input.tick_input()
        };
        if tick(&mut self.state, &input, FIXED_DT) {
            self.input.consume_one_shots();
        }
    }

    /// Forward emitted events and the music state to the audio sink
    fn sync_audio(&mut self) {
        for event in self.state.drain_events() {
            self.audio.play(event);
        }
        self.audio.set_combat_music(self.state.mode.combat_music());
    }

    pub fn toggle_pause(&mut self) {
        flow::toggle_pause(&mut self.state);
        self.input.release_all();
        self.sync_audio();
    }

    /// Window blur or hidden tab
    pub fn on_focus_lost(&mut self) {
        self.input.release_all();
        if self.settings.pause_on_blur && self.state.mode.pausable() {
            flow::pause_for_focus_loss(&mut self.state);
            log::info!("Auto-paused (focus lost)");
            self.sync_audio();
        }
    }

    /// Pick a relic by zero-based draft slot
    pub fn choose_draft(&mut self, index: usize) -> bool {
        flow::select_draft_index(&mut self.state, index)
    }

    /// Pick a relic by id (`"prism"`, `"aegis"`, ...)
    pub fn choose_relic(&mut self, id: &str) -> bool {
        match RelicId::parse(id) {
            Some(relic) => flow::select_relic(&mut self.state, relic),
            None => {
                log::warn!("Unknown relic {:?}", id);
                false
            }
        }
    }

    pub fn skip_draft(&mut self) {
        flow::skip_draft(&mut self.state);
    }

    pub fn toggle_mute(&mut self) {
        self.settings.muted = !self.settings.muted;
        self.audio.set_muted(self.settings.muted);
        self.audio.set_combat_music(self.state.mode.combat_music());
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    /// Apply queued intents. Returns the ones only the host can perform.
    pub fn process_intents(&mut self) -> Vec<HostIntent> {
        let mut unhandled = Vec::new();
        for intent in self.input.drain_intents() {
            if let Some(rest) = self.handle_intent(intent) {
                unhandled.push(rest);
            }
        }
        unhandled
    }

    pub fn handle_intent(&mut self, intent: HostIntent) -> Option<HostIntent> {
        match intent {
            HostIntent::StartRun => {
                if matches!(self.state.mode, Mode::Menu | Mode::GameOver) {
                    self.start_run(None);
                }
            }
            HostIntent::TogglePause => self.toggle_pause(),
            HostIntent::ToggleMute => self.toggle_mute(),
            HostIntent::ToggleAutopilot => {
                self.autopilot = !self.autopilot;
                log::info!("Autopilot: {}", self.autopilot);
            }
            HostIntent::ChooseDraft(index) => {
                if self.state.mode == Mode::Draft {
                    self.choose_draft(index);
                }
            }
            HostIntent::ToggleFullscreen => return Some(intent),
        }
        None
    }

    /// Save the finished run's score under `name`. Only the first call per
    /// run does anything.
    pub fn submit_score(&mut self, name: &str) -> SaveStatus {
        self.settings.remember_name(name);
        let Some(pending) = self.state.pending_score else {
            return SaveStatus::Skipped;
        };
        if self.score_saved {
            return SaveStatus::Skipped;
        }
        if pending.score == 0 {
            self.score_saved = true;
            return SaveStatus::Skipped;
        }
        let entry = ScoreEntry::new(&self.settings.player_name, pending.score, pending.level);
        let status = self.store.submit(entry);
        if !matches!(status, SaveStatus::Failed(_)) {
            self.score_saved = true;
        }
        self.highscores = self.store.load();
        status
    }

    /// Leaderboard rank the finished run would take, if it qualifies
    pub fn pending_rank(&self) -> Option<usize> {
        let pending = self.state.pending_score?;
        self.highscores.potential_rank(pending.score)
    }

    pub fn score_saved(&self) -> bool {
        self.score_saved
    }

    /// JSON snapshot of the current run
    pub fn snapshot_text(&self) -> String {
        render_game_to_text(&self.state, self.is_muted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::flow;

    #[test]
    fn test_menu_does_not_advance() {
        let mut game = Game::headless(5);
        assert_eq!(game.advance_time(1000.0), 0);
        assert_eq!(game.frame(0.05), 0);
        assert_eq!(game.state.time, 0.0);

        game.start_run(None);
        game.toggle_pause();
        assert_eq!(game.frame(0.05), 0);
        game.toggle_pause();
        // Nothing banked while paused
        assert_eq!(game.frame(0.001), 0);
    }

    #[test]
    fn test_advance_time_tick_count() {
        let mut game = Game::headless(5);
        game.start_run(None);
        assert_eq!(game.advance_time(0.0), 1);
        assert_eq!(game.advance_time(100.0), 6);
        assert_eq!(game.advance_time(1000.0), 60);
        game.toggle_pause();
        assert_eq!(game.advance_time(1000.0), 0);
    }

    #[test]
    fn test_one_shots_survive_until_a_tick() {
        let mut game = Game::headless(5);
        game.start_run(None);
        game.input.key_down("ShiftLeft");
        // No tick this frame
        assert_eq!(game.frame(0.001), 0);
        assert!(game.input.tick_input().dash);
        game.frame(FIXED_DT);
        assert!(!game.input.tick_input().dash);
        assert!(game.state.player.dash_cooldown > 0.0);
    }

    #[test]
    fn test_one_shots_survive_hit_stop() {
        let mut game = Game::headless(5);
        game.start_run(None);
        game.state.hit_stop_timer = 0.1;
        game.input.key_down("ShiftLeft");
        assert_eq!(game.frame(FIXED_DT), 1);
        assert!(game.state.hit_stop_timer > 0.0);
        assert!(game.input.tick_input().dash);
        assert_eq!(game.state.player.dash_cooldown, 0.0);

        for _ in 0..20 {
            game.frame(FIXED_DT);
        }
        assert_eq!(game.state.hit_stop_timer, 0.0);
        assert!(!game.input.tick_input().dash);
        assert!(game.state.player.dash_cooldown > 0.0);
    }

    #[test]
    fn test_intents() {
        let mut game = Game::headless(5);
        game.input.key_down("Enter");
        game.input.key_down("KeyF");
        let rest = game.process_intents();
        assert_eq!(rest, vec![HostIntent::ToggleFullscreen]);
        assert_eq!(game.state.mode, Mode::Playing);

        game.input.key_down("KeyM");
        game.input.key_down("KeyP");
        game.process_intents();
        assert!(game.is_muted());
        assert_eq!(game.state.mode, Mode::Paused);
        assert!(game.snapshot_text().contains("\"audio_muted\": true"));
    }

    #[test]
    fn test_focus_loss_respects_setting() {
        let mut game = Game::headless(5);
        game.start_run(None);
        game.settings.pause_on_blur = false;
        game.on_focus_lost();
        assert_eq!(game.state.mode, Mode::Playing);
        game.settings.pause_on_blur = true;
        game.on_focus_lost();
        assert_eq!(game.state.mode, Mode::Paused);
    }

    #[test]
    fn test_submit_score_once() {
        let mut game = Game::headless(5);
        game.start_run(None);
        assert_eq!(game.submit_score("early"), SaveStatus::Skipped);

        game.state.score = 4321.6;
        flow::fail_run(&mut game.state);
        assert_eq!(game.submit_score("neo!"), SaveStatus::Saved);
        assert_eq!(game.highscores.top_score(), Some(4321));
        assert_eq!(game.highscores.entries[0].name, "NEO");
        assert_eq!(game.highscores.entries[0].level, 1);
        assert_eq!(game.submit_score("again"), SaveStatus::Skipped);
        assert_eq!(game.highscores.len(), 1);

        game.start_run(None);
        assert!(!game.score_saved());
    }

    #[test]
    fn test_zero_score_not_saved() {
        let mut game = Game::headless(5);
        game.start_run(None);
        flow::fail_run(&mut game.state);
        assert_eq!(game.submit_score("zero"), SaveStatus::Skipped);
        assert!(game.score_saved());
        assert!(game.highscores.is_empty());
    }

    #[test]
    fn test_choose_relic_by_id() {
        let mut game = Game::headless(5);
        game.start_run(None);
        flow::open_draft(&mut game.state);
        let offered = game.state.progression.draft_choices[0];
        assert!(!game.choose_relic("nonsense"));
        assert!(game.choose_relic(offered.as_str()));
        assert_eq!(game.state.mode, Mode::WarpJump);
    }

    #[test]
    fn test_skip_draft_warps() {
        let mut game = Game::headless(5);
        game.start_run(None);
        flow::open_draft(&mut game.state);
        game.skip_draft();
        assert_eq!(game.state.mode, Mode::WarpJump);
        assert!(game.state.progression.stacks.is_empty());
    }

    #[test]
    fn test_pending_rank() {
        let mut game = Game::headless(5);
        game.start_run(None);
        assert_eq!(game.pending_rank(), None);
        game.state.score = 50.0;
        flow::fail_run(&mut game.state);
        assert_eq!(game.pending_rank(), Some(1));
    }

    #[test]
    fn test_restart_takes_new_seed() {
        let mut game = Game::headless(5);
        game.start_run(Some(77));
        assert_eq!(game.state.seed, 77);
        assert_eq!(game.state.mode, Mode::Playing);
    }

    #[test]
    fn test_autopilot_runs_headless() {
        let mut game = Game::headless(2024);
        game.autopilot = true;
        game.start_run(None);
        for _ in 0..60 {
            game.advance_time(1000.0);
        }
        assert!(game.state.time > 0.0);
        assert!(game.state.events.is_empty());
    }
}
