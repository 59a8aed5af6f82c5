//! Game settings and preferences
//!
//! Persisted separately from high scores (LocalStorage on web, a JSON file
//! natively).

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::highscores::{DEFAULT_NAME, sanitize_player_name};
use crate::sim::SimConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 180,
            QualityPreset::Medium => 600,
            QualityPreset::High => 1400,
        }
    }

    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.35,
            QualityPreset::Medium => 0.7,
            QualityPreset::High => 1.0,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Particle effects (explosions, sparks, etc.)
    pub particles: bool,

    // === Audio ===
    pub muted: bool,
    /// Pause the run when the window loses focus
    pub pause_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    /// Last name typed on the game-over screen
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            muted: false,
            pause_on_blur: true,
            reduced_motion: false,
            player_name: DEFAULT_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Arena and effect limits for a new `GameState`
    pub fn to_sim_config(&self) -> SimConfig {
        SimConfig {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            max_particles: self.max_particles(),
            trail_scale: self.quality.trail_quality(),
            screen_shake: self.effective_screen_shake(),
        }
    }

    /// Remember a submitted name in its sanitized form
    pub fn remember_name(&mut self, name: &str) {
        self.player_name = sanitize_player_name(name);
    }

    /// Parse settings JSON, falling back to defaults on corruption
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Settings>(text) {
            Ok(mut settings) => {
                settings.player_name = sanitize_player_name(&settings.player_name);
                settings
            }
            Err(err) => {
                log::warn!("Settings unreadable, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file; missing or corrupt files give defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Failed to read settings {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), crate::persistence::StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "neon_rift_settings";

    /// Settings from LocalStorage, defaults when absent
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        match crate::platform::web::storage_get(Self::STORAGE_KEY) {
            Some(json) => Self::from_json(&json),
            None => Self::default(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if crate::platform::web::storage_set(Self::STORAGE_KEY, &json) {
                    log::debug!("Settings written to LocalStorage");
                }
            }
            Err(err) => log::warn!("Settings not saved: {}", err),
        }
    }
}
