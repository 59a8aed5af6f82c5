//! Neon Rift - A neon arena shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, progression, game state)
//! - `game`: Tick driver owning the state, clock, input and collaborators
//! - `platform`: Input mapping and the browser harness
//! - `persistence`: High-score stores with fallback
//! - `highscores`: Leaderboard records and queries
//! - `settings`: User preferences and quality presets
//! - `audio`: Gameplay event sinks

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::{HighScores, ScoreEntry};
pub use settings::{QualityPreset, Settings};

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_STEPS: u32 = 5;
    /// Upper bound on a single frame delta (tab stalls, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Milliseconds per tick as seen by the headless harness
    pub const HARNESS_MS_PER_TICK: f64 = 1000.0 / 60.0;

    /// Default arena dimensions (pixels, origin top-left)
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 16.0;
    pub const PLAYER_BASE_SPEED: f32 = 290.0;
    pub const PLAYER_BASE_ENERGY: f32 = 100.0;
    pub const PLAYER_BASE_SHIELD: f32 = 100.0;

    /// Streak multiplier ceiling
    pub const MAX_STREAK_MULTIPLIER: u32 = 12;
    /// Seconds before an idle streak resets
    pub const STREAK_WINDOW: f32 = 2.8;

    /// Overdrive meter capacity and burst length
    pub const OVERDRIVE_MAX: f32 = 100.0;
    pub const OVERDRIVE_DURATION: f32 = 8.5;

    /// Banner time between the last kill and the draft
    pub const LEVEL_COMPLETE_DURATION: f32 = 1.2;
    /// Warp transition length
    pub const WARP_DURATION: f32 = 1.15;

    /// Retained high-score entries
    pub const MAX_STORED_SCORES: usize = 120;
}

/// Clamp without panicking on inverted bounds
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Round to 2 decimal places (snapshot precision)
#[inline]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Uniform float in `[min, max)`. Accepts `min == max`, unlike `random_range`.
#[inline]
pub fn rand_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Uniform integer in `[min, max]`
#[inline]
pub fn rand_int<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Pick a value from `(value, weight)` pairs proportionally to weight.
///
/// Entries with non-positive weight are never chosen. Returns `None` when no
/// entry has positive weight.
pub fn weighted_pick<T: Copy, R: Rng + ?Sized>(entries: &[(T, f32)], rng: &mut R) -> Option<T> {
    let total: f32 = entries.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.random::<f32>() * total;
    for &(value, weight) in entries {
        if weight <= 0.0 {
            continue;
        }
        roll -= weight;
        if roll <= 0.0 {
            return Some(value);
        }
    }
    // Float rounding can leave a sliver of roll; the last weighted entry owns it
    entries.iter().rev().find(|(_, w)| *w > 0.0).map(|(v, _)| *v)
}
