//! Level configuration provider
//!
//! A fixed base table of levels, cycled and scaled for indices past its end.
//! Every difficulty knob is monotone in the level index.

use serde::{Deserialize, Serialize};

use super::state::EnemyKind;

/// Resolved parameters for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    /// 1-based display number
    pub level_number: u32,
    /// Credited kills required to clear the level
    pub target_kills: u32,
    /// Seconds between spawns before pressure and mutator scaling
    pub spawn_interval: f32,
    /// Concurrent enemy cap
    pub max_enemies: usize,
    /// Relative spawn weights per enemy type
    pub enemy_mix: Vec<(EnemyKind, f32)>,
    /// Added to the player's base move speed
    pub player_speed_bonus: f32,
    pub boss_level: bool,
}

struct BaseLevel {
    name: &'static str,
    target_kills: u32,
    spawn_interval: f32,
    max_enemies: usize,
    mix: &'static [(EnemyKind, f32)],
    player_speed_bonus: f32,
    boss_level: bool,
}

use EnemyKind::*;

const BASE_LEVELS: [BaseLevel; 6] = [
    BaseLevel {
        name: "Boot Sequence",
        target_kills: 26,
        spawn_interval: 1.1,
        max_enemies: 12,
        mix: &[(Seeker, 6.0), (Spinner, 2.0), (Mine, 1.0)],
        player_speed_bonus: 0.0,
        boss_level: false,
    },
    BaseLevel {
        name: "Pulse District",
        target_kills: 40,
        spawn_interval: 0.95,
        max_enemies: 16,
        mix: &[(Seeker, 4.0), (Spinner, 4.0), (Mine, 2.0), (Splitter, 2.0)],
        player_speed_bonus: 12.0,
        boss_level: false,
    },
    BaseLevel {
        name: "Fractal Pressure",
        target_kills: 56,
        spawn_interval: 0.78,
        max_enemies: 20,
        mix: &[(Seeker, 3.0), (Spinner, 5.0), (Tank, 2.0), (Mine, 3.0), (Splitter, 3.0)],
        player_speed_bonus: 16.0,
        boss_level: false,
    },
    BaseLevel {
        name: "Event Horizon",
        target_kills: 74,
        spawn_interval: 0.64,
        max_enemies: 24,
        mix: &[(Seeker, 2.0), (Spinner, 5.0), (Tank, 4.0), (Mine, 3.0), (Splitter, 5.0)],
        player_speed_bonus: 22.0,
        boss_level: false,
    },
    BaseLevel {
        name: "Rift Core",
        target_kills: 96,
        spawn_interval: 0.53,
        max_enemies: 30,
        mix: &[(Seeker, 2.0), (Spinner, 4.0), (Tank, 5.0), (Mine, 4.0), (Splitter, 6.0)],
        player_speed_bonus: 30.0,
        boss_level: false,
    },
    BaseLevel {
        name: "Singularity Warden",
        target_kills: 110,
        spawn_interval: 0.5,
        max_enemies: 32,
        mix: &[(Seeker, 3.0), (Spinner, 4.0), (Tank, 3.0), (Mine, 2.0), (Splitter, 4.0)],
        player_speed_bonus: 34.0,
        boss_level: true,
    },
];

/// Floor for scaled spawn intervals
const MIN_SPAWN_INTERVAL: f32 = 0.32;

/// Number of levels in one cycle of the base table
pub fn cycle_length() -> u32 {
    BASE_LEVELS.len() as u32
}

/// Resolve the configuration for a zero-based level index.
///
/// Past the base table, each cycle adds the full first-to-last spread of every
/// knob plus a fixed step, so cycle `n + 1` level 0 is never easier than
/// cycle `n`'s final level.
pub fn level_config(index: u32) -> LevelConfig {
    let len = BASE_LEVELS.len() as u32;
    let cycle = index / len;
    let base = &BASE_LEVELS[(index % len) as usize];
    let first = &BASE_LEVELS[0];
    let last = &BASE_LEVELS[BASE_LEVELS.len() - 1];

    let kills_step = last.target_kills - first.target_kills + 16;
    let interval_step = first.spawn_interval - last.spawn_interval + 0.04;
    let enemies_step = last.max_enemies - first.max_enemies + 2;
    let speed_step = last.player_speed_bonus - first.player_speed_bonus + 2.0;

    let name = if cycle == 0 {
        base.name.to_string()
    } else {
        format!("{} +{}", base.name, cycle)
    };

    LevelConfig {
        name,
        level_number: index + 1,
        target_kills: base.target_kills + kills_step * cycle,
        spawn_interval: (base.spawn_interval - interval_step * cycle as f32).max(MIN_SPAWN_INTERVAL),
        max_enemies: base.max_enemies + enemies_step * cycle as usize,
        enemy_mix: base.mix.to_vec(),
        player_speed_bonus: base.player_speed_bonus + speed_step * cycle as f32,
        boss_level: base.boss_level,
    }
}
