//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (flat entity vectors, tail-first removal)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod flow;
pub mod levels;
pub mod player;
pub mod progression;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use clock::FixedStepClock;
pub use collision::{circles_overlap, destroy_enemy, reap_dead_enemies};
pub use levels::{LevelConfig, level_config};
pub use progression::{MutatorId, Progression, RelicId, RelicStats};
pub use snapshot::{Snapshot, render_game_to_text};
pub use state::{
    Enemy, EnemyKind, EliteMod, GameEvent, GameState, Mode, PendingScore, Player, PowerupKind,
    SimConfig,
};
pub use tick::{TickInput, tick};
