//! Game state and core simulation types
//!
//! All state that must be persisted for determinism lives here. Entities are
//! plain records in flat vectors; nothing owns anything else.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::levels::{LevelConfig, level_config};
use super::progression::Progression;
use crate::consts::*;

/// Current mode of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Title screen, no ticks
    Menu,
    /// Active combat
    Playing,
    /// Kill target met and field clear, banner showing
    LevelComplete,
    /// Transition into the next level
    WarpJump,
    /// Choosing a relic between levels
    Draft,
    /// Suspended; resumes `pause_return_mode`
    Paused,
    /// Run ended
    GameOver,
}

impl Mode {
    /// Modes during which the fixed-step loop runs ticks
    pub fn ticks(self) -> bool {
        !matches!(self, Mode::Menu | Mode::Paused)
    }

    /// Modes that can be paused
    pub fn pausable(self) -> bool {
        matches!(
            self,
            Mode::Playing | Mode::LevelComplete | Mode::WarpJump | Mode::Draft
        )
    }

    /// Modes with combat music
    pub fn combat_music(self) -> bool {
        matches!(self, Mode::Playing | Mode::LevelComplete | Mode::WarpJump)
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Seeker,
    Spinner,
    Tank,
    Mine,
    Splitter,
    Shard,
    Boss,
}

impl EnemyKind {
    /// Base score for a credited kill
    pub fn base_points(self) -> u32 {
        match self {
            EnemyKind::Seeker => 120,
            EnemyKind::Spinner => 170,
            EnemyKind::Tank => 260,
            EnemyKind::Mine => 220,
            EnemyKind::Splitter => 210,
            EnemyKind::Shard => 70,
            EnemyKind::Boss => 2400,
        }
    }

    /// Neon body color
    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Seeker => 0x59f3ff,
            EnemyKind::Spinner => 0xff6696,
            EnemyKind::Tank => 0xff9648,
            EnemyKind::Mine => 0xf6ff67,
            EnemyKind::Splitter => 0x7d8bff,
            EnemyKind::Shard => 0xb5c2ff,
            EnemyKind::Boss => 0xff4fd5,
        }
    }

    /// Heavy enemies shake the camera harder when they die
    pub fn is_heavy(self) -> bool {
        matches!(self, EnemyKind::Tank | EnemyKind::Boss)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Seeker => "seeker",
            EnemyKind::Spinner => "spinner",
            EnemyKind::Tank => "tank",
            EnemyKind::Mine => "mine",
            EnemyKind::Splitter => "splitter",
            EnemyKind::Shard => "shard",
            EnemyKind::Boss => "boss",
        }
    }
}

/// Elite modifier tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliteMod {
    #[default]
    None,
    Hasted,
    Armored,
    Volatile,
}

impl EliteMod {
    pub fn color(self) -> Option<u32> {
        match self {
            EliteMod::None => None,
            EliteMod::Hasted => Some(0x7effe9),
            EliteMod::Armored => Some(0xffd88a),
            EliteMod::Volatile => Some(0xff8ea8),
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKind {
    Rapid,
    Shield,
    Scatter,
    Drone,
    Arc,
    Gravity,
    Cannon,
    Phase,
    Heart,
    Nova,
}

impl PowerupKind {
    pub fn color(self) -> u32 {
        match self {
            PowerupKind::Rapid => 0x2ef7ff,
            PowerupKind::Shield => 0x82ffb2,
            PowerupKind::Scatter => 0xffd56d,
            PowerupKind::Drone => 0x92fff2,
            PowerupKind::Arc => 0xa7c8ff,
            PowerupKind::Gravity => 0xd8a8ff,
            PowerupKind::Cannon => 0xffb36d,
            PowerupKind::Phase => 0xb7f6ff,
            PowerupKind::Heart => 0xff87a8,
            PowerupKind::Nova => 0xff80ff,
        }
    }

    /// HUD message on pickup
    pub fn message(self) -> &'static str {
        match self {
            PowerupKind::Rapid => "RAPID FIRE",
            PowerupKind::Shield => "AEGIS SHIELD",
            PowerupKind::Scatter => "SCATTER SHOT",
            PowerupKind::Drone => "DRONE WING",
            PowerupKind::Arc => "ARC REACTOR",
            PowerupKind::Gravity => "GRAVITY WELL",
            PowerupKind::Cannon => "NOVA CANNON +1",
            PowerupKind::Phase => "PHASE CHARGE +1",
            PowerupKind::Heart => "ENERGY RESTORED",
            PowerupKind::Nova => "NOVA BLAST",
        }
    }
}

/// Discrete gameplay events for audio and other observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Shoot,
    EnemyHit,
    EnemyExplode { kind: EnemyKind, credited: bool },
    PlayerDamaged,
    LevelUp,
    Powerup(PowerupKind),
    PhasePulse,
    CannonBlast,
    ArcZap,
    OverdriveActivated,
    ShieldRecharge,
    ShieldRestored,
    BossSpawned,
    GameOver,
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Base move speed after relic scaling
    pub speed: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub shield: f32,
    pub max_shield: f32,
    /// Seconds before shield regen may start
    pub shield_regen_delay: f32,
    pub shield_regen_active: bool,
    /// Aegis powerup: ram immunity
    pub shield_timer: f32,
    pub invulnerable: f32,
    pub fire_cooldown: f32,
    pub dash_cooldown: f32,
    pub dash_timer: f32,
    pub rapid_timer: f32,
    pub scatter_timer: f32,
    pub drone_timer: f32,
    pub drone_cooldown: f32,
    pub arc_timer: f32,
    pub gravity_timer: f32,
    pub cannon_charges: u32,
    pub cannon_cooldown: f32,
    pub phase_charges: u32,
    pub phase_cooldown: f32,
    /// Position history for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            speed: PLAYER_BASE_SPEED,
            energy: PLAYER_BASE_ENERGY,
            max_energy: PLAYER_BASE_ENERGY,
            shield: PLAYER_BASE_SHIELD,
            max_shield: PLAYER_BASE_SHIELD,
            shield_regen_delay: 0.0,
            shield_regen_active: false,
            shield_timer: 0.0,
            invulnerable: 0.0,
            fire_cooldown: 0.0,
            dash_cooldown: 0.0,
            dash_timer: 0.0,
            rapid_timer: 0.0,
            scatter_timer: 0.0,
            drone_timer: 0.0,
            drone_cooldown: 0.0,
            arc_timer: 0.0,
            gravity_timer: 0.0,
            cannon_charges: 0,
            cannon_cooldown: 0.0,
            phase_charges: 1,
            phase_cooldown: 0.0,
            trail: Vec::new(),
        }
    }

    /// Pull energy and shield back inside `[0, max]`
    pub fn clamp_resources(&mut self) {
        self.energy = self.energy.clamp(0.0, self.max_energy);
        self.shield = self.shield.clamp(0.0, self.max_shield);
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Orientation (radians)
    pub angle: f32,
    pub spin: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub radius: f32,
    pub speed: f32,
    /// Multiplier on the base contact damage
    pub contact_damage: f32,
    pub shoot_cooldown: f32,
    pub elite: EliteMod,
    pub color: u32,
    /// Animation phase
    pub pulse: f32,
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Enemy {
    pub fn is_elite(&self) -> bool {
        self.elite != EliteMod::None
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Apply damage; hp never rises above max
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).min(self.max_hp);
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Remaining life (seconds)
    pub life: f32,
    pub damage: f32,
    /// Glow color
    pub glow: u32,
    /// Extra enemies an arc discharge may jump to
    pub arc_chains: u32,
}

/// An enemy projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life: f32,
    pub damage: f32,
    pub glow: u32,
    /// Near-miss bonus already granted
    pub near_missed: bool,
}

/// A dropped pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub kind: PowerupKind,
    pub pos: Vec2,
    /// Vertical drift, damped each tick
    pub vel_y: f32,
    pub radius: f32,
    pub life: f32,
    pub pulse: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

/// A short-lived lightning segment between two arc-chain targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcLink {
    pub from: Vec2,
    pub to: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub color: u32,
}

/// An expanding shockwave ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ripple {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// 0-1, decreases over time
    pub life: f32,
    pub band: f32,
    pub power: f32,
}

/// Arena and effect limits derived from settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub width: f32,
    pub height: f32,
    pub max_particles: usize,
    /// Trail length multiplier (1.0 = full)
    pub trail_scale: f32,
    pub screen_shake: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            max_particles: 600,
            trail_scale: 1.0,
            screen_shake: true,
        }
    }
}

impl SimConfig {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// True if `pos` lies within the arena grown by `padding` on every side
    pub fn in_bounds(&self, pos: Vec2, padding: f32) -> bool {
        pos.x >= -padding
            && pos.x <= self.width + padding
            && pos.y >= -padding
            && pos.y <= self.height + padding
    }
}

/// Score waiting to be submitted to the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingScore {
    pub score: u64,
    /// 1-based level reached
    pub level: u32,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: SimConfig,
    pub mode: Mode,
    /// Mode restored when leaving `Paused`
    pub pause_return_mode: Mode,
    /// Simulated seconds this run
    pub time: f32,
    pub score: f64,
    pub level_index: u32,
    /// Resolved configuration for `level_index`
    pub level: LevelConfig,
    pub kills_in_level: u32,
    pub streak: u32,
    pub streak_timer: f32,
    pub spawn_timer: f32,
    pub level_done_timer: f32,
    pub warp_timer: f32,
    pub shake: f32,
    pub flash: f32,
    pub cinematic_pulse: f32,
    pub camera_offset: Vec2,
    pub hit_stop_timer: f32,
    pub overdrive_meter: f32,
    pub overdrive_timer: f32,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    pub powerup_message: String,
    pub powerup_message_timer: f32,
    pub pending_score: Option<PendingScore>,
    pub progression: Progression,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub powerups: Vec<Powerup>,
    pub arc_links: Vec<ArcLink>,
    pub ripples: Vec<Ripple>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Enemies spawned by death cascades, appended at the end of the tick
    pub spawn_queue: Vec<Enemy>,
    /// Events emitted since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next enemy ID
    next_enemy_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default arena
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            mode: Mode::Menu,
            pause_return_mode: Mode::Playing,
            time: 0.0,
            score: 0.0,
            level_index: 0,
            level: level_config(0),
            kills_in_level: 0,
            streak: 0,
            streak_timer: 0.0,
            spawn_timer: 0.0,
            level_done_timer: 0.0,
            warp_timer: 0.0,
            shake: 0.0,
            flash: 0.0,
            cinematic_pulse: 0.0,
            camera_offset: Vec2::ZERO,
            hit_stop_timer: 0.0,
            overdrive_meter: 0.0,
            overdrive_timer: 0.0,
            boss_spawned: false,
            boss_defeated: false,
            powerup_message: String::new(),
            powerup_message_timer: 0.0,
            pending_score: None,
            progression: Progression::default(),
            player: Player::new(config.center()),
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            powerups: Vec::new(),
            arc_links: Vec::new(),
            ripples: Vec::new(),
            particles: Vec::new(),
            spawn_queue: Vec::new(),
            events: Vec::new(),
            next_enemy_id: 1,
        }
    }

    /// Allocate a new enemy ID
    pub fn next_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn overdrive_active(&self) -> bool {
        self.overdrive_timer > 0.0
    }

    /// Current streak multiplier applied to score
    pub fn streak_multiplier(&self) -> u32 {
        self.streak.clamp(1, MAX_STREAK_MULTIPLIER)
    }

    /// Add score scaled by the streak multiplier and relic score bonus.
    /// Ignored once the run has ended so the pending entry stays final.
    pub fn add_score(&mut self, amount: f32) {
        if self.mode == Mode::GameOver {
            return;
        }
        let mult = self.streak_multiplier() as f64 * self.progression.stats.score_mult as f64;
        self.score += amount as f64 * mult;
    }

    /// Fill the overdrive meter; no gain while a burst is running
    pub fn add_overdrive(&mut self, value: f32) {
        if self.overdrive_active() {
            return;
        }
        self.overdrive_meter = (self.overdrive_meter + value).clamp(0.0, OVERDRIVE_MAX);
    }

    /// Enemies still alive (hp above zero)
    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }
}

/// Record a position to a trail (newest first)
pub fn record_trail(trail: &mut Vec<Vec2>, pos: Vec2, max: usize) {
    trail.insert(0, pos);
    trail.truncate(max);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_in_menu() {
        let state = GameState::new(7);
        assert_eq!(state.mode, Mode::Menu);
        assert_eq!(state.player.pos, Vec2::new(640.0, 360.0));
        assert_eq!(state.player.phase_charges, 1);
        assert_eq!(state.player.cannon_charges, 0);
    }

    #[test]
    fn test_enemy_ids_increase() {
        let mut state = GameState::new(7);
        let a = state.next_enemy_id();
        let b = state.next_enemy_id();
        assert!(b > a);
    }

    #[test]
    fn test_clamp_resources() {
        let mut player = Player::new(Vec2::ZERO);
        player.energy = 140.0;
        player.shield = -3.0;
        player.clamp_resources();
        assert_eq!(player.energy, 100.0);
        assert_eq!(player.shield, 0.0);
    }

    #[test]
    fn test_score_uses_streak_multiplier() {
        let mut state = GameState::new(7);
        state.mode = Mode::Playing;
        state.add_score(100.0);
        assert_eq!(state.score, 100.0);
        state.streak = 30;
        state.add_score(100.0);
        assert_eq!(state.score, 100.0 + 1200.0);
        state.mode = Mode::GameOver;
        state.add_score(100.0);
        assert_eq!(state.score, 1300.0);
    }

    #[test]
    fn test_overdrive_meter_caps_and_locks() {
        let mut state = GameState::new(7);
        state.add_overdrive(250.0);
        assert_eq!(state.overdrive_meter, OVERDRIVE_MAX);
        state.overdrive_meter = 10.0;
        state.overdrive_timer = 1.0;
        state.add_overdrive(50.0);
        assert_eq!(state.overdrive_meter, 10.0);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut trail = Vec::new();
        for i in 0..20 {
            record_trail(&mut trail, Vec2::splat(i as f32), 6);
        }
        assert_eq!(trail.len(), 6);
        assert_eq!(trail[0], Vec2::splat(19.0));
    }

    #[test]
    fn test_mode_serializes_kebab_case() {
        let json = serde_json::to_string(&Mode::LevelComplete).unwrap();
        assert_eq!(json, "\"level-complete\"");
    }

    #[test]
    fn test_state_round_trips_through_serde() {
        let mut state = GameState::new(99);
        state.score = 1234.0;
        state.level_index = 3;
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.level_index, 3);
        assert_eq!(restored.score, 1234.0);
        assert_eq!(restored.mode, Mode::Menu);
    }
}
