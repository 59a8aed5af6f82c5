//! Text snapshot export
//!
//! A read-only JSON view of the run for test harnesses and tooling. Units are
//! arena pixels and seconds; positions and timers are rounded to 2 decimals.

use serde::{Deserialize, Serialize};

use super::state::{EnemyKind, GameState, Mode, PowerupKind};
use crate::round2;

const MAX_ENEMIES: usize = 20;
const MAX_BULLETS: usize = 25;
const MAX_ENEMY_BULLETS: usize = 20;
const MAX_RIPPLES: usize = 6;
const MAX_ARC_LINKS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub origin: String,
    pub x_axis: String,
    pub y_axis: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelView {
    /// 1-based
    pub index: u32,
    pub name: String,
    pub mutator: String,
    pub kills: u32,
    pub target_kills: u32,
    pub boss_level: bool,
    pub warp_timer: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub rapid_timer: f32,
    pub scatter_timer: f32,
    pub shield_timer: f32,
    pub drone_timer: f32,
    pub cannon_charges: u32,
    pub phase_charges: u32,
    pub phase_cooldown: f32,
    pub arc_timer: f32,
    pub gravity_well_timer: f32,
    pub overdrive_timer: f32,
    pub overdrive_meter: f32,
    pub invulnerable: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub hp: f32,
    pub radius: f32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub elite: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub damage: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupView {
    #[serde(rename = "type")]
    pub kind: PowerupKind,
    pub x: f32,
    pub y: f32,
    pub life: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RippleView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub life: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcLinkView {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub life: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelicView {
    pub id: String,
    pub stacks: u32,
}

/// Everything a headless driver can observe about a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub coordinate_system: CoordinateSystem,
    pub mode: Mode,
    pub level: LevelView,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub enemy_bullets: Vec<BulletView>,
    pub powerups: Vec<PowerupView>,
    pub ripples: Vec<RippleView>,
    pub arc_links: Vec<ArcLinkView>,
    pub score: u64,
    pub streak: u32,
    pub relics: Vec<RelicView>,
    pub draft_choices: Vec<String>,
    pub powerup_message: String,
    pub audio_muted: bool,
}

/// Timers are reported never below zero
fn timer(value: f32) -> f32 {
    round2(value.max(0.0))
}

impl Snapshot {
    pub fn capture(state: &GameState, audio_muted: bool) -> Self {
        let p = &state.player;
        Self {
            coordinate_system: CoordinateSystem {
                origin: "top-left".into(),
                x_axis: "increases to the right".into(),
                y_axis: "increases downward".into(),
                width: state.config.width,
                height: state.config.height,
            },
            mode: state.mode,
            level: LevelView {
                index: state.level.level_number,
                name: state.level.name.clone(),
                mutator: state.progression.mutator.def().name.into(),
                kills: state.kills_in_level,
                target_kills: state.level.target_kills,
                boss_level: state.level.boss_level,
                warp_timer: timer(state.warp_timer),
            },
            player: PlayerView {
                x: round2(p.pos.x),
                y: round2(p.pos.y),
                vx: round2(p.vel.x),
                vy: round2(p.vel.y),
                radius: p.radius,
                energy: timer(p.energy),
                max_energy: p.max_energy,
                shield: timer(p.shield),
                max_shield: p.max_shield,
                rapid_timer: timer(p.rapid_timer),
                scatter_timer: timer(p.scatter_timer),
                shield_timer: timer(p.shield_timer),
                drone_timer: timer(p.drone_timer),
                cannon_charges: p.cannon_charges,
                phase_charges: p.phase_charges,
                phase_cooldown: timer(p.phase_cooldown),
                arc_timer: timer(p.arc_timer),
                gravity_well_timer: timer(p.gravity_timer),
                overdrive_timer: timer(state.overdrive_timer),
                overdrive_meter: timer(state.overdrive_meter),
                invulnerable: timer(p.invulnerable),
            },
            enemies: state
                .enemies
                .iter()
                .take(MAX_ENEMIES)
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    x: round2(e.pos.x),
                    y: round2(e.pos.y),
                    hp: round2(e.hp),
                    radius: e.radius,
                    elite: e.is_elite().then(|| format!("{:?}", e.elite).to_lowercase()),
                })
                .collect(),
            bullets: state
                .bullets
                .iter()
                .take(MAX_BULLETS)
                .map(|b| BulletView {
                    x: round2(b.pos.x),
                    y: round2(b.pos.y),
                    vx: round2(b.vel.x),
                    vy: round2(b.vel.y),
                    damage: None,
                })
                .collect(),
            enemy_bullets: state
                .enemy_bullets
                .iter()
                .take(MAX_ENEMY_BULLETS)
                .map(|b| BulletView {
                    x: round2(b.pos.x),
                    y: round2(b.pos.y),
                    vx: round2(b.vel.x),
                    vy: round2(b.vel.y),
                    damage: Some(b.damage),
                })
                .collect(),
            powerups: state
                .powerups
                .iter()
                .map(|item| PowerupView {
                    kind: item.kind,
                    x: round2(item.pos.x),
                    y: round2(item.pos.y),
                    life: timer(item.life),
                })
                .collect(),
            ripples: state
                .ripples
                .iter()
                .take(MAX_RIPPLES)
                .map(|r| RippleView {
                    x: round2(r.pos.x),
                    y: round2(r.pos.y),
                    radius: round2(r.radius),
                    life: timer(r.life),
                })
                .collect(),
            arc_links: state
                .arc_links
                .iter()
                .take(MAX_ARC_LINKS)
                .map(|link| ArcLinkView {
                    x1: round2(link.from.x),
                    y1: round2(link.from.y),
                    x2: round2(link.to.x),
                    y2: round2(link.to.y),
                    life: timer(link.life),
                })
                .collect(),
            score: state.score.max(0.0).floor() as u64,
            streak: state.streak,
            relics: state
                .progression
                .stacks
                .iter()
                .map(|(id, stacks)| RelicView {
                    id: id.as_str().into(),
                    stacks: *stacks,
                })
                .collect(),
            draft_choices: state
                .progression
                .draft_choices
                .iter()
                .map(|id| id.as_str().into())
                .collect(),
            powerup_message: if state.powerup_message_timer > 0.0 {
                state.powerup_message.clone()
            } else {
                String::new()
            },
            audio_muted,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Pretty JSON dump of the current run
pub fn render_game_to_text(state: &GameState, audio_muted: bool) -> String {
    Snapshot::capture(state, audio_muted)
        .to_json()
        .unwrap_or_else(|err| {
            log::warn!("Snapshot serialization failed: {}", err);
            String::from("{}")
        })
}
