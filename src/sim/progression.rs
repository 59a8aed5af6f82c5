//! Relics, level mutators and the between-level draft
//!
//! Relic stats are always rebuilt from zero defaults plus stack contributions.
//! Nothing here adjusts a stat incrementally.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Player;
use crate::consts::*;
use crate::weighted_pick;

/// Relic identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelicId {
    Overclock,
    Hypercore,
    Prism,
    Aegis,
    Singularity,
    Bloodcode,
    Phaseboot,
    Bounty,
}

impl RelicId {
    pub const ALL: [RelicId; 8] = [
        RelicId::Overclock,
        RelicId::Hypercore,
        RelicId::Prism,
        RelicId::Aegis,
        RelicId::Singularity,
        RelicId::Bloodcode,
        RelicId::Phaseboot,
        RelicId::Bounty,
    ];

    pub fn as_str(self) -> &'static str {
        self.def().id
    }

    pub fn parse(s: &str) -> Option<Self> {
        RelicId::ALL.into_iter().find(|r| r.as_str() == s)
    }

    pub fn def(self) -> &'static RelicDef {
        &RELIC_DEFS[self as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

/// Static description of a relic
#[derive(Debug)]
pub struct RelicDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub max_stacks: u32,
}

/// Indexed by `RelicId as usize`
pub static RELIC_DEFS: [RelicDef; 8] = [
    RelicDef {
        id: "overclock",
        name: "Overclock Coil",
        description: "+16% fire rate",
        rarity: Rarity::Common,
        max_stacks: 4,
    },
    RelicDef {
        id: "hypercore",
        name: "Hypercore Plating",
        description: "+20 max energy",
        rarity: Rarity::Rare,
        max_stacks: 4,
    },
    RelicDef {
        id: "prism",
        name: "Prism Splitter",
        description: "Scatter fires 2 extra shards",
        rarity: Rarity::Rare,
        max_stacks: 3,
    },
    RelicDef {
        id: "aegis",
        name: "Aegis Lattice",
        description: "+24 max shield, +1 shield per kill",
        rarity: Rarity::Rare,
        max_stacks: 3,
    },
    RelicDef {
        id: "singularity",
        name: "Singularity Core",
        description: "Bigger cannon blasts, +1 cannon per level",
        rarity: Rarity::Epic,
        max_stacks: 2,
    },
    RelicDef {
        id: "bloodcode",
        name: "Bloodcode Loop",
        description: "Kills restore energy, +7% score",
        rarity: Rarity::Epic,
        max_stacks: 3,
    },
    RelicDef {
        id: "phaseboot",
        name: "Phase Boots",
        description: "+8% move speed, faster dash",
        rarity: Rarity::Common,
        max_stacks: 4,
    },
    RelicDef {
        id: "bounty",
        name: "Bounty Beacon",
        description: "More powerups, +6% score",
        rarity: Rarity::Common,
        max_stacks: 4,
    },
];

/// Derived stats, a pure function of relic stacks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelicStats {
    pub fire_rate_mult: f32,
    pub move_speed_mult: f32,
    pub dash_cooldown_mult: f32,
    pub bullet_damage_bonus: f32,
    pub scatter_extra: u32,
    pub cannon_radius_mult: f32,
    pub cannon_boss_damage: f32,
    pub cannon_per_level: u32,
    pub on_kill_health: f32,
    pub on_kill_shield: f32,
    pub max_health_bonus: f32,
    pub max_shield_bonus: f32,
    pub powerup_drop_mult: f32,
    pub score_mult: f32,
}

impl Default for RelicStats {
    fn default() -> Self {
        Self {
            fire_rate_mult: 1.0,
            move_speed_mult: 1.0,
            dash_cooldown_mult: 1.0,
            bullet_damage_bonus: 0.0,
            scatter_extra: 0,
            cannon_radius_mult: 1.0,
            cannon_boss_damage: 0.0,
            cannon_per_level: 0,
            on_kill_health: 0.0,
            on_kill_shield: 0.0,
            max_health_bonus: 0.0,
            max_shield_bonus: 0.0,
            powerup_drop_mult: 1.0,
            score_mult: 1.0,
        }
    }
}

impl RelicStats {
    /// Rebuild stats from scratch
    pub fn from_stacks(stacks: &BTreeMap<RelicId, u32>) -> Self {
        let mut stats = Self::default();
        for (&id, &count) in stacks {
            let n = count.min(id.def().max_stacks);
            if n == 0 {
                continue;
            }
            let nf = n as f32;
            match id {
                RelicId::Overclock => stats.fire_rate_mult += 0.16 * nf,
                RelicId::Hypercore => stats.max_health_bonus += 20.0 * nf,
                RelicId::Prism => stats.scatter_extra += 2 * n,
                RelicId::Aegis => {
                    stats.max_shield_bonus += 24.0 * nf;
                    stats.on_kill_shield += nf;
                }
                RelicId::Singularity => {
                    stats.cannon_radius_mult += 0.28 * nf;
                    stats.cannon_boss_damage += 6.0 * nf;
                    stats.cannon_per_level += n;
                }
                RelicId::Bloodcode => {
                    stats.on_kill_health += 1.3 * nf;
                    stats.score_mult += 0.07 * nf;
                }
                RelicId::Phaseboot => {
                    stats.move_speed_mult += 0.08 * nf;
                    stats.dash_cooldown_mult = (1.0 - 0.08 * nf).max(0.55);
                }
                RelicId::Bounty => {
                    stats.powerup_drop_mult += 0.22 * nf;
                    stats.score_mult += 0.06 * nf;
                }
            }
        }
        stats
    }
}

/// Level mutator identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutatorId {
    Stable,
    Feral,
    Bulwark,
    Chaos,
    Jackpot,
}

/// Multiplicative modifier bundle for one level
#[derive(Debug)]
pub struct MutatorDef {
    pub id: MutatorId,
    pub name: &'static str,
    pub enemy_speed_mult: f32,
    pub enemy_hp_mult: f32,
    pub spawn_interval_mult: f32,
    pub powerup_drop_mult: f32,
    pub weight: f32,
}

pub static MUTATOR_DEFS: [MutatorDef; 5] = [
    MutatorDef {
        id: MutatorId::Stable,
        name: "Stable Grid",
        enemy_speed_mult: 1.0,
        enemy_hp_mult: 1.0,
        spawn_interval_mult: 1.0,
        powerup_drop_mult: 1.0,
        weight: 0.0,
    },
    MutatorDef {
        id: MutatorId::Feral,
        name: "Feral Swarm",
        enemy_speed_mult: 1.24,
        enemy_hp_mult: 1.0,
        spawn_interval_mult: 0.92,
        powerup_drop_mult: 1.08,
        weight: 6.0,
    },
    MutatorDef {
        id: MutatorId::Bulwark,
        name: "Bulwark Protocol",
        enemy_speed_mult: 0.96,
        enemy_hp_mult: 1.34,
        spawn_interval_mult: 1.02,
        powerup_drop_mult: 1.2,
        weight: 5.0,
    },
    MutatorDef {
        id: MutatorId::Chaos,
        name: "Chaos Bloom",
        enemy_speed_mult: 1.14,
        enemy_hp_mult: 1.14,
        spawn_interval_mult: 0.85,
        powerup_drop_mult: 1.18,
        weight: 4.0,
    },
    MutatorDef {
        id: MutatorId::Jackpot,
        name: "Jackpot Signal",
        enemy_speed_mult: 1.08,
        enemy_hp_mult: 1.2,
        spawn_interval_mult: 0.94,
        powerup_drop_mult: 1.5,
        weight: 3.0,
    },
];

impl MutatorId {
    pub fn def(self) -> &'static MutatorDef {
        &MUTATOR_DEFS[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MutatorId::Stable => "stable",
            MutatorId::Feral => "feral",
            MutatorId::Bulwark => "bulwark",
            MutatorId::Chaos => "chaos",
            MutatorId::Jackpot => "jackpot",
        }
    }
}

/// Most recent mutators remembered
pub const MUTATOR_HISTORY_LEN: usize = 8;

/// Relics offered per draft
pub const DRAFT_SIZE: usize = 3;

/// Choose the mutator for a level.
///
/// Level 0 is always stable. Otherwise draw by weight from the non-stable
/// pool, leaving out `previous` whenever another option exists.
pub fn select_mutator<R: Rng + ?Sized>(
    level_index: u32,
    previous: Option<MutatorId>,
    rng: &mut R,
) -> MutatorId {
    if level_index == 0 {
        return MutatorId::Stable;
    }
    let pool: Vec<(MutatorId, f32)> = MUTATOR_DEFS
        .iter()
        .filter(|m| m.weight > 0.0)
        .map(|m| (m.id, m.weight))
        .collect();
    let filtered: Vec<(MutatorId, f32)> = pool
        .iter()
        .copied()
        .filter(|(id, _)| Some(*id) != previous)
        .collect();
    let candidates = if filtered.is_empty() { &pool } else { &filtered };
    weighted_pick(candidates, rng).unwrap_or(MutatorId::Stable)
}

/// Sample up to `count` distinct relics that are below their max stack
pub fn roll_draft_choices<R: Rng + ?Sized>(
    stacks: &BTreeMap<RelicId, u32>,
    count: usize,
    rng: &mut R,
) -> Vec<RelicId> {
    let mut pool: Vec<RelicId> = RelicId::ALL
        .into_iter()
        .filter(|id| stacks.get(id).copied().unwrap_or(0) < id.def().max_stacks)
        .collect();
    let mut picks = Vec::with_capacity(count.min(pool.len()));
    while picks.len() < count && !pool.is_empty() {
        let idx = rng.random_range(0..pool.len());
        picks.push(pool.swap_remove(idx));
    }
    picks
}

/// Relic stacks, derived stats, mutator and pending draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub stacks: BTreeMap<RelicId, u32>,
    pub stats: RelicStats,
    pub mutator: MutatorId,
    pub mutator_history: VecDeque<MutatorId>,
    pub draft_choices: Vec<RelicId>,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            stacks: BTreeMap::new(),
            stats: RelicStats::default(),
            mutator: MutatorId::Stable,
            mutator_history: VecDeque::with_capacity(MUTATOR_HISTORY_LEN),
            draft_choices: Vec::new(),
        }
    }
}

impl Progression {
    pub fn stack(&self, id: RelicId) -> u32 {
        self.stacks.get(&id).copied().unwrap_or(0)
    }

    pub fn recompute(&mut self) {
        self.stats = RelicStats::from_stacks(&self.stacks);
    }

    /// Add one stack (capped) and rebuild stats. Returns false at max.
    pub fn add_stack(&mut self, id: RelicId) -> bool {
        let current = self.stack(id);
        if current >= id.def().max_stacks {
            return false;
        }
        self.stacks.insert(id, current + 1);
        self.recompute();
        true
    }

    /// Roll and store the mutator for `level_index`
    pub fn apply_level_mutator<R: Rng + ?Sized>(&mut self, level_index: u32, rng: &mut R) {
        let previous = self.mutator_history.back().copied();
        self.mutator = select_mutator(level_index, previous, rng);
        self.mutator_history.push_back(self.mutator);
        while self.mutator_history.len() > MUTATOR_HISTORY_LEN {
            self.mutator_history.pop_front();
        }
        log::debug!("Level {} mutator: {}", level_index + 1, self.mutator.def().name);
    }

    /// Push derived stats onto the player.
    ///
    /// Max resources are rebuilt from base plus bonus. `heal_fraction` of any
    /// max-energy gain is healed; shield heals the same way only while up.
    pub fn apply_to_player(&self, player: &mut Player, heal_fraction: f32) {
        let prev_max_energy = player.max_energy;
        let prev_max_shield = player.max_shield;
        player.max_energy = PLAYER_BASE_ENERGY + self.stats.max_health_bonus;
        player.max_shield = PLAYER_BASE_SHIELD + self.stats.max_shield_bonus;
        player.speed = PLAYER_BASE_SPEED * self.stats.move_speed_mult;

        let energy_gain = player.max_energy - prev_max_energy;
        let shield_gain = player.max_shield - prev_max_shield;
        if energy_gain > 0.0 {
            player.energy += energy_gain * heal_fraction;
        }
        if shield_gain > 0.0 && player.shield > 0.0 {
            player.shield += shield_gain * heal_fraction;
        }
        player.clamp_resources();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_rng::FixedRng;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_default_stats_are_neutral() {
        let stats = RelicStats::from_stacks(&BTreeMap::new());
        assert_eq!(stats, RelicStats::default());
        assert_eq!(stats.fire_rate_mult, 1.0);
        assert_eq!(stats.scatter_extra, 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut prog = Progression::default();
        prog.add_stack(RelicId::Overclock);
        prog.add_stack(RelicId::Phaseboot);
        prog.add_stack(RelicId::Phaseboot);
        let first = prog.stats;
        prog.recompute();
        prog.recompute();
        assert_eq!(prog.stats, first);
    }

    #[test]
    fn test_stacks_cap_at_max() {
        let mut prog = Progression::default();
        assert!(prog.add_stack(RelicId::Singularity));
        assert!(prog.add_stack(RelicId::Singularity));
        assert!(!prog.add_stack(RelicId::Singularity));
        assert_eq!(prog.stack(RelicId::Singularity), 2);
        assert_eq!(prog.stats.cannon_per_level, 2);
    }

    #[test]
    fn test_phaseboot_dash_floor() {
        let mut stacks = BTreeMap::new();
        stacks.insert(RelicId::Phaseboot, 4);
        let stats = RelicStats::from_stacks(&stacks);
        assert!((stats.dash_cooldown_mult - 0.68).abs() < 1e-5);
        assert!((stats.move_speed_mult - 1.32).abs() < 1e-5);
    }

    #[test]
    fn test_score_mult_combines_relics() {
        let mut stacks = BTreeMap::new();
        stacks.insert(RelicId::Bloodcode, 1);
        stacks.insert(RelicId::Bounty, 2);
        let stats = RelicStats::from_stacks(&stacks);
        assert!((stats.score_mult - 1.19).abs() < 1e-5);
    }

    #[test]
    fn test_apply_to_player_partial_heal() {
        let mut prog = Progression::default();
        let mut player = Player::new(Vec2::ZERO);
        player.energy = 50.0;
        prog.add_stack(RelicId::Hypercore);
        prog.apply_to_player(&mut player, 0.5);
        assert_eq!(player.max_energy, 120.0);
        assert_eq!(player.energy, 60.0);
    }

    #[test]
    fn test_shield_not_healed_when_down() {
        let mut prog = Progression::default();
        let mut player = Player::new(Vec2::ZERO);
        player.shield = 0.0;
        prog.add_stack(RelicId::Aegis);
        prog.apply_to_player(&mut player, 1.0);
        assert_eq!(player.max_shield, 124.0);
        assert_eq!(player.shield, 0.0);
    }

    #[test]
    fn test_level_zero_is_stable() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(select_mutator(0, Some(MutatorId::Chaos), &mut rng), MutatorId::Stable);
    }

    #[test]
    fn test_mutator_never_repeats_previous() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut previous = None;
        for level in 1..200 {
            let picked = select_mutator(level, previous, &mut rng);
            assert_ne!(picked, MutatorId::Stable);
            assert_ne!(Some(picked), previous);
            previous = Some(picked);
        }
    }

    #[test]
    fn test_mutator_history_bounded() {
        let mut prog = Progression::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for level in 0..30 {
            prog.apply_level_mutator(level, &mut rng);
        }
        assert_eq!(prog.mutator_history.len(), MUTATOR_HISTORY_LEN);
    }

    #[test]
    fn test_draft_excludes_maxed_relic() {
        let mut stacks = BTreeMap::new();
        stacks.insert(RelicId::Singularity, 2);
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            let picks = roll_draft_choices(&stacks, DRAFT_SIZE, &mut rng);
            assert_eq!(picks.len(), DRAFT_SIZE);
            assert!(!picks.contains(&RelicId::Singularity));
            let mut unique = picks.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), picks.len());
        }
    }

    #[test]
    fn test_draft_empty_when_all_maxed() {
        let stacks: BTreeMap<RelicId, u32> =
            RelicId::ALL.iter().map(|id| (*id, id.def().max_stacks)).collect();
        let picks = roll_draft_choices(&stacks, DRAFT_SIZE, &mut FixedRng(0));
        assert!(picks.is_empty());
    }

    #[test]
    fn test_relic_id_parse() {
        assert_eq!(RelicId::parse("prism"), Some(RelicId::Prism));
        assert_eq!(RelicId::parse("nope"), None);
    }
}
