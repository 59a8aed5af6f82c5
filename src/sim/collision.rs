//! Collision and damage resolution
//!
//! Everything is circle-circle. Enemy destruction removes exactly one entry
//! and applies its side effects once; area effects from a death only lower
//! other enemies' hp, and `reap_dead_enemies` destroys the casualties from
//! the tail so cascades never skip or revisit an entry. Enemies spawned by a
//! death wait in `spawn_queue` until the spawner runs.

use glam::Vec2;
use rand::Rng;

use super::effects::{add_flash, add_pulse, add_shake, emit_particles, spawn_arc_link, spawn_ripple};
use super::enemy::{create_enemy, update_behaviors};
use super::player::{MAX_PHASE_CHARGES, damage_player};
use super::state::{EliteMod, EnemyKind, GameEvent, GameState, Mode, Powerup, PowerupKind};
use crate::consts::*;
use crate::{clamp, rand_between, weighted_pick};

/// Contact damage before the per-enemy multiplier
const CONTACT_BASE_DAMAGE: f32 = 26.0;
const CONTACT_DAMAGE_STEP: f32 = 10.0;
const ARC_RANGE: f32 = 210.0;
const MINE_BLAST_RADIUS: f32 = 120.0;
const VOLATILE_BLAST_RADIUS: f32 = 132.0;
/// Near-miss band outside the collision distance
const NEAR_MISS_INNER: f32 = 4.0;
const NEAR_MISS_OUTER: f32 = 36.0;

/// Powerup drop weights (they sum to 1)
const POWERUP_TABLE: [(PowerupKind, f32); 10] = [
    (PowerupKind::Rapid, 0.2),
    (PowerupKind::Shield, 0.16),
    (PowerupKind::Scatter, 0.14),
    (PowerupKind::Drone, 0.1),
    (PowerupKind::Arc, 0.1),
    (PowerupKind::Gravity, 0.08),
    (PowerupKind::Cannon, 0.08),
    (PowerupKind::Heart, 0.08),
    (PowerupKind::Nova, 0.045),
    (PowerupKind::Phase, 0.015),
];

/// True if two circles touch or overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let rr = ra + rb;
    a.distance_squared(b) <= rr * rr
}

/// Chance that a credited kill drops a powerup
pub fn drop_chance(state: &GameState) -> f32 {
    let relic = state.progression.stats.powerup_drop_mult;
    let mutator = state.progression.mutator.def().powerup_drop_mult;
    clamp(0.1 * relic * mutator, 0.03, 0.72)
}

pub fn spawn_powerup(state: &mut GameState, pos: Vec2) {
    let kind = weighted_pick(&POWERUP_TABLE, &mut state.rng).unwrap_or(PowerupKind::Rapid);
    let vel_y = rand_between(&mut state.rng, -10.0, 10.0);
    let pulse = rand_between(&mut state.rng, 0.0, std::f32::consts::TAU);
    state.powerups.push(Powerup {
        kind,
        pos,
        vel_y,
        radius: 11.0,
        life: 8.0,
        pulse,
    });
}

/// Remove the enemy at `index` and apply every death side effect once.
///
/// `credited` kills feed streak, score, overdrive, drops and on-kill heals.
pub fn destroy_enemy(state: &mut GameState, index: usize, credited: bool) {
    if index >= state.enemies.len() {
        return;
    }
    let enemy = state.enemies.remove(index);
    let boss = enemy.kind == EnemyKind::Boss;
    let heavy = enemy.kind.is_heavy() || enemy.is_elite();

    let (count, speed) = if boss {
        (54, 320.0)
    } else if heavy {
        (26, 240.0)
    } else {
        (16, 170.0)
    };
    emit_particles(state, enemy.pos, enemy.color, count, speed);
    let ripple_power = match enemy.kind {
        EnemyKind::Boss => 2.4,
        EnemyKind::Tank => 1.45,
        _ => 1.0,
    };
    spawn_ripple(state, enemy.pos, ripple_power);
    add_shake(state, if boss { 24.0 } else if heavy { 14.0 } else { 9.0 });
    add_flash(state, if boss { 0.52 } else if heavy { 0.34 } else { 0.22 });
    add_pulse(state, if boss { 0.95 } else if enemy.is_elite() { 0.65 } else { 0.28 });
    state.emit(GameEvent::EnemyExplode {
        kind: enemy.kind,
        credited,
    });

    if credited {
        state.streak += 1;
        state.streak_timer = STREAK_WINDOW;
        state.kills_in_level += 1;
        let level = state.level_index as f32;
        let elite_bonus = if enemy.is_elite() { 180.0 + level * 9.0 } else { 0.0 };
        state.add_score(enemy.kind.base_points() as f32 + level * 14.0 + elite_bonus);
        state.add_overdrive(if boss {
            28.0
        } else if enemy.is_elite() {
            12.0
        } else {
            5.4
        });
        if state.rng.random::<f32>() < drop_chance(state) {
            spawn_powerup(state, enemy.pos);
        }
        let stats = state.progression.stats;
        let player = &mut state.player;
        if stats.on_kill_health > 0.0 {
            player.energy = (player.energy + stats.on_kill_health).min(player.max_energy);
        }
        if stats.on_kill_shield > 0.0 && player.shield > 0.0 {
            player.shield = (player.shield + stats.on_kill_shield).min(player.max_shield);
        }
    }

    match enemy.kind {
        EnemyKind::Boss => {
            state.boss_defeated = true;
            state.kills_in_level = state.kills_in_level.max(state.level.target_kills);
            state.add_score(5000.0 + state.level_index as f32 * 260.0);
            state.hit_stop_timer = state.hit_stop_timer.max(0.1);
            log::info!("Boss defeated on level {}", state.level.level_number);
        }
        EnemyKind::Splitter => {
            for _ in 0..2 {
                let jitter = Vec2::new(
                    rand_between(&mut state.rng, -8.0, 8.0),
                    rand_between(&mut state.rng, -8.0, 8.0),
                );
                let shard = create_enemy(state, Some(EnemyKind::Shard), Some(enemy.pos + jitter));
                state.spawn_queue.push(shard);
            }
        }
        EnemyKind::Mine => {
            for other in state.enemies.iter_mut() {
                if other.pos.distance(enemy.pos) < MINE_BLAST_RADIUS {
                    other.take_damage(1.0);
                }
            }
        }
        _ => {}
    }

    if enemy.elite == EliteMod::Volatile {
        spawn_ripple(state, enemy.pos, 1.8);
        for other in state.enemies.iter_mut() {
            if other.pos.distance(enemy.pos) <= VOLATILE_BLAST_RADIUS {
                other.take_damage(2.2);
            }
        }
        let player_dist = state.player.pos.distance(enemy.pos);
        if player_dist < VOLATILE_BLAST_RADIUS && state.player.invulnerable <= 0.0 {
            damage_player(state, 16.0, 1.1);
        }
    }
}

/// Destroy every enemy at or below zero hp, including those killed by the
/// cascades of earlier deaths in the same sweep
pub fn reap_dead_enemies(state: &mut GameState) {
    while let Some(index) = state.enemies.iter().rposition(|e| e.is_dead()) {
        destroy_enemy(state, index, true);
    }
}

/// Jump damage from the enemy at `source` to its nearest neighbours
pub fn trigger_arc_chains(state: &mut GameState, source: usize, base_damage: f32, max_chains: u32) {
    if max_chains == 0 || source >= state.enemies.len() {
        return;
    }
    let origin = state.enemies[source].pos;
    let mut candidates: Vec<(usize, f32)> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(i, e)| *i != source && !e.is_dead())
        .map(|(i, e)| (i, e.pos.distance(origin)))
        .filter(|(_, d)| *d < ARC_RANGE)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.truncate(max_chains as usize);

    for (rank, (index, _)) in candidates.into_iter().enumerate() {
        let damage = base_damage * (0.82 - rank as f32 * 0.14);
        let target = state.enemies[index].pos;
        state.enemies[index].take_damage(damage);
        spawn_arc_link(state, origin, target, 0x9ffaff);
        emit_particles(state, target, 0x8ffff7, 3, 95.0);
        state.emit(GameEvent::ArcZap);
    }
}

/// Move player bullets and drop expired or escaped ones
pub fn update_bullets(state: &mut GameState, dt: f32) {
    let config = state.config;
    state.bullets.retain_mut(|b| {
        b.pos += b.vel * dt;
        b.life -= dt;
        b.life > 0.0 && config.in_bounds(b.pos, 30.0)
    });
}

/// Move enemy bullets, award near misses and hit the player
pub fn update_enemy_bullets(state: &mut GameState, dt: f32) {
    let config = state.config;
    let mut i = state.enemy_bullets.len();
    while i > 0 {
        i -= 1;
        let bullet = &mut state.enemy_bullets[i];
        bullet.pos += bullet.vel * dt;
        bullet.life -= dt;
        if bullet.life <= 0.0 || !config.in_bounds(bullet.pos, 40.0) {
            state.enemy_bullets.remove(i);
            continue;
        }

        let player = &state.player;
        let dist = bullet.pos.distance(player.pos);
        let collision_dist = player.radius + bullet.radius;
        if !bullet.near_missed
            && dist > collision_dist + NEAR_MISS_INNER
            && dist < collision_dist + NEAR_MISS_OUTER
        {
            bullet.near_missed = true;
            let pos = bullet.pos;
            state.add_overdrive(1.8);
            emit_particles(state, pos, 0x9fefff, 2, 55.0);
            continue;
        }

        if dist > collision_dist {
            continue;
        }
        let bullet = state.enemy_bullets.remove(i);
        if state.player.shield_timer > 0.0 {
            emit_particles(state, bullet.pos, 0x97ffe0, 6, 130.0);
            continue;
        }
        if damage_player(state, bullet.damage, 0.92) {
            return;
        }
    }
}

/// Enemy phase of a playing tick: behaviors, bullet hits, player contact.
pub fn resolve_enemies(state: &mut GameState, dt: f32) {
    update_behaviors(state, dt);
    reap_dead_enemies(state);

    resolve_bullet_hits(state);
    reap_dead_enemies(state);
    if state.mode != Mode::Playing {
        return;
    }

    resolve_player_contact(state);
    reap_dead_enemies(state);
}

/// Each living enemy takes at most one player bullet per tick
fn resolve_bullet_hits(state: &mut GameState) {
    for i in (0..state.enemies.len()).rev() {
        let enemy = &state.enemies[i];
        if enemy.is_dead() {
            continue;
        }
        let (pos, radius) = (enemy.pos, enemy.radius);
        let Some(j) = state
            .bullets
            .iter()
            .rposition(|b| circles_overlap(pos, radius, b.pos, b.radius))
        else {
            continue;
        };
        let bullet = state.bullets.remove(j);
        state.enemies[i].take_damage(bullet.damage);
        if bullet.arc_chains > 0 {
            trigger_arc_chains(state, i, bullet.damage * 0.9, bullet.arc_chains);
        }
        state.emit(GameEvent::EnemyHit);
        emit_particles(state, bullet.pos, 0xb5f8ff, 4, 130.0);

        if state.enemies[i].is_dead() && state.living_enemies() == 0 {
            // Final enemy on the field: freeze a beat
            state.hit_stop_timer = state.hit_stop_timer.max(0.12);
            add_pulse(state, 0.95);
            add_flash(state, 0.66);
            emit_particles(state, pos, 0xf0feff, 24, 240.0);
        }
    }
}

fn resolve_player_contact(state: &mut GameState) {
    for i in (0..state.enemies.len()).rev() {
        let enemy = &state.enemies[i];
        if enemy.is_dead() {
            continue;
        }
        let player = &state.player;
        if !circles_overlap(enemy.pos, enemy.radius, player.pos, player.radius) {
            continue;
        }

        if player.shield_timer > 0.0 {
            let pos = player.pos;
            destroy_enemy(state, i, true);
            emit_particles(state, pos, 0x8fffea, 10, 180.0);
            continue;
        }

        if player.invulnerable <= 0.0 {
            let amount = CONTACT_BASE_DAMAGE + enemy.contact_damage * CONTACT_DAMAGE_STEP;
            if damage_player(state, amount, 1.2) {
                // The fatal rammer survives the run
                break;
            }
        }
        destroy_enemy(state, i, false);
    }
}

/// Drift, expire and collect powerups
pub fn update_powerups(state: &mut GameState, dt: f32) {
    let mut i = state.powerups.len();
    while i > 0 {
        i -= 1;
        let item = &mut state.powerups[i];
        item.life -= dt;
        item.pulse += dt * 4.0;
        item.pos.y += item.vel_y * dt;
        item.vel_y *= 0.98;
        if item.life <= 0.0 {
            state.powerups.remove(i);
            continue;
        }
        let player = &state.player;
        if !circles_overlap(item.pos, item.radius, player.pos, player.radius) {
            continue;
        }
        let item = state.powerups.remove(i);
        apply_powerup(state, item.kind);
        emit_particles(state, item.pos, 0xfff28a, 15, 200.0);
    }
}

/// Apply a collected powerup
pub fn apply_powerup(state: &mut GameState, kind: PowerupKind) {
    let p = &mut state.player;
    match kind {
        PowerupKind::Rapid => p.rapid_timer = p.rapid_timer.max(5.5),
        PowerupKind::Shield => {
            p.shield = p.max_shield;
            p.shield_timer = p.shield_timer.max(5.5);
            p.shield_regen_delay = 0.0;
            p.shield_regen_active = false;
        }
        PowerupKind::Scatter => p.scatter_timer = p.scatter_timer.max(7.5),
        PowerupKind::Drone => p.drone_timer = p.drone_timer.max(10.5),
        PowerupKind::Arc => p.arc_timer = p.arc_timer.max(10.2),
        PowerupKind::Gravity => p.gravity_timer = p.gravity_timer.max(8.8),
        PowerupKind::Cannon => p.cannon_charges += 1,
        PowerupKind::Phase => {
            p.phase_charges = (p.phase_charges + 1).min(MAX_PHASE_CHARGES);
            p.phase_cooldown = (p.phase_cooldown - 0.9).max(0.0);
        }
        PowerupKind::Heart => p.energy = (p.energy + 34.0).min(p.max_energy),
        PowerupKind::Nova => {
            for index in (0..state.enemies.len()).rev() {
                destroy_enemy(state, index, true);
            }
            reap_dead_enemies(state);
        }
    }
    state.emit(GameEvent::Powerup(kind));
    state.powerup_message = kind.message().to_string();
    state.powerup_message_timer = 3.4;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::spawn_enemy;
    use crate::sim::state::{Bullet, EnemyBullet};

    fn playing_state() -> GameState {
        let mut state = GameState::new(2024);
        state.mode = Mode::Playing;
        state
    }

    fn bullet_at(pos: Vec2, damage: f32, arc_chains: u32) -> Bullet {
        Bullet {
            pos,
            vel: Vec2::ZERO,
            radius: 4.0,
            life: 1.0,
            damage,
            glow: 0x67ecff,
            arc_chains,
        }
    }

    fn explode_count(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyExplode { .. }))
            .count()
    }

    #[test]
    fn test_circles_overlap_touching() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.1, 0.0), 5.0));
    }

    #[test]
    fn test_bullet_kills_seeker_once() {
        let mut state = playing_state();
        let at = state.player.pos + Vec2::new(50.0, 0.0);
        let id = spawn_enemy(&mut state, Some(EnemyKind::Seeker), Some(at));
        state.enemies[0].hp = 1.0;
        state.enemies[0].max_hp = 1.0;
        state.enemies[0].elite = EliteMod::None;
        state.bullets.push(bullet_at(at, 1.0, 0));

        resolve_bullet_hits(&mut state);
        reap_dead_enemies(&mut state);

        assert!(state.enemies.iter().all(|e| e.id != id));
        assert_eq!(state.kills_in_level, 1);
        assert_eq!(state.score, EnemyKind::Seeker.base_points() as f64);
        assert_eq!(explode_count(&state.drain_events()), 1);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_contact_kill_not_credited() {
        let mut state = playing_state();
        let at = state.player.pos;
        spawn_enemy(&mut state, Some(EnemyKind::Seeker), Some(at));
        state.enemies[0].elite = EliteMod::None;
        state.enemies[0].contact_damage = 1.0;
        state.player.shield = 0.0;
        resolve_player_contact(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kills_in_level, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.player.energy, 64.0);
        assert!(state.player.invulnerable > 0.0);
    }

    #[test]
    fn test_fatal_contact_leaves_enemy() {
        let mut state = playing_state();
        let at = state.player.pos;
        spawn_enemy(&mut state, Some(EnemyKind::Splitter), Some(at));
        state.enemies[0].elite = EliteMod::Volatile;
        state.player.shield = 0.0;
        state.player.energy = 1.0;
        state.drain_events();

        resolve_player_contact(&mut state);
        assert_eq!(state.mode, Mode::GameOver);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.spawn_queue.is_empty());
        assert!(state.ripples.is_empty());
        assert_eq!(explode_count(&state.drain_events()), 0);
    }

    #[test]
    fn test_aegis_ram_is_credited() {
        let mut state = playing_state();
        let at = state.player.pos;
        spawn_enemy(&mut state, Some(EnemyKind::Tank), Some(at));
        state.enemies[0].elite = EliteMod::None;
        state.player.shield_timer = 2.0;
        let energy = state.player.energy;
        resolve_player_contact(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kills_in_level, 1);
        assert_eq!(state.player.energy, energy);
    }

    #[test]
    fn test_splitter_queues_two_shards() {
        let mut state = playing_state();
        spawn_enemy(&mut state, Some(EnemyKind::Splitter), Some(Vec2::new(200.0, 200.0)));
        destroy_enemy(&mut state, 0, true);
        assert!(state.enemies.is_empty());
        assert_eq!(state.spawn_queue.len(), 2);
        assert!(state.spawn_queue.iter().all(|e| e.kind == EnemyKind::Shard));
    }

    #[test]
    fn test_mine_blast_cascades() {
        let mut state = playing_state();
        let at = Vec2::new(200.0, 200.0);
        spawn_enemy(&mut state, Some(EnemyKind::Mine), Some(at));
        spawn_enemy(&mut state, Some(EnemyKind::Seeker), Some(at + Vec2::new(60.0, 0.0)));
        spawn_enemy(&mut state, Some(EnemyKind::Seeker), Some(at + Vec2::new(500.0, 0.0)));
        state.enemies[1].hp = 1.0;
        state.enemies[0].hp = 0.0;
        reap_dead_enemies(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.kills_in_level, 2);
        assert_eq!(explode_count(&state.drain_events()), 2);
    }

    #[test]
    fn test_volatile_blast_hurts_player() {
        let mut state = playing_state();
        let at = state.player.pos + Vec2::new(80.0, 0.0);
        spawn_enemy(&mut state, Some(EnemyKind::Seeker), Some(at));
        state.enemies[0].elite = EliteMod::Volatile;
        state.player.shield = 0.0;
        destroy_enemy(&mut state, 0, true);
        assert_eq!(state.player.energy, 84.0);
        assert!((state.player.invulnerable - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_arc_chain_prefers_nearest() {
        let mut state = playing_state();
        let at = Vec2::new(300.0, 300.0);
        spawn_enemy(&mut state, Some(EnemyKind::Tank), Some(at));
        spawn_enemy(&mut state, Some(EnemyKind::Tank), Some(at + Vec2::new(150.0, 0.0)));
        spawn_enemy(&mut state, Some(EnemyKind::Tank), Some(at + Vec2::new(50.0, 0.0)));
        spawn_enemy(&mut state, Some(EnemyKind::Tank), Some(at + Vec2::new(400.0, 0.0)));
        let hp: Vec<f32> = state.enemies.iter().map(|e| e.hp).collect();
        trigger_arc_chains(&mut state, 0, 1.0, 2);
        assert!((hp[2] - state.enemies[2].hp - 0.82).abs() < 1e-5);
        assert!((hp[1] - state.enemies[1].hp - 0.68).abs() < 1e-5);
        assert_eq!(state.enemies[3].hp, hp[3]);
        assert_eq!(state.arc_links.len(), 2);
    }

    #[test]
    fn test_boss_death_completes_kill_target() {
        let mut state = playing_state();
        spawn_enemy(&mut state, Some(EnemyKind::Boss), Some(Vec2::new(640.0, 144.0)));
        destroy_enemy(&mut state, 0, true);
        assert!(state.boss_defeated);
        assert!(state.kills_in_level >= state.level.target_kills);
        assert!(state.hit_stop_timer > 0.0);
        assert!(state.score >= 5000.0);
    }

    #[test]
    fn test_uncredited_boss_death_still_clears_level() {
        let mut state = playing_state();
        spawn_enemy(&mut state, Some(EnemyKind::Boss), Some(Vec2::new(640.0, 144.0)));
        destroy_enemy(&mut state, 0, false);
        assert!(state.boss_defeated);
        assert_eq!(state.kills_in_level, state.level.target_kills);
        assert_eq!(state.streak, 0);
    }

    #[test]
    fn test_near_miss_fills_overdrive() {
        let mut state = playing_state();
        let pos = state.player.pos + Vec2::new(16.0 + 4.8 + 20.0, 0.0);
        state.enemy_bullets.push(EnemyBullet {
            pos,
            vel: Vec2::ZERO,
            radius: 4.8,
            life: 1.0,
            damage: 11.0,
            glow: 0xff90c8,
            near_missed: false,
        });
        update_enemy_bullets(&mut state, 1.0 / 60.0);
        assert!((state.overdrive_meter - 1.8).abs() < 1e-6);
        update_enemy_bullets(&mut state, 1.0 / 60.0);
        assert!((state.overdrive_meter - 1.8).abs() < 1e-6);
        assert_eq!(state.player.energy, 100.0);
    }

    #[test]
    fn test_enemy_bullet_hits_shield_first() {
        let mut state = playing_state();
        let pos = state.player.pos;
        state.enemy_bullets.push(EnemyBullet {
            pos,
            vel: Vec2::ZERO,
            radius: 4.8,
            life: 1.0,
            damage: 14.0,
            glow: 0xff8f74,
            near_missed: false,
        });
        update_enemy_bullets(&mut state, 1.0 / 60.0);
        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.player.shield, 86.0);
        assert_eq!(state.player.energy, 100.0);
        assert!((state.player.shield_regen_delay - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_nova_clears_field() {
        let mut state = playing_state();
        for x in [100.0, 300.0, 500.0] {
            spawn_enemy(&mut state, Some(EnemyKind::Spinner), Some(Vec2::new(x, 100.0)));
        }
        apply_powerup(&mut state, PowerupKind::Nova);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kills_in_level, 3);
        assert_eq!(state.powerup_message, "NOVA BLAST");
    }

    #[test]
    fn test_powerup_pickup_and_expiry() {
        let mut state = playing_state();
        let pos = state.player.pos;
        state.powerups.push(Powerup {
            kind: PowerupKind::Rapid,
            pos,
            vel_y: 0.0,
            radius: 11.0,
            life: 8.0,
            pulse: 0.0,
        });
        state.powerups.push(Powerup {
            kind: PowerupKind::Heart,
            pos: Vec2::new(20.0, 20.0),
            vel_y: 0.0,
            radius: 11.0,
            life: 0.01,
            pulse: 0.0,
        });
        update_powerups(&mut state, 1.0 / 60.0);
        assert!(state.powerups.is_empty());
        assert_eq!(state.player.rapid_timer, 5.5);
        assert_eq!(state.player.energy, 100.0);
    }

    #[test]
    fn test_drop_chance_clamped() {
        let mut state = playing_state();
        assert!((drop_chance(&state) - 0.1).abs() < 1e-6);
        state.progression.stats.powerup_drop_mult = 100.0;
        assert_eq!(drop_chance(&state), 0.72);
    }
}
