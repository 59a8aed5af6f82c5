//! Player controller
//!
//! Movement, dash, weapons, drone wing, abilities and the single damage path.

use glam::Vec2;

use super::collision::destroy_enemy;
use super::effects::{add_flash, add_pulse, add_shake, emit_particles, spawn_ripple};
use super::flow;
use super::state::{Bullet, EnemyKind, GameEvent, GameState, Mode, record_trail};
use super::tick::TickInput;
use crate::consts::*;
use crate::{clamp, rand_between};

/// Acceleration gain applied to the move speed
const MOVE_RESPONSE: f32 = 7.4;
const DASH_IMPULSE: f32 = 650.0;
const DASH_COOLDOWN: f32 = 1.3;
const DASH_WINDOW: f32 = 0.18;
const SHIELD_REGEN_RATE: f32 = 20.0;
const SHIELD_REGEN_DELAY: f32 = 1.9;
/// Invulnerability granted by the killing blow
const DEATH_INVULNERABILITY: f32 = 1.8;
const WALL_PADDING: f32 = 4.0;
const PLAYER_TRAIL_LEN: f32 = 16.0;

const CANNON_COOLDOWN: f32 = 1.1;
const CANNON_RADIUS: f32 = 230.0;
const CANNON_BOSS_DAMAGE: f32 = 12.0;
const PHASE_COOLDOWN: f32 = 2.2;
const PHASE_RADIUS: f32 = 280.0;
pub const MAX_PHASE_CHARGES: u32 = 4;

const DRONE_INTERVAL: f32 = 0.22;
const BULLET_LIFE: f32 = 1.25;
/// Base scatter fan, widened by prism stacks
const SCATTER_OFFSETS: [f32; 5] = [-0.42, -0.2, 0.0, 0.2, 0.42];
const SCATTER_EXTRA_OFFSETS: [f32; 3] = [0.62, 0.82, 1.04];

/// Advance the player by one step: movement, shield regen, queued actions,
/// timers and weapons.
pub fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let overdrive = state.overdrive_active();
    let speed_bonus = state.level.player_speed_bonus;
    let p = &mut state.player;

    let direction = input.movement.normalize_or_zero();
    let moving = direction != Vec2::ZERO;
    if moving {
        let speed = (p.speed + speed_bonus) * if overdrive { 1.14 } else { 1.0 };
        p.vel += direction * speed * dt * MOVE_RESPONSE;
    }

    update_shield_regen(state, dt);

    if input.dash && state.player.dash_cooldown <= 0.0 {
        let p = &mut state.player;
        let dash_dir = if moving {
            direction
        } else {
            (input.aim - p.pos).try_normalize().unwrap_or(Vec2::X)
        };
        p.vel += dash_dir * DASH_IMPULSE;
        p.dash_cooldown = DASH_COOLDOWN
            * state.progression.stats.dash_cooldown_mult
            * if overdrive { 0.78 } else { 1.0 };
        p.dash_timer = DASH_WINDOW;
        let pos = p.pos;
        add_shake(state, 10.0);
        emit_particles(state, pos, 0x8ce9ff, 16, 250.0);
    }

    if input.cannon {
        fire_cannon(state);
    }
    if input.phase {
        trigger_phase_pulse(state);
    }
    if input.overdrive && state.overdrive_meter >= OVERDRIVE_MAX && !state.overdrive_active() {
        activate_overdrive(state);
    }
    // An ability may have ended the run
    if state.mode == Mode::GameOver {
        return;
    }

    let config = state.config;
    let p = &mut state.player;
    let damping = if p.dash_timer > 0.0 { 0.96 } else { 0.89 };
    p.vel *= damping;
    p.pos += p.vel * dt;
    let pad = p.radius + WALL_PADDING;
    p.pos.x = clamp(p.pos.x, pad, config.width - pad);
    p.pos.y = clamp(p.pos.y, pad, config.height - pad);

    for timer in [
        &mut p.fire_cooldown,
        &mut p.invulnerable,
        &mut p.dash_cooldown,
        &mut p.dash_timer,
        &mut p.rapid_timer,
        &mut p.scatter_timer,
        &mut p.drone_timer,
        &mut p.drone_cooldown,
        &mut p.arc_timer,
        &mut p.gravity_timer,
        &mut p.shield_timer,
        &mut p.cannon_cooldown,
        &mut p.phase_cooldown,
    ] {
        *timer = (*timer - dt).max(0.0);
    }

    let base_cooldown = if p.scatter_timer > 0.0 {
        0.2
    } else if p.rapid_timer > 0.0 {
        0.07
    } else {
        0.12
    };
    let fire_rate = state.progression.stats.fire_rate_mult * if overdrive { 1.34 } else { 1.0 };
    if input.firing && p.fire_cooldown <= 0.0 {
        p.fire_cooldown = (base_cooldown / fire_rate).max(0.03);
        shoot(state, input.aim);
    }

    fire_drone(state);

    let trail_len = (PLAYER_TRAIL_LEN * state.config.trail_scale).round() as usize;
    let p = &mut state.player;
    record_trail(&mut p.trail, p.pos, trail_len);
}

fn update_shield_regen(state: &mut GameState, dt: f32) {
    let p = &mut state.player;
    if p.shield <= 0.0 || p.shield >= p.max_shield {
        p.shield_regen_active = false;
        return;
    }
    if p.shield_regen_delay > 0.0 {
        p.shield_regen_delay = (p.shield_regen_delay - dt).max(0.0);
        p.shield_regen_active = false;
        return;
    }
    if !p.shield_regen_active {
        p.shield_regen_active = true;
        state.emit(GameEvent::ShieldRecharge);
    }
    let p = &mut state.player;
    p.shield = (p.shield + dt * SHIELD_REGEN_RATE).min(p.max_shield);
    if p.shield >= p.max_shield {
        p.shield_regen_active = false;
        state.emit(GameEvent::ShieldRestored);
    }
}

fn push_bullet(
    state: &mut GameState,
    angle: f32,
    speed: f32,
    radius: f32,
    glow: u32,
    damage: f32,
    arc_chains: u32,
) {
    let pos = state.player.pos;
    state.bullets.push(Bullet {
        pos,
        vel: Vec2::from_angle(angle) * speed,
        radius,
        life: BULLET_LIFE,
        damage,
        glow,
        arc_chains,
    });
}

/// Fire the main weapon toward `aim`
fn shoot(state: &mut GameState, aim: Vec2) {
    let overdrive = state.overdrive_active();
    let p = &state.player;
    let rapid = p.rapid_timer > 0.0;
    let scatter = p.scatter_timer > 0.0;
    let arc = p.arc_timer > 0.0;
    let delta = aim - p.pos;
    let spread = rand_between(&mut state.rng, -0.07, 0.07);
    let base = delta.y.atan2(delta.x) + spread;
    let base_speed = if rapid { 660.0 } else { 610.0 };
    let speed = base_speed * if overdrive { 1.08 } else { 1.0 };
    let radius = if rapid { 4.6 } else { 4.0 };
    let damage = 1.0 + state.progression.stats.bullet_damage_bonus;

    if scatter {
        let extra = (state.progression.stats.scatter_extra as usize)
            .min(SCATTER_EXTRA_OFFSETS.len());
        let chains = if arc { 1 } else { 0 };
        let fan = SCATTER_OFFSETS
            .iter()
            .copied()
            .chain(SCATTER_EXTRA_OFFSETS[..extra].iter().flat_map(|o| [-*o, *o]));
        for offset in fan {
            let (speed, damage) = (speed * 0.95, damage * 0.86);
            push_bullet(state, base + offset, speed, radius, 0x8ff6ff, damage, chains);
        }
    } else {
        let glow = if overdrive {
            0xfff59a
        } else if rapid {
            0xfcf980
        } else {
            0x67ecff
        };
        push_bullet(state, base, speed, radius, glow, damage, if arc { 2 } else { 0 });
    }

    state.emit(GameEvent::Shoot);
    let pos = state.player.pos;
    let color = if overdrive { 0xffe7a2 } else { 0x75f0ff };
    emit_particles(state, pos, color, if scatter { 4 } else { 2 }, 58.0);
}

/// Drone wing shot at the nearest enemy
fn fire_drone(state: &mut GameState) {
    let p = &state.player;
    if p.drone_timer <= 0.0 || p.drone_cooldown > 0.0 {
        return;
    }
    let origin = p.pos;
    let Some(target) = state
        .enemies
        .iter()
        .min_by(|a, b| {
            a.pos
                .distance_squared(origin)
                .total_cmp(&b.pos.distance_squared(origin))
        })
        .map(|e| e.pos)
    else {
        return;
    };
    let delta = target - origin;
    let angle = delta.y.atan2(delta.x) + rand_between(&mut state.rng, -0.05, 0.05);
    let chains = if state.player.arc_timer > 0.0 { 1 } else { 0 };
    push_bullet(state, angle, 700.0, 3.6, 0x9cfff0, 0.9, chains);
    emit_particles(state, origin, 0x97ffe6, 2, 70.0);
    state.player.drone_cooldown = DRONE_INTERVAL;
}

/// Apply damage to the player: shield absorbs first, the rest spills into
/// energy. Returns true if this hit ended the run.
pub fn damage_player(state: &mut GameState, amount: f32, invulnerability: f32) -> bool {
    if state.mode == Mode::GameOver || state.player.invulnerable > 0.0 {
        return false;
    }
    let p = &mut state.player;
    let absorbed = p.shield.min(amount).max(0.0);
    p.shield = (p.shield - absorbed).max(0.0);
    if absorbed > 0.0 {
        p.shield_regen_delay = if p.shield > 0.0 { SHIELD_REGEN_DELAY } else { 0.0 };
        p.shield_regen_active = false;
    }
    let spill = (amount - absorbed).max(0.0);
    if spill > 0.0 {
        p.energy = (p.energy - spill).max(0.0);
    }
    let dead = p.energy <= 0.0;
    p.invulnerable = if dead { DEATH_INVULNERABILITY } else { invulnerability };
    let pos = p.pos;

    add_shake(state, 16.0);
    add_flash(state, 0.38);
    add_pulse(state, 0.45);
    state.emit(GameEvent::PlayerDamaged);
    emit_particles(state, pos, 0xff7892, 18, 190.0);
    if dead {
        flow::fail_run(state);
    }
    dead
}

/// Spend a cannon charge: non-boss enemies in range are destroyed, the boss
/// takes a fixed hit
pub fn fire_cannon(state: &mut GameState) {
    let p = &mut state.player;
    if p.cannon_charges == 0 || p.cannon_cooldown > 0.0 {
        return;
    }
    p.cannon_charges -= 1;
    p.cannon_cooldown = CANNON_COOLDOWN;
    let origin = p.pos;
    let radius = CANNON_RADIUS * state.progression.stats.cannon_radius_mult;
    let boss_damage = CANNON_BOSS_DAMAGE + state.progression.stats.cannon_boss_damage;

    add_shake(state, 24.0);
    add_flash(state, 0.56);
    spawn_ripple(state, origin, 2.7);
    emit_particles(state, origin, 0xffc18f, 44, 300.0);
    state.emit(GameEvent::CannonBlast);

    for i in (0..state.enemies.len()).rev() {
        let Some(enemy) = state.enemies.get_mut(i) else {
            continue;
        };
        if enemy.pos.distance(origin) > radius {
            continue;
        }
        if enemy.kind == EnemyKind::Boss {
            enemy.take_damage(boss_damage);
            let pos = enemy.pos;
            emit_particles(state, pos, 0xff95da, 20, 210.0);
        } else {
            destroy_enemy(state, i, true);
        }
    }
    super::collision::reap_dead_enemies(state);
}

/// Spend a phase charge: clear nearby enemy fire and shove enemies outward
pub fn trigger_phase_pulse(state: &mut GameState) {
    let p = &mut state.player;
    if p.phase_charges == 0 || p.phase_cooldown > 0.0 {
        return;
    }
    p.phase_charges -= 1;
    p.phase_cooldown = PHASE_COOLDOWN;
    let origin = p.pos;

    add_shake(state, 22.0);
    add_flash(state, 0.52);
    add_pulse(state, 0.82);
    state.emit(GameEvent::PhasePulse);
    spawn_ripple(state, origin, 2.9);
    emit_particles(state, origin, 0xb2fdff, 36, 300.0);
    state.powerup_message = "PHASE PULSE".to_string();
    state.powerup_message_timer = 1.8;

    let clear_radius = PHASE_RADIUS * 1.12;
    state
        .enemy_bullets
        .retain(|b| b.pos.distance(origin) > clear_radius);

    for enemy in state.enemies.iter_mut() {
        let delta = enemy.pos - origin;
        let dist = delta.length().max(1.0);
        let falloff = clamp(1.0 - dist / PHASE_RADIUS, 0.0, 1.0);
        if falloff <= 0.0 {
            continue;
        }
        enemy.vel += delta / dist * (260.0 + falloff * 340.0);
        let damage = if enemy.kind == EnemyKind::Boss {
            1.5 + falloff * 1.5
        } else {
            1.6 + falloff * 3.2
        };
        enemy.take_damage(damage);
    }
    super::collision::reap_dead_enemies(state);
}

/// Dump the full meter into a timed burst
pub fn activate_overdrive(state: &mut GameState) {
    state.overdrive_meter = 0.0;
    state.overdrive_timer = OVERDRIVE_DURATION;
    add_pulse(state, 0.95);
    add_flash(state, 0.48);
    add_shake(state, 12.0);
    state.emit(GameEvent::OverdriveActivated);
    let pos = state.player.pos;
    emit_particles(state, pos, 0x91f6ff, 26, 240.0);
}
