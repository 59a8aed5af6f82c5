//! Enemy creation, steering and the spawn orchestrator
//!
//! Behavior is dispatched by `EnemyKind`. Every enemy moves by accumulating
//! acceleration into velocity, then damping, then bouncing off the arena walls.

use glam::Vec2;
use rand::Rng;

use super::effects::{add_flash, emit_particles};
use super::flow;
use super::state::{EliteMod, Enemy, EnemyBullet, EnemyKind, GameEvent, GameState, SimConfig};
use crate::{clamp, lerp, rand_between, rand_int, weighted_pick};

/// Elite roll chance never exceeds this
pub const MAX_ELITE_CHANCE: f32 = 0.42;
const ELITE_WEIGHTS: [(EliteMod, f32); 3] = [
    (EliteMod::Hasted, 5.0),
    (EliteMod::Armored, 4.0),
    (EliteMod::Volatile, 3.0),
];

/// Enemies this far outside the arena are dropped
const DESPAWN_MARGIN: f32 = 120.0;
/// Gravity well reach and burn radius
const GRAVITY_RANGE: f32 = 320.0;
const GRAVITY_BURN_RANGE: f32 = 84.0;

/// Chance that a freshly spawned enemy is elite at `level_index`
pub fn elite_chance(level_index: u32) -> f32 {
    clamp(0.05 + level_index as f32 * 0.018, 0.0, MAX_ELITE_CHANCE)
}

/// Build an enemy of `kind` with level and mutator scaling but no elite roll
fn base_enemy<R: Rng + ?Sized>(
    id: u32,
    kind: EnemyKind,
    pos: Vec2,
    level_index: u32,
    rng: &mut R,
) -> Enemy {
    let level = level_index as f32;
    let mut enemy = Enemy {
        id,
        kind,
        pos,
        vel: Vec2::ZERO,
        angle: rand_between(rng, 0.0, std::f32::consts::TAU),
        spin: rand_between(rng, -3.0, 3.0),
        hp: 1.0,
        max_hp: 1.0,
        radius: 14.0,
        speed: 100.0,
        contact_damage: 1.0,
        shoot_cooldown: rand_between(rng, 0.4, 1.2),
        elite: EliteMod::None,
        color: kind.color(),
        pulse: rand_between(rng, 0.0, std::f32::consts::TAU),
        trail: Vec::new(),
    };
    match kind {
        EnemyKind::Seeker => {
            enemy.hp = 1.0;
            enemy.radius = 13.0;
            enemy.speed = rand_between(rng, 120.0, 170.0) + level * 7.0;
        }
        EnemyKind::Spinner => {
            enemy.hp = 2.0;
            enemy.radius = 15.0;
            enemy.speed = rand_between(rng, 90.0, 140.0) + level * 8.0;
            enemy.spin = rand_between(rng, -6.0, 6.0);
        }
        EnemyKind::Tank => {
            enemy.hp = 6.0;
            enemy.radius = 22.0;
            enemy.speed = rand_between(rng, 50.0, 85.0) + level * 4.0;
            enemy.contact_damage = 2.0;
        }
        EnemyKind::Mine => {
            enemy.hp = 3.0;
            enemy.radius = 17.0;
            enemy.speed = 40.0;
        }
        EnemyKind::Splitter => {
            enemy.hp = 2.0;
            enemy.radius = 16.0;
            enemy.speed = rand_between(rng, 95.0, 135.0) + level * 6.0;
        }
        EnemyKind::Shard => {
            enemy.hp = 1.0;
            enemy.radius = 8.0;
            enemy.speed = rand_between(rng, 150.0, 210.0) + level * 7.0;
        }
        EnemyKind::Boss => {
            enemy.hp = 46.0 + (level * 1.5).floor();
            enemy.radius = 44.0;
            enemy.speed = 52.0 + level * 2.4;
            enemy.contact_damage = 3.0;
            enemy.spin = 2.1;
        }
    }
    enemy
}

/// Apply an elite modifier to a freshly built enemy
pub fn apply_elite(enemy: &mut Enemy, elite: EliteMod) {
    enemy.elite = elite;
    match elite {
        EliteMod::None => return,
        EliteMod::Hasted => enemy.speed *= 1.35,
        EliteMod::Armored => {
            enemy.hp = (enemy.hp * 1.85).round();
            enemy.radius += 2.0;
        }
        EliteMod::Volatile => enemy.contact_damage += 1.0,
    }
    if let Some(color) = elite.color() {
        enemy.color = color;
    }
}

/// Create an enemy with mutator scaling and an elite roll.
///
/// With `at == None` the enemy is placed on a random arena edge drifting
/// inward; `kind == None` draws from the level's mix.
pub fn create_enemy(state: &mut GameState, kind: Option<EnemyKind>, at: Option<Vec2>) -> Enemy {
    let kind = kind
        .or_else(|| weighted_pick(&state.level.enemy_mix, &mut state.rng))
        .unwrap_or(EnemyKind::Seeker);
    let side = rand_int(&mut state.rng, 0, 3);
    let id = state.next_enemy_id();
    let center = state.config.center();
    let mut enemy = base_enemy(id, kind, at.unwrap_or(center), state.level_index, &mut state.rng);

    let mutator = state.progression.mutator.def();
    enemy.hp = (enemy.hp * mutator.enemy_hp_mult).round().max(1.0);
    enemy.speed *= mutator.enemy_speed_mult;

    if !matches!(kind, EnemyKind::Boss | EnemyKind::Shard)
        && state.rng.random::<f32>() < elite_chance(state.level_index)
    {
        let elite = weighted_pick(&ELITE_WEIGHTS, &mut state.rng).unwrap_or(EliteMod::Hasted);
        apply_elite(&mut enemy, elite);
    }
    enemy.max_hp = enemy.hp;

    if at.is_none() {
        place_at_edge(&mut enemy, side, &state.config, &mut state.rng);
    }
    enemy
}

/// Create an enemy and add it to the field immediately
pub fn spawn_enemy(state: &mut GameState, kind: Option<EnemyKind>, at: Option<Vec2>) -> u32 {
    let enemy = create_enemy(state, kind, at);
    let id = enemy.id;
    state.enemies.push(enemy);
    id
}

fn place_at_edge<R: Rng + ?Sized>(enemy: &mut Enemy, side: i32, config: &SimConfig, rng: &mut R) {
    let margin = enemy.radius + 12.0;
    let (w, h) = (config.width, config.height);
    let inward = rand_between(rng, 40.0, 100.0);
    match side {
        0 => {
            enemy.pos = Vec2::new(margin, rand_between(rng, margin, h - margin));
            enemy.vel = Vec2::new(inward, 0.0);
        }
        1 => {
            enemy.pos = Vec2::new(w - margin, rand_between(rng, margin, h - margin));
            enemy.vel = Vec2::new(-inward, 0.0);
        }
        2 => {
            enemy.pos = Vec2::new(rand_between(rng, margin, w - margin), margin);
            enemy.vel = Vec2::new(0.0, inward);
        }
        _ => {
            enemy.pos = Vec2::new(rand_between(rng, margin, w - margin), h - margin);
            enemy.vel = Vec2::new(0.0, -inward);
        }
    }
}

/// Steering acceleration (pixels/s²) for an enemy.
///
/// `to_player` is the unit vector toward the player. Orbiting types blend a
/// perpendicular component whose share shrinks with distance while pursuit
/// grows, so far-away orbiters still close in.
pub fn steering(kind: EnemyKind, speed: f32, to_player: Vec2, dist: f32, drift: Vec2) -> Vec2 {
    let orbit = to_player.perp();
    let far = clamp((dist - 180.0) / 320.0, 0.0, 1.0);
    match kind {
        EnemyKind::Seeker | EnemyKind::Shard => to_player * speed * 5.0,
        EnemyKind::Splitter => to_player * speed * 4.0,
        EnemyKind::Spinner => {
            to_player * speed * lerp(2.4, 3.6, far) + orbit * speed * lerp(2.2, 1.2, far)
        }
        EnemyKind::Tank => to_player * speed * 2.2 + orbit * speed * lerp(0.6, 0.0, far),
        EnemyKind::Boss => {
            to_player * speed * lerp(1.5, 2.2, far) + orbit * speed * lerp(0.9, 0.4, far)
        }
        EnemyKind::Mine => {
            if dist < 280.0 {
                to_player * (speed + 130.0) * 2.6
            } else {
                drift * 14.0
            }
        }
    }
}

/// Velocity retained per tick
fn damping(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Tank => 0.94,
        EnemyKind::Boss => 0.975,
        _ => 0.96,
    }
}

/// Wall restitution
fn wall_bounce(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Tank => 0.34,
        EnemyKind::Boss => 0.2,
        _ => 0.42,
    }
}

/// Orientation change per second
fn turn_rate(enemy: &Enemy) -> f32 {
    match enemy.kind {
        EnemyKind::Spinner | EnemyKind::Boss => enemy.spin,
        EnemyKind::Tank => 1.4,
        EnemyKind::Mine => 1.0,
        EnemyKind::Splitter => 3.5,
        EnemyKind::Seeker | EnemyKind::Shard => 0.0,
    }
}

/// A ranged volley: bullet speed, damage, glow, cooldown range, range
struct Volley {
    speed: f32,
    damage: f32,
    glow: u32,
    shots: u32,
    cooldown: (f32, f32),
    range: f32,
}

fn volley(enemy: &Enemy) -> Option<Volley> {
    let elite = enemy.is_elite();
    match enemy.kind {
        EnemyKind::Spinner => Some(Volley {
            speed: if elite { 300.0 } else { 250.0 },
            damage: if elite { 14.0 } else { 11.0 },
            glow: if elite { 0xffd4a2 } else { 0xff90c8 },
            shots: 1,
            cooldown: if elite { (1.2, 1.8) } else { (1.6, 2.4) },
            range: 440.0,
        }),
        EnemyKind::Tank => Some(Volley {
            speed: if elite { 260.0 } else { 220.0 },
            damage: if elite { 18.0 } else { 14.0 },
            glow: if elite { 0xffb287 } else { 0xff8f74 },
            shots: 1,
            cooldown: if elite { (1.7, 2.5) } else { (2.2, 3.1) },
            range: 480.0,
        }),
        EnemyKind::Boss => Some(Volley {
            speed: 290.0,
            damage: 16.0,
            glow: 0xff72cf,
            shots: 2,
            cooldown: (0.65, 1.0),
            range: f32::INFINITY,
        }),
        _ => None,
    }
}

fn fire_at_player<R: Rng + ?Sized>(
    enemy: &Enemy,
    player_pos: Vec2,
    volley: &Volley,
    rng: &mut R,
    out: &mut Vec<EnemyBullet>,
) {
    let boss = enemy.kind == EnemyKind::Boss;
    let variance = if boss { 0.08 } else { 0.12 };
    let delta = player_pos - enemy.pos;
    let angle = delta.y.atan2(delta.x) + rand_between(rng, -variance, variance);
    out.push(EnemyBullet {
        pos: enemy.pos,
        vel: Vec2::from_angle(angle) * volley.speed,
        radius: if boss { 6.2 } else { 4.8 },
        life: if boss { 2.1 } else { 1.9 },
        damage: volley.damage,
        glow: volley.glow,
        near_missed: false,
    });
}

/// Advance every enemy through steering, gravity well, firing and movement.
///
/// Enemies pushed below zero hp (gravity well burn) are left for the caller
/// to destroy.
pub fn update_behaviors(state: &mut GameState, dt: f32) {
    let GameState {
        enemies,
        enemy_bullets,
        rng,
        player,
        config,
        time,
        ..
    } = state;
    let gravity_active = player.gravity_timer > 0.0;
    let trail_scale = config.trail_scale;

    for enemy in enemies.iter_mut() {
        let delta = player.pos - enemy.pos;
        let dist = delta.length().max(1.0);
        let to_player = delta / dist;

        if gravity_active {
            let pull = clamp(1.0 - dist / GRAVITY_RANGE, 0.0, 1.0);
            if pull > 0.0 {
                enemy.vel += to_player * (140.0 + pull * 380.0) * dt;
                if dist < GRAVITY_BURN_RANGE {
                    let burn = if enemy.kind == EnemyKind::Boss { 3.4 } else { 7.2 };
                    enemy.take_damage(dt * burn);
                }
            }
        }

        let drift = Vec2::new(
            (enemy.angle + *time * 0.8).cos(),
            (enemy.angle + *time * 0.6).sin(),
        );
        enemy.vel += steering(enemy.kind, enemy.speed, to_player, dist, drift) * dt;
        enemy.angle += turn_rate(enemy) * dt;
        enemy.pulse += dt * 4.0;

        enemy.shoot_cooldown -= dt;
        if enemy.shoot_cooldown <= 0.0 {
            if let Some(v) = volley(enemy) {
                if dist < v.range {
                    for _ in 0..v.shots {
                        fire_at_player(enemy, player.pos, &v, rng, enemy_bullets);
                    }
                    enemy.shoot_cooldown = rand_between(rng, v.cooldown.0, v.cooldown.1);
                }
            }
        }

        enemy.vel *= damping(enemy.kind);
        enemy.pos += enemy.vel * dt;
        bounce_off_walls(enemy, config);

        let trail_len = if enemy.kind == EnemyKind::Tank { 6.0 } else { 10.0 };
        super::state::record_trail(
            &mut enemy.trail,
            enemy.pos,
            (trail_len * trail_scale).round() as usize,
        );
    }

    enemies.retain(|e| config.in_bounds(e.pos, DESPAWN_MARGIN));
}

fn bounce_off_walls(enemy: &mut Enemy, config: &SimConfig) {
    let margin = enemy.radius + 7.0;
    let bounce = wall_bounce(enemy.kind);
    if enemy.pos.x < margin {
        enemy.pos.x = margin;
        enemy.vel.x = enemy.vel.x.abs() * bounce;
    } else if enemy.pos.x > config.width - margin {
        enemy.pos.x = config.width - margin;
        enemy.vel.x = -enemy.vel.x.abs() * bounce;
    }
    if enemy.pos.y < margin {
        enemy.pos.y = margin;
        enemy.vel.y = enemy.vel.y.abs() * bounce;
    } else if enemy.pos.y > config.height - margin {
        enemy.pos.y = config.height - margin;
        enemy.vel.y = -enemy.vel.y.abs() * bounce;
    }
}

/// Seconds between boss-level reinforcements relative to the base interval
const BOSS_LEVEL_INTERVAL_MULT: f32 = 1.25;
/// Spawn interval shrinks to this fraction as kills approach the target
const FULL_PRESSURE_INTERVAL: f32 = 0.62;

/// Spawn orchestration and level completion, run last in a playing tick
pub fn update_spawns(state: &mut GameState, dt: f32) {
    // Cascade spawns from this tick join the field now
    let queued = std::mem::take(&mut state.spawn_queue);
    state.enemies.extend(queued);

    let spawn_mult = state.progression.mutator.def().spawn_interval_mult;
    let boss_pending = state.level.boss_level && !state.boss_defeated;
    if state.kills_in_level >= state.level.target_kills
        && state.enemies.is_empty()
        && !boss_pending
    {
        flow::complete_level(state);
        return;
    }

    state.spawn_timer -= dt;
    let room = state.enemies.len() < state.level.max_enemies;

    if state.level.boss_level {
        if !state.boss_spawned {
            let at = Vec2::new(state.config.width * 0.5, state.config.height * 0.2);
            spawn_enemy(state, Some(EnemyKind::Boss), Some(at));
            state.boss_spawned = true;
            state.spawn_timer = 1.1;
            state.emit(GameEvent::BossSpawned);
            add_flash(state, 0.4);
            emit_particles(state, at, EnemyKind::Boss.color(), 40, 260.0);
            log::info!("Boss spawned on level {}", state.level.level_number);
            return;
        }
        if state.spawn_timer <= 0.0 && room && !state.boss_defeated {
            spawn_enemy(state, None, None);
            state.spawn_timer = state.level.spawn_interval * BOSS_LEVEL_INTERVAL_MULT * spawn_mult;
        }
        return;
    }

    if state.spawn_timer <= 0.0 && room && state.kills_in_level < state.level.target_kills {
        spawn_enemy(state, None, None);
        let intensity = state.kills_in_level as f32 / state.level.target_kills.max(1) as f32;
        state.spawn_timer =
            state.level.spawn_interval * lerp(1.0, FULL_PRESSURE_INTERVAL, intensity) * spawn_mult;
    }
}
