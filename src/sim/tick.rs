//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{resolve_enemies, update_bullets, update_enemy_bullets, update_powerups};
use super::effects::{
    add_flash, add_shake, update_arc_links, update_camera, update_particles, update_ripples,
};
use super::enemy::update_spawns;
use super::flow;
use super::player::update_player;
use super::state::{EnemyKind, GameState, Mode, record_trail};
use crate::consts::*;

/// Cinematic pulse held while hit-stop freezes the field
const HIT_STOP_PULSE: f32 = 0.72;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held movement direction; normalized by the player controller
    pub movement: Vec2,
    /// Pointer position in arena pixels
    pub aim: Vec2,
    /// Trigger held
    pub firing: bool,
    /// One-shot actions, consumed by the tick that sees them
    pub dash: bool,
    pub cannon: bool,
    pub phase: bool,
    pub overdrive: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

impl TickInput {
    /// Same held state with every one-shot cleared
    pub fn held(&self) -> Self {
        Self {
            dash: false,
            cannon: false,
            phase: false,
            overdrive: false,
            ..*self
        }
    }
}

/// Advance the game state by one fixed timestep.
///
/// Returns false when nothing consumed `input`: menu, pause and hit-stop
/// frames leave one-shot actions queued for the next tick that runs.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> bool {
    // Menu and pause are render-only
    if !state.mode.ticks() {
        return false;
    }

    if state.hit_stop_timer > 0.0 {
        state.hit_stop_timer = (state.hit_stop_timer - dt).max(0.0);
        state.cinematic_pulse = state.cinematic_pulse.max(HIT_STOP_PULSE);
        return false;
    }

    let mut input = *input;
    if input.autopilot {
        match state.mode {
            Mode::Playing => autopilot(state, &mut input),
            Mode::Draft => {
                flow::select_draft_index(state, 0);
            }
            _ => {}
        }
    }

    state.time += dt;
    state.streak_timer = (state.streak_timer - dt).max(0.0);
    if state.streak_timer <= 0.0 {
        state.streak = 0;
    }
    state.overdrive_timer = (state.overdrive_timer - dt).max(0.0);
    update_camera(state, dt);
    state.powerup_message_timer = (state.powerup_message_timer - dt).max(0.0);
    update_ripples(state, dt);
    update_arc_links(state, dt);

    match state.mode {
        Mode::Playing => playing_step(state, &input, dt),
        Mode::LevelComplete => {
            update_player(state, &input, dt * 0.5);
            update_bullets(state, dt * 0.4);
            update_enemy_bullets(state, dt * 0.35);
            update_particles(state, dt);
            state.level_done_timer -= dt;
            if state.mode == Mode::LevelComplete && state.level_done_timer <= 0.0 {
                flow::open_draft(state);
            }
        }
        Mode::WarpJump => warp_step(state, dt),
        _ => update_particles(state, dt),
    }
    true
}

/// Combat phases in their fixed order. A game over part way through stops
/// the remaining gameplay phases; particles still decay.
fn playing_step(state: &mut GameState, input: &TickInput, dt: f32) {
    update_player(state, input, dt);
    if state.mode == Mode::Playing {
        update_bullets(state, dt);
        update_enemy_bullets(state, dt);
    }
    if state.mode == Mode::Playing {
        resolve_enemies(state, dt);
    }
    if state.mode == Mode::Playing {
        update_powerups(state, dt);
    }
    update_particles(state, dt);
    if state.mode == Mode::Playing {
        update_spawns(state, dt);
    }
}

fn warp_step(state: &mut GameState, dt: f32) {
    let center = state.config.center();
    let trail_len = (18.0 * state.config.trail_scale).round() as usize;
    let p = &mut state.player;
    p.pos = p.pos.lerp(center, (dt * 5.0).min(1.0));
    p.vel *= 0.86;
    record_trail(&mut p.trail, p.pos, trail_len);

    update_particles(state, dt * 1.2);
    update_bullets(state, dt * 1.05);

    state.warp_timer = (state.warp_timer - dt).max(0.0);
    let t = 1.0 - state.warp_timer / WARP_DURATION;
    add_shake(state, 9.0 + t * 18.0);
    add_flash(state, 0.08 + t * 0.2);
    if state.warp_timer <= 0.0 {
        flow::advance_level(state);
    }
}

/// Demo pilot: keep distance from threats, drift home, grab pickups when
/// calm, shoot the closest enemy and spend abilities when crowded.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let p = &state.player;
    let center = state.config.center();
    let span = state.config.width.max(state.config.height);

    let nearest = state.enemies.iter().min_by(|a, b| {
        a.pos
            .distance_squared(p.pos)
            .total_cmp(&b.pos.distance_squared(p.pos))
    });
    input.firing = nearest.is_some();
    if let Some(enemy) = nearest {
        input.aim = enemy.pos + enemy.vel * 0.12;
    }

    let mut push = Vec2::ZERO;
    let mut crowd = 0;
    let mut boss_close = false;
    for enemy in &state.enemies {
        let away = p.pos - enemy.pos;
        let dist = away.length().max(1.0);
        if dist < 230.0 {
            crowd += 1;
            boss_close |= enemy.kind == EnemyKind::Boss;
        }
        if dist < 220.0 {
            let weight = if enemy.kind == EnemyKind::Boss { 2.0 } else { 1.0 };
            push += away / dist * (220.0 - dist) / 220.0 * weight;
        }
    }
    let mut incoming = 0;
    let mut close_call = false;
    for bullet in &state.enemy_bullets {
        let away = p.pos - bullet.pos;
        let dist = away.length().max(1.0);
        if dist < 200.0 {
            incoming += 1;
        }
        if dist < 120.0 {
            push += away / dist * (120.0 - dist) / 120.0 * 1.5;
        }
        close_call |= dist < p.radius + 40.0;
    }
    push += (center - p.pos) / span * 0.8;

    if push.length() < 0.35 {
        if let Some(item) = state.powerups.iter().min_by(|a, b| {
            a.pos
                .distance_squared(p.pos)
                .total_cmp(&b.pos.distance_squared(p.pos))
        }) {
            push += (item.pos - p.pos).normalize_or_zero();
        }
    }

    input.movement = push.normalize_or_zero();
    input.dash = close_call;
    input.cannon = crowd >= 4 || boss_close;
    input.phase = incoming >= 5;
    input.overdrive = state.overdrive_meter >= OVERDRIVE_MAX;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::spawn_enemy;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        flow::start_run(&mut state);
        state
    }

    #[test]
    fn test_menu_and_pause_do_not_tick() {
        let mut state = GameState::new(1);
        tick(&mut state, &TickInput::default(), FIXED_DT);
        assert_eq!(state.time, 0.0);

        flow::start_run(&mut state);
        flow::toggle_pause(&mut state);
        tick(&mut state, &TickInput::default(), FIXED_DT);
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_clear_field_completes_level_same_tick() {
        let mut state = running(8);
        state.kills_in_level = state.level.target_kills;
        assert!(state.enemies.is_empty());
        tick(&mut state, &TickInput::default(), FIXED_DT);
        assert_eq!(state.mode, Mode::LevelComplete);
    }

    #[test]
    fn test_level_complete_flows_into_draft_and_warp() {
        let mut state = running(8);
        state.kills_in_level = state.level.target_kills;
        let input = TickInput::default();
        tick(&mut state, &input, FIXED_DT);
        for _ in 0..90 {
            tick(&mut state, &input, FIXED_DT);
        }
        assert_eq!(state.mode, Mode::Draft);
        assert_eq!(state.progression.draft_choices.len(), 3);

        assert!(flow::select_draft_index(&mut state, 1));
        assert_eq!(state.mode, Mode::WarpJump);
        for _ in 0..90 {
            tick(&mut state, &input, FIXED_DT);
        }
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.level_index, 1);
        let center = state.config.center();
        assert!(state.player.pos.distance(center) < 5.0);
    }

    #[test]
    fn test_hit_stop_freezes_field() {
        let mut state = running(8);
        let at = state.player.pos + Vec2::new(200.0, 0.0);
        spawn_enemy(&mut state, Some(EnemyKind::Tank), Some(at));
        let before = state.enemies[0].pos;
        state.hit_stop_timer = 0.1;
        tick(&mut state, &TickInput::default(), FIXED_DT);
        assert_eq!(state.enemies[0].pos, before);
        assert_eq!(state.time, 0.0);
        assert!(state.cinematic_pulse >= HIT_STOP_PULSE);
        for _ in 0..6 {
            tick(&mut state, &TickInput::default(), FIXED_DT);
        }
        assert_eq!(state.hit_stop_timer, 0.0);
        tick(&mut state, &TickInput::default(), FIXED_DT);
        assert!(state.time > 0.0);
    }

    #[test]
    fn test_game_over_only_decays_particles() {
        let mut state = running(8);
        spawn_enemy(&mut state, Some(EnemyKind::Seeker), Some(Vec2::new(100.0, 100.0)));
        flow::fail_run(&mut state);
        let before = state.enemies[0].pos;
        let score = state.score;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), FIXED_DT);
        }
        assert_eq!(state.enemies[0].pos, before);
        assert_eq!(state.score, score);
        assert_eq!(state.mode, Mode::GameOver);
    }

    #[test]
    fn test_resources_stay_in_bounds_under_autopilot() {
        let mut state = running(77);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..3600 {
            tick(&mut state, &input, FIXED_DT);
            let p = &state.player;
            assert!(p.energy >= 0.0 && p.energy <= p.max_energy);
            assert!(p.shield >= 0.0 && p.shield <= p.max_shield);
            assert!(state.enemies.iter().all(|e| e.hp > 0.0 && e.hp <= e.max_hp));
        }
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = running(99999);
        let mut state2 = running(99999);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..1800 {
            tick(&mut state1, &input, FIXED_DT);
            tick(&mut state2, &input, FIXED_DT);
        }
        let a = serde_json::to_string(&state1).unwrap();
        let b = serde_json::to_string(&state2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_held_clears_one_shots() {
        let input = TickInput {
            firing: true,
            dash: true,
            phase: true,
            ..Default::default()
        };
        let held = input.held();
        assert!(held.firing);
        assert!(!held.dash && !held.phase);
    }
}
