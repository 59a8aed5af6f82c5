//! Visual effect state: particles, ripples, arc links, camera kick
//!
//! None of this feeds back into gameplay, but it consumes the run RNG so it
//! stays inside the deterministic tick.

use glam::Vec2;

use super::state::{ArcLink, GameState, Particle, Ripple};
use crate::rand_between;

/// Maximum live ripples
pub const MAX_RIPPLES: usize = 10;
/// Maximum live arc links
pub const MAX_ARC_LINKS: usize = 36;
const ARC_LINK_LIFE: f32 = 0.16;

/// Spray `count` particles outward from `pos`
pub fn emit_particles(state: &mut GameState, pos: Vec2, color: u32, count: usize, speed: f32) {
    let cap = state.config.max_particles;
    if cap == 0 {
        return;
    }
    for _ in 0..count {
        let angle = rand_between(&mut state.rng, 0.0, std::f32::consts::TAU);
        let mag = rand_between(&mut state.rng, speed * 0.4, speed);
        let life = rand_between(&mut state.rng, 0.25, 0.8);
        let size = rand_between(&mut state.rng, 2.0, 6.0);
        state.particles.push(Particle {
            pos,
            vel: Vec2::from_angle(angle) * mag,
            color,
            life,
            max_life: life,
            size,
        });
    }
    if state.particles.len() > cap {
        let excess = state.particles.len() - cap;
        state.particles.drain(0..excess);
    }
}

pub fn spawn_ripple(state: &mut GameState, pos: Vec2, power: f32) {
    let speed = 320.0 + rand_between(&mut state.rng, -50.0, 60.0);
    state.ripples.push(Ripple {
        pos,
        radius: 0.0,
        speed,
        life: 1.0,
        band: 38.0,
        power: 12.0 * power,
    });
    if state.ripples.len() > MAX_RIPPLES {
        state.ripples.remove(0);
    }
}

pub fn spawn_arc_link(state: &mut GameState, from: Vec2, to: Vec2, color: u32) {
    state.arc_links.push(ArcLink {
        from,
        to,
        life: ARC_LINK_LIFE,
        max_life: ARC_LINK_LIFE,
        color,
    });
    if state.arc_links.len() > MAX_ARC_LINKS {
        state.arc_links.remove(0);
    }
}

/// Raise camera shake to at least `amount`
pub fn add_shake(state: &mut GameState, amount: f32) {
    if state.config.screen_shake {
        state.shake = state.shake.max(amount);
    }
}

pub fn add_flash(state: &mut GameState, amount: f32) {
    state.flash = state.flash.max(amount);
}

pub fn add_pulse(state: &mut GameState, amount: f32) {
    state.cinematic_pulse = state.cinematic_pulse.max(amount);
}

/// Decay shake/flash/pulse and jitter the camera
pub fn update_camera(state: &mut GameState, dt: f32) {
    state.shake = (state.shake - dt * 26.0).max(0.0);
    state.cinematic_pulse = (state.cinematic_pulse - dt * 0.9).max(0.0);
    state.flash = (state.flash - dt * 0.9).max(0.0);
    let s = state.shake;
    state.camera_offset = Vec2::new(
        rand_between(&mut state.rng, -s, s) * 0.5,
        rand_between(&mut state.rng, -s, s) * 0.5,
    );
}

pub fn update_particles(state: &mut GameState, dt: f32) {
    state.particles.retain_mut(|p| {
        p.life -= dt;
        p.pos += p.vel * dt;
        p.vel *= 0.97;
        p.life > 0.0
    });
}

pub fn update_ripples(state: &mut GameState, dt: f32) {
    state.ripples.retain_mut(|r| {
        r.radius += r.speed * dt;
        r.life -= dt * 1.08;
        r.life > 0.0
    });
}

pub fn update_arc_links(state: &mut GameState, dt: f32) {
    state.arc_links.retain_mut(|link| {
        link.life -= dt;
        link.life > 0.0
    });
}
