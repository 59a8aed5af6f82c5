//! Mode transitions: run start, level clear, draft, warp, pause and failure

use super::effects::{add_flash, add_shake, emit_particles};
use super::levels::level_config;
use super::progression::{DRAFT_SIZE, RelicId, roll_draft_choices};
use super::state::{GameEvent, GameState, Mode, PendingScore};
use crate::consts::*;

/// Relic heal fraction when a relic is picked between levels
const RELIC_HEAL_FRACTION: f32 = 0.45;

/// Reset everything and begin level 1 with the same seed and arena
pub fn start_run(state: &mut GameState) {
    *state = GameState::with_config(state.seed, state.config);
    state.progression.recompute();
    state.progression.apply_to_player(&mut state.player, 0.0);
    state.progression.apply_level_mutator(0, &mut state.rng);
    state.level = level_config(0);
    state.mode = Mode::Playing;
    log::info!(
        "Run started (seed {}): level 1 {}",
        state.seed,
        state.level.name
    );
}

/// Pause an active mode, or resume the mode that was paused
pub fn toggle_pause(state: &mut GameState) {
    if state.mode.pausable() {
        state.pause_return_mode = state.mode;
        state.mode = Mode::Paused;
    } else if state.mode == Mode::Paused {
        state.mode = state.pause_return_mode;
    }
}

/// Lost focus: pause if something is running, never resume
pub fn pause_for_focus_loss(state: &mut GameState) {
    if state.mode.pausable() {
        toggle_pause(state);
    }
}

/// Kill target met and field clear
pub fn complete_level(state: &mut GameState) {
    state.mode = Mode::LevelComplete;
    state.level_done_timer = LEVEL_COMPLETE_DURATION;
    state.emit(GameEvent::LevelUp);
    let center = state.config.center();
    emit_particles(state, center, 0x6dfcff, 80, 260.0);
    state.add_score(1200.0 + state.level_index as f32 * 320.0);
    add_flash(state, 0.45);
    log::info!(
        "Level {} cleared, score {}",
        state.level.level_number,
        state.score.floor()
    );
}

/// Offer relics, or warp straight on when nothing is left to offer
pub fn open_draft(state: &mut GameState) {
    let choices = roll_draft_choices(&state.progression.stacks, DRAFT_SIZE, &mut state.rng);
    log::debug!("Draft offered: {:?}", choices);
    state.progression.draft_choices = choices;
    if state.progression.draft_choices.is_empty() {
        start_warp_jump(state);
        return;
    }
    state.mode = Mode::Draft;
}

/// Take an offered relic. Returns false if it was not on offer or is maxed.
pub fn select_relic(state: &mut GameState, id: RelicId) -> bool {
    if state.mode != Mode::Draft || !state.progression.draft_choices.contains(&id) {
        log::warn!("Relic {} is not on offer", id.as_str());
        return false;
    }
    if !state.progression.add_stack(id) {
        log::warn!("Relic {} is already at max stacks", id.as_str());
        return false;
    }
    state
        .progression
        .apply_to_player(&mut state.player, RELIC_HEAL_FRACTION);
    let def = id.def();
    state.powerup_message = format!("RELIC ONLINE: {}", def.name.to_uppercase());
    state.powerup_message_timer = 3.2;
    log::info!(
        "Relic picked: {} (stack {})",
        def.name,
        state.progression.stack(id)
    );
    start_warp_jump(state);
    true
}

/// Take the draft choice at a zero-based position
pub fn select_draft_index(state: &mut GameState, index: usize) -> bool {
    match state.progression.draft_choices.get(index).copied() {
        Some(id) => select_relic(state, id),
        None => {
            log::warn!("No draft choice at slot {}", index + 1);
            false
        }
    }
}

/// Leave the draft without taking a relic
pub fn skip_draft(state: &mut GameState) {
    if state.mode == Mode::Draft {
        start_warp_jump(state);
    }
}

pub fn start_warp_jump(state: &mut GameState) {
    state.mode = Mode::WarpJump;
    state.progression.draft_choices.clear();
    state.enemy_bullets.clear();
    state.arc_links.clear();
    state.warp_timer = WARP_DURATION;
    add_shake(state, 20.0);
    add_flash(state, 0.58);
    let center = state.config.center();
    emit_particles(state, center, 0x8af4ff, 56, 280.0);
}

/// Enter the next level once the warp finishes
pub fn advance_level(state: &mut GameState) {
    state.level_index += 1;
    state.level = level_config(state.level_index);
    state.kills_in_level = 0;
    state.spawn_timer = 0.2;
    state.mode = Mode::Playing;
    state.warp_timer = 0.0;
    state.enemy_bullets.clear();
    state.arc_links.clear();
    add_flash(state, 0.25);
    state.boss_spawned = false;
    state.boss_defeated = false;

    state
        .progression
        .apply_level_mutator(state.level_index, &mut state.rng);
    state.progression.apply_to_player(&mut state.player, 0.0);
    let stats = state.progression.stats;
    let p = &mut state.player;
    p.shield = p.max_shield;
    p.shield_regen_delay = 0.0;
    p.shield_regen_active = false;
    p.phase_charges = (p.phase_charges + 1).min(super::player::MAX_PHASE_CHARGES);
    p.phase_cooldown = (p.phase_cooldown - 0.8).max(0.0);
    p.cannon_charges += stats.cannon_per_level;
    let pos = p.pos;
    emit_particles(state, pos, 0x95fff5, 22, 220.0);

    log::info!(
        "Level {} started: {} [{}]",
        state.level.level_number,
        state.level.name,
        state.progression.mutator.def().name
    );
}

/// Health reached zero: end the run and hold the score for submission
pub fn fail_run(state: &mut GameState) {
    if state.mode == Mode::GameOver {
        return;
    }
    state.mode = Mode::GameOver;
    state.arc_links.clear();
    state.progression.draft_choices.clear();
    let pending = PendingScore {
        score: state.score.max(0.0).floor() as u64,
        level: state.level_index + 1,
    };
    state.pending_score = Some(pending);
    state.emit(GameEvent::GameOver);
    log::info!(
        "Game over on level {} with score {}",
        pending.level,
        pending.score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::spawn_enemy;
    use crate::sim::progression::MutatorId;
    use glam::Vec2;

    fn running() -> GameState {
        let mut state = GameState::new(321);
        start_run(&mut state);
        state
    }

    #[test]
    fn test_start_run_resets_everything() {
        let mut state = running();
        state.score = 900.0;
        state.level_index = 4;
        state.progression.add_stack(RelicId::Overclock);
        spawn_enemy(&mut state, None, Some(Vec2::new(100.0, 100.0)));
        state.mode = Mode::GameOver;

        start_run(&mut state);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.level_index, 0);
        assert!(state.enemies.is_empty());
        assert!(state.progression.stacks.is_empty());
        assert_eq!(state.progression.mutator, MutatorId::Stable);
        assert!(state.pending_score.is_none());
    }

    #[test]
    fn test_pause_restores_previous_mode() {
        let mut state = running();
        state.mode = Mode::WarpJump;
        toggle_pause(&mut state);
        assert_eq!(state.mode, Mode::Paused);
        toggle_pause(&mut state);
        assert_eq!(state.mode, Mode::WarpJump);
    }

    #[test]
    fn test_focus_loss_never_resumes() {
        let mut state = running();
        pause_for_focus_loss(&mut state);
        assert_eq!(state.mode, Mode::Paused);
        pause_for_focus_loss(&mut state);
        assert_eq!(state.mode, Mode::Paused);

        state.mode = Mode::GameOver;
        pause_for_focus_loss(&mut state);
        assert_eq!(state.mode, Mode::GameOver);
    }

    #[test]
    fn test_draft_excludes_maxed_relic() {
        let mut state = running();
        let maxed = RelicId::Overclock;
        state.progression.stacks.insert(maxed, maxed.def().max_stacks);
        for _ in 0..50 {
            open_draft(&mut state);
            assert_eq!(state.mode, Mode::Draft);
            assert_eq!(state.progression.draft_choices.len(), DRAFT_SIZE);
            assert!(!state.progression.draft_choices.contains(&maxed));
        }
    }

    #[test]
    fn test_empty_draft_goes_to_warp() {
        let mut state = running();
        for id in RelicId::ALL {
            state.progression.stacks.insert(id, id.def().max_stacks);
        }
        open_draft(&mut state);
        assert_eq!(state.mode, Mode::WarpJump);
        assert_eq!(state.warp_timer, WARP_DURATION);
    }

    #[test]
    fn test_select_relic_stacks_and_warps() {
        let mut state = running();
        open_draft(&mut state);
        let pick = state.progression.draft_choices[0];
        assert!(select_relic(&mut state, pick));
        assert_eq!(state.progression.stack(pick), 1);
        assert_eq!(state.mode, Mode::WarpJump);
        assert!(state.progression.draft_choices.is_empty());
        // Not on offer any more
        assert!(!select_relic(&mut state, pick));
    }

    #[test]
    fn test_select_bad_slot_is_ignored() {
        let mut state = running();
        open_draft(&mut state);
        assert!(!select_draft_index(&mut state, 7));
        assert_eq!(state.mode, Mode::Draft);
    }

    #[test]
    fn test_advance_level_refreshes() {
        let mut state = running();
        state.boss_spawned = true;
        state.boss_defeated = true;
        state.kills_in_level = 30;
        state.player.shield = 10.0;
        state.player.phase_charges = 4;
        state.enemy_bullets.clear();
        start_warp_jump(&mut state);
        advance_level(&mut state);
        assert_eq!(state.mode, Mode::Playing);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.level.level_number, 2);
        assert_eq!(state.kills_in_level, 0);
        assert!(!state.boss_spawned && !state.boss_defeated);
        assert_eq!(state.player.shield, state.player.max_shield);
        assert_eq!(state.player.phase_charges, 4);
        assert_ne!(state.progression.mutator, MutatorId::Stable);
    }

    #[test]
    fn test_level_clear_awards_bonus() {
        let mut state = running();
        complete_level(&mut state);
        assert_eq!(state.mode, Mode::LevelComplete);
        assert_eq!(state.score, 1200.0);
        assert!(state.drain_events().contains(&GameEvent::LevelUp));
    }

    #[test]
    fn test_fail_run_records_pending_score() {
        let mut state = running();
        state.score = 777.9;
        state.level_index = 2;
        fail_run(&mut state);
        assert_eq!(state.mode, Mode::GameOver);
        assert_eq!(
            state.pending_score,
            Some(PendingScore {
                score: 777,
                level: 3
            })
        );
    }
}
