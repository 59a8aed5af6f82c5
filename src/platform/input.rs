//! Keyboard and pointer state
//!
//! Hosts feed raw key codes (`KeyboardEvent.code` names) and pointer events
//! in; the driver reads a `TickInput` per tick plus any host intents.

use glam::Vec2;

use crate::sim::TickInput;

/// Requests the simulation does not handle itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostIntent {
    StartRun,
    TogglePause,
    ToggleMute,
    ToggleFullscreen,
    ToggleAutopilot,
    /// Zero-based draft slot
    ChooseDraft(usize),
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    fire_key: bool,
    pointer_down: bool,
    /// Pointer position in arena pixels
    pub pointer: Vec2,
    dash: bool,
    cannon: bool,
    phase: bool,
    overdrive: bool,
    intents: Vec<HostIntent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. Auto-repeat is harmless: one-shots are flags, not counters.
    pub fn key_down(&mut self, code: &str) {
        match code {
            "KeyW" | "ArrowUp" => self.up = true,
            "KeyS" | "ArrowDown" => self.down = true,
            "KeyA" | "ArrowLeft" => self.left = true,
            "KeyD" | "ArrowRight" => self.right = true,
            "Space" => self.fire_key = true,
            "ShiftLeft" | "ShiftRight" => self.dash = true,
            "KeyE" => self.cannon = true,
            "KeyQ" => self.phase = true,
            "KeyR" => self.overdrive = true,
            "KeyP" | "Escape" => self.intents.push(HostIntent::TogglePause),
            "KeyM" => self.intents.push(HostIntent::ToggleMute),
            "KeyF" => self.intents.push(HostIntent::ToggleFullscreen),
            "KeyI" => self.intents.push(HostIntent::ToggleAutopilot),
            "Enter" => self.intents.push(HostIntent::StartRun),
            "Digit1" => self.intents.push(HostIntent::ChooseDraft(0)),
            "Digit2" => self.intents.push(HostIntent::ChooseDraft(1)),
            "Digit3" => self.intents.push(HostIntent::ChooseDraft(2)),
            _ => {}
        }
    }

    pub fn key_up(&mut self, code: &str) {
        match code {
            "KeyW" | "ArrowUp" => self.up = false,
            "KeyS" | "ArrowDown" => self.down = false,
            "KeyA" | "ArrowLeft" => self.left = false,
            "KeyD" | "ArrowRight" => self.right = false,
            "Space" => self.fire_key = false,
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    pub fn pointer_button(&mut self, down: bool) {
        self.pointer_down = down;
    }

    /// Window lost focus: nothing stays held
    pub fn release_all(&mut self) {
        self.up = false;
        self.down = false;
        self.left = false;
        self.right = false;
        self.fire_key = false;
        self.pointer_down = false;
    }

    /// Input for the next tick
    pub fn tick_input(&self) -> TickInput {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        TickInput {
            movement: Vec2::new(axis(self.left, self.right), axis(self.up, self.down)),
            aim: self.pointer,
            firing: self.fire_key || self.pointer_down,
            dash: self.dash,
            cannon: self.cannon,
            phase: self.phase,
            overdrive: self.overdrive,
            autopilot: false,
        }
    }

    /// Clear one-shot actions once a tick has seen them
    pub fn consume_one_shots(&mut self) {
        self.dash = false;
        self.cannon = false;
        self.phase = false;
        self.overdrive = false;
    }

    pub fn drain_intents(&mut self) -> Vec<HostIntent> {
        std::mem::take(&mut self.intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_axes() {
        let mut input = InputState::new();
        input.key_down("KeyD");
        input.key_down("ArrowUp");
        assert_eq!(input.tick_input().movement, Vec2::new(1.0, -1.0));
        // Opposing keys cancel
        input.key_down("KeyA");
        assert_eq!(input.tick_input().movement.x, 0.0);
        input.key_up("KeyD");
        assert_eq!(input.tick_input().movement.x, -1.0);
    }

    #[test]
    fn test_fire_from_key_or_pointer() {
        let mut input = InputState::new();
        assert!(!input.tick_input().firing);
        input.pointer_button(true);
        input.pointer_move(300.0, 200.0);
        let tick = input.tick_input();
        assert!(tick.firing);
        assert_eq!(tick.aim, Vec2::new(300.0, 200.0));
        input.release_all();
        assert!(!input.tick_input().firing);
    }

    #[test]
    fn test_one_shots_are_consumed() {
        let mut input = InputState::new();
        input.key_down("ShiftLeft");
        input.key_down("KeyE");
        input.key_down("KeyQ");
        input.key_down("KeyR");
        let tick = input.tick_input();
        assert!(tick.dash && tick.cannon && tick.phase && tick.overdrive);
        input.consume_one_shots();
        let tick = input.tick_input();
        assert!(!tick.dash && !tick.cannon && !tick.phase && !tick.overdrive);
    }

    #[test]
    fn test_intents_queue_in_order() {
        let mut input = InputState::new();
        input.key_down("KeyP");
        input.key_down("Digit2");
        input.key_down("KeyM");
        input.key_down("KeyZ");
        assert_eq!(
            input.drain_intents(),
            vec![
                HostIntent::TogglePause,
                HostIntent::ChooseDraft(1),
                HostIntent::ToggleMute
            ]
        );
        assert!(input.drain_intents().is_empty());
    }
}
