//! Keyboard input mapping
//!
//! Arrow keys and WASD move, Escape toggles pause, Enter/Space start the game
//! or continue after a win.

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Left,
    Right,
    Up,
    Down,
    Pause,
    Confirm,
}

impl Intent {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Intent::Left),
            "ArrowRight" | "d" | "D" => Some(Intent::Right),
            "ArrowUp" | "w" | "W" => Some(Intent::Up),
            "ArrowDown" | "s" | "S" => Some(Intent::Down),
            "Escape" => Some(Intent::Pause),
            "Enter" | " " | "Spacebar" => Some(Intent::Confirm),
            _ => None,
        }
    }

    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            Intent::Left | Intent::Right | Intent::Up | Intent::Down
        )
    }
}

/// Movement keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl HeldKeys {
    pub fn press(&mut self, intent: Intent) {
        self.set(intent, true);
    }

    pub fn release(&mut self, intent: Intent) {
        self.set(intent, false);
    }

    fn set(&mut self, intent: Intent, down: bool) {
        match intent {
            Intent::Left => self.left = down,
            Intent::Right => self.right = down,
            Intent::Up => self.up = down,
            Intent::Down => self.down = down,
            Intent::Pause | Intent::Confirm => {}
        }
    }

    /// Copy the held directions into a tick input
    pub fn apply(&self, input: &mut TickInput) {
        input.left = self.left;
        input.right = self.right;
        input.up = self.up;
        input.down = self.down;
    }
}

/// Route a key press: movement is held, pause/confirm become one-shot actions
pub fn key_down(key: &str, held: &mut HeldKeys, input: &mut TickInput) -> Option<Intent> {
    let intent = Intent::from_key(key)?;
    match intent {
        Intent::Pause => input.pause = true,
        Intent::Confirm => input.confirm = true,
        _ => held.press(intent),
    }
    Some(intent)
}

pub fn key_up(key: &str, held: &mut HeldKeys) {
    if let Some(intent) = Intent::from_key(key).filter(Intent::is_movement) {
        held.release(intent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(Intent::from_key("ArrowLeft"), Some(Intent::Left));
        assert_eq!(Intent::from_key("D"), Some(Intent::Right));
        assert_eq!(Intent::from_key("w"), Some(Intent::Up));
        assert_eq!(Intent::from_key("s"), Some(Intent::Down));
        assert_eq!(Intent::from_key("Escape"), Some(Intent::Pause));
        assert_eq!(Intent::from_key(" "), Some(Intent::Confirm));
        assert_eq!(Intent::from_key("Enter"), Some(Intent::Confirm));
        assert_eq!(Intent::from_key("q"), None);
    }

    #[test]
    fn test_hold_and_release() {
        let mut held = HeldKeys::default();
        let mut input = TickInput::default();

        key_down("ArrowRight", &mut held, &mut input);
        key_down("w", &mut held, &mut input);
        held.apply(&mut input);
        assert!(input.right && input.up);
        assert!(!input.left && !input.down);

        key_up("d", &mut held);
        held.apply(&mut input);
        assert!(!input.right);
        assert!(input.up);
    }

    #[test]
    fn test_one_shot_keys() {
        let mut held = HeldKeys::default();
        let mut input = TickInput::default();

        key_down("Escape", &mut held, &mut input);
        key_down("Enter", &mut held, &mut input);
        assert!(input.pause && input.confirm);
        assert_eq!(held, HeldKeys::default());

        input.clear_one_shots();
        assert!(!input.pause && !input.confirm);
    }
}
