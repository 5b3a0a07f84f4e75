use crate::events::ModifierFlags;
use evdev::KeyCode;

/// Физические клавиши-модификаторы. Левая и правая учитываются отдельно,
/// чтобы отпускание одной не сбрасывало модификатор, пока зажата другая
const MODIFIER_KEYS: [(KeyCode, ModifierFlags); 9] = [
    (KeyCode::KEY_LEFTMETA, ModifierFlags::COMMAND),
    (KeyCode::KEY_RIGHTMETA, ModifierFlags::COMMAND),
    (KeyCode::KEY_LEFTALT, ModifierFlags::OPTION),
    (KeyCode::KEY_RIGHTALT, ModifierFlags::OPTION),
    (KeyCode::KEY_LEFTCTRL, ModifierFlags::CONTROL),
    (KeyCode::KEY_RIGHTCTRL, ModifierFlags::CONTROL),
    (KeyCode::KEY_LEFTSHIFT, ModifierFlags::SHIFT),
    (KeyCode::KEY_RIGHTSHIFT, ModifierFlags::SHIFT),
    (KeyCode::KEY_FN, ModifierFlags::FUNCTION),
];

#[derive(Debug, Default)]
pub struct ModifierState {
    pressed: u16,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_modifier(key: KeyCode) -> bool {
        Self::slot(key).is_some()
    }

    /// Обновить состояние клавиши. Возвращает true, если изменились флаги
    pub fn update_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let Some(slot) = Self::slot(key) else {
            return false;
        };

        let before = self.flags();
        if pressed {
            self.pressed |= 1 << slot;
        } else {
            self.pressed &= !(1 << slot);
        }
        before != self.flags()
    }

    pub fn flags(&self) -> ModifierFlags {
        MODIFIER_KEYS
            .iter()
            .enumerate()
            .filter(|(slot, _)| self.pressed & (1 << slot) != 0)
            .fold(ModifierFlags::EMPTY, |flags, (_, (_, flag))| flags | *flag)
    }

    fn slot(key: KeyCode) -> Option<usize> {
        MODIFIER_KEYS.iter().position(|(code, _)| *code == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_keys_set_flags() {
        let mut state = ModifierState::new();

        assert!(state.update_key(KeyCode::KEY_LEFTMETA, true));
        assert!(state.update_key(KeyCode::KEY_RIGHTALT, true));
        assert_eq!(state.flags(), ModifierFlags::COMMAND | ModifierFlags::OPTION);

        assert!(!state.update_key(KeyCode::KEY_A, true));
        assert!(!ModifierState::is_modifier(KeyCode::KEY_A));
    }

    #[test]
    fn test_left_and_right_tracked_separately() {
        let mut state = ModifierState::new();

        state.update_key(KeyCode::KEY_LEFTSHIFT, true);
        assert!(!state.update_key(KeyCode::KEY_RIGHTSHIFT, true));
        assert!(!state.update_key(KeyCode::KEY_LEFTSHIFT, false));
        assert_eq!(state.flags(), ModifierFlags::SHIFT);

        assert!(state.update_key(KeyCode::KEY_RIGHTSHIFT, false));
        assert!(state.flags().is_empty());
    }

    #[test]
    fn test_repeated_press_reports_no_change() {
        let mut state = ModifierState::new();
        assert!(state.update_key(KeyCode::KEY_LEFTCTRL, true));
        assert!(!state.update_key(KeyCode::KEY_LEFTCTRL, true));
    }
}
