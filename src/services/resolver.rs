use crate::config::GestureSettings;
use crate::events::{Intention, ModifierSet};

/// Определить намерение по удерживаемым модификаторам.
///
/// Сравнение только на точное равенство множеств: лишний модификатор
/// ломает совпадение. Пустой настроенный набор не совпадает никогда.
/// При пересечении наборов перемещение проверяется первым.
pub fn resolve(modifiers: &ModifierSet, settings: &GestureSettings) -> Intention {
    if modifiers.is_empty() {
        return Intention::Idle;
    }

    if !settings.move_modifiers.is_empty() && *modifiers == settings.move_modifiers {
        Intention::Move
    } else if !settings.resize_modifiers.is_empty() && *modifiers == settings.resize_modifiers {
        Intention::Resize
    } else {
        Intention::Idle
    }
}
