use super::modifiers::{ModifierFlags, ModifierSet};
use std::fmt;
use tokio::time::Instant;

/// Код клавиши (evdev коды)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KEY_{}", self.0)
    }
}

/// Сырое событие ввода от источника
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Изменился набор удерживаемых модификаторов
    ModifiersChanged {
        flags: ModifierFlags,
        timestamp: Instant,
    },
    /// Движение указателя. Смещение ядру не нужно, важны только флаги
    PointerMoved {
        flags: ModifierFlags,
        dx: i32,
        dy: i32,
        timestamp: Instant,
    },
    /// Нажатие обычной клавиши (в том числе автоповтор)
    KeyPressed {
        key_code: KeyCode,
        repeat: bool,
        timestamp: Instant,
    },
}

impl InputEvent {
    pub fn modifiers_changed(flags: ModifierFlags) -> Self {
        Self::ModifiersChanged {
            flags,
            timestamp: Instant::now(),
        }
    }

    pub fn pointer_moved(flags: ModifierFlags, dx: i32, dy: i32) -> Self {
        Self::PointerMoved {
            flags,
            dx,
            dy,
            timestamp: Instant::now(),
        }
    }

    pub fn key_pressed(key_code: KeyCode, repeat: bool) -> Self {
        Self::KeyPressed {
            key_code,
            repeat,
            timestamp: Instant::now(),
        }
    }

    /// То же событие с другой меткой времени (например, из ядра)
    pub fn at(mut self, at: Instant) -> Self {
        match &mut self {
            InputEvent::ModifiersChanged { timestamp, .. }
            | InputEvent::PointerMoved { timestamp, .. }
            | InputEvent::KeyPressed { timestamp, .. } => *timestamp = at,
        }
        self
    }

    /// Лента, по которой событие доставляется
    pub fn kind(&self) -> FeedKind {
        match self {
            InputEvent::ModifiersChanged { .. } => FeedKind::ModifierChange,
            InputEvent::PointerMoved { .. } => FeedKind::PointerMotion,
            InputEvent::KeyPressed { .. } => FeedKind::KeyPress,
        }
    }

    /// Флаги модификаторов, если событие их несёт
    pub fn flags(&self) -> Option<ModifierFlags> {
        match self {
            InputEvent::ModifiersChanged { flags, .. } | InputEvent::PointerMoved { flags, .. } => {
                Some(*flags)
            }
            InputEvent::KeyPressed { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Instant {
        match self {
            InputEvent::ModifiersChanged { timestamp, .. }
            | InputEvent::PointerMoved { timestamp, .. }
            | InputEvent::KeyPressed { timestamp, .. } => *timestamp,
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::ModifiersChanged { flags, .. } => {
                write!(f, "modifiers[{}]", ModifierSet::from_flags(*flags))
            }
            InputEvent::PointerMoved { flags, dx, dy, .. } => {
                write!(f, "motion({dx},{dy})[{}]", ModifierSet::from_flags(*flags))
            }
            InputEvent::KeyPressed { key_code, repeat, .. } => {
                write!(f, "key {}{}", key_code, if *repeat { " (repeat)" } else { "" })
            }
        }
    }
}

/// Тип ленты событий
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    ModifierChange,
    PointerMotion,
    KeyPress,
}

/// Глобальная лента только наблюдает; локальная обязана вернуть событие дальше
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedScope {
    Global,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feed {
    pub kind: FeedKind,
    pub scope: FeedScope,
}

impl Feed {
    pub fn new(kind: FeedKind, scope: FeedScope) -> Self {
        Self { kind, scope }
    }

    /// Пара global + local для одного типа ленты
    pub fn pair(kind: FeedKind) -> [Feed; 2] {
        [Feed::new(kind, FeedScope::Global), Feed::new(kind, FeedScope::Local)]
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.kind, self.scope)
    }
}

/// Непрозрачный идентификатор подписки на ленту
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedHandle(pub u64);

/// Событие, доставленное источником по конкретной подписке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEvent {
    pub handle: FeedHandle,
    pub feed: Feed,
    pub event: InputEvent,
}
