use serde::{Deserialize, Serialize};
use std::fmt;

/// Распознанное намерение пользователя
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intention {
    #[default]
    Idle,
    Move,
    Resize,
}

impl Intention {
    pub fn is_idle(self) -> bool {
        self == Intention::Idle
    }
}

impl fmt::Display for Intention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intention::Idle => write!(f, "idle"),
            Intention::Move => write!(f, "move"),
            Intention::Resize => write!(f, "resize"),
        }
    }
}
