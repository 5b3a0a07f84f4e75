use crate::events::Intention;
use tracing::info;

pub type ChangeHandler = Box<dyn FnMut(Intention) + Send>;

/// Единственная точка, где наружу сообщается о смене намерения.
///
/// Повторный коммит того же значения обработчик не вызывает.
pub struct Notifier {
    committed: Intention,
    handler: ChangeHandler,
}

impl Notifier {
    pub fn new(handler: ChangeHandler) -> Self {
        Self {
            committed: Intention::Idle,
            handler,
        }
    }

    pub fn committed(&self) -> Intention {
        self.committed
    }

    /// Возвращает предыдущее значение, если намерение действительно сменилось
    pub fn commit(&mut self, next: Intention) -> Option<Intention> {
        if next == self.committed {
            return None;
        }

        let previous = std::mem::replace(&mut self.committed, next);
        info!("Намерение: {} -> {}", previous, next);
        (self.handler)(next);
        Some(previous)
    }
}
