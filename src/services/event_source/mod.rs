//! Источники сырых событий ввода.
//!
//! Модуль только доставляет события по подпискам и возвращает события
//! локальных лент в систему. Решения о намерении принимает движок.

mod channel_source;
mod evdev_source;
mod modifier_state;
mod subscriptions;
mod r#trait;

pub use self::channel_source::{spawn_demo_script, ChannelEventSource, EventInjector};
pub use self::r#trait::{create_event_source, EventSource};
pub use self::subscriptions::SubscriptionTable;
