use crate::config::{Config, SharedSettings};
use crate::error::Result;
use crate::events::{Feed, FeedHandle, InputEvent, SourceEvent};

use super::{spawn_demo_script, ChannelEventSource, EventInjector};

/// Источник сырых событий ввода.
///
/// Подписки на ленты независимы. События по лентам без подписки
/// источник потребителю не отдаёт.
#[async_trait::async_trait]
pub trait EventSource {
    /// Подписаться на ленту
    fn subscribe(&mut self, feed: Feed) -> FeedHandle;

    /// Отписаться. Отписка от неизвестной подписки ничего не делает
    fn unsubscribe(&mut self, handle: FeedHandle);

    /// Следующее событие по активной подписке. Должно быть cancel-safe:
    /// цикл движка вызывает его внутри `tokio::select!`
    async fn next_event(&mut self) -> Option<SourceEvent>;

    /// Вернуть событие локальной ленты в обычную доставку без изменений
    fn forward(&mut self, event: &InputEvent) -> Result<()>;
}

#[async_trait::async_trait]
impl<T: EventSource + Send + ?Sized> EventSource for Box<T> {
    fn subscribe(&mut self, feed: Feed) -> FeedHandle {
        (**self).subscribe(feed)
    }

    fn unsubscribe(&mut self, handle: FeedHandle) {
        (**self).unsubscribe(handle)
    }

    async fn next_event(&mut self) -> Option<SourceEvent> {
        (**self).next_event().await
    }

    fn forward(&mut self, event: &InputEvent) -> Result<()> {
        (**self).forward(event)
    }
}

/// Factory function to create an appropriate event source based on the dry_run flag
pub fn create_event_source(
    config: &Config,
    settings: SharedSettings,
    dry_run: bool,
) -> Result<Box<dyn EventSource + Send>> {
    if dry_run {
        let (source, injector): (ChannelEventSource, EventInjector) = ChannelEventSource::new();
        spawn_demo_script(injector, settings);
        Ok(Box::new(source))
    } else {
        Ok(Box::new(super::evdev_source::EvdevEventSource::new(&config.input)?))
    }
}
