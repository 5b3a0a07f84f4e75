use crate::config::SharedSettings;
use crate::error::Result;
use crate::events::{Feed, FeedHandle, FeedScope, InputEvent, KeyCode, ModifierFlags, SourceEvent};
use crate::{debug_if_enabled, trace_if_enabled};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::info;

use super::r#trait::EventSource;
use super::SubscriptionTable;

/// Источник внутри процесса: события подаются через [`EventInjector`].
/// Используется в dry-run режиме и в тестах
pub struct ChannelEventSource {
    subscriptions: SubscriptionTable,
    rx: mpsc::UnboundedReceiver<(FeedScope, InputEvent)>,
    forwarded: usize,
}

/// Отправитель событий в [`ChannelEventSource`]
#[derive(Clone)]
pub struct EventInjector {
    tx: mpsc::UnboundedSender<(FeedScope, InputEvent)>,
}

impl ChannelEventSource {
    pub fn new() -> (Self, EventInjector) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            subscriptions: SubscriptionTable::new(),
            rx,
            forwarded: 0,
        };
        (source, EventInjector { tx })
    }

    #[allow(dead_code)]
    pub fn subscriptions(&self) -> &SubscriptionTable {
        &self.subscriptions
    }

    /// Сколько событий локальных лент вернулось в доставку
    #[allow(dead_code)]
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }
}

#[async_trait::async_trait]
impl EventSource for ChannelEventSource {
    fn subscribe(&mut self, feed: Feed) -> FeedHandle {
        let handle = self.subscriptions.subscribe(feed);
        debug_if_enabled!("Подписка {:?} на {}", handle, feed);
        handle
    }

    fn unsubscribe(&mut self, handle: FeedHandle) {
        if self.subscriptions.unsubscribe(handle) {
            debug_if_enabled!("Подписка {:?} снята", handle);
        }
    }

    async fn next_event(&mut self) -> Option<SourceEvent> {
        while let Some((scope, event)) = self.rx.recv().await {
            let feed = Feed::new(event.kind(), scope);
            if let Some(handle) = self.subscriptions.route(feed) {
                return Some(SourceEvent { handle, feed, event });
            }
            trace_if_enabled!("Нет подписки на {}, событие {} пропущено", feed, event);
        }
        None
    }

    fn forward(&mut self, event: &InputEvent) -> Result<()> {
        self.forwarded += 1;
        trace_if_enabled!("[DRY RUN] Проброс события {}", event);
        Ok(())
    }
}

impl EventInjector {
    /// false, если источник уже уничтожен
    pub fn send(&self, scope: FeedScope, event: InputEvent) -> bool {
        self.tx.send((scope, event)).is_ok()
    }

    pub fn modifiers(&self, scope: FeedScope, flags: ModifierFlags) -> bool {
        self.send(scope, InputEvent::modifiers_changed(flags))
    }

    pub fn motion(&self, scope: FeedScope, flags: ModifierFlags) -> bool {
        self.send(scope, InputEvent::pointer_moved(flags, 1, 0))
    }

    #[allow(dead_code)]
    pub fn key(&self, scope: FeedScope, key_code: u16) -> bool {
        self.send(scope, InputEvent::key_pressed(KeyCode(key_code), false))
    }
}

/// Эмуляция пользователя для dry-run: по кругу зажимает комбинацию
/// перемещения, водит указателем, отпускает, затем то же для изменения размера
pub fn spawn_demo_script(injector: EventInjector, settings: SharedSettings) {
    tokio::spawn(async move {
        info!("Dry-run режим - источник событий работает в режиме эмуляции");

        loop {
            let snapshot = *settings.read();
            for (label, chord) in [
                ("перемещение", snapshot.move_modifiers),
                ("изменение размера", snapshot.resize_modifiers),
            ] {
                if chord.is_empty() {
                    continue;
                }

                info!("Dry-run: зажимаем {} ({})", chord, label);
                if !injector.modifiers(FeedScope::Global, chord.to_flags()) {
                    return;
                }

                let hold = snapshot.activation_delay + Duration::from_millis(500);
                let steps = 10u32;
                for _ in 0..steps {
                    sleep(hold / steps).await;
                    injector.motion(FeedScope::Global, chord.to_flags());
                }

                info!("Dry-run: отпускаем модификаторы");
                injector.modifiers(FeedScope::Global, ModifierFlags::EMPTY);
                sleep(Duration::from_secs(2)).await;
            }
            sleep(Duration::from_secs(3)).await;
        }
    });
}
