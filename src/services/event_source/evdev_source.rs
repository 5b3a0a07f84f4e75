use crate::config::InputConfig;
use crate::error::Result;
use crate::events::{Feed, FeedHandle, FeedScope, InputEvent, KeyCode, SourceEvent};
use crate::services::VirtualDevice;
use crate::utils::{device_label, DeviceFinder};
use crate::{debug_if_enabled, grab_error, trace_if_enabled};
use evdev::{Device, EventStream, EventType, RelativeAxisCode};
use std::io::Error;
use std::path::Path;
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::modifier_state::ModifierState;
use super::r#trait::EventSource;
use super::SubscriptionTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceRole {
    Keyboard,
    Pointer,
}

struct RawInput {
    role: DeviceRole,
    event: evdev::InputEvent,
}

/// Источник событий на evdev: клавиатура и (опционально) указатель.
///
/// Каждое устройство читается отдельной задачей, сырые события сводятся в
/// один канал, а состояние модификаторов ведётся здесь, в одном потоке.
/// Без захвата клавиатуры всё приходит по глобальным лентам. С захватом
/// клавиатурные события идут по локальным лентам и возвращаются в систему
/// через uinput.
pub struct EvdevEventSource {
    subscriptions: SubscriptionTable,
    raw_rx: mpsc::UnboundedReceiver<RawInput>,
    readers: Vec<JoinHandle<()>>,
    modifier_state: ModifierState,
    keyboard_scope: FeedScope,
    virtual_device: Option<VirtualDevice>,
    /// Сырое событие за последним доставленным локальным событием
    held: Option<evdev::InputEvent>,
}

impl EvdevEventSource {
    pub fn new(config: &InputConfig) -> Result<Self> {
        info!("Инициализация EvdevEventSource");

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::new();

        let keyboard_path = DeviceFinder::find_keyboard_device(&config.keyboard_device)?;
        let mut keyboard = Self::open_device(&keyboard_path)?;

        let (keyboard_scope, virtual_device) = if config.grab_keyboard {
            match keyboard.grab() {
                Ok(_) => Self::log_grabbed_device(&keyboard),
                Err(e) => {
                    Self::log_grab_error(&keyboard_path, &e);
                    return Err(grab_error!(
                        grab,
                        "{:?}: {}. Device busy - скорее всего используется X11/Wayland",
                        keyboard_path,
                        e
                    ));
                }
            }
            let virtual_device = VirtualDevice::new("grabmod passthrough keyboard", false)?;
            (FeedScope::Local, Some(virtual_device))
        } else {
            (FeedScope::Global, None)
        };

        readers.push(Self::spawn_reader(keyboard.into_event_stream()?, DeviceRole::Keyboard, raw_tx.clone()));

        match DeviceFinder::find_pointer_device(&config.pointer_device)? {
            Some(pointer_path) => {
                let pointer = Self::open_device(&pointer_path)?;
                info!("Указатель: {}", device_label(&pointer));
                readers.push(Self::spawn_reader(pointer.into_event_stream()?, DeviceRole::Pointer, raw_tx));
            }
            None => warn!("Устройство указателя не используется - отпускание модификаторов во время перетаскивания не перепроверяется"),
        }

        Ok(Self {
            subscriptions: SubscriptionTable::new(),
            raw_rx,
            readers,
            modifier_state: ModifierState::new(),
            keyboard_scope,
            virtual_device,
            held: None,
        })
    }

    fn open_device(path: &Path) -> Result<Device> {
        Device::open(path).map_err(|e| grab_error!(device_not_found, "Не удалось открыть устройство {:?}: {}", path, e))
    }

    fn spawn_reader(
        mut stream: EventStream,
        role: DeviceRole,
        raw_tx: mpsc::UnboundedSender<RawInput>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match stream.next_event().await {
                    Ok(event) => {
                        if raw_tx.send(RawInput { role, event }).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Ошибка чтения событий {:?}: {}", role, e);
                        break;
                    }
                }
            }
        })
    }

    /// Вернуть сырое событие захваченной клавиатуры в систему
    fn passthrough(&mut self, event: evdev::InputEvent) {
        let Some(device) = self.virtual_device.as_mut() else {
            return;
        };
        // MSC_SCAN и прочее виртуальной клавиатуре не нужны
        let kind = event.event_type();
        if kind != EventType::KEY && kind != EventType::SYNCHRONIZATION {
            return;
        }
        if let Err(e) = device.send_raw(kind.0, event.code(), event.value()) {
            debug_if_enabled!("Не удалось пробросить событие {:?}: {}", event, e);
        }
    }

    fn log_grabbed_device(device: &Device) {
        info!("Устройство: {}", device_label(device));
        info!("Устройство захвачено эксклюзивно");
    }

    fn log_grab_error(device_path: &Path, e: &Error) {
        warn!("Не удалось захватить устройство {}: {}", device_path.display(), e);
        warn!("Попробуйте:");
        warn!("1. Отключить grab_keyboard в конфигурации");
        warn!("2. Добавить пользователя в группу input: sudo usermod -a -G input $USER");
        warn!("3. Перезайти в систему после добавления в группу");
    }
}

/// Перевести сырое событие в событие ленты.
///
/// Модификаторы дают ModifiersChanged только при смене флагов, поэтому
/// автоповтор модификатора и вторая клавиша той же пары ничего не порождают.
/// Движение указателя всегда идёт по глобальной ленте.
fn translate(
    modifier_state: &mut ModifierState,
    keyboard_scope: FeedScope,
    role: DeviceRole,
    event: evdev::InputEvent,
) -> Option<(FeedScope, InputEvent)> {
    let translated = match (role, event.event_type()) {
        (DeviceRole::Keyboard, EventType::KEY) => {
            let key = evdev::KeyCode::new(event.code());
            if ModifierState::is_modifier(key) {
                modifier_state
                    .update_key(key, event.value() != 0)
                    .then(|| (keyboard_scope, InputEvent::modifiers_changed(modifier_state.flags())))
            } else {
                match event.value() {
                    1 | 2 => Some((
                        keyboard_scope,
                        InputEvent::key_pressed(KeyCode(event.code()), event.value() == 2),
                    )),
                    _ => None,
                }
            }
        }
        (DeviceRole::Pointer, EventType::RELATIVE) => {
            let axis = RelativeAxisCode(event.code());
            let flags = modifier_state.flags();
            if axis == RelativeAxisCode::REL_X {
                Some((FeedScope::Global, InputEvent::pointer_moved(flags, event.value(), 0)))
            } else if axis == RelativeAxisCode::REL_Y {
                Some((FeedScope::Global, InputEvent::pointer_moved(flags, 0, event.value())))
            } else {
                None
            }
        }
        _ => None,
    };

    translated.map(|(scope, translated)| (scope, translated.at(kernel_instant(event.timestamp()))))
}

/// Метка ядра (CLOCK_REALTIME) в терминах монотонных часов tokio
fn kernel_instant(at: SystemTime) -> Instant {
    let now = Instant::now();
    SystemTime::now()
        .duration_since(at)
        .ok()
        .and_then(|age| now.checked_sub(age))
        .unwrap_or(now)
}

#[async_trait::async_trait]
impl EventSource for EvdevEventSource {
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
        // Потребитель не вернул прошлое локальное событие - не теряем его
        if let Some(stale) = self.held.take() {
            warn!("Локальное событие не было возвращено потребителем, пробрасываем само");
            self.passthrough(stale);
        }

        while let Some(raw) = self.raw_rx.recv().await {
            let grabbed = raw.role == DeviceRole::Keyboard && self.virtual_device.is_some();

            if let Some((scope, event)) =
                translate(&mut self.modifier_state, self.keyboard_scope, raw.role, raw.event)
            {
                let feed = Feed::new(event.kind(), scope);
                if let Some(handle) = self.subscriptions.route(feed) {
                    if grabbed {
                        self.held = Some(raw.event);
                    }
                    return Some(SourceEvent { handle, feed, event });
                }
                trace_if_enabled!("Нет подписки на {}, событие {} пропущено", feed, event);
            }

            if grabbed {
                self.passthrough(raw.event);
            }
        }
        None
    }

    fn forward(&mut self, event: &InputEvent) -> Result<()> {
        match self.held.take() {
            Some(raw) => {
                trace_if_enabled!("Проброс локального события {}", event);
                self.passthrough(raw);
                Ok(())
            }
            None => Err(grab_error!(passthrough, "нет сырого события для {}", event)),
        }
    }
}

impl Drop for EvdevEventSource {
    fn drop(&mut self) {
        info!("Остановка чтения устройств ввода");
        // Устройства закрываются вместе с задачами, захват снимается ядром
        for reader in &self.readers {
            reader.abort();
        }
    }
}
