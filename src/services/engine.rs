//! Движок намерений: владеет подписками на ленты событий и проводит каждое
//! событие через цепочку классификатор → резолвер → дебаунсер → нотификатор.
//!
//! Всё состояние принадлежит одному экземпляру и меняется только из его
//! цикла [`IntentionEngine::run`], поэтому обработчики никогда не
//! пересекаются. Ожидание таймера - это ещё одна ветка того же `select!`.
//!
//! Лента движения указателя подписана тогда и только тогда, когда
//! закоммиченное намерение не Idle.
//!
//! Если событие и дедлайн таймера готовы одновременно, порядок решают
//! метки времени: таймер срабатывает раньше события, только если его
//! дедлайн наступил не позже момента события.

use crate::config::SharedSettings;
use crate::events::{
    Feed, FeedHandle, FeedKind, FeedScope, InputEvent, Intention, ModifierFlags, ModifierSet, SourceEvent,
};
use crate::services::debouncer::{ActivationDebouncer, ActivationTimer};
use crate::services::event_source::EventSource;
use crate::services::{ChangeHandler, Notifier};
use crate::services::resolver::resolve;
use crate::{debug_if_enabled, trace_if_enabled};
use smallvec::SmallVec;
use std::future::Future;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

type Handles = SmallVec<[FeedHandle; 2]>;

/// Активные подписки движка, по парам global + local
#[derive(Debug, Default)]
struct FeedSet {
    modifier: Handles,
    pointer: Handles,
    key: Handles,
}

impl FeedSet {
    fn contains(&self, handle: FeedHandle) -> bool {
        self.modifier.contains(&handle) || self.pointer.contains(&handle) || self.key.contains(&handle)
    }

    fn drain(&mut self) -> SmallVec<[FeedHandle; 6]> {
        let mut all = SmallVec::new();
        all.extend(self.pointer.drain(..));
        all.extend(self.modifier.drain(..));
        all.extend(self.key.drain(..));
        all
    }
}

pub struct IntentionEngine<S: EventSource + Send> {
    source: S,
    settings: SharedSettings,
    debouncer: ActivationDebouncer,
    notifier: Notifier,
    feeds: FeedSet,
    alive: bool,
}

impl<S: EventSource + Send> IntentionEngine<S> {
    pub fn new(source: S, settings: SharedSettings, handler: ChangeHandler) -> Self {
        Self {
            source,
            settings,
            debouncer: ActivationDebouncer::new(),
            notifier: Notifier::new(handler),
            feeds: FeedSet::default(),
            alive: false,
        }
    }

    /// Начать наблюдение. Повторный вызов полностью пересоздаёт состояние
    pub fn start(&mut self) {
        self.stop();

        self.debouncer = ActivationDebouncer::new();
        self.feeds.modifier = self.subscribe_pair(FeedKind::ModifierChange);
        self.feeds.key = self.subscribe_pair(FeedKind::KeyPress);
        self.alive = true;

        info!("Движок намерений запущен");
    }

    /// Остановить наблюдение: снять все подписки и таймер.
    ///
    /// Активный жест завершается коммитом Idle до того, как метод вернётся,
    /// так что потребитель никогда не остаётся с "move" или "resize".
    pub fn stop(&mut self) {
        self.debouncer.cancel();
        if self.alive {
            self.commit(Intention::Idle);
        }

        for handle in self.feeds.drain() {
            self.source.unsubscribe(handle);
        }

        if self.alive {
            info!("Движок намерений остановлен");
        }
        self.alive = false;
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.alive
    }

    #[allow(dead_code)]
    pub fn committed(&self) -> Intention {
        self.notifier.committed()
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> Intention {
        self.debouncer.pending()
    }

    #[allow(dead_code)]
    pub fn pointer_feeds_installed(&self) -> bool {
        !self.feeds.pointer.is_empty()
    }

    /// Взведённый таймер активации, если движок жив
    pub fn deadline(&self) -> Option<ActivationTimer> {
        self.debouncer.deadline().filter(|_| self.alive)
    }

    #[allow(dead_code)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Обработать событие от источника.
    ///
    /// Для локальных лент возвращает событие, которое нужно пробросить
    /// дальше без изменений.
    pub fn dispatch(&mut self, delivered: SourceEvent) -> Option<InputEvent> {
        let passthrough = (delivered.feed.scope == FeedScope::Local).then_some(delivered.event);

        if !self.alive || !self.feeds.contains(delivered.handle) {
            trace_if_enabled!("Событие по снятой подписке {:?} проигнорировано", delivered.handle);
            return passthrough;
        }

        trace_if_enabled!(
            "Событие {} по {} (задержка доставки {:?})",
            delivered.event,
            delivered.feed,
            delivered.event.timestamp().elapsed()
        );

        match delivered.event.flags() {
            Some(flags) => self.on_modifiers(flags),
            None => self.on_key_press(),
        }

        passthrough
    }

    /// Срабатывание таймера активации поколения `generation`
    pub fn fire_timer(&mut self, generation: u64) {
        if !self.alive {
            return;
        }
        let policy = self.settings.read().timer_on_fire;
        if let Some(next) = self.debouncer.on_timer_fired(generation, policy) {
            debug_if_enabled!("Таймер активации #{} сработал: {}", generation, next);
            self.commit(next);
        }
    }

    /// Главный цикл. Завершается по `shutdown` или при закрытии источника,
    /// в обоих случаях движок останавливается до возврата
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.start();
        tokio::pin!(shutdown);

        loop {
            let timer = self.deadline();
            let wake_at = timer.map_or_else(Instant::now, |timer| timer.deadline);

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Получен сигнал остановки движка");
                    break;
                }
                delivered = self.source.next_event() => match delivered {
                    Some(delivered) => {
                        if let Some(timer) = timer.filter(|timer| timer.deadline <= delivered.event.timestamp()) {
                            self.fire_timer(timer.generation);
                        }
                        if let Some(event) = self.dispatch(delivered) {
                            if let Err(e) = self.source.forward(&event) {
                                warn!("Не удалось пробросить событие {}: {}", event, e);
                            }
                        }
                    }
                    None => {
                        warn!("Источник событий закрыт");
                        break;
                    }
                },
                _ = sleep_until(wake_at), if timer.is_some() => {
                    if let Some(timer) = timer {
                        self.fire_timer(timer.generation);
                    }
                }
            }
        }

        self.stop();
    }

    fn on_modifiers(&mut self, flags: ModifierFlags) {
        // Настройки перечитываются на каждом событии
        let settings = *self.settings.read();
        let modifiers = ModifierSet::from_flags(flags);
        let resolved = resolve(&modifiers, &settings);

        trace_if_enabled!("Модификаторы {} -> {}", modifiers, resolved);

        match self.debouncer.on_resolved(resolved, settings.activation_delay, Instant::now()) {
            Some(next) => self.commit(next),
            None => {
                if let Some(timer) = self.debouncer.deadline() {
                    debug_if_enabled!(
                        "Ожидание активации {} через {:?} (#{})",
                        self.debouncer.pending(),
                        settings.activation_delay,
                        timer.generation
                    );
                }
            }
        }
    }

    fn on_key_press(&mut self) {
        let delay = self.settings.read().activation_delay;
        let had_timer = self.debouncer.deadline();

        if let Some(next) = self.debouncer.on_key_press(delay, Instant::now()) {
            self.commit(next);
        } else if had_timer.is_some() {
            debug_if_enabled!("Нажатие клавиши продлило ожидание {} на {:?}", self.debouncer.pending(), delay);
        }
    }

    fn commit(&mut self, next: Intention) {
        if self.notifier.commit(next).is_none() {
            return;
        }

        if next.is_idle() {
            self.remove_pointer_feeds();
        } else {
            self.install_pointer_feeds();
        }
    }

    fn install_pointer_feeds(&mut self) {
        if !self.feeds.pointer.is_empty() {
            return;
        }
        self.feeds.pointer = self.subscribe_pair(FeedKind::PointerMotion);
        debug_if_enabled!("Ленты движения указателя подключены");
    }

    fn remove_pointer_feeds(&mut self) {
        if self.feeds.pointer.is_empty() {
            return;
        }
        for handle in std::mem::take(&mut self.feeds.pointer) {
            self.source.unsubscribe(handle);
        }
        debug_if_enabled!("Ленты движения указателя отключены");
    }

    fn subscribe_pair(&mut self, kind: FeedKind) -> Handles {
        Feed::pair(kind)
            .into_iter()
            .map(|feed| self.source.subscribe(feed))
            .collect()
    }
}

impl<S: EventSource + Send> Drop for IntentionEngine<S> {
    fn drop(&mut self) {
        if self.alive {
            debug_if_enabled!("Движок уничтожен без явной остановки");
        }
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GestureSettings;
    use crate::events::Modifier;
    use crate::services::debouncer::TimerPolicy;
    use crate::services::event_source::ChannelEventSource;
    use parking_lot::{Mutex, RwLock};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;

    type Seen = Arc<Mutex<Vec<(Intention, Instant)>>>;

    const MOVE: ModifierFlags = ModifierFlags(ModifierFlags::COMMAND.0 | ModifierFlags::OPTION.0);

    fn settings(delay_ms: u64) -> SharedSettings {
        Arc::new(RwLock::new(GestureSettings {
            move_modifiers: ModifierSet::empty().with(Modifier::Command).with(Modifier::Option),
            resize_modifiers: ModifierSet::empty()
                .with(Modifier::Command)
                .with(Modifier::Option)
                .with(Modifier::Shift),
            activation_delay: Duration::from_millis(delay_ms),
            timer_on_fire: TimerPolicy::Retain,
        }))
    }

    fn engine(settings: SharedSettings) -> (IntentionEngine<ChannelEventSource>, Seen) {
        let (source, _injector) = ChannelEventSource::new();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: ChangeHandler = Box::new(move |intention| sink.lock().push((intention, Instant::now())));
        let mut engine = IntentionEngine::new(source, settings, handler);
        engine.start();
        (engine, seen)
    }

    fn intentions(seen: &Seen) -> Vec<Intention> {
        seen.lock().iter().map(|(intention, _)| *intention).collect()
    }

    /// Доставить событие так, как это сделал бы источник. None - на ленту никто не подписан
    fn deliver(
        engine: &mut IntentionEngine<ChannelEventSource>,
        scope: FeedScope,
        event: InputEvent,
    ) -> Option<Option<InputEvent>> {
        let feed = Feed::new(event.kind(), scope);
        let handle = engine.source().subscriptions().route(feed)?;
        Some(engine.dispatch(SourceEvent { handle, feed, event }))
    }

    fn fire(engine: &mut IntentionEngine<ChannelEventSource>) {
        let timer = engine.deadline().expect("таймер должен быть взведён");
        engine.fire_timer(timer.generation);
    }

    #[test]
    fn test_start_installs_modifier_and_key_feeds() {
        let (engine, _) = engine(settings(0));
        let subs = engine.source().subscriptions();

        for feed in Feed::pair(FeedKind::ModifierChange).into_iter().chain(Feed::pair(FeedKind::KeyPress)) {
            assert!(subs.is_subscribed(feed), "нет подписки на {}", feed);
        }
        assert!(!engine.pointer_feeds_installed());
        assert_eq!(subs.len(), 4);
    }

    #[test]
    fn test_zero_delay_commits_synchronously() {
        let (mut engine, seen) = engine(settings(0));

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        assert_eq!(engine.committed(), Intention::Move);
        assert!(engine.deadline().is_none());
        assert!(engine.pointer_feeds_installed());
        assert_eq!(intentions(&seen), vec![Intention::Move]);
    }

    #[test]
    fn test_exact_match_prefers_resize_chord() {
        let shared = settings(0);
        {
            let mut s = shared.write();
            s.move_modifiers = ModifierSet::empty().with(Modifier::Command);
            s.resize_modifiers = ModifierSet::empty().with(Modifier::Command).with(Modifier::Shift);
        }
        let (mut engine, seen) = engine(shared);

        let chord = ModifierFlags::COMMAND | ModifierFlags::SHIFT;
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(chord));
        assert_eq!(intentions(&seen), vec![Intention::Resize]);
    }

    #[test]
    fn test_motion_during_gesture_is_silent_until_release() {
        let (mut engine, seen) = engine(settings(0));
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));

        for _ in 0..5 {
            deliver(&mut engine, FeedScope::Global, InputEvent::pointer_moved(MOVE, 2, 2)).unwrap();
        }
        assert_eq!(intentions(&seen), vec![Intention::Move]);

        // Модификатор-отпускание потерялось, заметили по движению указателя
        deliver(&mut engine, FeedScope::Global, InputEvent::pointer_moved(ModifierFlags::COMMAND, 2, 2)).unwrap();
        assert_eq!(engine.committed(), Intention::Idle);
        assert!(!engine.pointer_feeds_installed());
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);

        let motion = InputEvent::pointer_moved(MOVE, 1, 1);
        assert!(deliver(&mut engine, FeedScope::Global, motion).is_none());
    }

    #[test]
    fn test_release_is_immediate_despite_delay() {
        let (mut engine, seen) = engine(settings(300));

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        fire(&mut engine);
        assert_eq!(engine.committed(), Intention::Move);

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(ModifierFlags::EMPTY));
        assert_eq!(engine.committed(), Intention::Idle);
        assert!(engine.deadline().is_none());
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);
    }

    #[test]
    fn test_release_before_commit_cancels_pending() {
        let (mut engine, seen) = engine(settings(300));

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        let stale = engine.deadline().unwrap().generation;
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(ModifierFlags::EMPTY));

        engine.fire_timer(stale);
        assert_eq!(engine.committed(), Intention::Idle);
        assert!(intentions(&seen).is_empty());
    }

    #[test]
    fn test_local_events_pass_through_unchanged() {
        let (mut engine, _) = engine(settings(0));

        let event = InputEvent::modifiers_changed(MOVE);
        assert_eq!(deliver(&mut engine, FeedScope::Local, event), Some(Some(event)));

        let key = InputEvent::key_pressed(crate::events::KeyCode(30), false);
        assert_eq!(deliver(&mut engine, FeedScope::Local, key), Some(Some(key)));
        assert_eq!(deliver(&mut engine, FeedScope::Global, key), Some(None));
    }

    #[test]
    fn test_retained_timer_recommit_is_not_notified() {
        let (mut engine, seen) = engine(settings(300));

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        fire(&mut engine);

        // Ссылка на сработавший таймер осталась: клавиша перевзводит его
        deliver(&mut engine, FeedScope::Global, InputEvent::key_pressed(crate::events::KeyCode(30), false));
        fire(&mut engine);

        assert_eq!(engine.committed(), Intention::Move);
        assert_eq!(intentions(&seen), vec![Intention::Move]);
    }

    #[test]
    fn test_clear_policy_ignores_key_after_activation() {
        let shared = settings(300);
        shared.write().timer_on_fire = TimerPolicy::Clear;
        let (mut engine, _) = engine(shared);

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        fire(&mut engine);
        deliver(&mut engine, FeedScope::Global, InputEvent::key_pressed(crate::events::KeyCode(30), false));
        assert!(engine.deadline().is_none());
    }

    #[test]
    fn test_reloaded_timer_policy_applies_to_next_fire() {
        let shared = settings(300);
        let (mut engine, seen) = engine(Arc::clone(&shared));

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        shared.write().timer_on_fire = TimerPolicy::Clear;
        fire(&mut engine);
        assert_eq!(engine.committed(), Intention::Move);

        deliver(&mut engine, FeedScope::Global, InputEvent::key_pressed(crate::events::KeyCode(30), false));
        assert!(engine.deadline().is_none());
        assert_eq!(intentions(&seen), vec![Intention::Move]);
    }

    #[test]
    fn test_settings_change_applies_to_next_event() {
        let shared = settings(0);
        let (mut engine, seen) = engine(Arc::clone(&shared));

        shared.write().move_modifiers = ModifierSet::empty().with(Modifier::Control);
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        assert!(intentions(&seen).is_empty());

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(ModifierFlags::CONTROL));
        assert_eq!(intentions(&seen), vec![Intention::Move]);
    }

    #[test]
    fn test_stop_tears_everything_down() {
        let (mut engine, seen) = engine(settings(300));

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        let pending = engine.deadline().unwrap().generation;

        engine.stop();
        assert!(!engine.is_running());
        assert!(engine.source().subscriptions().is_empty());
        assert!(engine.deadline().is_none());

        engine.fire_timer(pending);
        assert!(intentions(&seen).is_empty());

        // Повторная остановка безопасна
        engine.stop();
    }

    #[test]
    fn test_stop_mid_gesture_reports_idle_and_removes_feeds() {
        let (mut engine, seen) = engine(settings(0));
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        assert!(engine.pointer_feeds_installed());

        engine.stop();
        assert_eq!(engine.committed(), Intention::Idle);
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);
        assert!(!engine.pointer_feeds_installed());
        assert!(engine.source().subscriptions().is_empty());

        engine.stop();
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);
    }

    #[test]
    fn test_drop_mid_gesture_reports_idle() {
        let (mut engine, seen) = engine(settings(0));
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));

        drop(engine);
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);
    }

    #[test]
    fn test_restart_resets_state_without_duplicate_feeds() {
        let (mut engine, seen) = engine(settings(0));
        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));

        engine.start();
        assert!(engine.is_running());
        assert_eq!(engine.committed(), Intention::Idle);
        assert_eq!(engine.source().subscriptions().len(), 4);

        deliver(&mut engine, FeedScope::Global, InputEvent::modifiers_changed(MOVE));
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle, Intention::Move]);
    }

    #[test]
    fn test_stale_handle_is_ignored_but_passed_through() {
        let (mut engine, seen) = engine(settings(0));
        let feed = Feed::new(FeedKind::ModifierChange, FeedScope::Local);
        let event = InputEvent::modifiers_changed(MOVE);

        let forwarded = engine.dispatch(SourceEvent { handle: FeedHandle(9_999), feed, event });
        assert_eq!(forwarded, Some(event));
        assert!(intentions(&seen).is_empty());
    }

    fn spawn_run(
        settings: SharedSettings,
    ) -> (
        crate::services::event_source::EventInjector,
        Seen,
        oneshot::Sender<()>,
        tokio::task::JoinHandle<IntentionEngine<ChannelEventSource>>,
    ) {
        let (source, injector) = ChannelEventSource::new();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: ChangeHandler = Box::new(move |intention| sink.lock().push((intention, Instant::now())));
        let mut engine = IntentionEngine::new(source, settings, handler);

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            engine
                .run(async move {
                    let _ = stop_rx.await;
                })
                .await;
            engine
        });
        (injector, seen, stop_tx, task)
    }

    async fn ms(n: u64) {
        tokio::time::sleep(Duration::from_millis(n)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_commit_and_instant_release() {
        let (injector, seen, stop, task) = spawn_run(settings(300));
        ms(1).await;
        let start = Instant::now();

        injector.modifiers(FeedScope::Global, MOVE);
        ms(299).await;
        assert!(intentions(&seen).is_empty());

        ms(2).await;
        assert_eq!(intentions(&seen), vec![Intention::Move]);
        let committed_at = seen.lock()[0].1;
        assert_eq!(committed_at - start, Duration::from_millis(300));

        ms(199).await;
        injector.modifiers(FeedScope::Global, ModifierFlags::EMPTY);
        ms(1).await;
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);
        let released_at = seen.lock()[1].1;
        assert_eq!(released_at - start, Duration::from_millis(500));

        stop.send(()).unwrap();
        let engine = task.await.unwrap();
        assert!(!engine.is_running());
        assert!(engine.source().subscriptions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_press_postpones_commit() {
        let (injector, seen, stop, task) = spawn_run(settings(300));
        ms(1).await;
        let start = Instant::now();

        injector.modifiers(FeedScope::Global, MOVE);
        ms(200).await;
        injector.key(FeedScope::Global, 30);

        ms(250).await;
        assert!(intentions(&seen).is_empty(), "коммит должен был сдвинуться");

        ms(100).await;
        assert_eq!(intentions(&seen), vec![Intention::Move]);
        assert_eq!(seen.lock()[0].1 - start, Duration::from_millis(500));

        stop.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_queued_before_deadline_beats_timer() {
        let (injector, seen, stop, task) = spawn_run(settings(300));
        ms(1).await;

        injector.modifiers(FeedScope::Global, MOVE);
        ms(1).await;

        // Отпускание уже в очереди, когда дедлайн проходит
        injector.modifiers(FeedScope::Global, ModifierFlags::EMPTY);
        tokio::time::advance(Duration::from_millis(400)).await;
        ms(1).await;

        assert!(intentions(&seen).is_empty());

        stop.send(()).unwrap();
        let engine = task.await.unwrap();
        assert!(engine.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_after_deadline_sees_committed_timer() {
        let (injector, seen, stop, task) = spawn_run(settings(300));
        ms(1).await;

        injector.modifiers(FeedScope::Global, MOVE);
        ms(1).await;

        tokio::time::advance(Duration::from_millis(400)).await;
        injector.modifiers(FeedScope::Global, ModifierFlags::EMPTY);
        ms(1).await;

        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);

        stop.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_gesture_reports_idle() {
        let (injector, seen, stop, task) = spawn_run(settings(0));
        ms(1).await;

        injector.modifiers(FeedScope::Global, MOVE);
        ms(1).await;
        assert_eq!(intentions(&seen), vec![Intention::Move]);

        stop.send(()).unwrap();
        task.await.unwrap();
        assert_eq!(intentions(&seen), vec![Intention::Move, Intention::Idle]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_with_pending_timer_never_commits() {
        let (injector, seen, stop, task) = spawn_run(settings(300));
        ms(1).await;

        injector.modifiers(FeedScope::Global, MOVE);
        ms(100).await;
        stop.send(()).unwrap();
        let engine = task.await.unwrap();

        ms(1_000).await;
        assert!(intentions(&seen).is_empty());
        assert!(engine.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_feed_events_are_forwarded_by_run_loop() {
        let (injector, _seen, stop, task) = spawn_run(settings(0));
        ms(1).await;

        injector.modifiers(FeedScope::Local, MOVE);
        injector.key(FeedScope::Local, 30);
        injector.key(FeedScope::Global, 31);
        ms(1).await;

        stop.send(()).unwrap();
        let engine = task.await.unwrap();
        assert_eq!(engine.source().forwarded(), 2);
    }
}
