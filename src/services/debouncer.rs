//! Отложенная активация намерения.
//!
//! Вход в жест (Move/Resize) откладывается на `activation_delay`, выход в
//! Idle всегда синхронный. Нажатие обычной клавиши во время ожидания
//! перезапускает таймер для той же цели.
//!
//! Таймер здесь - только дедлайн с номером поколения. Реальное ожидание
//! делает цикл движка через `tokio::time::sleep_until`, а затем вызывает
//! [`ActivationDebouncer::on_timer_fired`] с поколением, которого ждал, и
//! политикой из текущего снимка настроек. Устаревшее поколение ничего не
//! коммитит.

use crate::events::Intention;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Что делать со ссылкой на таймер после его срабатывания
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPolicy {
    /// Ссылка остаётся: нажатие клавиши после активации перевзводит таймер
    /// на ту же цель и приводит к повторному (невидимому) коммиту
    #[default]
    Retain,
    /// Ссылка сбрасывается при срабатывании
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationTimer {
    pub generation: u64,
    pub deadline: Instant,
    /// false - таймер уже сработал, но ссылка на него сохранена
    armed: bool,
}

#[derive(Debug, Default)]
pub struct ActivationDebouncer {
    pending: Intention,
    timer: Option<ActivationTimer>,
    generation: u64,
}

impl ActivationDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Intention {
        self.pending
    }

    #[allow(dead_code)]
    /// Есть ли ссылка на таймер (взведённый или уже сработавший)
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Ближайший взведённый дедлайн
    pub fn deadline(&self) -> Option<ActivationTimer> {
        self.timer.filter(|timer| timer.armed)
    }

    /// Обработать только что вычисленное намерение.
    ///
    /// Возвращает `Some`, если намерение нужно закоммитить немедленно.
    pub fn on_resolved(&mut self, resolved: Intention, delay: Duration, now: Instant) -> Option<Intention> {
        if resolved.is_idle() {
            self.cancel();
            self.pending = Intention::Idle;
            return Some(Intention::Idle);
        }

        if resolved == self.pending {
            return None;
        }

        self.schedule(resolved, delay, now)
    }

    /// Нажатие обычной клавиши продлевает окно ожидания
    pub fn on_key_press(&mut self, delay: Duration, now: Instant) -> Option<Intention> {
        if self.pending.is_idle() || self.timer.is_none() {
            return None;
        }
        self.schedule(self.pending, delay, now)
    }

    /// Срабатывание таймера поколения `generation`
    pub fn on_timer_fired(&mut self, generation: u64, policy: TimerPolicy) -> Option<Intention> {
        let timer = self.timer.as_mut()?;
        if !timer.armed || timer.generation != generation {
            return None;
        }

        match policy {
            TimerPolicy::Retain => timer.armed = false,
            TimerPolicy::Clear => self.timer = None,
        }
        Some(self.pending)
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    fn schedule(&mut self, target: Intention, delay: Duration, now: Instant) -> Option<Intention> {
        self.cancel();
        self.pending = target;

        if delay.is_zero() {
            return Some(target);
        }

        self.generation += 1;
        self.timer = Some(ActivationTimer {
            generation: self.generation,
            deadline: now + delay,
            armed: true,
        });
        None
    }
}
