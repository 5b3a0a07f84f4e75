use crate::events::{Modifier, ModifierSet};
use crate::services::debouncer::TimerPolicy;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub gesture: GestureConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// "auto" или путь к /dev/input/eventN
    pub keyboard_device: String,
    /// "auto", путь или "none" - тогда движение указателя не отслеживается
    pub pointer_device: String,
    /// Захватить клавиатуру эксклюзивно и пробрасывать события через uinput
    #[serde(default)]
    pub grab_keyboard: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GestureConfig {
    pub move_modifiers: Vec<Modifier>,
    pub resize_modifiers: Vec<Modifier>,
    pub activation_delay_ms: u64,
    #[serde(default)]
    pub timer_on_fire: TimerPolicy,
}

/// Снимок настроек, который читает ядро на каждом событии
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSettings {
    pub move_modifiers: ModifierSet,
    pub resize_modifiers: ModifierSet,
    pub activation_delay: Duration,
    pub timer_on_fire: TimerPolicy,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Config::default().gesture.settings()
    }
}

/// Разделяемый снимок настроек. Ядро только читает, перезагрузка заменяет целиком
pub type SharedSettings = Arc<RwLock<GestureSettings>>;

impl GestureConfig {
    pub fn settings(&self) -> GestureSettings {
        GestureSettings {
            move_modifiers: self.move_modifiers.iter().copied().collect(),
            resize_modifiers: self.resize_modifiers.iter().copied().collect(),
            activation_delay: Duration::from_millis(self.activation_delay_ms),
            timer_on_fire: self.timer_on_fire,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            input: InputConfig {
                keyboard_device: "auto".to_string(),
                pointer_device: "auto".to_string(),
                grab_keyboard: false,
            },
            gesture: GestureConfig {
                move_modifiers: vec![Modifier::Command, Modifier::Option],
                resize_modifiers: vec![Modifier::Command, Modifier::Option, Modifier::Shift],
                activation_delay_ms: 0,
                timer_on_fire: TimerPolicy::Retain,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("GRABMOD_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.input.keyboard_device.is_empty() {
            anyhow::bail!("keyboard_device не может быть пустым (используйте \"auto\")");
        }
        if self.input.keyboard_device == "none" {
            anyhow::bail!("Без клавиатуры модификаторы отслеживать невозможно");
        }
        if self.input.pointer_device.is_empty() {
            anyhow::bail!("pointer_device не может быть пустым (используйте \"auto\" или \"none\")");
        }

        Ok(())
    }

    /// Предупредить о комбинациях, которые никогда не сработают.
    /// Пересечения не ошибка: перемещение всегда проверяется первым
    pub fn warn_unreachable_gestures(&self) {
        let settings = self.gesture.settings();
        if settings.move_modifiers.is_empty() && settings.resize_modifiers.is_empty() {
            warn!("Не заданы ни move_modifiers, ни resize_modifiers - намерение никогда не активируется");
        }
        if !settings.move_modifiers.is_empty() && settings.move_modifiers == settings.resize_modifiers {
            warn!(
                "move_modifiers и resize_modifiers совпадают ({}), изменение размера недостижимо",
                settings.move_modifiers
            );
        }
    }

    pub fn gesture_settings(&self) -> GestureSettings {
        self.gesture.settings()
    }
}
