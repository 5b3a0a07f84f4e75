use thiserror::Error;

/// Ошибки источников ввода и окружения. Само ядро намерений ошибок не имеет,
/// конфигурация остаётся на anyhow
#[derive(Error, Debug)]
pub enum GrabError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Захват клавиатуры не удался: {0}")]
    Grab(String),

    #[error("Проброс события не удался: {0}")]
    Passthrough(String),
}

impl GrabError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(GrabError::DeviceNotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, GrabError>;

#[macro_export]
macro_rules! grab_error {
    (device_not_found, $($arg:tt)*) => {
        $crate::error::GrabError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::GrabError::Permission(format!($($arg)*))
    };
    (grab, $($arg:tt)*) => {
        $crate::error::GrabError::Grab(format!($($arg)*))
    };
    (passthrough, $($arg:tt)*) => {
        $crate::error::GrabError::Passthrough(format!($($arg)*))
    };
}
