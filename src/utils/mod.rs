pub mod device_finder;
pub mod permissions;

pub use device_finder::DeviceFinder;

/// Имя устройства для логов: "Имя (phys)" или просто имя
pub fn device_label(device: &evdev::Device) -> String {
    format_label(device.name(), device.physical_path())
}

fn format_label(name: Option<&str>, phys: Option<&str>) -> String {
    let name = name.unwrap_or("Unknown");
    match phys {
        Some(phys) if !phys.is_empty() => format!("{} ({})", name, phys),
        _ => name.to_string(),
    }
}

// ✅ Макросы условного логирования для горячего пути (каждое событие ввода)
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! trace_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!($($arg)*);
        }
    };
}
