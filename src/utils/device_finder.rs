use crate::error::{GrabError, Result};
use evdev::{Device, KeyCode, RelativeAxisCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceKind {
    Keyboard,
    Pointer,
}

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти подходящее клавиатурное устройство
    pub fn find_keyboard_device(device_path: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            return Self::explicit_path(device_path);
        }

        info!("Начинаем автопоиск клавиатурного устройства...");
        match Self::auto_find(DeviceKind::Keyboard) {
            Some(path) => Ok(path),
            None => GrabError::device_not_found(
                "Не удалось найти подходящее клавиатурное устройство. \
                 Убедитесь, что пользователь добавлен в группу 'input'",
            ),
        }
    }

    /// Найти устройство указателя. "none" отключает отслеживание движения
    pub fn find_pointer_device(device_path: &str) -> Result<Option<PathBuf>> {
        match device_path {
            "none" => Ok(None),
            "auto" => {
                info!("Начинаем автопоиск устройства указателя...");
                let found = Self::auto_find(DeviceKind::Pointer);
                if found.is_none() {
                    warn!("Устройство указателя не найдено");
                }
                Ok(found)
            }
            path => Self::explicit_path(path).map(Some),
        }
    }

    fn explicit_path(device_path: &str) -> Result<PathBuf> {
        let path = PathBuf::from(device_path);
        if path.exists() {
            info!("Используется указанное устройство: {:?}", path);
            Ok(path)
        } else {
            Err(crate::grab_error!(device_not_found, "Указанное устройство не найдено: {:?}", path))
        }
    }

    fn auto_find(kind: DeviceKind) -> Option<PathBuf> {
        let mut candidates: Vec<(PathBuf, u32)> = Self::event_devices()
            .into_iter()
            .filter(|path| Self::is_device_accessible(path))
            .filter_map(|path| {
                let device = Device::open(&path)
                    .map_err(|e| debug!("Не удалось открыть устройство {:?}: {}", path, e))
                    .ok()?;
                let priority = Self::priority(&device, kind)?;
                debug!("Кандидат {:?}: {} (приоритет {})", kind, super::device_label(&device), priority);
                Some((path, priority))
            })
            .collect();

        // Сортируем по приоритету, при равенстве - по номеру устройства
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let (path, _) = candidates.into_iter().next()?;
        info!("Найдено устройство ({:?}): {:?}", kind, path);
        Some(path)
    }

    fn event_devices() -> Vec<PathBuf> {
        let entries = match fs::read_dir("/dev/input") {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Нет доступа к /dev/input: {}", e);
                return Vec::new();
            }
        };

        let mut devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with("event"))
            })
            .collect();
        devices.sort();
        devices
    }

    /// None - устройство не подходит
    fn priority(device: &Device, kind: DeviceKind) -> Option<u32> {
        let name = device.name().unwrap_or("Unknown").to_lowercase();

        match kind {
            DeviceKind::Keyboard => {
                if name.contains("mouse") || name.contains("touchpad") || name.contains("trackpoint") {
                    return None;
                }
                let keys = device.supported_keys()?;
                let basic_keys = keys.contains(KeyCode::KEY_A)
                    && keys.contains(KeyCode::KEY_SPACE)
                    && keys.contains(KeyCode::KEY_LEFTSHIFT);
                if !basic_keys {
                    return None;
                }
                Some(if name.contains("keyboard") { 50 } else { 10 })
            }
            DeviceKind::Pointer => {
                let axes = device.supported_relative_axes()?;
                if !(axes.contains(RelativeAxisCode::REL_X) && axes.contains(RelativeAxisCode::REL_Y)) {
                    return None;
                }
                Some(if name.contains("mouse") { 50 } else { 10 })
            }
        }
    }

    fn is_device_accessible(device_path: &Path) -> bool {
        match fs::File::open(device_path) {
            Ok(_) => true,
            Err(e) => {
                debug!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}
