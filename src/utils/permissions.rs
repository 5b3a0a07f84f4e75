use crate::error::Result;
use crate::grab_error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tracing::{info, warn};

/// Проверить права доступа к необходимым ресурсам
pub fn check_permissions(grab_keyboard: bool) -> Result<()> {
    info!("Проверка прав доступа...");

    // Проверка доступа к /dev/input/
    check_input_devices_access()?;

    // uinput нужен только для проброса захваченной клавиатуры
    if grab_keyboard {
        check_uinput_access()?;
    }

    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_input_devices_access() -> Result<()> {
    let input_dir = "/dev/input";

    if !std::path::Path::new(input_dir).exists() {
        return Err(grab_error!(permission, "Директория {} не существует", input_dir));
    }

    match fs::read_dir(input_dir) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", input_dir);
            Ok(())
        }
        Err(e) => Err(grab_error!(
            permission,
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            input_dir,
            e
        )),
    }
}

fn check_uinput_access() -> Result<()> {
    let uinput_device = "/dev/uinput";

    let metadata = fs::metadata(uinput_device).map_err(|e| {
        grab_error!(
            permission,
            "{} недоступен ({}). Загрузите модуль: sudo modprobe uinput",
            uinput_device,
            e
        )
    })?;

    // Проверяем права доступа (обычно 660 или 666)
    let mode = metadata.permissions().mode();
    if mode & 0o006 == 0 && mode & 0o060 == 0 {
        return Err(grab_error!(
            permission,
            "Нет прав доступа к {}. Добавьте пользователя в группу 'uinput' или 'input'",
            uinput_device
        ));
    }

    info!("Доступ к {} подтвержден", uinput_device);
    Ok(())
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Рекомендуется добавить пользователя в группу 'input'");
            warn!("   и запускать приложение от имени обычного пользователя:");
            warn!("   sudo usermod -a -G input $USER");
        }
        Ok(user) => {
            info!("Приложение запущено от имени пользователя: {}", user);
        }
        Err(_) => {
            warn!("Не удалось определить пользователя");
        }
    }
}
