use crate::error::Result;
use crate::grab_error;
use tracing::{debug, info};

/// Виртуальная клавиатура uinput, через которую события захваченной
/// клавиатуры возвращаются в систему без изменений
pub struct VirtualDevice {
    device: Option<uinput::Device>,
    device_name: String,
    dry_run: bool,
    sent: u64,
}

impl VirtualDevice {
    pub fn new(device_name: &str, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Self::create_virtual_device(device_name)?)
        };

        Ok(Self {
            device,
            device_name: device_name.to_string(),
            dry_run,
            sent: 0,
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для проброса клавиш", device_name);

        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .create()
            .map_err(|e| grab_error!(passthrough, "не удалось создать виртуальное устройство '{}': {}", device_name, e))?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    /// Записать сырое событие (type, code, value) как есть
    pub fn send_raw(&mut self, kind: u16, code: u16, value: i32) -> Result<()> {
        if self.dry_run {
            self.sent += 1;
            debug!("[DRY RUN] Виртуальное событие #{}: type={} code={} value={}", self.sent, kind, code, value);
            return Ok(());
        }

        let Some(device) = &mut self.device else {
            return Err(grab_error!(passthrough, "виртуальное устройство '{}' недоступно", self.device_name));
        };

        device
            .write(i32::from(kind), i32::from(code), value)
            .map_err(|e| grab_error!(
                passthrough,
                "type={} code={} в '{}': {}",
                kind,
                code,
                self.device_name,
                e
            ))?;
        self.sent += 1;
        Ok(())
    }

    /// Сколько событий записано (или сымитировано в dry-run)
    #[allow(dead_code)]
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}' (записано событий: {})", self.device_name, self.sent);
        }
    }
}
