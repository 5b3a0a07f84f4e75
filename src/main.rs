use anyhow::Result;
use clap::Parser;
use parking_lot::RwLock;
use std::io::Write;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, SharedSettings};
use events::Intention;
use services::{create_event_source, ChangeHandler, IntentionEngine};

#[derive(Parser, Debug)]
#[command(name = "grabmod")]
#[command(about = "Определяет намерение переместить или изменить размер окна по удерживаемым модификаторам")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "grabmod.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция ввода вместо evdev)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск grabmod v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);
    config.warn_unreachable_gestures();

    if args.dry_run {
        warn!("Режим сухого запуска - события ввода эмулируются");
    } else {
        // Проверка прав доступа
        utils::permissions::check_permissions(config.input.grab_keyboard)?;
    }

    let settings: SharedSettings = Arc::new(RwLock::new(config.gesture_settings()));
    log_settings(&settings);

    let source = create_event_source(&config, settings.clone(), args.dry_run)?;
    let mut engine = IntentionEngine::new(source, settings.clone(), stdout_handler());

    let reload_handle = spawn_reload_on_sighup(args.config.clone(), settings.clone());

    info!("Все компоненты инициализированы");

    engine
        .run(async {
            // Ожидание сигнала завершения
            match signal::ctrl_c().await {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
        })
        .await;

    if let Some(handle) = reload_handle {
        handle.abort();
    }

    info!("grabmod завершил работу");
    Ok(())
}

/// Потребитель намерений: одно слово на строку в stdout
fn stdout_handler() -> ChangeHandler {
    Box::new(|intention: Intention| {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", intention).and_then(|_| stdout.flush()) {
            warn!("Не удалось записать намерение в stdout: {}", e);
        }
    })
}

/// Перечитать конфигурацию по SIGHUP. Новые настройки действуют со следующего события
fn spawn_reload_on_sighup(path: String, settings: SharedSettings) -> Option<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("SIGHUP недоступен, перезагрузка конфигурации отключена: {}", e);
            return None;
        }
    };

    Some(tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!("Получен SIGHUP, перечитываем {}", path);
            match Config::load(&path) {
                Ok(config) => {
                    config.warn_unreachable_gestures();
                    *settings.write() = config.gesture_settings();
                    log_settings(&settings);
                }
                Err(e) => error!("Конфигурация не перезагружена, остаются прежние настройки: {:#}", e),
            }
        }
    }))
}

fn log_settings(settings: &SharedSettings) {
    let snapshot = *settings.read();
    info!(
        "Перемещение: {}, изменение размера: {}, задержка активации: {:?}, таймер после срабатывания: {:?}",
        snapshot.move_modifiers, snapshot.resize_modifiers, snapshot.activation_delay, snapshot.timer_on_fire
    );
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    // stdout занят намерениями, логи уходят в stderr
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    if format == "pretty" {
        registry.with(layer.pretty()).init();
    } else {
        registry.with(layer.compact()).init();
    }

    Ok(())
}
