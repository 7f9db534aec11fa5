use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use filecast::{
    init_logging, log_failure, setup_file_monitoring, setup_message_broker, spawn_inbox_drain,
    LoggingConfig, Settings,
};
use tracing::info;

/// Наблюдатель за изменениями файлов с публикацией diff'ов через брокер.
#[derive(Parser, Debug)]
#[command(name = "filecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publishes file change diffs to topic subscribers", long_about = None)]
struct Args {
    /// Файл конфигурации (по умолчанию `filecast.toml`, если есть)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Корень файлового сервера
    #[arg(short, long)]
    root: Option<PathBuf>,
    /// Наблюдаемый подкаталог внутри корня
    #[arg(short, long)]
    watch_dir: Option<String>,
    /// Уровень логирования или директива EnvFilter
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(
        self,
        settings: &mut Settings,
    ) {
        if let Some(root) = self.root {
            settings.root_path = root;
        }
        if let Some(watch_dir) = self.watch_dir {
            settings.watch_dir = watch_dir;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings =
        Settings::load_from(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    let logging = init_logging(LoggingConfig::from_settings(&settings))
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_COMMIT"),
        build_time = env!("BUILD_TIME"),
        root = %settings.root_path.display(),
        watch_dir = %settings.watch_dir,
        "Starting filecast"
    );

    let setup = setup_message_broker(
        &settings.subscription_pattern(),
        &settings.consumer_name,
        settings.inbox_capacity,
    )?;
    let drain = spawn_inbox_drain(setup.inbox);

    let (monitor, watcher) = setup_file_monitoring(setup.broker.clone(), &settings)
        .inspect_err(|e| log_failure(e, "start file watcher"))
        .with_context(|| format!("failed to watch {}", settings.watch_path().display()))?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutting down");

    watcher.stop().await;
    setup
        .consumer
        .unsubscribe(&setup.broker, &settings.subscription_pattern())?;
    drop(setup.consumer);
    drop(monitor);

    let handled = drain.await.context("inbox drain task failed")?;
    info!(
        handled,
        stats = ?setup.broker.stats(),
        "Shutdown complete"
    );

    logging.shutdown();
    Ok(())
}
