use std::{path::PathBuf, sync::Arc};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn};

use super::FileChangeMonitor;
use crate::error::{log_failure, MonitorResult};

/// Handle наблюдателя. Пока он жив, события файловой системы доходят до
/// монитора; drop останавливает наблюдение.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl WatcherHandle {
    /// Останавливает наблюдение и дожидается обработки уже полученных
    /// событий.
    pub async fn stop(self) {
        let Self {
            _inner: watcher,
            task,
        } = self;
        drop(watcher);
        if let Err(e) = task.await {
            warn!(error = %e, "Watcher task terminated abnormally");
        }
    }
}

/// События, которые считаются изменением файла.
fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// Запускает рекурсивное наблюдение за `dir`.
///
/// Колбэк `notify` синхронно пересылает события в unbounded-канал, tokio
/// задача вызывает [`FileChangeMonitor::on_modified`] для каждого пути в
/// blocking-пуле. Должна вызываться внутри tokio runtime.
pub fn spawn_watcher(
    monitor: Arc<FileChangeMonitor>,
    dir: impl Into<PathBuf>,
) -> MonitorResult<WatcherHandle> {
    let dir = dir.into();
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("filecast: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("filecast: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&dir, RecursiveMode::Recursive)?;
    info!(dir = %dir.display(), "File watcher started");

    let task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_change(&event.kind) {
                continue;
            }
            debug!(kind = ?event.kind, paths = ?event.paths, "Received notify event");

            for path in event.paths {
                let handler = {
                    let monitor = Arc::clone(&monitor);
                    let path = path.clone();
                    move || monitor.on_modified(&path)
                };
                match tokio::task::spawn_blocking(handler).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        let _span = info_span!("file_change", path = %path.display()).entered();
                        log_failure(&e, "handle file change");
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "File change handler panicked")
                    }
                }
            }
        }
        debug!("Watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        task,
    })
}
