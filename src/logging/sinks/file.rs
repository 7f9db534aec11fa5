use std::path::Path;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{fmt, registry::LookupSpan, Layer};

/// Файловый слой с ежедневной ротацией и неблокирующей записью.
///
/// Guard должен жить до завершения процесса, иначе хвост лога теряется.
pub fn layer<S>(
    log_dir: &Path,
    file_name: &str,
) -> (impl Layer<S>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let file_appender = daily(log_dir, file_name);
    let (non_blocking_writer, guard) = non_blocking(file_appender);

    let layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_writer);

    (layer, guard)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    /// Тест проверят, что записанное событие попадает в файл после drop guard.
    #[test]
    fn test_file_layer_writes_after_guard_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let (layer, guard) = layer::<Registry>(tmp.path(), "test.log");
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("written to file");
        });
        drop(guard);

        let contents: String = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
            .collect();
        assert!(contents.contains("written to file"));
    }
}
