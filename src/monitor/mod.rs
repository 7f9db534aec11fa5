//! Наблюдение за файлами: превращает изменения файлов под корнем в
//! сообщения брокера и записи журнала аудита.
//!
//! Топик сообщения: путь файла относительно корня (`docs/a.txt`), тело:
//! `Timestamp: <ts>\nDiff:\n<diff>`.

pub mod audit;
pub mod diff;
pub mod watcher;

use std::path::{Component, Path, PathBuf};

use dashmap::DashMap;
use tracing::{debug, info};

pub use audit::AuditLog;
pub use diff::file_diff;
pub use watcher::{spawn_watcher, WatcherHandle};

use crate::{
    error::{MonitorError, MonitorResult},
    pubsub::Producer,
};

/// Формат метки времени в сообщениях и журнале аудита.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Обработчик изменений файлов.
///
/// Помнит последнюю увиденную версию каждого файла (по топику), чтобы
/// публиковать diff, а не содержимое целиком.
#[derive(Debug)]
pub struct FileChangeMonitor {
    producer: Producer,
    root: PathBuf,
    versions: DashMap<String, Vec<String>>,
    audit: AuditLog,
}

impl FileChangeMonitor {
    pub fn new(
        producer: Producer,
        root: impl Into<PathBuf>,
        audit_log_path: impl Into<PathBuf>,
    ) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            producer,
            root,
            versions: DashMap::new(),
            audit: AuditLog::new(audit_log_path),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Текущее локальное время в формате `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp() -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Топик для файла: путь относительно корня, компоненты через `/`.
    pub fn topic_for_path(
        &self,
        path: &Path,
    ) -> MonitorResult<String> {
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| MonitorError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(
                    part.to_str()
                        .ok_or_else(|| MonitorError::NonUtf8Path(path.to_path_buf()))?,
                ),
                Component::CurDir => {}
                _ => {
                    return Err(MonitorError::OutsideRoot {
                        path: path.to_path_buf(),
                        root: self.root.clone(),
                    })
                }
            }
        }
        Ok(parts.join("/"))
    }

    /// Читает файл, публикует diff относительно прошлой версии и запоминает
    /// новую версию. Если публикация не удалась, запомненная версия не
    /// меняется.
    pub fn publish_file_change(
        &self,
        path: &Path,
        timestamp: &str,
    ) -> MonitorResult<()> {
        let topic = self.topic_for_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| MonitorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let current: Vec<String> = content.lines().map(str::to_string).collect();

        let previous = self.versions.insert(topic.clone(), current.clone());
        let diff = file_diff(previous.as_deref(), &current);

        debug!(topic = %topic, first_seen = previous.is_none(), "Publishing file change");
        let published = self
            .producer
            .publish(&topic, &format!("Timestamp: {timestamp}\nDiff:\n{diff}"));
        if published.is_err() {
            // Следующий diff должен строиться от версии, которую видели
            // подписчики.
            match previous {
                Some(previous) => {
                    self.versions.insert(topic, previous);
                }
                None => {
                    self.versions.remove(&topic);
                }
            }
        }
        published.map_err(Into::into)
    }

    /// Обработка события изменения: каталоги пропускаются, для файла
    /// публикуется изменение и пишется строка аудита.
    pub fn on_modified(
        &self,
        path: &Path,
    ) -> MonitorResult<()> {
        if path.is_dir() {
            return Ok(());
        }
        let timestamp = Self::timestamp();
        self.publish_file_change(path, &timestamp)?;
        self.audit.append(&timestamp, path)?;
        info!(path = %path.display(), "File change recorded");
        Ok(())
    }

    /// Забывает запомненную версию файла.
    pub fn forget(
        &self,
        topic: &str,
    ) -> bool {
        self.versions.remove(topic).is_some()
    }

    /// Количество файлов с запомненной версией.
    pub fn tracked_files(&self) -> usize {
        self.versions.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use filecast_error::BrokerError;

    use super::*;
    use crate::pubsub::{Broker, Consumer};

    struct Fixture {
        _tmp: tempfile::TempDir,
        root: PathBuf,
        consumer: Arc<Consumer>,
        monitor: FileChangeMonitor,
    }

    fn fixture(pattern: &str) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("docs")).unwrap();

        let broker = Arc::new(Broker::new());
        let consumer = Arc::new(Consumer::new("AuditConsumer"));
        consumer.subscribe(&broker, pattern).unwrap();

        let monitor = FileChangeMonitor::new(
            Producer::new(broker),
            &root,
            root.join("audit.log"),
        );
        Fixture {
            _tmp: tmp,
            root,
            consumer,
            monitor,
        }
    }

    #[test]
    fn test_topic_for_path() {
        let fx = fixture("~");
        let file = fx.root.join("docs/a.txt");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(fx.monitor.topic_for_path(&file).unwrap(), "docs/a.txt");
    }

    #[test]
    fn test_topic_outside_root_rejected() {
        let fx = fixture("~");
        assert!(matches!(
            fx.monitor.topic_for_path(Path::new("/definitely/elsewhere.txt")),
            Err(MonitorError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = FileChangeMonitor::timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }

    /// Тест проверяет, что первое изменение публикует содержимое, а второе:
    /// diff.
    #[test]
    fn test_publish_first_then_diff() {
        let fx = fixture("docs~");
        let file = fx.root.join("docs/a.txt");

        std::fs::write(&file, "one\ntwo\n").unwrap();
        fx.monitor.publish_file_change(&file, "T1").unwrap();
        std::fs::write(&file, "one\nthree\n").unwrap();
        fx.monitor.publish_file_change(&file, "T2").unwrap();

        let messages = fx.consumer.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            ("docs/a.txt", "Timestamp: T1\nDiff:\n+ one\ntwo")
        );
        assert_eq!(
            messages[1],
            (
                "docs/a.txt",
                "Timestamp: T2\nDiff:\n--- previous\n+++ current\n@@ -1,2 +1,2 @@\n one\n-two\n+three"
            )
        );
        assert_eq!(fx.monitor.tracked_files(), 1);
    }

    #[test]
    fn test_on_modified_skips_directories() {
        let fx = fixture("~");
        fx.monitor.on_modified(&fx.root.join("docs")).unwrap();
        assert!(fx.consumer.is_empty());
        assert!(!fx.monitor.audit_log().path().exists());
    }

    #[test]
    fn test_on_modified_publishes_and_audits() {
        let fx = fixture("~");
        let file = fx.root.join("docs/a.txt");
        std::fs::write(&file, "hello").unwrap();

        fx.monitor.on_modified(&file).unwrap();

        assert_eq!(fx.consumer.len(), 1);
        let audit = std::fs::read_to_string(fx.monitor.audit_log().path()).unwrap();
        assert!(audit.trim_end().ends_with(&format!(", {}", file.display())));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let fx = fixture("~");
        let err = fx
            .monitor
            .publish_file_change(&fx.root.join("docs/gone.txt"), "T")
            .unwrap_err();
        assert!(matches!(err, MonitorError::Read { .. }));
        assert!(fx.consumer.is_empty());
    }

    /// Тест проверяет, что отклонённая публикация не оставляет запомненной
    /// версии.
    #[test]
    fn test_rejected_publish_keeps_previous_version() {
        let fx = fixture("~");
        let blank = fx.root.join(" ");
        std::fs::write(&blank, "content").unwrap();

        let err = fx.monitor.publish_file_change(&blank, "T1").unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Broker(BrokerError::InvalidTopic { .. })
        ));
        assert_eq!(fx.monitor.tracked_files(), 0);
        assert!(fx.consumer.is_empty());
    }
}
