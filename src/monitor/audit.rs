use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use filecast_error::{FilecastResult, ResultExt};
use parking_lot::Mutex;

/// Журнал аудита: одна строка `"<timestamp>, <path>"` на изменение.
///
/// Файл открывается на дозапись при каждой записи; мьютекс не даёт строкам
/// из разных потоков перемешаться.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Дописывает запись, создавая файл при необходимости.
    pub fn append(
        &self,
        timestamp: &str,
        file_path: &Path,
    ) -> FilecastResult<()> {
        let entry = format!("{timestamp}, {}\n", file_path.display());
        let _guard = self.lock.lock();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open audit log {}", self.path.display()))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("write audit log {}", self.path.display()))?;
        Ok(())
    }
}
