use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use filecast_error::{ensure, FilecastResult, StatusCode};
use serde::{Deserialize, Serialize};

/// Файл конфигурации, который ищется в рабочем каталоге, если путь не задан.
pub const DEFAULT_CONFIG_FILE: &str = "filecast";

/// Переменная окружения с корнем файлового сервера. Имеет приоритет над
/// `FILECAST_ROOT_PATH`.
pub const ROOT_PATH_ENV: &str = "FILE_SERVER_ROOT_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Корень файлового сервера; топики считаются относительно него.
    pub root_path: PathBuf,
    /// Наблюдаемый подкаталог внутри `root_path`.
    pub watch_dir: String,
    pub audit_log_path: PathBuf,
    pub consumer_name: String,
    /// Ёмкость очереди аудит-потребителя.
    pub inbox_capacity: usize,
    pub log_level: String,
    /// Каталог для файлового лога. `None`: только консоль.
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Загружает настройки, используя `filecast.toml` из рабочего каталога,
    /// если он есть.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Загружает настройки; `path`: явный файл конфигурации, который
    /// обязан существовать.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let cfg = Config::builder()
            // Значения по умолчанию
            .set_default("root_path", "")?
            .set_default("watch_dir", "important_stuff")?
            .set_default("audit_log_path", "file_change_audit.log")?
            .set_default("consumer_name", "AuditConsumer")?
            .set_default("inbox_capacity", 1024)?
            .set_default("log_level", "info")?
            .add_source(file)
            // Переменные окружения с префиксом FILECAST_
            .add_source(Environment::with_prefix("FILECAST").try_parsing(true))
            .set_override_option("root_path", std::env::var(ROOT_PATH_ENV).ok())?
            .build()?;

        cfg.try_deserialize()
    }

    pub fn validate(&self) -> FilecastResult<()> {
        ensure!(
            !self.root_path.as_os_str().is_empty(),
            StatusCode::InvalidConfig,
            "root_path is not set (use {} or FILECAST_ROOT_PATH)",
            ROOT_PATH_ENV
        );
        ensure!(
            !self.watch_dir.trim().is_empty(),
            StatusCode::InvalidConfig,
            "watch_dir must not be empty"
        );
        ensure!(
            self.inbox_capacity > 0,
            StatusCode::InvalidConfig,
            "inbox_capacity must be greater than zero"
        );
        Ok(())
    }

    /// Полный путь к наблюдаемому каталогу.
    pub fn watch_path(&self) -> PathBuf {
        self.root_path.join(&self.watch_dir)
    }

    /// Шаблон подписки аудит-потребителя: всё внутри `watch_dir`.
    pub fn subscription_pattern(&self) -> String {
        format!("{}~", self.watch_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;

    const VARS: [&str; 4] = [
        ROOT_PATH_ENV,
        "FILECAST_ROOT_PATH",
        "FILECAST_WATCH_DIR",
        "FILECAST_INBOX_CAPACITY",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    /// Тест проверяет значения по умолчанию.
    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::load().unwrap();
        assert_eq!(settings.watch_dir, "important_stuff");
        assert_eq!(settings.audit_log_path, PathBuf::from("file_change_audit.log"));
        assert_eq!(settings.consumer_name, "AuditConsumer");
        assert_eq!(settings.inbox_capacity, 1024);
        assert_eq!(settings.log_level, "info");
        assert!(settings.log_dir.is_none());

        let err = settings.validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        assert!(err.to_string().contains("root_path is not set"));
    }

    #[test]
    #[serial]
    fn test_env_prefix() {
        clear_env();
        std::env::set_var("FILECAST_ROOT_PATH", "/srv/files");
        std::env::set_var("FILECAST_INBOX_CAPACITY", "16");
        let settings = Settings::load().unwrap();
        clear_env();

        assert_eq!(settings.root_path, PathBuf::from("/srv/files"));
        assert_eq!(settings.inbox_capacity, 16);
        assert!(settings.validate().is_ok());
    }

    /// Тест проверяет, что FILE_SERVER_ROOT_PATH перекрывает FILECAST_ROOT_PATH.
    #[test]
    #[serial]
    fn test_file_server_root_override() {
        clear_env();
        std::env::set_var("FILECAST_ROOT_PATH", "/a");
        std::env::set_var(ROOT_PATH_ENV, "/b");
        let settings = Settings::load().unwrap();
        clear_env();

        assert_eq!(settings.root_path, PathBuf::from("/b"));
    }

    #[test]
    #[serial]
    fn test_explicit_file() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "root_path = \"/data\"\nwatch_dir = \"docs\"").unwrap();

        let settings = Settings::load_from(Some(file.path())).unwrap();
        assert_eq!(settings.watch_path(), PathBuf::from("/data/docs"));
        assert_eq!(settings.subscription_pattern(), "docs~");
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_error() {
        clear_env();
        assert!(Settings::load_from(Some(Path::new("/nonexistent/filecast.toml"))).is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let settings = Settings {
            root_path: PathBuf::from("/srv"),
            watch_dir: "w".into(),
            audit_log_path: PathBuf::from("a.log"),
            consumer_name: "c".into(),
            inbox_capacity: 0,
            log_level: "info".into(),
            log_dir: None,
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        assert_eq!(err.to_string(), "inbox_capacity must be greater than zero");
    }
}
