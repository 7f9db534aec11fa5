use std::{path::PathBuf, str::FromStr};

use crate::{config::Settings, logging::filters};

/// Формат строк лога.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Конфигурация логирования.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Уровень или директива `EnvFilter` (`"info"`, `"filecast=debug"`).
    pub level: String,
    /// Каталог файлового лога; `None` отключает файловый sink.
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
    pub console_format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_name: "filecast.log".to_string(),
            console_format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            level: settings.log_level.clone(),
            log_dir: settings.log_dir.clone(),
            ..Default::default()
        }
    }

    /// `FILECAST_LOG_FORMAT` и `NO_COLOR` поверх значений конфига.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(format) = std::env::var("FILECAST_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.console_format = format,
                Err(e) => eprintln!("Ignoring FILECAST_LOG_FORMAT: {e}"),
            }
        }
        if std::env::var_os("NO_COLOR").is_some() {
            self.with_ansi = false;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("log level must not be empty".to_string());
        }
        filters::parse_directive(&self.build_filter_directive())?;
        if self.log_dir.is_some() && self.file_name.trim().is_empty() {
            return Err("log file name must not be empty".to_string());
        }
        Ok(())
    }

    /// Создаёт каталог лога, если файловый sink включён.
    pub fn ensure_log_dir(&self) -> std::io::Result<()> {
        match &self.log_dir {
            Some(dir) => std::fs::create_dir_all(dir),
            None => Ok(()),
        }
    }

    /// Директива для `EnvFilter`. Голый уровень применяется ко всем целям.
    pub fn build_filter_directive(&self) -> String {
        self.level.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_validate() {
        let mut cfg = LoggingConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.level = " ".into();
        assert!(cfg.validate().is_err());

        cfg.level = "inof".into();
        assert!(cfg.validate().is_err());

        cfg.level = "filecast=debug".into();
        assert!(cfg.validate().is_ok());

        cfg.level = "debug".into();
        cfg.log_dir = Some(PathBuf::from("logs"));
        cfg.file_name.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_ensure_log_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/logs");
        let cfg = LoggingConfig {
            log_dir: Some(dir.clone()),
            ..Default::default()
        };
        cfg.ensure_log_dir().unwrap();
        assert!(dir.is_dir());
    }
}
