//! Конфигурация процесса: значения по умолчанию, файл `filecast.toml` и
//! переменные окружения `FILECAST_*`.

pub mod settings;

pub use config::ConfigError;
pub use settings::Settings;
