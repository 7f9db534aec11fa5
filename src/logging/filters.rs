use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// `RUST_LOG`, если задана; иначе директива из конфигурации; при
/// некорректной директиве: `info`.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    let directive = config.build_filter_directive();

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match parse_directive(&directive) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "Invalid log filter directive from config ('{directive}'): {e}; falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

/// Собирает `EnvFilter` из директивы.
///
/// Одиночное слово без `=`, `,` и `[` обязано быть уровнем: `EnvFilter`
/// принял бы `inof` как имя target и молча отфильтровал бы всё остальное.
pub fn parse_directive(directive: &str) -> Result<EnvFilter, String> {
    if is_bare_word(directive) {
        let level = LevelFilter::from_str(directive)
            .map_err(|_| format!("unknown log level '{directive}'"))?;
        return EnvFilter::try_new(level.to_string()).map_err(|e| e.to_string());
    }
    EnvFilter::try_new(directive).map_err(|e| e.to_string())
}

fn is_bare_word(directive: &str) -> bool {
    !directive.contains(['=', ',', '['])
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        sync::{Arc, Mutex},
    };

    use serial_test::serial;
    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;

    // Мини-буферный writer для тестов
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(filter: EnvFilter) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = fmt::layer()
            .with_writer(VecMakeWriter(buffer.clone()))
            .with_ansi(false)
            .with_filter(filter);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("info message");
            tracing::warn!("warn message");
        });

        let out = buffer.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Тест проверят, что директива из конфига применяется, когда RUST_LOG
    /// не задана.
    #[test]
    #[serial]
    fn test_config_directive_filters_levels() {
        env::remove_var("RUST_LOG");
        let cfg = LoggingConfig {
            level: "warn".into(),
            ..Default::default()
        };
        let out = capture(build_filter_from_config(&cfg));
        assert!(out.contains("warn message"));
        assert!(!out.contains("info message"));
    }

    /// Тест проверят, что RUST_LOG имеет приоритет над конфигом.
    #[test]
    #[serial]
    fn test_rust_log_wins() {
        env::set_var("RUST_LOG", "info");
        let cfg = LoggingConfig {
            level: "error".into(),
            ..Default::default()
        };
        let out = capture(build_filter_from_config(&cfg));
        env::remove_var("RUST_LOG");
        assert!(out.contains("info message"));
    }

    /// Тест проверят, что директива с некорректным уровнем заменяется на
    /// `info`.
    #[test]
    #[serial]
    fn test_invalid_directive_falls_back_to_info() {
        env::remove_var("RUST_LOG");
        let cfg = LoggingConfig {
            level: "filecast=notalevel".into(),
            ..Default::default()
        };
        let out = capture(build_filter_from_config(&cfg));
        assert!(out.contains("info message"));
    }

    /// Тест проверят, что опечатка в уровне не превращается в target-фильтр,
    /// который глушит все события.
    #[test]
    #[serial]
    fn test_mistyped_level_falls_back_to_info() {
        env::remove_var("RUST_LOG");
        let cfg = LoggingConfig {
            level: "inof".into(),
            ..Default::default()
        };
        let out = capture(build_filter_from_config(&cfg));
        assert!(out.contains("info message"));
        assert!(out.contains("warn message"));
    }

    #[test]
    fn test_parse_directive() {
        assert!(parse_directive("debug").is_ok());
        assert!(parse_directive("WARN").is_ok());
        assert!(parse_directive("filecast=debug,notify=warn").is_ok());
        assert!(parse_directive("inof").is_err());
        assert!(parse_directive("filecast=notalevel").is_err());
    }
}
