use filecast_error::{ErrorExt, LogLevel};
use tracing::{debug, error, info, warn};

/// Пишет событие о неудачной операции `action` на уровне, который задаёт
/// код статуса ошибки.
pub fn log_failure(
    err: &dyn ErrorExt,
    action: &str,
) {
    let code = err.status_code();
    let tags = err.metrics_tags();
    macro_rules! emit {
        ($mac:ident) => {
            $mac!(
                code = code.code(),
                retryable = code.is_retryable(),
                critical = code.is_critical(),
                tags = ?tags,
                error = %err,
                "Failed to {action}"
            )
        };
    }
    match code.log_level() {
        LogLevel::Debug => emit!(debug),
        LogLevel::Info => emit!(info),
        LogLevel::Warn => emit!(warn),
        LogLevel::Error => emit!(error),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        path::PathBuf,
        sync::{Arc, Mutex},
    };

    use filecast_error::BrokerError;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::error::MonitorError;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(err: &dyn ErrorExt) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(out.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || log_failure(err, "handle change"));
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    /// Тест проверяет, что уровень события берётся из кода статуса.
    #[test]
    fn test_level_follows_status_code() {
        let watch = MonitorError::Watch(notify::Error::generic("inotify limit"));
        let line = capture(&watch);
        assert!(line.contains("ERROR"), "{line}");
        assert!(line.contains("critical=true"), "{line}");
        assert!(line.contains("Failed to handle change"), "{line}");

        let topic = MonitorError::Broker(BrokerError::InvalidTopic {
            topic: " ".to_string(),
        });
        let line = capture(&topic);
        assert!(line.contains(" INFO "), "{line}");
        assert!(line.contains("code=2010"), "{line}");
    }

    #[test]
    fn test_fields() {
        let err = MonitorError::Read {
            path: PathBuf::from("/srv/docs/a.txt"),
            source: io::Error::new(io::ErrorKind::Other, "device busy"),
        };
        let line = capture(&err);
        assert!(line.contains(" WARN "), "{line}");
        assert!(line.contains("retryable=true"), "{line}");
        assert!(line.contains("/srv/docs/a.txt"), "{line}");
        assert!(line.contains("device busy"), "{line}");
    }
}
