use std::fmt;

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 1xxx: Общие ошибки и конфигурация
/// - 2xxx: Ошибки данных (топики, подписки, пути)
/// - 3xxx: Разрешения
/// - 4xxx: Переполнение очередей доставки
/// - 6xxx: IO / файловое наблюдение
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Общие ошибки ===
    Internal = 1003,
    InvalidConfig = 1006,

    // === 2xxx: Ошибки данных ===
    NotFound = 2000,
    InvalidTopic = 2010,
    NotSubscribed = 2011,
    InvalidUtf8 = 2012,
    OutsideRoot = 2013,

    // === 3xxx: Разрешения ===
    PermissionDenied = 3001,

    // === 4xxx: Очереди доставки ===
    InboxFull = 4000,
    InboxClosed = 4001,

    // === 6xxx: IO / наблюдение ===
    Io = 6000,
    Timeout = 6002,
    UnexpectedEof = 6007,
    WatchFailed = 6010,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Возвращает `true`, если операцию с этим кодом имеет смысл повторить
    /// (файл мог быть занят, очередь могла освободиться).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::InboxFull | Self::Io)
    }

    /// Ошибка, после которой наблюдение за файлами не продолжается.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Internal | Self::WatchFailed)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    ///
    /// Исчезнувший файл: обычное дело для редакторов с временными файлами,
    /// поэтому `NotFound` пишется на уровне `debug`.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::NotFound => LogLevel::Debug,
            Self::InvalidConfig
            | Self::InvalidTopic
            | Self::NotSubscribed
            | Self::OutsideRoot => LogLevel::Info,
            Self::Internal | Self::WatchFailed => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
