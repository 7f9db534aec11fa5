use crate::{ErrorExt, StatusCode};

/// Ошибки операций брокера (subscribe / unsubscribe / publish).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Топик или шаблон пуст либо состоит только из пробелов.
    InvalidTopic { topic: String },
    /// Потребитель не зарегистрирован под этим шаблоном.
    NotSubscribed { consumer: String, pattern: String },
}

/// Ошибки передачи сообщения в очередь потребителя.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Ограниченная очередь заполнена, сообщение отброшено.
    InboxFull { consumer: String, capacity: usize },
    /// Получатель очереди уже закрыт.
    InboxClosed { consumer: String },
}

impl std::fmt::Display for BrokerError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::InvalidTopic { topic } => write!(f, "Invalid topic: {topic:?}"),
            Self::NotSubscribed { consumer, pattern } => {
                write!(f, "Consumer '{consumer}' is not subscribed to '{pattern}'")
            }
        }
    }
}

impl std::error::Error for BrokerError {}

impl ErrorExt for BrokerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTopic { .. } => StatusCode::InvalidTopic,
            Self::NotSubscribed { .. } => StatusCode::NotSubscribed,
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "broker".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        match self {
            Self::InvalidTopic { topic } => tags.push(("topic", topic.clone())),
            Self::NotSubscribed { consumer, pattern } => {
                tags.push(("consumer", consumer.clone()));
                tags.push(("pattern", pattern.clone()));
            }
        }

        tags
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::InboxFull { consumer, capacity } => {
                write!(f, "Inbox of '{consumer}' is full (capacity {capacity})")
            }
            Self::InboxClosed { consumer } => write!(f, "Inbox of '{consumer}' is closed"),
        }
    }
}

impl std::error::Error for DeliveryError {}

impl ErrorExt for DeliveryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InboxFull { .. } => StatusCode::InboxFull,
            Self::InboxClosed { .. } => StatusCode::InboxClosed,
        }
    }
}
