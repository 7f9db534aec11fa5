use std::sync::Arc;

/// Доставленное сообщение: пара `(topic, message)`.
///
/// Обе строки разделяемые, поэтому копирование при fan-out дешёвое.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: Arc<str>,
    pub payload: Arc<str>,
}

impl Message {
    pub fn new(
        topic: impl Into<Arc<str>>,
        payload: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Пара `(topic, payload)` в виде строковых срезов.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.topic, &self.payload)
    }
}

impl PartialEq<(&str, &str)> for Message {
    fn eq(
        &self,
        other: &(&str, &str),
    ) -> bool {
        self.as_pair() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет создание сообщения из &str и String.
    #[test]
    fn test_message_creation() {
        let msg = Message::new("topicA", String::from("Message1"));
        assert_eq!(&*msg.topic, "topicA");
        assert_eq!(&*msg.payload, "Message1");
        assert_eq!(msg, ("topicA", "Message1"));
    }

    /// Тест проверяет, что клон разделяет те же строки.
    #[test]
    fn test_clone_shares_buffers() {
        let msg = Message::new("a", "b");
        let copy = msg.clone();
        assert!(Arc::ptr_eq(&msg.topic, &copy.topic));
        assert!(Arc::ptr_eq(&msg.payload, &copy.payload));
    }

    #[test]
    fn test_multiline_payload() {
        let msg = Message::new("docs/a.txt", "Timestamp: t\nDiff:\n+ x");
        assert_eq!(msg.as_pair().1.lines().count(), 3);
    }
}
