use std::{fmt, str::FromStr, sync::Arc};

use filecast_error::BrokerError;

/// Маркер подстановки: всё до первого вхождения: литеральный префикс,
/// всё после: игнорируется при сопоставлении.
pub const WILDCARD: char = '~';

/// Проверенный топик или шаблон подписки.
///
/// Гарантирует, что строка не пуста после обрезки пробелов. Сама строка
/// хранится без изменений: `" a "` и `"a"`: разные ключи реестра.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Проверяет и создаёт топик.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BrokerError> {
        let raw = raw.as_ref();
        if !is_valid_topic(raw) {
            return Err(BrokerError::InvalidTopic {
                topic: raw.to_string(),
            });
        }
        Ok(Self(Arc::from(raw)))
    }

    /// Вариант для необязательного значения: `None` отклоняется так же,
    /// как пустая строка.
    pub fn try_from_opt(raw: Option<&str>) -> Result<Self, BrokerError> {
        match raw {
            Some(raw) => Self::new(raw),
            None => Err(BrokerError::InvalidTopic {
                topic: String::new(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Разделяемая ссылка на строку топика (для сообщений при fan-out).
    pub fn as_shared(&self) -> Arc<str> {
        self.0.clone()
    }

    /// Литеральный префикс шаблона или `None` для точного шаблона.
    pub fn literal_prefix(&self) -> Option<&str> {
        self.0.split_once(WILDCARD).map(|(prefix, _)| prefix)
    }

    /// Содержит ли шаблон маркер подстановки.
    pub fn is_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// Сопоставляет этот шаблон с опубликованным топиком.
    #[inline]
    pub fn matches(
        &self,
        topic: &str,
    ) -> bool {
        matches(&self.0, topic)
    }
}

/// Топик допустим, если после обрезки пробелов в нём что-то осталось.
#[inline]
pub fn is_valid_topic(raw: &str) -> bool {
    !raw.trim().is_empty()
}

/// Решает, подходит ли опубликованный `topic` под шаблон `pattern`.
///
/// - без `~`: точное побайтовое совпадение;
/// - с `~`: `topic` начинается с текста до первой `~`, остаток шаблона не
///   учитывается. Шаблон `"~"` совпадает со всеми топиками.
#[inline]
pub fn matches(
    pattern: &str,
    topic: &str,
) -> bool {
    match pattern.split_once(WILDCARD) {
        None => pattern == topic,
        Some((prefix, _)) => topic.starts_with(prefix),
    }
}

impl fmt::Display for Topic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Topic {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Topic {
    type Error = BrokerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Topic {
    type Error = BrokerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что шаблон без `~` требует точного совпадения.
    #[test]
    fn test_exact_pattern() {
        assert!(matches("topicA", "topicA"));
        assert!(!matches("topicA", "topicB"));
        assert!(!matches("topicA", "topicAB"));
        assert!(!matches("topicA", "topica"));
    }

    /// Тест проверяет сопоставление по литеральному префиксу.
    #[test]
    fn test_prefix_pattern() {
        assert!(matches("topic~", "topicA"));
        assert!(matches("topic~", "topic"));
        assert!(matches("ab~", "abc"));
        assert!(!matches("b~", "abc"));
        assert!(!matches("topic~", "anotherTopic"));
    }

    /// Тест проверяет, что `"~"` совпадает с любым топиком.
    #[test]
    fn test_match_all() {
        for topic in ["topic1", "a/b/c.txt", " ", "~"] {
            assert!(matches("~", topic), "'~' should match {topic:?}");
        }
    }

    /// Тест проверяет, что значимо только первое вхождение `~`, а текст
    /// после него игнорируется.
    #[test]
    fn test_suffix_and_multiple_markers_ignored() {
        assert!(matches("docs~whatever", "docs/readme.md"));
        assert!(matches("a~b~c", "a"));
        assert!(matches("a~b~c", "azzz"));
        assert!(!matches("a~b~c", "ba"));
    }

    #[test]
    fn test_validation() {
        assert!(Topic::new("topicA").is_ok());
        assert!(Topic::new(" padded ").is_ok());
        assert_eq!(
            Topic::new(""),
            Err(BrokerError::InvalidTopic {
                topic: String::new()
            })
        );
        assert!(Topic::new("   ").is_err());
        assert!(Topic::new("\t\n").is_err());
        assert!(Topic::try_from_opt(None).is_err());
        assert!(Topic::try_from_opt(Some("x")).is_ok());
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(Topic::new("topic~").unwrap().literal_prefix(), Some("topic"));
        assert_eq!(Topic::new("~").unwrap().literal_prefix(), Some(""));
        assert_eq!(Topic::new("exact").unwrap().literal_prefix(), None);
        assert!(!Topic::new("exact").unwrap().is_wildcard());
    }

    /// Тест проверяет, что исходная строка сохраняется без обрезки.
    #[test]
    fn test_raw_text_preserved() {
        let t: Topic = " a ".parse().unwrap();
        assert_eq!(t.as_str(), " a ");
        assert!(t.matches(" a "));
        assert!(!t.matches("a"));
    }
}
