use std::sync::Arc;

use filecast_error::BrokerError;

use super::{Receiver, Topic};

/// Разделяемая ссылка на потребителя в реестре.
pub type ConsumerRef = Arc<dyn Receiver>;

/// Снимок реестра: шаблон → имена потребителей в порядке подписки.
///
/// Шаблоны идут в порядке первой подписки на них.
pub type SubscriptionList = Vec<(String, Vec<String>)>;

struct Entry {
    pattern: Topic,
    consumers: Vec<ConsumerRef>,
}

/// Реестр подписок: шаблон → упорядоченный список потребителей.
///
/// Порядок шаблонов: порядок вставки (вектор записей, а не хеш-таблица),
/// от него зависит детерминированный порядок fan-out. Один и тот же
/// потребитель может быть зарегистрирован под шаблоном несколько раз.
/// Пустые записи не хранятся.
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Entry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет `consumer` в конец списка шаблона `pattern`, создавая
    /// запись при первой подписке.
    pub fn subscribe(
        &mut self,
        consumer: ConsumerRef,
        pattern: &str,
    ) -> Result<(), BrokerError> {
        let pattern = Topic::new(pattern)?;
        match self.position(pattern.as_str()) {
            Some(idx) => self.entries[idx].consumers.push(consumer),
            None => self.entries.push(Entry {
                pattern,
                consumers: vec![consumer],
            }),
        }
        Ok(())
    }

    /// Удаляет первую регистрацию `consumer` под шаблоном `pattern`.
    ///
    /// Потребитель сравнивается по идентичности (адрес), а не по имени.
    /// Неизвестный шаблон и отсутствие потребителя в списке одинаково
    /// дают [`BrokerError::NotSubscribed`]. Последний удалённый потребитель
    /// удаляет и сам шаблон.
    pub fn unsubscribe<R>(
        &mut self,
        consumer: &R,
        pattern: &str,
    ) -> Result<(), BrokerError>
    where
        R: Receiver + ?Sized,
    {
        let pattern = Topic::new(pattern)?;
        let not_subscribed = || BrokerError::NotSubscribed {
            consumer: consumer.name().to_string(),
            pattern: pattern.to_string(),
        };

        let idx = self.position(pattern.as_str()).ok_or_else(not_subscribed)?;
        let consumers = &mut self.entries[idx].consumers;
        let slot = consumers
            .iter()
            .position(|c| std::ptr::addr_eq(Arc::as_ptr(c), consumer as *const R))
            .ok_or_else(not_subscribed)?;

        consumers.remove(slot);
        if consumers.is_empty() {
            self.entries.remove(idx);
        }
        Ok(())
    }

    /// Снимок реестра. Изменение снимка не влияет на реестр.
    pub fn list(&self) -> SubscriptionList {
        self.entries
            .iter()
            .map(|e| {
                (
                    e.pattern.to_string(),
                    e.consumers.iter().map(|c| c.name().to_string()).collect(),
                )
            })
            .collect()
    }

    /// Потребители всех шаблонов, совпавших с `topic`: шаблоны в порядке
    /// реестра, потребители в порядке подписки, без дедупликации.
    pub fn matching<'a>(
        &'a self,
        topic: &'a str,
    ) -> impl Iterator<Item = &'a ConsumerRef> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.pattern.matches(topic))
            .flat_map(|e| e.consumers.iter())
    }

    pub fn contains_pattern(
        &self,
        pattern: &str,
    ) -> bool {
        self.position(pattern).is_some()
    }

    /// Количество шаблонов.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Общее количество регистраций (с учётом повторов).
    pub fn subscription_count(&self) -> usize {
        self.entries.iter().map(|e| e.consumers.len()).sum()
    }

    fn position(
        &self,
        pattern: &str,
    ) -> Option<usize> {
        self.entries.iter().position(|e| e.pattern.as_str() == pattern)
    }
}
