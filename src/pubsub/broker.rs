use std::sync::atomic::{AtomicUsize, Ordering};

use filecast_error::BrokerError;
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::{ConsumerRef, Message, Receiver, SubscriptionList, SubscriptionRegistry, Topic};

/// Брокер Pub/Sub сообщений.
///
/// Поддерживает:
/// - Точные подписки (`"docs/a.txt"`)
/// - Подписки по префиксу (`"docs/~"`, `"~"`: все топики)
/// - Автоматическое удаление пустых шаблонов
/// - Статистику публикаций и доставок
///
/// Реестр защищён `RwLock`: subscribe/unsubscribe берут блокировку на запись,
/// `publish` держит блокировку на чтение на всё время сопоставления и
/// доставки. Публикация видит реестр целиком до или целиком после
/// конкурентного изменения.
pub struct Broker {
    registry: RwLock<SubscriptionRegistry>,
    /// Общее количество успешных вызовов `publish`
    pub publish_count: AtomicUsize,
    /// Общее количество вызовов `receive` у потребителей
    pub delivery_count: AtomicUsize,
}

/// Снимок счётчиков брокера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    pub publish_count: usize,
    pub delivery_count: usize,
    pub patterns: usize,
    pub subscriptions: usize,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(SubscriptionRegistry::new()),
            publish_count: AtomicUsize::new(0),
            delivery_count: AtomicUsize::new(0),
        }
    }

    /// Подписывает `consumer` на шаблон `pattern`.
    ///
    /// Повторная подписка того же потребителя на тот же шаблон создаёт
    /// вторую регистрацию (сообщение будет доставлено дважды).
    pub fn subscribe(
        &self,
        consumer: ConsumerRef,
        pattern: &str,
    ) -> Result<(), BrokerError> {
        let name = consumer.name().to_string();
        self.registry.write().subscribe(consumer, pattern)?;
        debug!(consumer = %name, pattern, "Subscribed");
        Ok(())
    }

    /// Снимает одну регистрацию `consumer` под шаблоном `pattern`.
    ///
    /// После возврата новых доставок по этой регистрации не будет.
    pub fn unsubscribe<R>(
        &self,
        consumer: &R,
        pattern: &str,
    ) -> Result<(), BrokerError>
    where
        R: Receiver + ?Sized,
    {
        self.registry.write().unsubscribe(consumer, pattern)?;
        debug!(consumer = %consumer.name(), pattern, "Unsubscribed");
        Ok(())
    }

    /// Публикует `message` в топик `topic`.
    ///
    /// Доставляет сообщение каждому потребителю каждого совпавшего шаблона:
    /// шаблоны в порядке реестра, потребители в порядке подписки. Возврат
    /// происходит после вызова `receive` у всех совпавших потребителей.
    /// Вызывать из [`Receiver::receive`] нельзя, см. документацию трейта.
    pub fn publish(
        &self,
        topic: &str,
        message: &str,
    ) -> Result<(), BrokerError> {
        let topic = Topic::new(topic)?;
        let message = Message::new(topic.as_shared(), message);
        self.publish_count.fetch_add(1, Ordering::Relaxed);

        let registry = self.registry.read();
        let mut delivered = 0usize;
        for consumer in registry.matching(topic.as_str()) {
            trace!(consumer = %consumer.name(), topic = %topic, "Dispatching");
            consumer.receive(message.clone());
            delivered += 1;
        }
        drop(registry);

        self.delivery_count.fetch_add(delivered, Ordering::Relaxed);
        debug!(topic = %topic, delivered, "Published");
        Ok(())
    }

    /// Снимок подписок: шаблон → имена потребителей в порядке подписки.
    pub fn list_subscriptions(&self) -> SubscriptionList {
        self.registry.read().list()
    }

    pub fn stats(&self) -> BrokerStats {
        let registry = self.registry.read();
        BrokerStats {
            publish_count: self.publish_count.load(Ordering::Relaxed),
            delivery_count: self.delivery_count.load(Ordering::Relaxed),
            patterns: registry.len(),
            subscriptions: registry.subscription_count(),
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("subscriptions", &self.list_subscriptions())
            .field("publish_count", &self.publish_count.load(Ordering::Relaxed))
            .finish()
    }
}
