use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use filecast_error::{BrokerError, DeliveryError, ErrorExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{Broker, Message};
use crate::error::TryRecvError;

/// Приёмник сообщений: конечная точка цепочки доставки.
///
/// `receive` вызывается брокером синхронно под read-блокировкой реестра,
/// поэтому он не должен блокироваться надолго и не должен обращаться к
/// тому же брокеру:
/// - `subscribe`/`unsubscribe` из `receive` ждут write-блокировку, которую
///   не получить, пока идёт доставка;
/// - повторный `publish` из `receive` тоже может зависнуть: `RwLock` из
///   `parking_lot` честный, и если другой поток уже ждёт write-блокировку,
///   новая read-блокировка встаёт в очередь за ним.
///
/// Чтобы переслать сообщение дальше, положите его в очередь (как делает
/// [`InboxConsumer`]) и публикуйте из другой задачи.
pub trait Receiver: Send + Sync + 'static {
    /// Имя потребителя (для диагностики и `list_subscriptions`).
    fn name(&self) -> &str;

    /// Принимает доставленное сообщение. Не возвращает ошибок.
    fn receive(
        &self,
        message: Message,
    );
}

/// Потребитель с почтовым ящиком в памяти.
///
/// Накапливает доставленные пары `(topic, message)` в порядке поступления.
/// Ящик только растёт, пока жив потребитель.
#[derive(Debug)]
pub struct Consumer {
    name: String,
    mailbox: Mutex<Vec<Message>>,
}

impl Consumer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mailbox: Mutex::new(Vec::new()),
        }
    }

    /// Регистрирует себя в `broker` под шаблоном `pattern`.
    pub fn subscribe(
        self: &Arc<Self>,
        broker: &Broker,
        pattern: &str,
    ) -> Result<(), BrokerError> {
        broker.subscribe(self.clone(), pattern)
    }

    /// Снимает одну регистрацию себя под шаблоном `pattern`.
    pub fn unsubscribe(
        &self,
        broker: &Broker,
        pattern: &str,
    ) -> Result<(), BrokerError> {
        broker.unsubscribe(self, pattern)
    }

    /// Снимок почтового ящика.
    pub fn messages(&self) -> Vec<Message> {
        self.mailbox.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.mailbox.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailbox.lock().is_empty()
    }
}

impl Receiver for Consumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(
        &self,
        message: Message,
    ) {
        info!(
            consumer = %self.name,
            topic = %message.topic,
            message = %message.payload,
            "Message received"
        );
        self.mailbox.lock().push(message);
    }
}

/// Потребитель с ограниченной очередью.
///
/// Брокер кладёт сообщения в очередь без блокировки (`try_send`), а
/// обработка идёт независимо на стороне [`Inbox`]. При переполнении или
/// закрытой очереди сообщение отбрасывается, учитывается в `dropped` и
/// логируется на уровне `warn`.
///
/// После того как `unsubscribe` вернул управление, новых сообщений по этой
/// подписке в очередь не попадает; уже поставленные в очередь остаются
/// доступны для чтения из `Inbox`.
#[derive(Debug)]
pub struct InboxConsumer {
    name: String,
    capacity: usize,
    tx: mpsc::Sender<Message>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Принимающая сторона очереди [`InboxConsumer`].
#[derive(Debug)]
pub struct Inbox {
    name: String,
    rx: mpsc::Receiver<Message>,
}

impl InboxConsumer {
    /// Создаёт потребителя и его очередь ёмкостью `capacity` (минимум 1).
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
    ) -> (Arc<Self>, Inbox) {
        let name = name.into();
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let consumer = Arc::new(Self {
            name: name.clone(),
            capacity,
            tx,
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        });
        (consumer, Inbox { name, rx })
    }

    pub fn subscribe(
        self: &Arc<Self>,
        broker: &Broker,
        pattern: &str,
    ) -> Result<(), BrokerError> {
        broker.subscribe(self.clone(), pattern)
    }

    pub fn unsubscribe(
        &self,
        broker: &Broker,
        pattern: &str,
    ) -> Result<(), BrokerError> {
        broker.unsubscribe(self, pattern)
    }

    /// Ставит сообщение в очередь без ожидания.
    pub fn try_deliver(
        &self,
        message: Message,
    ) -> Result<(), DeliveryError> {
        match self.tx.try_send(message) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(DeliveryError::InboxFull {
                consumer: self.name.clone(),
                capacity: self.capacity,
            }),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DeliveryError::InboxClosed {
                consumer: self.name.clone(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Количество сообщений, успешно поставленных в очередь.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Количество отброшенных сообщений (переполнение или закрытая очередь).
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Receiver for InboxConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(
        &self,
        message: Message,
    ) {
        let topic = message.topic.clone();
        if let Err(err) = self.try_deliver(message) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                consumer = %self.name,
                topic = %topic,
                dropped_total = self.dropped(),
                code = %err.status_code(),
                error = %err,
                "Delivery dropped"
            );
        }
    }
}

impl Inbox {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Асинхронно ожидает следующее сообщение.
    ///
    /// Возвращает `None`, когда потребитель уничтожен и очередь пуста.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Пытается получить сообщение без ожидания.
    pub fn try_recv(&mut self) -> Result<Message, TryRecvError> {
        self.rx.try_recv().map_err(Into::into)
    }

    /// Закрывает очередь: новые сообщения отбрасываются, уже поставленные
    /// остаются доступными для чтения.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Количество сообщений, ожидающих обработки.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
