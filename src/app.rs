//! Сборка приложения: брокер, аудит-потребитель и наблюдатель за файлами.

use std::sync::Arc;

use filecast_error::BrokerError;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    config::Settings,
    error::MonitorResult,
    monitor::{spawn_watcher, FileChangeMonitor, WatcherHandle},
    pubsub::{Broker, Inbox, InboxConsumer, Producer},
};

/// Брокер и подписанный на него аудит-потребитель.
pub struct MessageBrokerSetup {
    pub broker: Arc<Broker>,
    pub consumer: Arc<InboxConsumer>,
    pub inbox: Inbox,
}

/// Создаёт брокер и потребителя `consumer_name`, подписанного на `pattern`.
pub fn setup_message_broker(
    pattern: &str,
    consumer_name: &str,
    capacity: usize,
) -> Result<MessageBrokerSetup, BrokerError> {
    let broker = Arc::new(Broker::new());
    let (consumer, inbox) = InboxConsumer::new(consumer_name, capacity);
    consumer.subscribe(&broker, pattern)?;
    info!(consumer = consumer_name, pattern, capacity, "Message broker ready");

    Ok(MessageBrokerSetup {
        broker,
        consumer,
        inbox,
    })
}

/// Запускает наблюдение за `settings.watch_path()`; изменения публикуются в
/// `broker`.
pub fn setup_file_monitoring(
    broker: Arc<Broker>,
    settings: &Settings,
) -> MonitorResult<(Arc<FileChangeMonitor>, WatcherHandle)> {
    let monitor = Arc::new(FileChangeMonitor::new(
        Producer::new(broker),
        &settings.root_path,
        &settings.audit_log_path,
    ));
    let handle = spawn_watcher(Arc::clone(&monitor), settings.watch_path())?;
    Ok((monitor, handle))
}

/// Задача, которая вычитывает очередь потребителя и логирует каждое
/// сообщение. Завершается, когда очередь закрыта и пуста; возвращает число
/// обработанных сообщений.
pub fn spawn_inbox_drain(mut inbox: Inbox) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut handled = 0u64;
        while let Some(message) = inbox.recv().await {
            info!(
                consumer = %inbox.name(),
                topic = %message.topic,
                message = %message.payload,
                "Message received"
            );
            handled += 1;
        }
        handled
    })
}
