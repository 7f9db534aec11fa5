use std::sync::Arc;

use filecast_error::BrokerError;

use super::Broker;

/// Издатель: даёт право только публиковать через связанный брокер.
///
/// Подписки и просмотр реестра через него недоступны.
#[derive(Debug, Clone)]
pub struct Producer {
    broker: Arc<Broker>,
}

impl Producer {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }

    /// Публикует сообщение; проверка топика и ошибки: как у
    /// [`Broker::publish`].
    pub fn publish(
        &self,
        topic: &str,
        message: &str,
    ) -> Result<(), BrokerError> {
        self.broker.publish(topic, message)
    }
}
