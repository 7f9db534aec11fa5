//! Подсистема Publish–Subscribe (pub/sub).
//!
//! Внутрипроцессный брокер, превращающий события об изменении файлов в
//! сообщения по топикам:
//!
//! - `topic`: проверка топиков и сопоставление шаблонов с `~`.
//! - `registry`: реестр подписок с сохранением порядка.
//! - `broker`: подписка, отписка и синхронный fan-out.
//! - `producer`: издатель, умеющий только публиковать.
//! - `consumer`: трейт `Receiver`, потребитель с почтовым ящиком и
//!   потребитель с ограниченной очередью.
//! - `message`: доставляемая пара `(topic, message)`.

pub mod broker;
pub mod consumer;
pub mod message;
pub mod producer;
pub mod registry;
pub mod topic;

pub use broker::*;
pub use consumer::*;
pub use message::*;
pub use producer::*;
pub use registry::*;
pub use topic::{is_valid_topic, matches, Topic, WILDCARD};
