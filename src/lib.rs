/// Application bootstrap: broker, audit consumer, file watcher.
pub mod app;
/// Settings loading (defaults, `filecast.toml`, `FILECAST_*` env vars).
pub mod config;
/// Error types of the root crate: monitor and inbox errors.
pub mod error;
/// Logging initialisation (filters, formatting, sinks).
pub mod logging;
/// File change monitoring: diffs, audit log, notify watcher.
pub mod monitor;
/// Pub/Sub: Broker, Producer, Consumer, topic matching.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Bootstrap helpers.
pub use app::{setup_file_monitoring, setup_message_broker, spawn_inbox_drain, MessageBrokerSetup};
/// config
pub use config::Settings;
/// Operation errors and result types.
pub use error::{log_failure, MonitorError, MonitorResult, TryRecvError};
pub use filecast_error::{BrokerError, DeliveryError, FilecastResult, StackError, StatusCode};
/// Logging API.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// File monitoring API.
pub use monitor::{spawn_watcher, FileChangeMonitor, WatcherHandle};
/// Pub/Sub API.
pub use pubsub::{
    matches, Broker, BrokerStats, Consumer, Inbox, InboxConsumer, Message, Producer, Receiver,
    Topic, WILDCARD,
};
