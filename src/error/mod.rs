pub mod monitor;
pub mod pubsub;
pub mod report;

pub use monitor::{MonitorError, MonitorResult};
pub use pubsub::TryRecvError;
pub use report::log_failure;
