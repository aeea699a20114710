//! Health polling against the monitor service.

pub mod poller;
pub mod report;

pub use poller::{HealthPoller, DEFAULT_POLL_INTERVAL, HEALTH_PATH};
pub use report::HealthReport;
