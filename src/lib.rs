pub mod activity;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod experiment;
pub mod health;
pub mod registry;
pub mod services;

// Re-export the pieces a UI layer wires together
pub use activity::{ActivityEvent, ActivityFeed, ActivityLog, EventKind};
pub use config::HarnessConfig;
pub use dashboard::Dashboard;
pub use experiment::{ExperimentRunner, Hypothesis};
pub use health::HealthPoller;
pub use registry::{ServiceRegistry, ServiceStatus};
