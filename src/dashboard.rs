use std::sync::Arc;

use tracing::info;

use crate::activity::ActivityLog;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::experiment::{ExperimentPlan, ExperimentRunner, Hypothesis, RunHandle};
use crate::health::HealthPoller;
use crate::registry::ServiceRegistry;
use crate::services::{BackendClient, HttpBackend};

/// Owner of the whole harness: registry, activity feed, poller and runner.
///
/// The poller runs between `start` and `shutdown`. Dropping the dashboard
/// without `shutdown` still cancels polling.
pub struct Dashboard {
    registry: ServiceRegistry,
    activity: ActivityLog,
    poller: HealthPoller,
    runner: ExperimentRunner,
}

impl Dashboard {
    pub fn new(config: &HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let backend = Arc::new(BackendClient::new(config.request_timeout)?);
        Self::assemble(config, backend)
    }

    pub fn with_backend(config: &HarnessConfig, backend: Arc<dyn HttpBackend>) -> Result<Self, HarnessError> {
        config.validate()?;
        Self::assemble(config, backend)
    }

    /// Expects an already validated config.
    fn assemble(config: &HarnessConfig, backend: Arc<dyn HttpBackend>) -> Result<Self, HarnessError> {
        let activity = ActivityLog::with_capacity(config.activity_capacity);
        activity.info("System initialized.", "System");

        let registry = ServiceRegistry::load()?;
        activity.success("Microservices discovery completed.", "Discovery");

        let poller = HealthPoller::new(
            backend.clone(),
            registry.clone(),
            &config.backends.monitor,
            config.poll_interval,
        );

        let plan = ExperimentPlan::new(config.backends.reservas.as_str(), config.backends.gateway.as_str())
            .with_reservation_id(config.reservation_id);
        let runner = ExperimentRunner::new(backend, activity.clone(), plan);

        Ok(Self { registry, activity, poller, runner })
    }

    pub fn start(&mut self) {
        info!(services = self.registry.ids().len(), "Dashboard starting");
        self.poller.start();
    }

    pub async fn shutdown(&mut self) {
        self.poller.stop().await;
        info!("Dashboard stopped");
    }

    pub fn run(&self, hypothesis: Hypothesis) -> RunHandle {
        self.runner.run(hypothesis)
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn runner(&self) -> &ExperimentRunner {
        &self.runner
    }

    pub fn poller(&self) -> &HealthPoller {
        &self.poller
    }
}
