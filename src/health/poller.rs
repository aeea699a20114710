use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ProbeError;
use crate::registry::{ServiceRegistry, StatusReconciler};
use crate::services::{HttpBackend, ProbeRequest};
use super::report::HealthReport;

pub const HEALTH_PATH: &str = "/health-check";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Everything the poll task needs, moved into it on `start`.
#[derive(Clone)]
struct PollContext {
    backend: Arc<dyn HttpBackend>,
    registry: ServiceRegistry,
    reconciler: StatusReconciler,
    url: String,
    period: Duration,
    probes: Arc<AtomicU64>,
}

impl PollContext {
    async fn probe(&self) -> Result<HealthReport, ProbeError> {
        let value = self.backend.execute(&ProbeRequest::get(self.url.as_str())).await?;
        HealthReport::from_value(value)
    }

    fn apply(&self, seq: u64, outcome: Result<HealthReport, ProbeError>) {
        match outcome {
            Ok(report) => {
                let changes = self.registry.apply_report(&self.reconciler, &report);
                debug!(seq, reported = report.len(), changed = changes.len(), "Health probe applied");
            }
            Err(e) => {
                // Diagnostic only; the activity feed stays quiet and statuses stay put.
                warn!(seq, error = %e, "Health probe failed, keeping current statuses");
            }
        }
    }
}

/// Periodic health poller.
///
/// Probes immediately on `start`, then once per period. Probes never overlap:
/// a tick that falls due while one is outstanding is skipped, so results are
/// applied strictly in probe order. Dropping the poller cancels it.
pub struct HealthPoller {
    ctx: PollContext,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HealthPoller {
    pub fn new(backend: Arc<dyn HttpBackend>, registry: ServiceRegistry, monitor_base: &str, period: Duration) -> Self {
        Self {
            ctx: PollContext {
                backend,
                registry,
                reconciler: StatusReconciler::default(),
                url: format!("{}{}", monitor_base.trim_end_matches('/'), HEALTH_PATH),
                period,
                probes: Arc::new(AtomicU64::new(0)),
            },
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn with_reconciler(mut self, reconciler: StatusReconciler) -> Self {
        self.ctx.reconciler = reconciler;
        self
    }

    pub fn url(&self) -> &str {
        &self.ctx.url
    }

    /// Number of probes issued since construction.
    pub fn probes_issued(&self) -> u64 {
        self.ctx.probes.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Health poller already running");
            return;
        }
        // A stopped token stays cancelled; each run gets its own.
        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let ctx = self.ctx.clone();

        info!(url = %ctx.url, period_ms = ctx.period.as_millis() as u64, "Health poller started");
        self.task = Some(tokio::spawn(poll_loop(ctx, cancel)));
    }

    /// Cancels the timer and waits for the poll task to finish. A probe in
    /// flight is dropped and its result never applied. Idempotent.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Health poll task ended abnormally");
            }
            info!("Health poller stopped");
        }
    }
}

impl Drop for HealthPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn poll_loop(ctx: PollContext, cancel: CancellationToken) {
    // interval() panics on a zero period.
    let mut cadence = interval(ctx.period.max(Duration::from_millis(1)));
    cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = cadence.tick() => {}
        }

        let seq = ctx.probes.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(seq, "Discarding in-flight health probe");
                break;
            }
            outcome = ctx.probe() => outcome,
        };

        if cancel.is_cancelled() {
            break;
        }
        ctx.apply(seq, outcome);
    }
}
