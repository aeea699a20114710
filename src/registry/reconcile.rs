use crate::health::report::HealthReport;
use super::types::{ServiceDescriptor, ServiceStatus, JUST_NOW};

/// Id of the health service itself. It reports itself as online
/// unconditionally, so its card is never overwritten from the report.
pub const MONITOR_ID: &str = "monitor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: String,
    pub from: ServiceStatus,
    pub to: ServiceStatus,
}

/// Applies a health report onto the service cards.
///
/// Only ids present in the report with a non-null status are considered, and
/// only a differing value causes a write. Absence from the report is never
/// read as "offline".
#[derive(Debug, Clone)]
pub struct StatusReconciler {
    self_id: String,
}

impl Default for StatusReconciler {
    fn default() -> Self {
        Self::new(MONITOR_ID)
    }
}

impl StatusReconciler {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self { self_id: self_id.into() }
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    pub fn reconcile(&self, services: &mut [ServiceDescriptor], report: &HealthReport) -> Vec<StatusChange> {
        let mut changes = Vec::new();

        for service in services.iter_mut() {
            if service.id == self.self_id {
                continue;
            }
            let Some(reported) = report.status_of(&service.id) else {
                continue;
            };
            // degraded/maintenance get no special treatment: a differing value wins.
            if service.status != reported {
                changes.push(StatusChange {
                    id: service.id.clone(),
                    from: service.status,
                    to: reported,
                });
                service.status = reported;
                service.last_updated = JUST_NOW.to_string();
            }
        }

        changes
    }
}
