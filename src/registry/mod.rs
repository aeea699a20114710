//! Service cards and their live status.
//!
//! Readers never see a half-applied reconciliation: every mutation builds a
//! new snapshot and publishes it whole through a watch channel.

pub mod catalog;
pub mod reconcile;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::error::RegistryError;
use crate::health::report::HealthReport;

pub use reconcile::{StatusChange, StatusReconciler, MONITOR_ID};
pub use types::{ServiceDescriptor, ServiceStatus, JUST_NOW};

pub type Snapshot = Arc<[ServiceDescriptor]>;

#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    tx: Arc<watch::Sender<Snapshot>>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for service in &services {
            if !seen.insert(service.id.as_str()) {
                return Err(RegistryError::DuplicateId(service.id.clone()));
            }
        }
        let (tx, _rx) = watch::channel(Snapshot::from(services));
        Ok(Self { tx: Arc::new(tx) })
    }

    /// Registry over the built-in catalog.
    pub fn load() -> Result<Self, RegistryError> {
        Self::new(catalog::load())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<ServiceDescriptor> {
        self.tx.borrow().iter().find(|s| s.id == id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.tx.borrow().iter().map(|s| s.id.clone()).collect()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Explicit status write. Returns whether anything changed.
    pub fn update(&self, id: &str, status: ServiceStatus, last_updated: &str) -> Result<bool, RegistryError> {
        if self.get(id).is_none() {
            return Err(RegistryError::UnknownId(id.to_string()));
        }

        let changed = self.tx.send_if_modified(|current| {
            let mut next = current.to_vec();
            let Some(service) = next.iter_mut().find(|s| s.id == id) else {
                return false;
            };
            if service.status == status && service.last_updated == last_updated {
                return false;
            }
            service.status = status;
            service.last_updated = last_updated.to_string();
            *current = Snapshot::from(next);
            true
        });
        Ok(changed)
    }

    /// Reconciles `report` into a fresh snapshot, publishing only if
    /// something changed.
    pub fn apply_report(&self, reconciler: &StatusReconciler, report: &HealthReport) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        self.tx.send_if_modified(|current| {
            let mut next = current.to_vec();
            changes = reconciler.reconcile(&mut next, report);
            if changes.is_empty() {
                return false;
            }
            *current = Snapshot::from(next);
            true
        });

        for change in &changes {
            info!(service = %change.id, from = %change.from, to = %change.to, "Service status changed");
        }
        changes
    }
}
