use serde_json::json;

use testbed_harness::error::{ProbeError, RegistryError};
use testbed_harness::health::HealthReport;
use testbed_harness::registry::{
    catalog, ServiceDescriptor, ServiceRegistry, ServiceStatus, StatusChange, StatusReconciler, JUST_NOW, MONITOR_ID,
};

fn service(id: &str, status: ServiceStatus) -> ServiceDescriptor {
    ServiceDescriptor {
        id: id.to_string(),
        name: format!("Servicio {id}"),
        status,
        description: String::new(),
        detail: None,
        tags: vec!["Core".to_string()],
        last_updated: "Hace 5 min".to_string(),
        url: None,
    }
}

#[test]
fn test_catalog_has_five_unique_services() {
    let services = catalog::load();
    let ids: Vec<&str> = services.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["reservas", "pagos", "inventario", "monitor", "busqueda"]);

    let monitor = services.iter().find(|s| s.id == MONITOR_ID).unwrap();
    assert_eq!(monitor.status, ServiceStatus::Degraded);
    assert!(ServiceRegistry::new(services).is_ok());
}

#[test]
fn test_offline_report_flips_only_that_service() {
    let mut services = catalog::load();
    let before = services.clone();
    let report = HealthReport::new().with("reservas", ServiceStatus::Offline);

    let changes = StatusReconciler::default().reconcile(&mut services, &report);

    assert_eq!(
        changes,
        vec![StatusChange { id: "reservas".to_string(), from: ServiceStatus::Online, to: ServiceStatus::Offline }]
    );
    assert_eq!(services[0].status, ServiceStatus::Offline);
    assert_eq!(services[0].last_updated, JUST_NOW);
    assert_eq!(&services[1..], &before[1..], "every other card is untouched");
}

#[test]
fn test_monitor_is_never_overwritten() {
    let mut services = catalog::load();
    let report = HealthReport::new()
        .with(MONITOR_ID, ServiceStatus::Offline)
        .with("pagos", ServiceStatus::Offline);

    let changes = StatusReconciler::default().reconcile(&mut services, &report);

    let monitor = services.iter().find(|s| s.id == MONITOR_ID).unwrap();
    assert_eq!(monitor.status, ServiceStatus::Degraded);
    assert_eq!(monitor.last_updated, "Hace 10 min");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].id, "pagos");
}

#[test]
fn test_equal_status_leaves_label_alone() {
    let mut services = vec![service("pagos", ServiceStatus::Online)];
    let report = HealthReport::new().with("pagos", ServiceStatus::Online);

    let changes = StatusReconciler::default().reconcile(&mut services, &report);

    assert!(changes.is_empty());
    assert_eq!(services[0].last_updated, "Hace 5 min");
}

#[test]
fn test_absent_ids_are_not_treated_as_offline() {
    let mut services = vec![service("reservas", ServiceStatus::Online), service("inventario", ServiceStatus::Maintenance)];
    let before = services.clone();

    let changes = StatusReconciler::default().reconcile(&mut services, &HealthReport::new());

    assert!(changes.is_empty());
    assert_eq!(services, before);
}

#[test]
fn test_incoming_value_overwrites_degraded() {
    let mut services = vec![service("busqueda", ServiceStatus::Degraded)];
    let report = HealthReport::new().with("busqueda", ServiceStatus::Online);

    StatusReconciler::default().reconcile(&mut services, &report);

    assert_eq!(services[0].status, ServiceStatus::Online);
    assert_eq!(services[0].last_updated, JUST_NOW);
}

#[test]
fn test_custom_self_id_is_skipped() {
    let mut services = vec![service("watchdog", ServiceStatus::Online), service(MONITOR_ID, ServiceStatus::Online)];
    let report = HealthReport::new()
        .with("watchdog", ServiceStatus::Offline)
        .with(MONITOR_ID, ServiceStatus::Offline);

    StatusReconciler::new("watchdog").reconcile(&mut services, &report);

    assert_eq!(services[0].status, ServiceStatus::Online);
    assert_eq!(services[1].status, ServiceStatus::Offline);
}

#[test]
fn test_report_decoding() {
    // Shape produced by the monitor, including a key with no card.
    let report = HealthReport::from_value(json!({
        "reservas": "online",
        "gateway": "offline",
        "pagos": null
    }))
    .unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!(report.status_of("reservas"), Some(ServiceStatus::Online));
    assert_eq!(report.status_of("pagos"), None, "null means no report for that id");

    let mut services = vec![service("pagos", ServiceStatus::Offline)];
    assert!(StatusReconciler::default().reconcile(&mut services, &report).is_empty());
}

#[test]
fn test_non_object_reports_are_malformed() {
    assert!(matches!(HealthReport::from_value(json!(["online"])), Err(ProbeError::Decode(_))));
    assert!(matches!(HealthReport::from_value(json!(null)), Err(ProbeError::Decode(_))));
    assert!(matches!(HealthReport::from_value(json!("online")), Err(ProbeError::Decode(_))));
}

#[test]
fn test_unknown_value_under_unregistered_id_is_ignored() {
    let report = HealthReport::from_value(json!({"reservas": "offline", "analisis": "starting"})).unwrap();
    assert_eq!(report.status_of("analisis"), None);

    let mut services = catalog::load();
    let changes = StatusReconciler::default().reconcile(&mut services, &report);
    assert_eq!(
        changes,
        vec![StatusChange {
            id: "reservas".to_string(),
            from: ServiceStatus::Online,
            to: ServiceStatus::Offline,
        }]
    );
}

#[test]
fn test_empty_or_invalid_value_means_no_report() {
    let report = HealthReport::from_value(json!({
        "reservas": "offline",
        "pagos": "",
        "inventario": "sideways",
        "busqueda": 7
    }))
    .unwrap();
    assert_eq!(report.status_of("pagos"), None);
    assert_eq!(report.status_of("inventario"), None);
    assert_eq!(report.status_of("busqueda"), None);

    let mut services = catalog::load();
    let changes = StatusReconciler::default().reconcile(&mut services, &report);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].id, "reservas");
    let initial = catalog::load();
    for (service, before) in services.iter().zip(&initial).filter(|(s, _)| s.id != "reservas") {
        assert_eq!(service, before, "{} is left untouched", service.id);
    }
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let services = vec![service("pagos", ServiceStatus::Online), service("pagos", ServiceStatus::Offline)];
    assert_eq!(ServiceRegistry::new(services).unwrap_err(), RegistryError::DuplicateId("pagos".to_string()));
}

#[test]
fn test_get_and_update() {
    let registry = ServiceRegistry::load().unwrap();
    assert!(registry.get("nope").is_none());
    assert_eq!(registry.get("pagos").unwrap().name, "Microservicio Pagos");

    assert_eq!(
        registry.update("nope", ServiceStatus::Offline, JUST_NOW),
        Err(RegistryError::UnknownId("nope".to_string()))
    );

    assert_eq!(registry.update("inventario", ServiceStatus::Maintenance, "Hace 1 min"), Ok(true));
    assert_eq!(registry.update("inventario", ServiceStatus::Maintenance, "Hace 1 min"), Ok(false));
    assert_eq!(registry.get("inventario").unwrap().status, ServiceStatus::Maintenance);
}

#[test]
fn test_apply_report_publishes_new_snapshot_only_on_change() {
    let registry = ServiceRegistry::load().unwrap();
    let mut rx = registry.subscribe();
    let old = registry.snapshot();
    let reconciler = StatusReconciler::default();

    let unchanged = HealthReport::new().with("reservas", ServiceStatus::Online);
    assert!(registry.apply_report(&reconciler, &unchanged).is_empty());
    assert!(!rx.has_changed().unwrap());

    let report = HealthReport::new().with("reservas", ServiceStatus::Offline);
    assert_eq!(registry.apply_report(&reconciler, &report).len(), 1);
    assert!(rx.has_changed().unwrap());

    let current = rx.borrow_and_update().clone();
    assert_eq!(current[0].status, ServiceStatus::Offline);
    assert_eq!(old[0].status, ServiceStatus::Online, "earlier snapshots are never mutated");
}
