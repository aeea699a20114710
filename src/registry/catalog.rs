use super::types::{ServiceDescriptor, ServiceStatus};

fn descriptor(
    id: &str,
    name: &str,
    status: ServiceStatus,
    description: &str,
    detail: &str,
    tags: &[&str],
    last_updated: &str,
) -> ServiceDescriptor {
    ServiceDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        status,
        description: description.to_string(),
        detail: Some(detail.to_string()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        last_updated: last_updated.to_string(),
        url: None,
    }
}

/// The fixed startup catalog, in display order.
pub fn load() -> Vec<ServiceDescriptor> {
    vec![
        descriptor(
            "reservas",
            "Microservicio Reservas",
            ServiceStatus::Online,
            "Gestiona la creación y administración de reservas.",
            "Hipótesis 1: si un microservicio cae y vuelve, puede resincronizar su estado \
             automáticamente (Outbox + Polling Consumer).",
            &["Core", "Base de Datos"],
            "Recién",
        ),
        descriptor(
            "pagos",
            "Microservicio Pagos",
            ServiceStatus::Online,
            "Procesa pagos y consenso entre réplicas.",
            "Hipótesis 2: un sistema de votación con 5 réplicas puede detectar una réplica \
             defectuosa mediante consenso.",
            &["Finanzas", "Seguridad"],
            "Hace 1 min",
        ),
        descriptor(
            "inventario",
            "Microservicio Inventario",
            ServiceStatus::Online,
            "Gestiona la disponibilidad de productos.",
            "Servicio encargado del stock. Se sincroniza con Reservas mediante eventos asíncronos.",
            &["Logística"],
            "Hace 5 min",
        ),
        descriptor(
            "monitor",
            "Microservicio Monitor",
            ServiceStatus::Degraded,
            "Monitoreo de salud del sistema.",
            "Monitorea la salud de los servicios y alerta sobre degradaciones o fallos.",
            &["Infraestructura"],
            "Hace 10 min",
        ),
        descriptor(
            "busqueda",
            "Microservicio Búsqueda",
            ServiceStatus::Online,
            "Funcionalidad de búsqueda vía Gateway.",
            "Hipótesis 3: un Circuit Breaker puede degradar funcionalidad automáticamente sin \
             que el usuario perciba error.",
            &["Gateway", "Búsqueda"],
            "Recién",
        ),
    ]
}
