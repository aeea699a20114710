use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ProbeError;
use crate::services::ProbeRequest;
use super::types::{Hypothesis, ProbePath};

/// Body sent to both H1 endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationRequest {
    pub cliente: String,
    pub monto: u64,
}

impl Default for ReservationRequest {
    fn default() -> Self {
        Self { cliente: "Tester".to_string(), monto: 100 }
    }
}

/// Where and what each hypothesis sends. Fixed for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPlan {
    pub reservas_base: String,
    pub gateway_base: String,
    /// Reservation paid for by H2.
    pub reservation_id: u64,
    pub reservation: ReservationRequest,
}

impl ExperimentPlan {
    pub fn new(reservas_base: impl Into<String>, gateway_base: impl Into<String>) -> Self {
        Self {
            reservas_base: reservas_base.into().trim_end_matches('/').to_string(),
            gateway_base: gateway_base.into().trim_end_matches('/').to_string(),
            reservation_id: 1,
            reservation: ReservationRequest::default(),
        }
    }

    pub fn with_reservation_id(mut self, id: u64) -> Self {
        self.reservation_id = id;
        self
    }

    pub fn request(&self, hypothesis: Hypothesis, path: ProbePath) -> ProbeRequest {
        let naive = match path {
            ProbePath::Tactic => "",
            ProbePath::Naive => "/naive",
        };
        match hypothesis {
            Hypothesis::H1 => {
                let body = json!({ "cliente": self.reservation.cliente, "monto": self.reservation.monto });
                ProbeRequest::post(format!("{}/reservas{naive}", self.reservas_base), body)
            }
            Hypothesis::H2 => ProbeRequest::post(
                format!("{}/reservas/{}/pagar{naive}", self.reservas_base, self.reservation_id),
                json!({}),
            ),
            Hypothesis::H3 => ProbeRequest::get(format!("{}/search{naive}", self.gateway_base)),
        }
    }
}

/// Feed source label for one side of a hypothesis.
pub fn source_label(hypothesis: Hypothesis, path: ProbePath) -> &'static str {
    match (hypothesis, path) {
        (Hypothesis::H1, ProbePath::Tactic) => "Reservas",
        (Hypothesis::H1, ProbePath::Naive) => "Reservas (Naive)",
        (Hypothesis::H2, ProbePath::Tactic) => "Pagos",
        (Hypothesis::H2, ProbePath::Naive) => "Pagos (Naive)",
        (Hypothesis::H3, ProbePath::Tactic) => "Gateway",
        (Hypothesis::H3, ProbePath::Naive) => "Gateway (Naive)",
    }
}

fn side(path: ProbePath) -> &'static str {
    match path {
        ProbePath::Tactic => "CON",
        ProbePath::Naive => "SIN",
    }
}

fn field(payload: &Value, name: &str) -> String {
    match payload.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn start_message(hypothesis: Hypothesis) -> String {
    format!("Iniciando contraste {hypothesis}: {} vs Naive...", hypothesis.tactic_name())
}

pub fn success_message(hypothesis: Hypothesis, path: ProbePath, payload: &Value) -> String {
    let side = side(path);
    match hypothesis {
        Hypothesis::H1 => format!("✅ {side} Outbox: Reserva ID {}", field(payload, "id")),
        Hypothesis::H2 => format!("✅ {side} Votación: {}", field(payload, "mensaje")),
        Hypothesis::H3 => format!("✅ {side} Circuit Breaker: Búsqueda OK"),
    }
}

pub fn error_message(hypothesis: Hypothesis, path: ProbePath, error: &ProbeError) -> String {
    format!("❌ {} {}: {error}", side(path), hypothesis.tactic_name())
}
