use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ProbeError;
use crate::registry::ServiceStatus;

/// Body of `GET /health-check`: service id -> coarse status.
///
/// Only the outer object shape is checked on decode. Values are read lazily
/// per id: `null`, `""` and anything that is not one of the four statuses
/// count as "no report" for that id, so a stray key never costs the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthReport {
    entries: BTreeMap<String, Value>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, status: ServiceStatus) -> Self {
        self.entries.insert(id.into(), Value::String(status.as_str().to_string()));
        self
    }

    /// Fails only when the body is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, ProbeError> {
        match value {
            Value::Object(map) => Ok(Self { entries: map.into_iter().collect() }),
            other => Err(ProbeError::Decode(format!("expected an object, got {other}"))),
        }
    }

    pub fn status_of(&self, id: &str) -> Option<ServiceStatus> {
        match self.entries.get(id)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => match s.parse() {
                Ok(status) => Some(status),
                Err(e) => {
                    debug!(id, "ignoring health entry: {e}");
                    None
                }
            },
            other => {
                debug!(id, value = %other, "ignoring non-string health entry");
                None
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ServiceStatus)> for HealthReport {
    fn from_iter<I: IntoIterator<Item = (K, ServiceStatus)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.as_str().to_string())))
                .collect(),
        }
    }
}
