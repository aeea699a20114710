use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label written to `last_updated` when reconciliation changes a status.
pub const JUST_NOW: &str = "Ahora";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Online,
    Offline,
    Degraded,
    Maintenance,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Online => "online",
            ServiceStatus::Offline => "offline",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(ServiceStatus::Online),
            "offline" => Ok(ServiceStatus::Offline),
            "degraded" => Ok(ServiceStatus::Degraded),
            "maintenance" => Ok(ServiceStatus::Maintenance),
            other => Err(format!("unknown service status '{other}'")),
        }
    }
}

/// A service card. Only `status` and `last_updated` ever change after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub id: String,
    pub name: String,
    pub status: ServiceStatus,
    pub description: String,
    pub detail: Option<String>,
    pub tags: Vec<String>,
    pub last_updated: String,
    pub url: Option<String>,
}
