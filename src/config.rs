use std::time::Duration;

use crate::error::ConfigError;
use crate::health::DEFAULT_POLL_INTERVAL;

pub const DEFAULT_RESERVAS: &str = "127.0.0.1:5002";
pub const DEFAULT_GATEWAY: &str = "127.0.0.1:5007";
pub const DEFAULT_MONITOR: &str = "127.0.0.1:5006";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Normalized base URLs of the three backends the harness talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrls {
    pub reservas: String,
    pub gateway: String,
    pub monitor: String,
}

impl Default for BackendUrls {
    fn default() -> Self {
        Self {
            reservas: format!("http://{DEFAULT_RESERVAS}"),
            gateway: format!("http://{DEFAULT_GATEWAY}"),
            monitor: format!("http://{DEFAULT_MONITOR}"),
        }
    }
}

impl BackendUrls {
    /// Accepts `host:port` or full URLs.
    pub fn new(reservas: &str, gateway: &str, monitor: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            reservas: normalize_base("reservas", reservas)?,
            gateway: normalize_base("gateway", gateway)?,
            monitor: normalize_base("monitor", monitor)?,
        })
    }
}

/// `host:port` -> `http://host:port`; trailing slashes dropped.
pub fn normalize_base(name: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl(name));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("http://{trimmed}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub backends: BackendUrls,
    pub poll_interval: Duration,
    /// Applied to every health and experiment request.
    pub request_timeout: Duration,
    /// `None` keeps the whole session's activity.
    pub activity_capacity: Option<usize>,
    pub reservation_id: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            backends: BackendUrls::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            activity_capacity: None,
            reservation_id: 1,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::NonPositive("poll interval"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::NonPositive("request timeout"));
        }
        if self.activity_capacity == Some(0) {
            return Err(ConfigError::NonPositive("activity capacity"));
        }
        Ok(())
    }
}

