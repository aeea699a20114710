//! Error types shared by the harness.
//!
//! None of these are fatal. Probe errors become error outcomes in the
//! activity feed (experiments) or diagnostic log lines (health polling).

/// Failure of a single outbound HTTP probe.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("transport error: {0}")]
    Transport(String),

    /// The configured request timeout expired.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Backend answered with a non-2xx status.
    #[error("HTTP {status} {reason}{}", detail_suffix(.detail))]
    Status {
        status: u16,
        reason: String,
        /// The backend's `error` field, when the body carried one.
        detail: Option<String>,
    },

    /// Body was not the JSON shape we expected.
    #[error("malformed response body: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate service id '{0}'")]
    DuplicateId(String),

    #[error("unknown service id '{0}'")]
    UnknownId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL for {0} is empty")]
    EmptyBaseUrl(&'static str),

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
}

/// Anything that can stop the dashboard from being assembled.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("service registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] ProbeError),
}
