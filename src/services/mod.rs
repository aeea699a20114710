pub mod client;
pub mod request;

pub use client::{BackendClient, HttpBackend};
pub use request::{Method, ProbeRequest};
