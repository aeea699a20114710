#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use testbed_harness::error::ProbeError;
use testbed_harness::services::{HttpBackend, ProbeRequest};

#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Err(ProbeError),
    /// Never completes.
    Pending,
}

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    reply: Reply,
}

/// Backend fake keyed by URL. Each URL holds a queue of replies; the last
/// one repeats once the others are used up. Unknown URLs are refused.
#[derive(Default)]
pub struct ScriptedBackend {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<ProbeRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, url: &str, delay_ms: u64, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(Scripted { delay: Duration::from_millis(delay_ms), reply });
    }

    pub fn calls(&self) -> Vec<ProbeRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| r.url == url).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_script(&self, url: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(url)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn execute(&self, request: &ProbeRequest) -> Result<Value, ProbeError> {
        self.calls.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let Some(script) = self.next_script(&request.url) else {
            return Err(ProbeError::Transport("connection refused".to_string()));
        };
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        match script.reply {
            Reply::Ok(value) => Ok(value),
            Reply::Err(e) => Err(e),
            Reply::Pending => std::future::pending::<Result<Value, ProbeError>>().await,
        }
    }
}
