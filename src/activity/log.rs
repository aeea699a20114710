use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;

use super::event::{ActivityEvent, EventId, EventKind};

#[derive(Debug)]
struct LogState {
    /// Newest at the front.
    events: VecDeque<ActivityEvent>,
    next_id: u64,
    capacity: Option<usize>,
    subscribers: Vec<mpsc::UnboundedSender<ActivityEvent>>,
}

/// Append-only, observable activity log.
///
/// Cloning yields another handle onto the same log. Appends are serialized
/// under one lock, so the order subscribers observe is the order in which
/// `append` calls were made.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    state: Arc<Mutex<LogState>>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    /// Unbounded log.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Keeps at most `max` events, evicting the oldest first.
    pub fn bounded(max: usize) -> Self {
        Self::with_capacity(Some(max))
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LogState {
                events: VecDeque::new(),
                next_id: 1,
                capacity,
                subscribers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        // A panic while holding the lock cannot leave the deque half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, message: impl Into<String>, source: impl Into<String>, kind: EventKind) -> EventId {
        let mut state = self.lock();

        let id = EventId(state.next_id);
        state.next_id += 1;

        let event = ActivityEvent {
            id,
            message: message.into(),
            source: source.into(),
            timestamp: Utc::now(),
            kind,
        };
        debug!(%id, source = %event.source, kind = %event.kind, "activity: {}", event.message);

        state.subscribers.retain(|tx| tx.send(event.clone()).is_ok());

        state.events.push_front(event);
        if let Some(max) = state.capacity {
            while state.events.len() > max {
                state.events.pop_back();
            }
        }

        id
    }

    pub fn info(&self, message: impl Into<String>, source: impl Into<String>) -> EventId {
        self.append(message, source, EventKind::Info)
    }

    pub fn success(&self, message: impl Into<String>, source: impl Into<String>) -> EventId {
        self.append(message, source, EventKind::Success)
    }

    pub fn error(&self, message: impl Into<String>, source: impl Into<String>) -> EventId {
        self.append(message, source, EventKind::Error)
    }

    /// Newest-first copy of the retained events.
    pub fn snapshot(&self) -> Vec<ActivityEvent> {
        self.lock().events.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.lock().capacity
    }

    /// Registers a subscriber. The feed starts from the current sequence and
    /// receives every event appended afterwards; snapshot and registration
    /// happen under the same lock, so nothing falls in between.
    pub fn subscribe(&self) -> ActivityFeed {
        let mut state = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.push(tx);
        ActivityFeed {
            view: state.events.clone(),
            capacity: state.capacity,
            rx,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

/// A subscriber's view of the log.
///
/// Holds its own newest-first mirror of the sequence, so every update can be
/// consumed either as the single new event (`recv`) or as the full current
/// sequence (`changed`).
#[derive(Debug)]
pub struct ActivityFeed {
    view: VecDeque<ActivityEvent>,
    capacity: Option<usize>,
    rx: mpsc::UnboundedReceiver<ActivityEvent>,
}

impl ActivityFeed {
    fn apply(&mut self, event: &ActivityEvent) {
        self.view.push_front(event.clone());
        if let Some(max) = self.capacity {
            while self.view.len() > max {
                self.view.pop_back();
            }
        }
    }

    /// Waits for the next appended event. `None` once every log handle is gone.
    pub async fn recv(&mut self) -> Option<ActivityEvent> {
        let event = self.rx.recv().await?;
        self.apply(&event);
        Some(event)
    }

    pub fn try_recv(&mut self) -> Option<ActivityEvent> {
        let event = self.rx.try_recv().ok()?;
        self.apply(&event);
        Some(event)
    }

    /// Waits for the next append and returns the full newest-first sequence.
    pub async fn changed(&mut self) -> Option<&[ActivityEvent]> {
        self.recv().await?;
        Some(self.view.make_contiguous())
    }

    pub fn current(&mut self) -> &[ActivityEvent] {
        self.view.make_contiguous()
    }
}
