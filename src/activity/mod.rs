//! User-facing activity feed.
//!
//! Experiments and the dashboard write here. Health-probe failures do not:
//! they go to the diagnostic log only, so a dead monitor does not flood the
//! feed every poll cycle.

pub mod event;
pub mod log;

pub use event::{ActivityEvent, EventId, EventKind};
pub use log::{ActivityFeed, ActivityLog};
