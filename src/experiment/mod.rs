//! Paired tactic-vs-naive experiments.
//!
//! Each run fires the tactic and the naive request at once and times them
//! independently. Results land in the activity feed in completion order and in
//! the per-hypothesis board for display.

pub mod plan;
pub mod runner;
pub mod types;

pub use plan::{ExperimentPlan, ReservationRequest};
pub use runner::{round_ms, ExperimentRunner, RunHandle, FRONTEND_SOURCE};
pub use types::{ExperimentBoard, Hypothesis, HypothesisState, PathOutcome, PathResult, ProbePath, RunPhase};
