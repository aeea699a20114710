use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::activity::{ActivityLog, EventKind};
use crate::services::HttpBackend;
use super::plan::{self, ExperimentPlan};
use super::types::{ExperimentBoard, Hypothesis, HypothesisState, PathOutcome, PathResult, ProbePath, RunPhase};

pub const FRONTEND_SOURCE: &str = "Frontend";

/// Rounds to the nearest whole millisecond.
pub fn round_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// The two in-flight sides of one run. Each completes on its own.
#[derive(Debug)]
pub struct RunHandle {
    pub hypothesis: Hypothesis,
    pub run_id: Uuid,
    pub tactic: JoinHandle<PathOutcome>,
    pub naive: JoinHandle<PathOutcome>,
}

impl RunHandle {
    /// Waits for both sides. A side whose task was aborted yields `None`.
    pub async fn join(self) -> (Option<PathOutcome>, Option<PathOutcome>) {
        let (tactic, naive) = tokio::join!(self.tactic, self.naive);
        (tactic.ok(), naive.ok())
    }

    pub fn abort(&self) {
        self.tactic.abort();
        self.naive.abort();
    }
}

/// Runs hypotheses against the live backends and reports into the feed.
#[derive(Clone)]
pub struct ExperimentRunner {
    backend: Arc<dyn HttpBackend>,
    activity: ActivityLog,
    plan: Arc<ExperimentPlan>,
    board: Arc<watch::Sender<ExperimentBoard>>,
}

impl ExperimentRunner {
    pub fn new(backend: Arc<dyn HttpBackend>, activity: ActivityLog, plan: ExperimentPlan) -> Self {
        let (board, _rx) = watch::channel(ExperimentBoard::default());
        Self {
            backend,
            activity,
            plan: Arc::new(plan),
            board: Arc::new(board),
        }
    }

    pub fn plan(&self) -> &ExperimentPlan {
        &self.plan
    }

    pub fn state(&self, hypothesis: Hypothesis) -> HypothesisState {
        self.board.borrow().get(hypothesis).clone()
    }

    pub fn is_loading(&self, hypothesis: Hypothesis) -> bool {
        self.board.borrow().get(hypothesis).is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExperimentBoard> {
        self.board.subscribe()
    }

    /// Starts both sides of `hypothesis` and returns immediately.
    ///
    /// Both requests are spawned before this returns, so neither waits on the
    /// other. Must be called from within a tokio runtime.
    pub fn run(&self, hypothesis: Hypothesis) -> RunHandle {
        let run_id = Uuid::new_v4();
        let span = info_span!("experiment", %hypothesis, %run_id);

        self.activity.info(plan::start_message(hypothesis), FRONTEND_SOURCE);

        let mut generation = 0;
        self.board.send_modify(|board| {
            let state = board.get_mut(hypothesis);
            state.generation += 1;
            state.phase = RunPhase::Running;
            state.run_id = Some(run_id);
            state.tactic = None;
            state.naive = None;
            generation = state.generation;
        });
        span.in_scope(|| info!(generation, "Experiment started"));

        let tactic = self.spawn_path(hypothesis, ProbePath::Tactic, generation, span.clone());
        let naive = self.spawn_path(hypothesis, ProbePath::Naive, generation, span);

        RunHandle { hypothesis, run_id, tactic, naive }
    }

    fn spawn_path(&self, hypothesis: Hypothesis, path: ProbePath, generation: u64, span: Span) -> JoinHandle<PathOutcome> {
        let request = self.plan.request(hypothesis, path);
        let runner = self.clone();

        tokio::spawn(
            async move {
                let started = Instant::now();
                let result = runner.backend.execute(&request).await;
                let elapsed_ms = round_ms(started.elapsed());

                let source = plan::source_label(hypothesis, path);
                let (result, message, kind) = match result {
                    Ok(payload) => {
                        info!(%path, elapsed_ms, "Path succeeded");
                        let message = plan::success_message(hypothesis, path, &payload);
                        (PathResult::Success(payload), message, EventKind::Success)
                    }
                    Err(e) => {
                        warn!(%path, elapsed_ms, error = %e, "Path failed");
                        let message = plan::error_message(hypothesis, path, &e);
                        (PathResult::Error(e.to_string()), message, EventKind::Error)
                    }
                };

                let outcome = PathOutcome { path, elapsed_ms, result };
                runner.record(hypothesis, generation, &outcome);
                runner.activity.append(message, source, kind);
                outcome
            }
            .instrument(span),
        )
    }

    fn record(&self, hypothesis: Hypothesis, generation: u64, outcome: &PathOutcome) {
        self.board.send_if_modified(|board| {
            let state = board.get_mut(hypothesis);
            if state.generation != generation {
                // Superseded by a newer run of the same hypothesis.
                return false;
            }
            match outcome.path {
                ProbePath::Tactic => state.tactic = Some(outcome.clone()),
                ProbePath::Naive => {
                    state.naive = Some(outcome.clone());
                    state.phase = RunPhase::Done;
                }
            }
            true
        });
    }
}
