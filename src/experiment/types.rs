use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One paired tactic-vs-naive experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hypothesis {
    /// Reservation outbox.
    H1,
    /// Payment voting across replicas.
    H2,
    /// Search behind a circuit breaker.
    H3,
}

impl Hypothesis {
    pub const ALL: [Hypothesis; 3] = [Hypothesis::H1, Hypothesis::H2, Hypothesis::H3];

    fn index(&self) -> usize {
        match self {
            Hypothesis::H1 => 0,
            Hypothesis::H2 => 1,
            Hypothesis::H3 => 2,
        }
    }

    /// Name of the reliability tactic under test, as shown in the feed.
    pub fn tactic_name(&self) -> &'static str {
        match self {
            Hypothesis::H1 => "Outbox",
            Hypothesis::H2 => "Votación",
            Hypothesis::H3 => "Circuit Breaker",
        }
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.index() + 1)
    }
}

impl FromStr for Hypothesis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h1" | "1" => Ok(Hypothesis::H1),
            "h2" | "2" => Ok(Hypothesis::H2),
            "h3" | "3" => Ok(Hypothesis::H3),
            other => Err(format!("unknown hypothesis '{other}' (expected h1, h2 or h3)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbePath {
    /// Endpoint implementing the reliability pattern.
    Tactic,
    /// Same operation without it; the baseline.
    Naive,
}

impl fmt::Display for ProbePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbePath::Tactic => f.write_str("tactic"),
            ProbePath::Naive => f.write_str("naive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathResult {
    Success(Value),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub path: ProbePath,
    pub elapsed_ms: u64,
    pub result: PathResult,
}

impl PathOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, PathResult::Success(_))
    }
}

/// `Running` ends only when the naive path completes. The tactic path
/// finishing first does not end the run, and a run whose naive path never
/// completes stays `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Done,
}

/// Display state of one hypothesis: phase plus the last result per path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HypothesisState {
    pub phase: RunPhase,
    /// Bumped on every run; completions of older runs no longer write here.
    pub generation: u64,
    pub run_id: Option<Uuid>,
    pub tactic: Option<PathOutcome>,
    pub naive: Option<PathOutcome>,
}

impl HypothesisState {
    pub fn is_loading(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn outcome(&self, path: ProbePath) -> Option<&PathOutcome> {
        match path {
            ProbePath::Tactic => self.tactic.as_ref(),
            ProbePath::Naive => self.naive.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperimentBoard {
    states: [HypothesisState; 3],
}

impl ExperimentBoard {
    pub fn get(&self, hypothesis: Hypothesis) -> &HypothesisState {
        &self.states[hypothesis.index()]
    }

    pub fn get_mut(&mut self, hypothesis: Hypothesis) -> &mut HypothesisState {
        &mut self.states[hypothesis.index()]
    }
}
