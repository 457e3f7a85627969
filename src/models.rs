// src/models.rs
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed verdict taxonomy. Every judged test case and every finalized
/// submission carries exactly one of these; an unrecognized provider status
/// always classifies as `RuntimeError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    CompilationError,
    RuntimeError,
    TimeLimitExceeded,
}

impl Verdict {
    /// Rank used to keep the worst verdict observed across a submission's
    /// test cases. Higher is worse.
    pub fn severity(self) -> u8 {
        match self {
            Verdict::Accepted => 0,
            Verdict::WrongAnswer => 1,
            Verdict::TimeLimitExceeded => 2,
            Verdict::RuntimeError => 3,
            Verdict::CompilationError => 4,
        }
    }

    pub fn worst(self, other: Verdict) -> Verdict {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::WrongAnswer => "wrong_answer",
            Verdict::CompilationError => "compilation_error",
            Verdict::RuntimeError => "runtime_error",
            Verdict::TimeLimitExceeded => "time_limit_exceeded",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coding problem as supplied by the problem catalog. Read-only for the
/// duration of a judging run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    /// Per-language starter code, keyed by internal language name.
    pub starter_code: HashMap<String, String>,
    pub points: i64,
    pub time_limit_ms: u64,
}

impl Problem {
    pub fn starter_for(&self, language: &str) -> &str {
        self.starter_code.get(language).map(String::as_str).unwrap_or("")
    }
}

/// One test case of a problem. Cases are always evaluated in ascending
/// `ordinal` order; only cases with `is_sample` set are ever shown to the
/// caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub problem_id: Uuid,
    pub ordinal: i64,
    pub input: String,
    pub expected_output: String,
    pub is_sample: bool,
}

/// Raw record returned by the execution service for one (program, stdin)
/// run. Ephemeral; only derived fields survive into a [`TestResult`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExecutionResult {
    /// Provider-defined integer status code.
    pub status: i32,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    /// Wall time in seconds, as reported by the provider.
    #[serde(default)]
    pub time: Option<f64>,
    /// Peak memory in kilobytes.
    #[serde(default)]
    pub memory: Option<f64>,
}

impl RawExecutionResult {
    pub fn time_ms(&self) -> u64 {
        (self.time.unwrap_or(0.0) * 1000.0).round() as u64
    }

    pub fn memory_mb(&self) -> f64 {
        self.memory.unwrap_or(0.0) / 1024.0
    }
}

/// Per-test-case outcome derived by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub execution_time_ms: u64,
    pub memory_used_mb: f64,
    pub is_sample: bool,
}

/// Durable per-user/per-problem statistics row. One row per (user, problem)
/// pair; `solved` is monotonic and `points_earned` is written exactly once,
/// on the first transition to solved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProblemStat {
    pub user_id: Uuid,
    pub problem_id: Uuid,
    pub attempts: i64,
    pub solved: bool,
    pub best_time_ms: Option<i64>,
    pub best_memory_mb: Option<f64>,
    pub points_earned: i64,
    pub last_attempted_at: DateTime<Utc>,
}
