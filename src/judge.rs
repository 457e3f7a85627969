// src/judge.rs
//
// Submission orchestrator: drives templater -> execution client ->
// classifier per test case, strictly in ordinal order, and aggregates the
// per-case verdicts into one final submission outcome.

use chrono::Utc;
use log::{error, info, warn};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::classifier;
use crate::database;
use crate::errors::{JudgeError, Result};
use crate::executor::ExecutionBackend;
use crate::models::{Problem, TestCase, TestResult, Verdict};
use crate::stats;
use crate::templates;

/// Aggregated outcome of one judging run. `execution_time_ms` is the mean
/// over evaluated cases; `memory_used_mb` the peak.
#[derive(Debug, Clone)]
pub struct JudgeOutcome {
    pub verdict: Verdict,
    pub test_cases_passed: u32,
    pub test_cases_total: u32,
    pub execution_time_ms: u64,
    pub memory_used_mb: f64,
    pub error_message: Option<String>,
    pub results: Vec<TestResult>,
}

/// What the caller gets back: the outcome plus only the sample test results.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SubmissionReport {
    pub submission_id: Uuid,
    pub verdict: Verdict,
    pub test_cases_passed: u32,
    pub test_cases_total: u32,
    pub execution_time_ms: u64,
    pub memory_used_mb: f64,
    pub error_message: Option<String>,
    pub sample_test_results: Vec<TestResult>,
}

/// Error detail accompanying a verdict, drawn from the record that set it.
fn detail_for(verdict: Verdict, raw: &crate::models::RawExecutionResult) -> Option<String> {
    let source = match verdict {
        Verdict::CompilationError => raw.compile_output.as_deref(),
        Verdict::RuntimeError | Verdict::TimeLimitExceeded => raw.stderr.as_deref(),
        _ => None,
    };
    source.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Judges one submission against its ordered test cases. Never fails:
/// transport errors fold into a `RuntimeError` outcome so the caller always
/// receives a verdict and counts.
pub async fn run_judging(
    backend: &dyn ExecutionBackend,
    problem: &Problem,
    cases: &[TestCase],
    code: &str,
    language: &str,
) -> JudgeOutcome {
    let template = templates::template_for(language);
    let starter = problem.starter_for(language);

    let mut verdict = Verdict::Accepted;
    let mut error_message: Option<String> = None;
    let mut passed = 0u32;
    let mut evaluated = 0u32;
    let mut total_time_ms = 0u64;
    let mut peak_memory_mb = 0f64;
    let mut results = Vec::with_capacity(cases.len());

    for case in cases {
        let prepared = template.prepare(code, starter, &case.input);

        let raw = match backend
            .execute(&prepared.source, &prepared.stdin, language, problem.time_limit_ms)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                // Fail fast: remaining cases are not evaluated; totals keep
                // the full case count.
                warn!(
                    "execution transport failure on case {} of problem {}: {}",
                    case.ordinal, problem.id, e
                );
                if Verdict::RuntimeError.severity() >= verdict.severity() {
                    verdict = Verdict::RuntimeError;
                    error_message = Some(e.to_string());
                }
                break;
            }
        };

        let classification = classifier::classify(&raw, &case.expected_output);
        evaluated += 1;
        if classification.passed {
            passed += 1;
        }

        let time_ms = raw.time_ms();
        let memory_mb = raw.memory_mb();
        total_time_ms += time_ms;
        if memory_mb > peak_memory_mb {
            peak_memory_mb = memory_mb;
        }

        // The final verdict is the worst one observed across all cases, not
        // the last one; the error detail tracks whichever case set it.
        if classification.verdict.severity() > verdict.severity() {
            verdict = classification.verdict;
            error_message = detail_for(classification.verdict, &raw);
        }

        results.push(TestResult {
            input: case.input.clone(),
            expected_output: case.expected_output.clone(),
            actual_output: classification.actual_output,
            passed: classification.passed,
            execution_time_ms: time_ms,
            memory_used_mb: memory_mb,
            is_sample: case.is_sample,
        });
    }

    let execution_time_ms = if evaluated > 0 {
        total_time_ms / u64::from(evaluated)
    } else {
        0
    };

    JudgeOutcome {
        verdict,
        test_cases_passed: passed,
        test_cases_total: cases.len() as u32,
        execution_time_ms,
        memory_used_mb: peak_memory_mb,
        error_message,
        results,
    }
}

/// Full submission flow: load the problem and its cases, create a pending
/// submission row, judge, finalize the row exactly once, reconcile stats and
/// return the sample-only report. Persistence failures after judging are
/// logged without corrupting the in-flight response.
pub async fn submit(
    pool: &SqlitePool,
    backend: &dyn ExecutionBackend,
    user_id: Uuid,
    problem_id: Uuid,
    code: &str,
    language: &str,
) -> Result<SubmissionReport> {
    let problem = database::fetch_problem(pool, problem_id)
        .await?
        .ok_or(JudgeError::ProblemNotFound(problem_id))?;
    let cases = database::fetch_test_cases(pool, problem_id).await?;

    let submission_id = Uuid::new_v4();
    database::insert_pending_submission(
        pool,
        submission_id,
        user_id,
        problem_id,
        language,
        cases.len() as u32,
        Utc::now(),
    )
    .await?;

    info!(
        "judging submission {} (user={}, problem={}, language={}, cases={})",
        submission_id,
        user_id,
        problem_id,
        language,
        cases.len()
    );

    let outcome = run_judging(backend, &problem, &cases, code, language).await;

    info!(
        "submission {} finished: {} ({}/{} passed)",
        submission_id, outcome.verdict, outcome.test_cases_passed, outcome.test_cases_total
    );

    if let Err(e) = database::finalize_submission(pool, submission_id, &outcome).await {
        error!("failed to finalize submission {}: {}", submission_id, e);
    }

    if let Err(e) = stats::reconcile(pool, user_id, problem_id, &outcome, problem.points).await {
        if outcome.verdict == Verdict::Accepted {
            // A solved transition must not be dropped silently; give the
            // reconciliation one more chance before logging it away.
            warn!(
                "stats reconciliation failed for user {} problem {}, retrying: {}",
                user_id, problem_id, e
            );
            if let Err(e) =
                stats::reconcile(pool, user_id, problem_id, &outcome, problem.points).await
            {
                error!(
                    "stats reconciliation gave up for user {} problem {}: {}",
                    user_id, problem_id, e
                );
            }
        } else {
            error!(
                "stats reconciliation failed for user {} problem {}: {}",
                user_id, problem_id, e
            );
        }
    }

    let sample_test_results = outcome
        .results
        .iter()
        .filter(|r| r.is_sample)
        .cloned()
        .collect();

    Ok(SubmissionReport {
        submission_id,
        verdict: outcome.verdict,
        test_cases_passed: outcome.test_cases_passed,
        test_cases_total: outcome.test_cases_total,
        execution_time_ms: outcome.execution_time_ms,
        memory_used_mb: outcome.memory_used_mb,
        error_message: outcome.error_message,
        sample_test_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{
        STATUS_ACCEPTED, STATUS_COMPILATION_ERROR, STATUS_RUNTIME_ERROR_NZEC,
    };
    use crate::models::RawExecutionResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Backend that replays a scripted sequence of execution records.
    struct ScriptedBackend {
        script: Mutex<Vec<Result<RawExecutionResult>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<RawExecutionResult>>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ExecutionBackend for ScriptedBackend {
        async fn execute(
            &self,
            _source: &str,
            _stdin: &str,
            _language: &str,
            _time_limit_ms: u64,
        ) -> Result<RawExecutionResult> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(RawExecutionResult::default()))
        }
    }

    fn problem() -> Problem {
        Problem {
            id: Uuid::new_v4(),
            title: "Sum".to_string(),
            starter_code: HashMap::from([(
                "python".to_string(),
                "def add_one(n):\n    pass\n".to_string(),
            )]),
            points: 100,
            time_limit_ms: 2_000,
        }
    }

    fn cases(problem_id: Uuid, expected: &[&str]) -> Vec<TestCase> {
        expected
            .iter()
            .enumerate()
            .map(|(i, out)| TestCase {
                problem_id,
                ordinal: i as i64,
                input: format!("{}", i),
                expected_output: out.to_string(),
                is_sample: i == 0,
            })
            .collect()
    }

    fn accepted(stdout: &str) -> Result<RawExecutionResult> {
        Ok(RawExecutionResult {
            status: STATUS_ACCEPTED,
            stdout: Some(stdout.to_string()),
            time: Some(0.01),
            memory: Some(2048.0),
            ..Default::default()
        })
    }

    #[actix_rt::test]
    async fn all_cases_pass_yields_accepted() {
        let p = problem();
        let cs = cases(p.id, &["1", "2", "3"]);
        let backend = ScriptedBackend::new(vec![accepted("1"), accepted("2"), accepted("3")]);

        let outcome = run_judging(&backend, &p, &cs, "def add_one(n):\n    return n + 1", "python").await;

        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert_eq!(outcome.test_cases_passed, 3);
        assert_eq!(outcome.test_cases_total, 3);
        assert_eq!(outcome.execution_time_ms, 10);
        assert_eq!(outcome.memory_used_mb, 2.0);
        assert!(outcome.error_message.is_none());
    }

    #[actix_rt::test]
    async fn one_mismatch_yields_wrong_answer_without_aborting() {
        let p = problem();
        let cs = cases(p.id, &["1", "2", "3"]);
        let backend = ScriptedBackend::new(vec![accepted("1"), accepted("99"), accepted("3")]);

        let outcome = run_judging(&backend, &p, &cs, "code", "python").await;

        assert_eq!(outcome.verdict, Verdict::WrongAnswer);
        assert_eq!(outcome.test_cases_passed, 2);
        assert_eq!(outcome.test_cases_total, 3);
        // All cases still execute; a wrong answer does not abort the run.
        assert_eq!(backend.calls(), 3);
    }

    #[actix_rt::test]
    async fn worst_verdict_wins_over_later_passes() {
        let p = problem();
        let cs = cases(p.id, &["1", "2", "3"]);
        let backend = ScriptedBackend::new(vec![
            Ok(RawExecutionResult {
                status: STATUS_COMPILATION_ERROR,
                compile_output: Some("error: expected ';'".to_string()),
                ..Default::default()
            }),
            accepted("2"),
            accepted("3"),
        ]);

        let outcome = run_judging(&backend, &p, &cs, "code", "python").await;

        assert_eq!(outcome.verdict, Verdict::CompilationError);
        assert_eq!(outcome.test_cases_passed, 2);
        assert_eq!(outcome.error_message.as_deref(), Some("error: expected ';'"));
    }

    #[actix_rt::test]
    async fn compilation_error_outranks_runtime_error() {
        let p = problem();
        let cs = cases(p.id, &["1", "2"]);
        let backend = ScriptedBackend::new(vec![
            Ok(RawExecutionResult {
                status: STATUS_RUNTIME_ERROR_NZEC,
                stderr: Some("boom".to_string()),
                ..Default::default()
            }),
            Ok(RawExecutionResult {
                status: STATUS_COMPILATION_ERROR,
                compile_output: Some("syntax error".to_string()),
                ..Default::default()
            }),
        ]);

        let outcome = run_judging(&backend, &p, &cs, "code", "python").await;

        assert_eq!(outcome.verdict, Verdict::CompilationError);
        assert_eq!(outcome.error_message.as_deref(), Some("syntax error"));
    }

    #[actix_rt::test]
    async fn transport_failure_aborts_and_keeps_totals() {
        let p = problem();
        let cs = cases(p.id, &["1", "2", "3", "4"]);
        let backend = ScriptedBackend::new(vec![
            accepted("1"),
            Err(JudgeError::Execution {
                status: 503,
                body: "unavailable".to_string(),
            }),
            accepted("3"),
            accepted("4"),
        ]);

        let outcome = run_judging(&backend, &p, &cs, "code", "python").await;

        assert_eq!(outcome.verdict, Verdict::RuntimeError);
        assert_eq!(outcome.test_cases_passed, 1);
        assert_eq!(outcome.test_cases_total, 4);
        assert_eq!(backend.calls(), 2);
        assert!(outcome.error_message.unwrap().contains("503"));
    }

    #[actix_rt::test]
    async fn sample_flag_survives_into_results() {
        let p = problem();
        let cs = cases(p.id, &["1", "2"]);
        let backend = ScriptedBackend::new(vec![accepted("1"), accepted("2")]);

        let outcome = run_judging(&backend, &p, &cs, "code", "python").await;

        assert!(outcome.results[0].is_sample);
        assert!(!outcome.results[1].is_sample);
    }

    #[actix_rt::test]
    async fn no_cases_judges_vacuously_accepted() {
        let p = problem();
        let backend = ScriptedBackend::new(vec![]);

        let outcome = run_judging(&backend, &p, &[], "code", "python").await;

        assert_eq!(outcome.verdict, Verdict::Accepted);
        assert_eq!(outcome.test_cases_total, 0);
        assert_eq!(outcome.execution_time_ms, 0);
        assert_eq!(backend.calls(), 0);
    }
}
