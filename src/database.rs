// src/database.rs
use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::info;
use sqlx::migrate::Migrator;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use uuid::Uuid;

use crate::judge::JudgeOutcome;
use crate::models::{Problem, TestCase, TestResult, UserProblemStat};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db() -> Result<SqlitePool, sqlx::Error> {
    let db_path = get_db_path()?;

    // Create parent directory before attempting to connect.
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
    }

    let absolute_path = if db_path.is_relative() {
        std::env::current_dir()
            .map_err(sqlx::Error::Io)?
            .join(&db_path)
    } else {
        db_path.clone()
    };

    let db_url = format!("sqlite://{}?mode=rwc", absolute_path.display());
    info!("connecting to {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!("database migrations completed");

    Ok(pool)
}

fn get_db_path() -> Result<PathBuf, sqlx::Error> {
    let db_url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let db_path_str = db_url.strip_prefix("sqlite:").ok_or_else(|| {
        sqlx::Error::Configuration("DATABASE_URL must start with 'sqlite:'".into())
    })?;

    Ok(PathBuf::from(db_path_str))
}

// ---------------------------------------------------------------------------
// Problem catalog (read-only during judging; the insert helpers exist for
// the authoring collaborator and for tests)

pub async fn fetch_problem(pool: &SqlitePool, id: Uuid) -> Result<Option<Problem>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, title, starter_code, points, time_limit_ms FROM problems WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|row| {
        let starter_json: String = row.get(2);
        let starter_code: HashMap<String, String> =
            serde_json::from_str(&starter_json).unwrap_or_default();
        Ok(Problem {
            id,
            title: row.get(1),
            starter_code,
            points: row.get(3),
            time_limit_ms: row.get::<i64, _>(4) as u64,
        })
    })
    .transpose()
}

pub async fn fetch_test_cases(
    pool: &SqlitePool,
    problem_id: Uuid,
) -> Result<Vec<TestCase>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT ordinal, input, expected_output, is_sample
        FROM test_cases
        WHERE problem_id = ?
        ORDER BY ordinal ASC
        "#,
    )
    .bind(problem_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| TestCase {
            problem_id,
            ordinal: row.get(0),
            input: row.get(1),
            expected_output: row.get(2),
            is_sample: row.get::<i64, _>(3) != 0,
        })
        .collect())
}

pub async fn insert_problem(pool: &SqlitePool, problem: &Problem) -> Result<(), sqlx::Error> {
    let starter_json =
        serde_json::to_string(&problem.starter_code).unwrap_or_else(|_| "{}".to_string());
    sqlx::query(
        r#"
        INSERT INTO problems (id, title, starter_code, points, time_limit_ms)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(problem.id.to_string())
    .bind(&problem.title)
    .bind(starter_json)
    .bind(problem.points)
    .bind(problem.time_limit_ms as i64)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_test_case(pool: &SqlitePool, case: &TestCase) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO test_cases (problem_id, ordinal, input, expected_output, is_sample)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(case.problem_id.to_string())
    .bind(case.ordinal)
    .bind(&case.input)
    .bind(&case.expected_output)
    .bind(case.is_sample as i64)
    .execute(pool)
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Submission store

pub async fn insert_pending_submission(
    pool: &SqlitePool,
    id: Uuid,
    user_id: Uuid,
    problem_id: Uuid,
    language: &str,
    total: u32,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO submissions (id, user_id, problem_id, language, verdict, test_cases_total, created_at)
        VALUES (?, ?, ?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(problem_id.to_string())
    .bind(language)
    .bind(total as i64)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Finalizes a pending submission. The `verdict = 'pending'` guard makes the
/// transition terminal; a submission is never re-finalized.
pub async fn finalize_submission(
    pool: &SqlitePool,
    id: Uuid,
    outcome: &JudgeOutcome,
) -> Result<(), sqlx::Error> {
    let sample_results: Vec<&TestResult> =
        outcome.results.iter().filter(|r| r.is_sample).collect();
    let sample_json = serde_json::to_string(&sample_results).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        r#"
        UPDATE submissions
        SET verdict = ?, test_cases_passed = ?, test_cases_total = ?,
            execution_time_ms = ?, memory_used_mb = ?, error_message = ?,
            sample_results = ?
        WHERE id = ? AND verdict = 'pending'
        "#,
    )
    .bind(outcome.verdict.as_str())
    .bind(outcome.test_cases_passed as i64)
    .bind(outcome.test_cases_total as i64)
    .bind(outcome.execution_time_ms as i64)
    .bind(outcome.memory_used_mb)
    .bind(&outcome.error_message)
    .bind(sample_json)
    .bind(id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// Stored submission row as rendered to callers.
#[derive(serde::Serialize, Clone)]
pub struct SubmissionRecord {
    pub id: String,
    pub user_id: String,
    pub problem_id: String,
    pub language: String,
    pub verdict: String,
    pub test_cases_passed: i64,
    pub test_cases_total: i64,
    pub execution_time_ms: i64,
    pub memory_used_mb: f64,
    pub error_message: Option<String>,
    pub sample_test_results: Vec<TestResult>,
    pub created_at: String,
}

fn submission_from_row(row: sqlx::sqlite::SqliteRow) -> SubmissionRecord {
    let sample_json: Option<String> = row.get(10);
    let sample_test_results = sample_json
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();
    SubmissionRecord {
        id: row.get(0),
        user_id: row.get(1),
        problem_id: row.get(2),
        language: row.get(3),
        verdict: row.get(4),
        test_cases_passed: row.get(5),
        test_cases_total: row.get(6),
        execution_time_ms: row.get(7),
        memory_used_mb: row.get(8),
        error_message: row.get(9),
        sample_test_results,
        created_at: row.get(11),
    }
}

const SUBMISSION_COLUMNS: &str = "id, user_id, problem_id, language, verdict, \
    test_cases_passed, test_cases_total, execution_time_ms, memory_used_mb, \
    error_message, sample_results, created_at";

pub async fn get_submission(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<SubmissionRecord>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM submissions WHERE id = ?",
        SUBMISSION_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(submission_from_row))
}

pub async fn list_user_submissions(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<SubmissionRecord>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM submissions WHERE user_id = ? ORDER BY created_at DESC",
        SUBMISSION_COLUMNS
    ))
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(submission_from_row).collect())
}

// ---------------------------------------------------------------------------
// UserProblemStat store

pub async fn get_stat(
    pool: &SqlitePool,
    user_id: Uuid,
    problem_id: Uuid,
) -> Result<Option<UserProblemStat>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT attempts, solved, best_time_ms, best_memory_mb, points_earned, last_attempted_at
        FROM user_problem_stats
        WHERE user_id = ? AND problem_id = ?
        "#,
    )
    .bind(user_id.to_string())
    .bind(problem_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        let last: String = row.get(5);
        UserProblemStat {
            user_id,
            problem_id,
            attempts: row.get(0),
            solved: row.get::<i64, _>(1) != 0,
            best_time_ms: row.get(2),
            best_memory_mb: row.get(3),
            points_earned: row.get(4),
            last_attempted_at: DateTime::parse_from_rfc3339(&last)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }))
}

pub async fn insert_stat(
    pool: &SqlitePool,
    stat: &UserProblemStat,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_problem_stats
            (user_id, problem_id, attempts, solved, best_time_ms, best_memory_mb,
             points_earned, last_attempted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(stat.user_id.to_string())
    .bind(stat.problem_id.to_string())
    .bind(stat.attempts)
    .bind(stat.solved as i64)
    .bind(stat.best_time_ms)
    .bind(stat.best_memory_mb)
    .bind(stat.points_earned)
    .bind(stat.last_attempted_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Updates the row only if it still carries the attempts count read before
/// merging; returns the affected-row count so the caller can detect a
/// concurrent writer and re-reconcile.
pub async fn update_stat_guarded(
    pool: &SqlitePool,
    stat: &UserProblemStat,
    expected_attempts: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_problem_stats
        SET attempts = ?, solved = ?, best_time_ms = ?, best_memory_mb = ?,
            points_earned = ?, last_attempted_at = ?
        WHERE user_id = ? AND problem_id = ? AND attempts = ?
        "#,
    )
    .bind(stat.attempts)
    .bind(stat.solved as i64)
    .bind(stat.best_time_ms)
    .bind(stat.best_memory_mb)
    .bind(stat.points_earned)
    .bind(stat.last_attempted_at.to_rfc3339())
    .bind(stat.user_id.to_string())
    .bind(stat.problem_id.to_string())
    .bind(expected_attempts)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
