// src/stats.rs
//
// Reconciles a submission outcome into the single durable stats row per
// (user, problem) pair. The merge itself is a pure function; the write path
// verifies that every write actually landed instead of trusting a blind
// upsert, which keeps concurrent submissions for the same pair safe without
// a database lock.

use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database;
use crate::errors::{JudgeError, Result};
use crate::judge::JudgeOutcome;
use crate::models::{UserProblemStat, Verdict};

/// Bounded retries for the read-merge-write cycle under contention.
const MAX_RECONCILE_ATTEMPTS: u32 = 3;

/// Merges a submission outcome into the existing stats row (or the absence
/// of one). Pure; all reconciliation rules live here.
pub fn merge_stat(
    user_id: Uuid,
    problem_id: Uuid,
    existing: Option<&UserProblemStat>,
    outcome: &JudgeOutcome,
    points: i64,
    now: DateTime<Utc>,
) -> UserProblemStat {
    let accepted = outcome.verdict == Verdict::Accepted;
    let time_ms = outcome.execution_time_ms as i64;
    let memory_mb = outcome.memory_used_mb;

    match existing {
        None => UserProblemStat {
            user_id,
            problem_id,
            attempts: 1,
            solved: accepted,
            best_time_ms: accepted.then_some(time_ms),
            best_memory_mb: accepted.then_some(memory_mb),
            points_earned: if accepted { points } else { 0 },
            last_attempted_at: now,
        },
        Some(prev) => {
            let newly_solved = accepted && !prev.solved;
            UserProblemStat {
                user_id,
                problem_id,
                attempts: prev.attempts + 1,
                // Monotonic: a later failing attempt never clears it.
                solved: prev.solved || accepted,
                best_time_ms: merge_best_i64(prev.best_time_ms, accepted.then_some(time_ms)),
                best_memory_mb: merge_best_f64(prev.best_memory_mb, accepted.then_some(memory_mb)),
                // Written exactly once, on the first solve.
                points_earned: if newly_solved { points } else { prev.points_earned },
                last_attempted_at: now,
            }
        }
    }
}

fn merge_best_i64(previous: Option<i64>, candidate: Option<i64>) -> Option<i64> {
    match (previous, candidate) {
        (Some(p), Some(c)) if c < p => Some(c),
        (None, Some(c)) => Some(c),
        _ => previous,
    }
}

fn merge_best_f64(previous: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (previous, candidate) {
        (Some(p), Some(c)) if c < p => Some(c),
        (None, Some(c)) => Some(c),
        _ => previous,
    }
}

/// Reconciles one outcome into the stats row. The update is guarded by the
/// attempts count read beforehand; zero affected rows means another writer
/// got there first (or the row appeared concurrently), so the cycle re-reads
/// and merges again. An insert that hits the unique key likewise falls back
/// to the update path on the next pass.
pub async fn reconcile(
    pool: &SqlitePool,
    user_id: Uuid,
    problem_id: Uuid,
    outcome: &JudgeOutcome,
    points: i64,
) -> Result<()> {
    for attempt in 0..MAX_RECONCILE_ATTEMPTS {
        let existing = database::get_stat(pool, user_id, problem_id).await?;
        let merged = merge_stat(user_id, problem_id, existing.as_ref(), outcome, points, Utc::now());

        match &existing {
            Some(prev) => {
                let affected = database::update_stat_guarded(pool, &merged, prev.attempts).await?;
                if affected > 0 {
                    return Ok(());
                }
                debug!(
                    "stat row for ({}, {}) changed under us, retry {}",
                    user_id, problem_id, attempt
                );
            }
            None => match database::insert_stat(pool, &merged).await {
                Ok(()) => return Ok(()),
                Err(e) if is_unique_violation(&e) => {
                    debug!(
                        "stat row for ({}, {}) created concurrently, retry {}",
                        user_id, problem_id, attempt
                    );
                }
                Err(e) => return Err(e.into()),
            },
        }
    }

    Err(JudgeError::StatsContention {
        user: user_id,
        problem: problem_id,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
