// src/api/handlers/mod.rs
mod health;
mod history;
mod stats;
mod submissions;

use actix_web::HttpResponse;
use serde_json::json;

use crate::errors::JudgeError;

pub use health::health_check;
pub use history::list_submissions;
pub use stats::get_problem_stats;
pub use submissions::{get_submission, submit};

/// Maps engine errors onto HTTP responses. Judged failures are not errors;
/// they arrive here only as transport or infrastructure problems.
pub(crate) fn error_response(e: &JudgeError) -> HttpResponse {
    let body = json!({ "error": e.to_string() });
    match e {
        JudgeError::Validation(_) => HttpResponse::BadRequest().json(body),
        JudgeError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
        JudgeError::ProblemNotFound(_) | JudgeError::SubmissionNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        _ => HttpResponse::InternalServerError().json(body),
    }
}
