// src/api/handlers/submissions.rs
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::handlers::error_response;
use crate::api::AppState;
use crate::auth;
use crate::database;
use crate::errors::JudgeError;
use crate::judge;

#[derive(Clone, Deserialize)]
pub struct SubmitRequest {
    pub problem_id: Option<Uuid>,
    pub code: Option<String>,
    pub language: Option<String>,
}

/// Pulls a required, non-empty field out of the request body.
fn required(value: Option<String>, name: &str) -> crate::errors::Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(JudgeError::Validation(format!("missing field '{}'", name))),
    }
}

pub async fn submit(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    req: web::Json<SubmitRequest>,
) -> Result<HttpResponse> {
    let body = req.into_inner();

    // Input errors are rejected before any execution begins; no submission
    // row is created for them.
    let problem_id = match body
        .problem_id
        .ok_or_else(|| JudgeError::Validation("missing field 'problem_id'".to_string()))
    {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };
    let code = match required(body.code, "code") {
        Ok(v) => v,
        Err(e) => return Ok(error_response(&e)),
    };
    let language = match required(body.language, "language") {
        Ok(v) => v,
        Err(e) => return Ok(error_response(&e)),
    };

    // Identity comes from the token, never from the body, and is checked
    // before the problem lookup.
    let user_id = match auth::identity_from_request(&http_req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };

    match judge::submit(
        &state.db,
        state.executor.as_ref(),
        user_id,
        problem_id,
        &code,
        &language,
    )
    .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(report)),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_submission(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = match auth::identity_from_request(&http_req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };
    let id = path.into_inner();

    match database::get_submission(&state.db, id).await {
        // Submissions are only visible to their owner.
        Ok(Some(record)) if record.user_id == user_id.to_string() => {
            Ok(HttpResponse::Ok().json(record))
        }
        Ok(_) => Ok(error_response(&JudgeError::SubmissionNotFound(id))),
        Err(e) => Ok(error_response(&e.into())),
    }
}
