// src/api/handlers/history.rs
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::Serialize;

use crate::api::handlers::error_response;
use crate::api::AppState;
use crate::auth;
use crate::database::{self, SubmissionRecord};

#[derive(Serialize)]
pub struct HistoryResponse {
    pub results: Vec<SubmissionRecord>,
}

/// The authenticated user's submission history, newest first.
pub async fn list_submissions(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match auth::identity_from_request(&http_req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };

    match database::list_user_submissions(&state.db, user_id).await {
        Ok(results) => Ok(HttpResponse::Ok().json(HistoryResponse { results })),
        Err(e) => {
            log::error!("failed to fetch submission history: {}", e);
            Ok(error_response(&e.into()))
        }
    }
}
