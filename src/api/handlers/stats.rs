// src/api/handlers/stats.rs
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde_json::json;
use uuid::Uuid;

use crate::api::handlers::error_response;
use crate::api::AppState;
use crate::auth;
use crate::database;

/// The authenticated user's stats row for one problem. Absence means the
/// user has never attempted it.
pub async fn get_problem_stats(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = match auth::identity_from_request(&http_req, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };
    let problem_id = path.into_inner();

    match database::get_stat(&state.db, user_id, problem_id).await {
        Ok(Some(stat)) => Ok(HttpResponse::Ok().json(stat)),
        Ok(None) => Ok(HttpResponse::NotFound().json(json!({
            "error": "no attempts for this problem"
        }))),
        Err(e) => Ok(error_response(&e.into())),
    }
}
