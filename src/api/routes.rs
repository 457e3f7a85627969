// src/api/routes.rs
use actix_web::web;

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .service(
                web::scope("/submissions")
                    .route("", web::post().to(handlers::submit))
                    .route("", web::get().to(handlers::list_submissions))
                    .route("/{id}", web::get().to(handlers::get_submission)),
            )
            .route(
                "/problems/{id}/stats",
                web::get().to(handlers::get_problem_stats),
            ),
    );
}
