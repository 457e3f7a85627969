// src/api/state.rs
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::executor::ExecutionBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: SqlitePool,
    pub executor: Arc<dyn ExecutionBackend>,
}

impl AppState {
    pub fn new(config: AppConfig, db: SqlitePool, executor: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            db,
            executor,
        }
    }
}
