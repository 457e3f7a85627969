// src/config.rs
use crate::errors::{JudgeError, Result};

/// Configuration for the external execution service.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub api_base: String,
    pub auth_token: Option<String>,
    /// Grace margin added on top of a problem's time limit when bounding the
    /// HTTP call to the execution service.
    pub grace_ms: u64,
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub executor: ExecutorConfig,
    pub jwt_secret: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_base = std::env::var("EXECUTOR_API_BASE").map_err(|_| {
            JudgeError::Config(
                "EXECUTOR_API_BASE is not set. Point it at the execution service.".to_string(),
            )
        })?;
        let auth_token = std::env::var("EXECUTOR_AUTH_TOKEN").ok();
        let grace_ms = std::env::var("EXECUTOR_GRACE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(2_000);

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| {
            JudgeError::Config("JWT_SECRET is not set. Submissions require it.".to_string())
        })?;

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(AppConfig {
            executor: ExecutorConfig {
                api_base,
                auth_token,
                grace_ms,
            },
            jwt_secret,
            bind_addr,
        })
    }
}
