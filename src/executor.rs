// src/executor.rs

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;

use crate::classifier::STATUS_TIME_LIMIT_EXCEEDED;
use crate::config::ExecutorConfig;
use crate::errors::{JudgeError, Result};
use crate::models::RawExecutionResult;

/// Fallback provider language when an internal name is not in the table.
pub const FALLBACK_LANGUAGE_ID: i64 = 71; // Python 3

/// Closed mapping from internal language names to the execution provider's
/// numeric language ids. Unknown names fall back to Python 3 rather than
/// erroring.
pub fn provider_language_id(language: &str) -> i64 {
    match language {
        "python" | "python3" => 71,
        "java" => 62,
        "cpp" | "c++" => 54,
        "javascript" => 63,
        _ => FALLBACK_LANGUAGE_ID,
    }
}

/// Seam between the orchestrator and the execution service, so judging can
/// be driven by a stub in tests.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Runs one (program, stdin) pair and returns the raw execution record.
    /// `time_limit_ms` bounds the call; a client-side timeout reports as a
    /// provider time-limit status, not a transport failure.
    async fn execute(
        &self,
        source: &str,
        stdin: &str,
        language: &str,
        time_limit_ms: u64,
    ) -> Result<RawExecutionResult>;
}

/// HTTP client for the external execution service.
pub struct HttpExecutionClient {
    client: reqwest::Client,
    config: ExecutorConfig,
}

#[derive(Serialize)]
struct ExecutionRequest<'a> {
    language_id: i64,
    source_code: &'a str,
    stdin: &'a str,
}

impl HttpExecutionClient {
    pub fn new(client: reqwest::Client, config: ExecutorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ExecutionBackend for HttpExecutionClient {
    async fn execute(
        &self,
        source: &str,
        stdin: &str,
        language: &str,
        time_limit_ms: u64,
    ) -> Result<RawExecutionResult> {
        let url = format!(
            "{}/submissions?wait=true",
            self.config.api_base.trim_end_matches('/')
        );
        let language_id = provider_language_id(language);

        debug!("executing against {} (language_id={})", url, language_id);

        let body = ExecutionRequest {
            language_id,
            source_code: source,
            stdin,
        };

        let mut request = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(time_limit_ms + self.config.grace_ms))
            .json(&body);
        if let Some(token) = &self.config.auth_token {
            request = request.header("X-Auth-Token", token);
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                // The provider did not come back within limit + grace.
                return Ok(RawExecutionResult {
                    status: STATUS_TIME_LIMIT_EXCEEDED,
                    stderr: Some("execution timed out".to_string()),
                    time: Some(time_limit_ms as f64 / 1000.0),
                    ..Default::default()
                });
            }
            Err(e) => return Err(e.into()),
        };

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(JudgeError::Execution {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let raw: RawExecutionResult = resp
            .json()
            .await
            .map_err(|e| JudgeError::UnexpectedResponse(e.to_string()))?;
        Ok(raw)
    }
}
