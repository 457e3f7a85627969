// src/errors.rs
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Problem '{0}' not found")]
    ProblemNotFound(Uuid),

    #[error("Submission '{0}' not found")]
    SubmissionNotFound(Uuid),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Execution service returned status {status}: {body}")]
    Execution { status: u16, body: String },

    #[error("Unexpected execution response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stats reconciliation for user {user} on problem {problem} did not converge")]
    StatsContention { user: Uuid, problem: Uuid },
}

pub type Result<T> = std::result::Result<T, JudgeError>;
