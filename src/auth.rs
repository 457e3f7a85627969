// src/auth.rs
//
// Bearer-token identity. The judging engine never trusts a caller-supplied
// user id; it is always derived from a validated JWT.

use actix_web::HttpRequest;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{JudgeError, Result};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(user_id: Uuid, secret: &str, ttl_secs: i64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JudgeError::Config(format!("failed to sign token: {}", e)))
}

pub fn decode_user(token: &str, secret: &str) -> Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| JudgeError::Unauthorized(format!("invalid token: {}", e)))?;

    Uuid::parse_str(&data.claims.sub)
        .map_err(|_| JudgeError::Unauthorized("token subject is not a user id".to_string()))
}

/// Extracts the authenticated user from the `Authorization: Bearer` header.
pub fn identity_from_request(req: &HttpRequest, secret: &str) -> Result<Uuid> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| JudgeError::Unauthorized("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| JudgeError::Unauthorized("expected a bearer token".to_string()))?;

    decode_user(token.trim(), secret)
}
