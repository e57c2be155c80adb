// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, context::RequestContext, error::AppError};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the user id threads are partitioned by.
    pub sub: String,
    /// Caller's role (e.g., 'user', 'admin'). Not used for authorization yet.
    #[serde(default)]
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a token for `user_id`, valid for `expiration_seconds`.
pub fn sign_jwt(user_id: &str, role: &str, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: user_id.to_owned(),
        role: role.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: request context.
///
/// Reads an optional 'Authorization: Bearer <token>' header and injects a
/// `RequestContext` into the request extensions. A missing or invalid token
/// yields the anonymous context; requests are never rejected here.
pub async fn request_context(State(config): State<Config>, mut req: Request<Body>, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let ctx = match token.map(|t| verify_jwt(t, &config.jwt_secret)) {
        Some(Ok(claims)) => RequestContext::for_user(claims.sub),
        Some(Err(_)) => {
            tracing::debug!("Invalid bearer token, continuing as anonymous");
            RequestContext::anonymous()
        }
        None => RequestContext::anonymous(),
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
