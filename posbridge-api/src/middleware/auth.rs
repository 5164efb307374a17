use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::StatusCode,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Roles allowed to call the order and POS endpoints.
pub const TRUSTED_ROLES: [&str; 2] = ["SERVICE", "ADMIN"];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Only trusted internal callers (checkout service, admin tools) get through.
pub async fn service_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Authorization(bearer) = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<ServiceClaims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    if !TRUSTED_ROLES.contains(&token_data.claims.role.as_str()) {
        return Err(StatusCode::FORBIDDEN);
    }

    tracing::debug!(caller = %token_data.claims.sub, "Authenticated caller");
    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}

/// Mint an HS256 token for a trusted caller.
pub fn issue_token(
    secret: &str,
    subject: &str,
    role: &str,
    ttl_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = ServiceClaims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}
