use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Header carrying the bearer token on protected requests.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Authenticated user context extracted from a verified token. Downstream
/// ownership checks treat this id as authoritative.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user.id,
        }
    }
}

/// Token authentication middleware for protected routes.
///
/// Both rejection paths return early, so exactly one response is ever sent
/// and the handler never runs for an unauthenticated request.
pub async fn token_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("No token, authorization denied"))?;

    let claims =
        auth::verify_token(token).map_err(|_| ApiError::unauthorized("Token is not valid"))?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}
