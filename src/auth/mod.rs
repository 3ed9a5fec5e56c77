use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Signed token payload. The identity travels nested under `user` so the
/// verified id can be lifted straight into the request context.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        Self::with_ttl(user_id, config::config().security.token_expiry_secs)
    }

    pub fn with_ttl(user_id: Uuid, ttl_secs: u64) -> Self {
        let now = Utc::now();

        Self {
            user: TokenUser { id: user_id },
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token generation error: {0}")]
    Generation(String),

    #[error("signing secret not configured")]
    MissingSecret,

    /// Expired, tampered and malformed tokens all collapse into this one
    /// variant; callers never learn which check failed.
    #[error("token is not valid")]
    Invalid,
}

/// Issue a signed bearer token for the given user id.
pub fn generate_token(user_id: Uuid) -> Result<String, TokenError> {
    sign(&Claims::new(user_id), &config::config().security.jwt_secret)
}

/// Verify a bearer token and return its claims.
pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    verify(token, &config::config().security.jwt_secret)
}

fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Invalid);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = sign(&Claims::with_ttl(user_id, 3600), SECRET).unwrap();

        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.user.id, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let user_id = Uuid::new_v4();
        let mut claims = Claims::with_ttl(user_id, 3600);
        // Past the default validation leeway
        claims.exp = claims.iat - 120;

        let token = sign(&claims, SECRET).unwrap();
        assert!(matches!(verify(&token, SECRET), Err(TokenError::Invalid)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = sign(&Claims::with_ttl(Uuid::new_v4(), 3600), SECRET).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('A');
        assert!(matches!(verify(&tampered, SECRET), Err(TokenError::Invalid)));

        // Signed under a different secret
        assert!(matches!(
            verify(&token, "other-secret"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let claims = Claims::with_ttl(Uuid::new_v4(), 3600);
        assert!(matches!(sign(&claims, ""), Err(TokenError::MissingSecret)));
    }
}
