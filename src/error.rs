// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::TokenError;
use crate::database::manager::DatabaseError;
use crate::services::github_service::GithubError;
use crate::services::post_service::PostError;
use crate::services::profile_service::ProfileError;
use crate::services::user_service::UserError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError {
                message,
                field_errors,
            } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert service error types to ApiError. Validation and business-rule
// rejections surface their own message; store and signing failures are
// logged in full and surfaced as a generic 500.
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(what) => {
                tracing::error!("database configuration missing: {}", what);
                ApiError::service_unavailable("Database unavailable")
            }
            DatabaseError::Sqlx(e) => {
                tracing::error!("database error: {}", e);
                ApiError::internal_server_error("Server Error")
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AlreadyExists | UserError::InvalidCredentials => {
                ApiError::bad_request(err.to_string())
            }
            UserError::NotFound => ApiError::not_found(err.to_string()),
            UserError::Database(e) => e.into(),
            UserError::Hash(e) => {
                tracing::error!("password hash error: {}", e);
                ApiError::internal_server_error("Server Error")
            }
            UserError::Token(e) => {
                tracing::error!("token issuance error: {}", e);
                ApiError::internal_server_error("Server Error")
            }
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            // The profile read paths report missing records as 400, matching
            // the externally observed behavior of this API
            ProfileError::NoProfileForUser | ProfileError::NotFound => {
                ApiError::bad_request(err.to_string())
            }
            ProfileError::ExperienceNotFound | ProfileError::EducationNotFound => {
                ApiError::not_found(err.to_string())
            }
            ProfileError::Database(e) => e.into(),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound | PostError::CommentNotFound => {
                ApiError::not_found(err.to_string())
            }
            PostError::AlreadyLiked | PostError::NotYetLiked => {
                ApiError::bad_request(err.to_string())
            }
            PostError::NotOwner => ApiError::unauthorized(err.to_string()),
            PostError::Database(e) => e.into(),
        }
    }
}

impl From<GithubError> for ApiError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::NotFound => ApiError::not_found(err.to_string()),
            GithubError::Request(e) => {
                tracing::error!("github request failed: {}", e);
                ApiError::internal_server_error("Server Error")
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => ApiError::unauthorized("Token is not valid"),
            e => {
                tracing::error!("token issuance error: {}", e);
                ApiError::internal_server_error("Server Error")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_business_rejections_to_400() {
        assert_eq!(ApiError::from(UserError::AlreadyExists).status_code(), 400);
        assert_eq!(ApiError::from(PostError::AlreadyLiked).status_code(), 400);
        assert_eq!(ApiError::from(PostError::NotYetLiked).status_code(), 400);
        assert_eq!(ApiError::from(ProfileError::NotFound).status_code(), 400);
    }

    #[test]
    fn maps_ownership_violations_to_401() {
        let err = ApiError::from(PostError::NotOwner);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "User not authorized");
    }

    #[test]
    fn login_failures_share_one_message() {
        let err = ApiError::from(UserError::InvalidCredentials);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid Credentials");
    }

    #[test]
    fn missing_resources_map_to_404() {
        assert_eq!(ApiError::from(PostError::NotFound).status_code(), 404);
        assert_eq!(
            ApiError::from(PostError::CommentNotFound).message(),
            "Comment does not exist"
        );
    }
}
