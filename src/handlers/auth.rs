use std::collections::HashMap;

use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::user::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::UserService;

use super::users::is_valid_email;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/auth - check credentials and receive a signed token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let mut field_errors = HashMap::new();

    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    if !is_valid_email(email) {
        field_errors.insert(
            "email".to_string(),
            "Please include a valid email".to_string(),
        );
    }

    let password = payload.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        field_errors.insert("password".to_string(), "Password is required".to_string());
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid login fields",
            Some(field_errors),
        ));
    }

    let service = UserService::new().await?;
    let token = service.authenticate(email, password).await?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// GET /api/auth - the account behind the verified token, without the
/// credential hash
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> ApiResult<User> {
    let service = UserService::new().await?;
    let user = service.find_by_id(auth_user.id).await?;

    Ok(ApiResponse::success(user))
}
