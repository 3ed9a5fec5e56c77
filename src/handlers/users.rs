use std::collections::HashMap;

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/users - register an account and receive a signed token
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    let mut field_errors = HashMap::new();

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        field_errors.insert("name".to_string(), "Name is required".to_string());
    }

    let email = payload.email.as_deref().map(str::trim).unwrap_or_default();
    if !is_valid_email(email) {
        field_errors.insert(
            "email".to_string(),
            "Please include a valid email".to_string(),
        );
    }

    let password = payload.password.as_deref().unwrap_or_default();
    if password.chars().count() < 6 {
        field_errors.insert(
            "password".to_string(),
            "Please enter a password with 6 or more characters".to_string(),
        );
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid registration fields",
            Some(field_errors),
        ));
    }

    let service = UserService::new().await?;
    let token = service.register(name, email, password).await?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// Structural email check; the full address grammar is not the point here.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
