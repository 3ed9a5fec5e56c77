use std::collections::HashMap;

use axum::{extract::Path, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::profile::{Profile, ProfileWithOwner};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::github_service::GithubService;
use crate::services::profile_service::{
    NewEducation, NewExperience, ProfileFields, ProfileService,
};
use crate::services::user_service::UserService;

/// GET /api/profile/me - the caller's own profile
pub async fn get_mine(Extension(auth_user): Extension<AuthUser>) -> ApiResult<ProfileWithOwner> {
    let service = ProfileService::new().await?;
    let profile = service.get_mine(auth_user.id).await?;

    Ok(ApiResponse::success(profile))
}

/// POST /api/profile - create the caller's profile or partially update it
pub async fn upsert(
    Extension(auth_user): Extension<AuthUser>,
    Json(fields): Json<ProfileFields>,
) -> ApiResult<Profile> {
    let mut field_errors = HashMap::new();

    if fields.status.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        field_errors.insert("status".to_string(), "Status is required".to_string());
    }
    if fields.skills.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        field_errors.insert("skills".to_string(), "Skills is required".to_string());
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid profile fields",
            Some(field_errors),
        ));
    }

    let service = ProfileService::new().await?;
    let profile = service.upsert(auth_user.id, fields).await?;

    Ok(ApiResponse::success(profile))
}

/// GET /api/profile - all profiles with their owners' display fields
pub async fn get_all() -> ApiResult<Vec<ProfileWithOwner>> {
    let service = ProfileService::new().await?;
    let profiles = service.get_all().await?;

    Ok(ApiResponse::success(profiles))
}

/// GET /api/profile/user/:user_id - profile by owning user id
pub async fn get_by_user(Path(user_id): Path<String>) -> ApiResult<ProfileWithOwner> {
    let service = ProfileService::new().await?;
    let profile = service.get_by_user(&user_id).await?;

    Ok(ApiResponse::success(profile))
}

/// DELETE /api/profile - remove the caller's profile and account.
/// Their posts stay behind with the denormalized author fields.
pub async fn delete_mine(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let service = UserService::new().await?;
    service.delete_account(auth_user.id).await?;

    Ok(ApiResponse::success(json!({ "msg": "User deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT /api/profile/experience - prepend a career entry
pub async fn add_experience(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<ExperienceRequest>,
) -> ApiResult<Profile> {
    let mut field_errors = HashMap::new();

    let title = payload.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        field_errors.insert("title".to_string(), "Title is required".to_string());
    }
    let company = payload.company.as_deref().map(str::trim).unwrap_or_default();
    if company.is_empty() {
        field_errors.insert("company".to_string(), "Company is required".to_string());
    }
    if payload.from.is_none() {
        field_errors.insert("from".to_string(), "From date is required".to_string());
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid experience fields",
            Some(field_errors),
        ));
    }
    let Some(from) = payload.from else {
        return Err(ApiError::validation_error("Invalid experience fields", None));
    };

    let service = ProfileService::new().await?;
    let profile = service
        .add_experience(
            auth_user.id,
            NewExperience {
                title: title.to_string(),
                company: company.to_string(),
                location: payload.location,
                from,
                to: payload.to,
                current: payload.current,
                description: payload.description,
            },
        )
        .await?;

    Ok(ApiResponse::success(profile))
}

/// DELETE /api/profile/experience/:exp_id - remove a career entry by id
pub async fn remove_experience(
    Extension(auth_user): Extension<AuthUser>,
    Path(exp_id): Path<String>,
) -> ApiResult<Profile> {
    let service = ProfileService::new().await?;
    let profile = service.remove_experience(auth_user.id, &exp_id).await?;

    Ok(ApiResponse::success(profile))
}

#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default, rename = "fieldofstudy")]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT /api/profile/education - prepend an education entry
pub async fn add_education(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<EducationRequest>,
) -> ApiResult<Profile> {
    let mut field_errors = HashMap::new();

    let school = payload.school.as_deref().map(str::trim).unwrap_or_default();
    if school.is_empty() {
        field_errors.insert("school".to_string(), "School is required".to_string());
    }
    let degree = payload.degree.as_deref().map(str::trim).unwrap_or_default();
    if degree.is_empty() {
        field_errors.insert("degree".to_string(), "Degree is required".to_string());
    }
    let field_of_study = payload
        .field_of_study
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if field_of_study.is_empty() {
        field_errors.insert(
            "fieldofstudy".to_string(),
            "Field of study is required".to_string(),
        );
    }
    if payload.from.is_none() {
        field_errors.insert("from".to_string(), "From date is required".to_string());
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid education fields",
            Some(field_errors),
        ));
    }
    let Some(from) = payload.from else {
        return Err(ApiError::validation_error("Invalid education fields", None));
    };

    let service = ProfileService::new().await?;
    let profile = service
        .add_education(
            auth_user.id,
            NewEducation {
                school: school.to_string(),
                degree: degree.to_string(),
                field_of_study: field_of_study.to_string(),
                from,
                to: payload.to,
                current: payload.current,
                description: payload.description,
            },
        )
        .await?;

    Ok(ApiResponse::success(profile))
}

/// DELETE /api/profile/education/:edu_id - remove an education entry by id
pub async fn remove_education(
    Extension(auth_user): Extension<AuthUser>,
    Path(edu_id): Path<String>,
) -> ApiResult<Profile> {
    let service = ProfileService::new().await?;
    let profile = service.remove_education(auth_user.id, &edu_id).await?;

    Ok(ApiResponse::success(profile))
}

/// GET /api/profile/github/:username - public repos for a github username
pub async fn github_repos(Path(username): Path<String>) -> ApiResult<Value> {
    let repos = GithubService::new().repos(&username).await?;

    Ok(ApiResponse::success(repos))
}
