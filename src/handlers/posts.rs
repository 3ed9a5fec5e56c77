use std::collections::HashMap;

use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::post::{Comment, Like, Post};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::post_service::PostService;
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
pub struct PostBody {
    #[serde(default)]
    pub text: Option<String>,
}

fn require_text(body: &PostBody) -> Result<&str, ApiError> {
    let text = body.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("text".to_string(), "Text is required".to_string());
        return Err(ApiError::validation_error(
            "Invalid post fields",
            Some(field_errors),
        ));
    }
    Ok(text)
}

/// POST /api/posts - create a post with the caller's display fields
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<PostBody>,
) -> ApiResult<Post> {
    let text = require_text(&payload)?;

    let author = UserService::new().await?.find_by_id(auth_user.id).await?;
    let service = PostService::new().await?;
    let post = service.create(&author, text).await?;

    Ok(ApiResponse::success(post))
}

/// GET /api/posts - all posts, most recent first
pub async fn list_all() -> ApiResult<Vec<Post>> {
    let service = PostService::new().await?;
    let posts = service.list_all().await?;

    Ok(ApiResponse::success(posts))
}

/// GET /api/posts/:id - one post by id
pub async fn get(Path(id): Path<String>) -> ApiResult<Post> {
    let service = PostService::new().await?;
    let post = service.get(&id).await?;

    Ok(ApiResponse::success(post))
}

/// DELETE /api/posts/:id - owner-only removal
pub async fn delete(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let service = PostService::new().await?;
    service.delete(auth_user.id, &id).await?;

    Ok(ApiResponse::success(json!({ "msg": "Post removed" })))
}

/// PUT /api/posts/like/:id - like once per user
pub async fn like(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Like>> {
    let service = PostService::new().await?;
    let likes = service.like(auth_user.id, &id).await?;

    Ok(ApiResponse::success(likes))
}

/// PUT /api/posts/unlike/:id - take back an existing like
pub async fn unlike(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Like>> {
    let service = PostService::new().await?;
    let likes = service.unlike(auth_user.id, &id).await?;

    Ok(ApiResponse::success(likes))
}

/// POST /api/posts/comment/:id - comment on any post
pub async fn add_comment(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<PostBody>,
) -> ApiResult<Vec<Comment>> {
    let text = require_text(&payload)?;

    let author = UserService::new().await?.find_by_id(auth_user.id).await?;
    let service = PostService::new().await?;
    let comments = service.add_comment(&author, &id, text).await?;

    Ok(ApiResponse::success(comments))
}

/// DELETE /api/posts/comment/:id/:comment_id - remove the caller's own
/// comment, addressed by its id
pub async fn remove_comment(
    Extension(auth_user): Extension<AuthUser>,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<Vec<Comment>> {
    let service = PostService::new().await?;
    let comments = service.remove_comment(auth_user.id, &id, &comment_id).await?;

    Ok(ApiResponse::success(comments))
}
