use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One like per user per post, enforced by a scan before insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub user: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

/// A post owned by one user. Author name and avatar are copied in at
/// creation time and are not kept in sync with later user edits.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Json<Vec<Like>>,
    pub comments: Json<Vec<Comment>>,
    pub created_at: DateTime<Utc>,
}
