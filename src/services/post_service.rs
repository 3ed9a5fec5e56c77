use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::post::{Comment, Like, Post};
use crate::database::models::user::User;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Post already liked")]
    AlreadyLiked,

    #[error("Post has not yet been liked")]
    NotYetLiked,

    #[error("Comment does not exist")]
    CommentNotFound,

    #[error("User not authorized")]
    NotOwner,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for PostError {
    fn from(err: sqlx::Error) -> Self {
        PostError::Database(DatabaseError::Sqlx(err))
    }
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub async fn new() -> Result<Self, PostError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    /// Create a post for the author, copying their current display name and
    /// avatar into the row.
    pub async fn create(&self, author: &User, text: &str) -> Result<Post, PostError> {
        let post = Post {
            id: Uuid::new_v4(),
            user_id: author.id,
            text: text.to_string(),
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            likes: Json(Vec::new()),
            comments: Json(Vec::new()),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO posts (id, user_id, text, name, avatar, likes, comments, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(post.text.clone())
        .bind(post.name.clone())
        .bind(post.avatar.clone())
        .bind(post.likes.clone())
        .bind(post.comments.clone())
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    /// All posts, most recent first.
    pub async fn list_all(&self) -> Result<Vec<Post>, PostError> {
        Ok(
            sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Fetch one post by the id given in the URL. A malformed identifier
    /// reads the same as an unknown one.
    pub async fn get(&self, post_id: &str) -> Result<Post, PostError> {
        let post_id = Uuid::parse_str(post_id).map_err(|_| PostError::NotFound)?;

        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(PostError::NotFound)
    }

    /// Delete a post. Only the owner referenced by the row may do this.
    pub async fn delete(&self, user_id: Uuid, post_id: &str) -> Result<(), PostError> {
        let post = self.get(post_id).await?;

        if post.user_id != user_id {
            return Err(PostError::NotOwner);
        }

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Like a post once per user; the newest like sits at the front.
    pub async fn like(&self, user_id: Uuid, post_id: &str) -> Result<Vec<Like>, PostError> {
        let mut post = self.get(post_id).await?;

        if find_like(&post.likes.0, user_id).is_some() {
            return Err(PostError::AlreadyLiked);
        }

        post.likes.0.insert(
            0,
            Like {
                id: Uuid::new_v4(),
                user: user_id,
            },
        );

        self.save_engagement(&post).await?;
        Ok(post.likes.0)
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: &str) -> Result<Vec<Like>, PostError> {
        let mut post = self.get(post_id).await?;

        let index = find_like(&post.likes.0, user_id).ok_or(PostError::NotYetLiked)?;
        post.likes.0.remove(index);

        self.save_engagement(&post).await?;
        Ok(post.likes.0)
    }

    /// Comment on a post; any authenticated user may do this. The newest
    /// comment sits at the front.
    pub async fn add_comment(
        &self,
        author: &User,
        post_id: &str,
        text: &str,
    ) -> Result<Vec<Comment>, PostError> {
        let mut post = self.get(post_id).await?;

        post.comments.0.insert(
            0,
            Comment {
                id: Uuid::new_v4(),
                user: author.id,
                text: text.to_string(),
                name: author.name.clone(),
                avatar: author.avatar.clone(),
                date: Utc::now(),
            },
        );

        self.save_engagement(&post).await?;
        Ok(post.comments.0)
    }

    /// Remove the comment addressed by `comment_id` after checking that the
    /// caller authored that specific comment.
    pub async fn remove_comment(
        &self,
        user_id: Uuid,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Vec<Comment>, PostError> {
        let mut post = self.get(post_id).await?;

        let comment_id = Uuid::parse_str(comment_id).map_err(|_| PostError::CommentNotFound)?;
        let index =
            find_comment(&post.comments.0, comment_id).ok_or(PostError::CommentNotFound)?;

        if post.comments.0[index].user != user_id {
            return Err(PostError::NotOwner);
        }

        post.comments.0.remove(index);

        self.save_engagement(&post).await?;
        Ok(post.comments.0)
    }

    /// Document-style save of the nested collections on the post row.
    async fn save_engagement(&self, post: &Post) -> Result<(), PostError> {
        sqlx::query("UPDATE posts SET likes = $2, comments = $3 WHERE id = $1")
            .bind(post.id)
            .bind(post.likes.clone())
            .bind(post.comments.clone())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn find_like(likes: &[Like], user_id: Uuid) -> Option<usize> {
    likes.iter().position(|like| like.user == user_id)
}

fn find_comment(comments: &[Comment], comment_id: Uuid) -> Option<usize> {
    comments.iter().position(|comment| comment.id == comment_id)
}
