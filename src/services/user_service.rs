use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, TokenError};
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::user::User;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User already exists")]
    AlreadyExists,

    /// Unknown email and wrong password intentionally share this variant
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Database(DatabaseError::Sqlx(err))
    }
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, UserError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    /// Register a new account and issue a token for it.
    ///
    /// Duplicate emails are rejected by a lookup before the insert, the
    /// same check every read-modify-write in this service relies on.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, UserError> {
        let existing = self.find_by_email(email).await?;
        if existing.is_some() {
            return Err(UserError::AlreadyExists);
        }

        let avatar = avatar_url(email);
        let hashed = bcrypt::hash(password, config::config().security.bcrypt_cost)?;
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO users (id, name, email, password, avatar) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(&hashed)
        .bind(&avatar)
        .execute(&self.pool)
        .await?;

        tracing::info!("registered user {}", id);

        Ok(auth::generate_token(id)?)
    }

    /// Check credentials and issue a token. The password comparison runs in
    /// constant time inside bcrypt.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, UserError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(auth::generate_token(user.id)?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User, UserError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Delete the caller's profile and account. Posts are intentionally
    /// left in place with their denormalized author fields.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), UserError> {
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!("deleted account {}", id);
        Ok(())
    }
}

/// Gravatar-style avatar URL derived from the normalized email address.
pub fn avatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    let digest = hasher.finalize();

    format!("https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm", digest)
}
