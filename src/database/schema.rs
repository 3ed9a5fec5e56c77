use crate::database::manager::{DatabaseError, DatabaseManager};

// Nested collections (likes, comments, experience, education, social links)
// live as JSONB documents on their owning row and are rewritten whole on
// save, which keeps every mutation a single-row write.

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    avatar      TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_PROFILES: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id               UUID PRIMARY KEY,
    user_id          UUID NOT NULL,
    company          TEXT,
    website          TEXT,
    location         TEXT,
    status           TEXT NOT NULL,
    bio              TEXT,
    github_username  TEXT,
    skills           JSONB NOT NULL DEFAULT '[]'::jsonb,
    experience       JSONB NOT NULL DEFAULT '[]'::jsonb,
    education        JSONB NOT NULL DEFAULT '[]'::jsonb,
    social           JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_POSTS: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id          UUID PRIMARY KEY,
    user_id     UUID NOT NULL,
    text        TEXT NOT NULL,
    name        TEXT NOT NULL,
    avatar      TEXT NOT NULL,
    likes       JSONB NOT NULL DEFAULT '[]'::jsonb,
    comments    JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

/// Create the application tables if they do not exist yet.
pub async fn ensure_schema() -> Result<(), DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    for ddl in [CREATE_USERS, CREATE_PROFILES, CREATE_POSTS] {
        sqlx::query(ddl).execute(&pool).await?;
    }

    Ok(())
}
