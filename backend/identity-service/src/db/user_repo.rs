//! User repository. Callers pass emails already lowered through
//! `validators::normalize_email`.

use authority_client::Role;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, reset_token_hash, \
     reset_token_expires_at, created_at, updated_at";

pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring search over name and email.
pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<User>, sqlx::Error> {
    let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE name ILIKE $1 OR email ILIKE $1
         ORDER BY created_at DESC"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// List the email addresses of all admin accounts.
pub async fn admin_emails(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE role = 'admin'")
        .fetch_all(pool)
        .await
}

/// Partial update; unset fields keep their current value.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    role: Option<Role>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET name = COALESCE($2, name),
             email = COALESCE($3, email),
             role = COALESCE($4, role),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_many(pool: &PgPool, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Check whether any of the given ids belongs to an admin account.
pub async fn any_admin(pool: &PgPool, ids: &[Uuid]) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE id = ANY($1) AND role = 'admin')",
    )
    .bind(ids)
    .fetch_one(pool)
    .await
}

/// Store a reset token hash, but only if no unexpired one is outstanding.
/// Returns false when another request won the race; the caller maps that to
/// a conflict instead of overwriting the live token.
pub async fn claim_reset_token(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users
         SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
         WHERE id = $1
           AND (reset_token_hash IS NULL OR reset_token_expires_at < NOW())",
    )
    .bind(id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Complete a reset: set the new password and clear the token in one
/// statement, matching only an unexpired stored hash. Zero rows means the
/// token was wrong, expired, or already consumed.
pub async fn consume_reset_token(
    pool: &PgPool,
    token_hash: &str,
    password_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET password_hash = $2,
             reset_token_hash = NULL,
             reset_token_expires_at = NULL,
             updated_at = NOW()
         WHERE reset_token_hash = $1
           AND reset_token_expires_at >= NOW()
         RETURNING {USER_COLUMNS}"
    ))
    .bind(token_hash)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
}
