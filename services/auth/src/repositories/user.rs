//! User repository for the login and recovery flows

use common::error::RepoResult;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::UserCredentials;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user's stored credentials by email, ignoring case
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        info!("Finding user by email: {}", email);

        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, password_hash, enabled
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserCredentials {
            id: row.get("id"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            password_hash: row.get("password_hash"),
            enabled: row.get("enabled"),
        }))
    }
}
