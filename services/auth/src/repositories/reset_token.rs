//! Password reset token repository
//!
//! Issuing a code purges every expired token and the user's previous codes,
//! so at most one outstanding code exists per user and a value is never
//! shared by two live tokens.

use chrono::Utc;
use common::{
    credentials::{TokenKind, generate_reset_code, reset_code_expiry},
    error::{RepoError, RepoResult},
};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{debug, info, warn};

use crate::models::ResetToken;

/// Attempts at drawing an unused code before giving up
const MAX_CODE_ATTEMPTS: usize = 10;

const INVALID_CODE: &str = "The recovery code is not valid";

/// Reset token repository
#[derive(Clone)]
pub struct ResetTokenRepository {
    pool: PgPool,
}

fn token_from_row(row: &PgRow) -> ResetToken {
    ResetToken {
        id: row.get("id"),
        value: row.get("value"),
        kind: row.get("kind"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

impl ResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh password reset code for `user_id`
    pub async fn issue(&self, user_id: i32) -> RepoResult<ResetToken> {
        info!("Issuing password reset code for user: {}", user_id);
        let kind = TokenKind::PasswordReset.as_str();

        let mut tx = self.pool.begin().await?;

        let purged = sqlx::query(
            "DELETE FROM reset_tokens WHERE expires_at <= NOW() OR (user_id = $1 AND kind = $2)",
        )
        .bind(user_id)
        .bind(kind)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        debug!("Purged {} stale reset tokens", purged);

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_reset_code();

            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM reset_tokens WHERE value = $1 AND kind = $2)",
            )
            .bind(&code)
            .bind(kind)
            .fetch_one(&mut *tx)
            .await?;

            if taken {
                debug!("Reset code collision, drawing again");
                continue;
            }

            let now = Utc::now();
            let row = sqlx::query(
                r#"
                INSERT INTO reset_tokens (value, kind, user_id, expires_at, created_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, value, kind, user_id, expires_at, created_at
                "#,
            )
            .bind(&code)
            .bind(kind)
            .bind(user_id)
            .bind(reset_code_expiry(now))
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            return Ok(token_from_row(&row));
        }

        warn!("No unused reset code found after {} attempts", MAX_CODE_ATTEMPTS);
        Err(RepoError::Conflict(
            "Could not issue a recovery code, try again".to_string(),
        ))
    }

    /// Look up a live password reset code without consuming it
    pub async fn find_valid(&self, code: &str) -> RepoResult<ResetToken> {
        info!("Verifying password reset code");

        let row = sqlx::query(
            r#"
            SELECT id, value, kind, user_id, expires_at, created_at
            FROM reset_tokens
            WHERE value = $1 AND kind = $2
            "#,
        )
        .bind(code.trim())
        .bind(TokenKind::PasswordReset.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| token_from_row(&row))
            .filter(|token| token.is_usable(TokenKind::PasswordReset, Utc::now()))
            .ok_or_else(|| RepoError::Invalid(INVALID_CODE.to_string()))
    }

    /// Set a new password hash and consume the code in one transaction
    pub async fn consume(&self, code: &str, password_hash: &str) -> RepoResult<()> {
        info!("Consuming password reset code");

        let mut tx = self.pool.begin().await?;

        let token = sqlx::query(
            r#"
            SELECT id, value, kind, user_id, expires_at, created_at
            FROM reset_tokens
            WHERE value = $1 AND kind = $2
            FOR UPDATE
            "#,
        )
        .bind(code.trim())
        .bind(TokenKind::PasswordReset.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| token_from_row(&row))
        .filter(|token| token.is_usable(TokenKind::PasswordReset, Utc::now()))
        .ok_or_else(|| RepoError::Invalid(INVALID_CODE.to_string()))?;

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(token.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM reset_tokens WHERE id = $1")
            .bind(token.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Password reset for user: {}", token.user_id);

        Ok(())
    }
}
