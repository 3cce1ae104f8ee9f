//! User repository for database operations

use common::{
    error::{RepoError, RepoResult},
    pagination::{Page, PageRequest},
    principal::RoleRef,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::contains_pattern;
use crate::models::user::{NewUser, User, UserChanges};

const EMAIL_TAKEN: &str = "The email is already registered";

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        photo: row.get("photo"),
        registered_at: row.get("registered_at"),
        enabled: row.get("enabled"),
        role: RoleRef {
            id: row.get("role_id"),
            name: row.get("role_name"),
        },
    }
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_role(&self, role_id: i32) -> RepoResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(RepoError::not_found("Role"))
        }
    }

    async fn email_taken(&self, email: &str, except: Option<i32>) -> RepoResult<bool> {
        let taken = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id IS DISTINCT FROM $2)",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Create a new user
    pub async fn create(&self, input: &NewUser) -> RepoResult<User> {
        info!("Creating new user: {}", input.email);

        self.ensure_role(input.role_id).await?;
        if self.email_taken(&input.email, None).await? {
            return Err(RepoError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, EMAIL_TAKEN))?;

        self.get(id).await
    }

    /// Users by registration time, newest first
    pub async fn list(&self, page: PageRequest) -> RepoResult<Page<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.photo, u.registered_at, u.enabled,
                   r.id AS role_id, r.name AS role_name
            FROM users u
            INNER JOIN roles r ON r.id = u.role_id
            ORDER BY u.registered_at DESC, u.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(rows.iter().map(user_from_row).collect(), total, page))
    }

    /// Case-insensitive substring search over names and email
    pub async fn search(&self, term: &str) -> RepoResult<Vec<User>> {
        info!("Searching users: {}", term);

        let rows = sqlx::query(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.photo, u.registered_at, u.enabled,
                   r.id AS role_id, r.name AS role_name
            FROM users u
            INNER JOIN roles r ON r.id = u.role_id
            WHERE u.first_name ILIKE $1 OR u.last_name ILIKE $1 OR u.email ILIKE $1
            ORDER BY u.last_name, u.first_name, u.id
            "#,
        )
        .bind(contains_pattern(term))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Find a user by ID
    pub async fn get(&self, id: i32) -> RepoResult<User> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.photo, u.registered_at, u.enabled,
                   r.id AS role_id, r.name AS role_name
            FROM users u
            INNER JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("User"))?;

        Ok(user_from_row(&row))
    }

    /// Find a user id by email, ignoring case
    pub async fn find_id_by_email(&self, email: &str) -> RepoResult<Option<i32>> {
        let id = sqlx::query_scalar("SELECT id FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    /// Apply a partial update
    pub async fn update(&self, id: i32, changes: &UserChanges) -> RepoResult<User> {
        info!("Updating user: {}", id);

        if let Some(role_id) = changes.role_id {
            self.ensure_role(role_id).await?;
        }
        if let Some(email) = &changes.email {
            if self.email_taken(email, Some(id)).await? {
                return Err(RepoError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                role_id = COALESCE($5, role_id),
                enabled = COALESCE($6, enabled)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.role_id)
        .bind(changes.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, EMAIL_TAKEN))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("User"));
        }
        self.get(id).await
    }

    /// Delete a user; refused while players or expenses reference it
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepoError::conflict_or_database(
                    e,
                    "The user cannot be deleted, it has associated records",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("User"));
        }
        Ok(())
    }

    pub async fn password_hash(&self, id: i32) -> RepoResult<String> {
        sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::not_found("User"))
    }

    pub async fn set_password_hash(&self, id: i32, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("User"));
        }
        Ok(())
    }

    /// Replace the photo filename, returning the previous one
    pub async fn replace_photo(&self, id: i32, photo: Option<&str>) -> RepoResult<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT photo FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| RepoError::not_found("User"))?;

        sqlx::query("UPDATE users SET photo = $2 WHERE id = $1")
            .bind(id)
            .bind(photo)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }

    /// Id of the role named `name`, ignoring case
    pub async fn role_id_by_name(&self, name: &str) -> RepoResult<i32> {
        sqlx::query_scalar("SELECT id FROM roles WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::not_found("Role"))
    }
}
