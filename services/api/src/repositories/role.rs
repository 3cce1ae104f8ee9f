//! Role repository for database operations

use common::error::{RepoError, RepoResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::permission::permission_from_row;
use crate::models::{
    evaluation::first_missing,
    role::{Role, RoleDetail, normalize_role_name},
};

const NAME_TAKEN: &str = "A role with that name already exists";

/// Role repository for database operations
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

fn role_from_row(row: &PgRow) -> Role {
    Role {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl RoleRepository {
    /// Create a new role repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> RepoResult<Vec<Role>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(role_from_row).collect())
    }

    /// Get a role with the full permission catalogue and the ids it holds
    pub async fn get_detail(&self, id: i32) -> RepoResult<RoleDetail> {
        let row = sqlx::query("SELECT id, name, created_at FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::not_found("Role"))?;

        let permissions = sqlx::query(
            "SELECT id, name, description, created_at FROM permissions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let selected: Vec<i32> = sqlx::query_scalar(
            "SELECT permission_id FROM role_permissions WHERE role_id = $1 ORDER BY permission_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RoleDetail {
            role: role_from_row(&row),
            permissions: permissions.iter().map(permission_from_row).collect(),
            selected,
        })
    }

    pub async fn create(&self, name: &str) -> RepoResult<Role> {
        let name = normalize_role_name(name);
        info!("Creating role: {}", name);

        let row = sqlx::query("INSERT INTO roles (name) VALUES ($1) RETURNING id, name, created_at")
            .bind(&name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::conflict_or_database(e, NAME_TAKEN))?;

        Ok(role_from_row(&row))
    }

    pub async fn rename(&self, id: i32, name: &str) -> RepoResult<Role> {
        let name = normalize_role_name(name);
        info!("Renaming role {} to {}", id, name);

        let row = sqlx::query(
            "UPDATE roles SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, NAME_TAKEN))?
        .ok_or_else(|| RepoError::not_found("Role"))?;

        Ok(role_from_row(&row))
    }

    /// Delete a role; refused while users hold it
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting role: {}", id);

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepoError::conflict_or_database(e, "The role cannot be deleted, it is assigned to users")
            })?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Role"));
        }
        Ok(())
    }

    /// Replace the role's permissions with exactly `permission_ids`
    ///
    /// Unknown ids abort the whole replacement.
    pub async fn replace_permissions(&self, role_id: i32, permission_ids: &[i32]) -> RepoResult<RoleDetail> {
        info!("Replacing permissions of role {}: {:?}", role_id, permission_ids);

        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(role_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepoError::not_found("Role"));
        }

        let known: Vec<i32> = sqlx::query_scalar("SELECT id FROM permissions WHERE id = ANY($1)")
            .bind(permission_ids)
            .fetch_all(&mut *tx)
            .await?;
        if let Some(missing) = first_missing(permission_ids, &known) {
            return Err(RepoError::NotFound(format!("Permission {} not found", missing)));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, permission_id FROM UNNEST($2::int4[]) AS s(permission_id)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_detail(role_id).await
    }
}
