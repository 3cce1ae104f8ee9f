//! Permission repository for database operations

use common::error::{RepoError, RepoResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::permission::{CreatePermissionRequest, Permission, UpdatePermissionRequest};

const NAME_TAKEN: &str = "A permission with that name already exists";

/// Permission repository for database operations
#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

pub(crate) fn permission_from_row(row: &PgRow) -> Permission {
    Permission {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

/// Permission names are matched exactly by guards, so only trim them
fn clean_name(name: &str) -> String {
    name.trim().to_string()
}

impl PermissionRepository {
    /// Create a new permission repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> RepoResult<Vec<Permission>> {
        let rows = sqlx::query("SELECT id, name, description, created_at FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(permission_from_row).collect())
    }

    pub async fn get(&self, id: i32) -> RepoResult<Permission> {
        let row = sqlx::query("SELECT id, name, description, created_at FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::not_found("Permission"))?;
        Ok(permission_from_row(&row))
    }

    /// Create a permission and grant it to the creator's role
    pub async fn create(&self, input: &CreatePermissionRequest, creator_role_id: i32) -> RepoResult<Permission> {
        let name = clean_name(&input.name);
        info!("Creating permission: {}", name);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO permissions (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, NAME_TAKEN))?;
        let permission = permission_from_row(&row);

        sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
            .bind(creator_role_id)
            .bind(permission.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(permission)
    }

    pub async fn update(&self, id: i32, input: &UpdatePermissionRequest) -> RepoResult<Permission> {
        info!("Updating permission: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE permissions SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(clean_name))
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, NAME_TAKEN))?
        .ok_or_else(|| RepoError::not_found("Permission"))?;

        Ok(permission_from_row(&row))
    }

    /// Delete a permission, revoking it from every role
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting permission: {}", id);

        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Permission"));
        }
        Ok(())
    }
}
