//! Evaluation type and parameter repository

use common::error::{RepoError, RepoResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::evaluation_type::{
    CreateEvaluationTypeRequest, CreateParameterRequest, EvaluationParameter, EvaluationType,
    EvaluationTypeDetail, UpdateEvaluationTypeRequest, UpdateParameterRequest, normalize_name,
};

const TYPE_NAME_TAKEN: &str = "An evaluation type with that name already exists";
const PARAMETER_NAME_TAKEN: &str = "The type already has a parameter with that name";

/// Repository for evaluation types and their parameters
#[derive(Clone)]
pub struct EvaluationTypeRepository {
    pool: PgPool,
}

fn type_from_row(row: &PgRow) -> EvaluationType {
    EvaluationType {
        id: row.get("id"),
        name: row.get("name"),
        icon: row.get("icon"),
        enabled: row.get("enabled"),
    }
}

fn parameter_from_row(row: &PgRow) -> EvaluationParameter {
    EvaluationParameter {
        id: row.get("id"),
        type_id: row.get("type_id"),
        name: row.get("name"),
        description: row.get("description"),
        enabled: row.get("enabled"),
    }
}

impl EvaluationTypeRepository {
    /// Create a new evaluation type repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> RepoResult<Vec<EvaluationType>> {
        let rows = sqlx::query("SELECT id, name, icon, enabled FROM evaluation_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(type_from_row).collect())
    }

    /// Get a type together with its parameters
    pub async fn get(&self, id: i32) -> RepoResult<EvaluationTypeDetail> {
        let row = sqlx::query("SELECT id, name, icon, enabled FROM evaluation_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::not_found("Evaluation type"))?;

        Ok(EvaluationTypeDetail {
            evaluation_type: type_from_row(&row),
            parameters: self.load_parameters(id).await?,
        })
    }

    pub async fn create(&self, input: &CreateEvaluationTypeRequest) -> RepoResult<EvaluationType> {
        let name = normalize_name(&input.name);
        info!("Creating evaluation type: {}", name);

        let row = sqlx::query(
            "INSERT INTO evaluation_types (name, icon) VALUES ($1, $2) RETURNING id, name, icon, enabled",
        )
        .bind(&name)
        .bind(&input.icon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, TYPE_NAME_TAKEN))?;

        Ok(type_from_row(&row))
    }

    pub async fn update(&self, id: i32, input: &UpdateEvaluationTypeRequest) -> RepoResult<EvaluationType> {
        info!("Updating evaluation type: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE evaluation_types SET
                name = COALESCE($2, name),
                icon = COALESCE($3, icon)
            WHERE id = $1
            RETURNING id, name, icon, enabled
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(normalize_name))
        .bind(&input.icon)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, TYPE_NAME_TAKEN))?
        .ok_or_else(|| RepoError::not_found("Evaluation type"))?;

        Ok(type_from_row(&row))
    }

    /// Delete a type; refused while parameters or evaluations reference it
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting evaluation type: {}", id);

        let result = sqlx::query("DELETE FROM evaluation_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepoError::conflict_or_database(
                    e,
                    "The evaluation type cannot be deleted, it has associated records",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Evaluation type"));
        }
        Ok(())
    }

    pub async fn toggle(&self, id: i32) -> RepoResult<EvaluationType> {
        let row = sqlx::query(
            "UPDATE evaluation_types SET enabled = NOT enabled WHERE id = $1 RETURNING id, name, icon, enabled",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Evaluation type"))?;

        Ok(type_from_row(&row))
    }

    /// Parameters of a type, failing when the type does not exist
    pub async fn parameters_of(&self, type_id: i32) -> RepoResult<Vec<EvaluationParameter>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM evaluation_types WHERE id = $1)")
                .bind(type_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(RepoError::not_found("Evaluation type"));
        }
        self.load_parameters(type_id).await
    }

    async fn load_parameters(&self, type_id: i32) -> RepoResult<Vec<EvaluationParameter>> {
        let rows = sqlx::query(
            r#"
            SELECT id, type_id, name, description, enabled
            FROM evaluation_parameters
            WHERE type_id = $1
            ORDER BY id
            "#,
        )
        .bind(type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(parameter_from_row).collect())
    }

    pub async fn get_parameter(&self, id: i32) -> RepoResult<EvaluationParameter> {
        let row = sqlx::query(
            "SELECT id, type_id, name, description, enabled FROM evaluation_parameters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Parameter"))?;

        Ok(parameter_from_row(&row))
    }

    pub async fn create_parameter(&self, input: &CreateParameterRequest) -> RepoResult<EvaluationParameter> {
        let name = normalize_name(&input.name);
        info!("Creating parameter {} for type {}", name, input.type_id);

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM evaluation_types WHERE id = $1)")
                .bind(input.type_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(RepoError::not_found("Evaluation type"));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO evaluation_parameters (type_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, type_id, name, description, enabled
            "#,
        )
        .bind(input.type_id)
        .bind(&name)
        .bind(input.description.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, PARAMETER_NAME_TAKEN))?;

        Ok(parameter_from_row(&row))
    }

    pub async fn update_parameter(&self, id: i32, input: &UpdateParameterRequest) -> RepoResult<EvaluationParameter> {
        info!("Updating parameter: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE evaluation_parameters SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, type_id, name, description, enabled
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(normalize_name))
        .bind(input.description.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, PARAMETER_NAME_TAKEN))?
        .ok_or_else(|| RepoError::not_found("Parameter"))?;

        Ok(parameter_from_row(&row))
    }

    /// Delete a parameter; refused while evaluation details reference it
    pub async fn delete_parameter(&self, id: i32) -> RepoResult<()> {
        info!("Deleting parameter: {}", id);

        let result = sqlx::query("DELETE FROM evaluation_parameters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepoError::conflict_or_database(e, "The parameter cannot be deleted, it has been evaluated")
            })?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Parameter"));
        }
        Ok(())
    }

    pub async fn toggle_parameter(&self, id: i32) -> RepoResult<EvaluationParameter> {
        let row = sqlx::query(
            r#"
            UPDATE evaluation_parameters SET enabled = NOT enabled
            WHERE id = $1
            RETURNING id, type_id, name, description, enabled
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Parameter"))?;

        Ok(parameter_from_row(&row))
    }
}
