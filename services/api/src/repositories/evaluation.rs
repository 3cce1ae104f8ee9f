//! Evaluation repository for database operations

use common::{
    error::{RepoError, RepoResult},
    pagination::{Page, PageRequest},
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::collections::HashMap;
use tracing::info;

use crate::models::{
    evaluation::{
        CreateEvaluationRequest, EvaluatedPlayer, Evaluation, EvaluationDetail, ParameterScore,
        first_missing, score_columns,
    },
    evaluation_type::{EvaluationParameter, EvaluationType},
};

/// Evaluation repository for database operations
#[derive(Clone)]
pub struct EvaluationRepository {
    pool: PgPool,
}

fn evaluation_from_row(row: &PgRow, details: Vec<EvaluationDetail>) -> Evaluation {
    Evaluation {
        id: row.get("id"),
        evaluated_at: row.get("evaluated_at"),
        player: EvaluatedPlayer {
            id: row.get("player_id"),
            first_name: row.get("player_first_name"),
            last_name: row.get("player_last_name"),
            position: row.get("player_position"),
        },
        evaluation_type: EvaluationType {
            id: row.get("type_id"),
            name: row.get("type_name"),
            icon: row.get("type_icon"),
            enabled: row.get("type_enabled"),
        },
        details,
    }
}

async fn exists(tx: &mut Transaction<'_, Postgres>, sql: &str, id: i32) -> RepoResult<bool> {
    let found: bool = sqlx::query_scalar(sql).bind(id).fetch_one(&mut **tx).await?;
    Ok(found)
}

impl EvaluationRepository {
    /// Create a new evaluation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an evaluation and one detail row per scored parameter
    pub async fn create(&self, input: &CreateEvaluationRequest) -> RepoResult<Evaluation> {
        info!(
            "Creating evaluation for player {} of type {}",
            input.player_id, input.type_id
        );

        let mut tx = self.pool.begin().await?;

        if !exists(&mut tx, "SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)", input.player_id).await? {
            return Err(RepoError::not_found("Player"));
        }
        if !exists(
            &mut tx,
            "SELECT EXISTS(SELECT 1 FROM evaluation_types WHERE id = $1)",
            input.type_id,
        )
        .await?
        {
            return Err(RepoError::not_found("Evaluation type"));
        }

        let (parameter_ids, values) = score_columns(&input.parameters);

        let known: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM evaluation_parameters WHERE type_id = $1 AND id = ANY($2)",
        )
        .bind(input.type_id)
        .bind(&parameter_ids)
        .fetch_all(&mut *tx)
        .await?;
        if let Some(missing) = first_missing(&parameter_ids, &known) {
            return Err(RepoError::NotFound(format!(
                "Parameter {} does not belong to this evaluation type",
                missing
            )));
        }

        let evaluation_id: i32 = sqlx::query_scalar(
            "INSERT INTO evaluations (player_id, type_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.player_id)
        .bind(input.type_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO evaluation_details (evaluation_id, parameter_id, value)
            SELECT $1, parameter_id, value
            FROM UNNEST($2::int4[], $3::float8[]) AS s(parameter_id, value)
            "#,
        )
        .bind(evaluation_id)
        .bind(&parameter_ids)
        .bind(&values)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(evaluation_id).await
    }

    /// Change the values of parameters already scored by the evaluation
    ///
    /// Nothing is written unless every submitted parameter has a detail row.
    pub async fn update_scores(&self, id: i32, scores: &[ParameterScore]) -> RepoResult<Evaluation> {
        info!("Updating evaluation: {}", id);

        let mut tx = self.pool.begin().await?;

        if !exists(&mut tx, "SELECT EXISTS(SELECT 1 FROM evaluations WHERE id = $1)", id).await? {
            return Err(RepoError::not_found("Evaluation"));
        }

        let (parameter_ids, values) = score_columns(scores);

        let scored: Vec<i32> = sqlx::query_scalar(
            "SELECT parameter_id FROM evaluation_details WHERE evaluation_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        if let Some(missing) = first_missing(&parameter_ids, &scored) {
            return Err(RepoError::NotFound(format!(
                "Parameter {} is not part of this evaluation",
                missing
            )));
        }

        sqlx::query(
            r#"
            UPDATE evaluation_details d
            SET value = s.value
            FROM UNNEST($2::int4[], $3::float8[]) AS s(parameter_id, value)
            WHERE d.evaluation_id = $1 AND d.parameter_id = s.parameter_id
            "#,
        )
        .bind(id)
        .bind(&parameter_ids)
        .bind(&values)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete an evaluation together with its details
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting evaluation: {}", id);

        let result = sqlx::query("DELETE FROM evaluations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Evaluation"));
        }
        Ok(())
    }

    /// Get an evaluation with its player, type and details
    pub async fn get(&self, id: i32) -> RepoResult<Evaluation> {
        let row = sqlx::query(
            r#"
            SELECT e.id, e.evaluated_at,
                   p.id AS player_id, p.first_name AS player_first_name,
                   p.last_name AS player_last_name, p.position AS player_position,
                   t.id AS type_id, t.name AS type_name, t.icon AS type_icon,
                   t.enabled AS type_enabled
            FROM evaluations e
            INNER JOIN players p ON p.id = e.player_id
            INNER JOIN evaluation_types t ON t.id = e.type_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Evaluation"))?;

        let mut details = self.details_for(&[id]).await?;
        let details = details.remove(&id).unwrap_or_default();

        Ok(evaluation_from_row(&row, details))
    }

    /// Evaluations of one player, most recent first
    pub async fn list_for_player(&self, player_id: i32, page: PageRequest) -> RepoResult<Page<Evaluation>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.evaluated_at,
                   p.id AS player_id, p.first_name AS player_first_name,
                   p.last_name AS player_last_name, p.position AS player_position,
                   t.id AS type_id, t.name AS type_name, t.icon AS type_icon,
                   t.enabled AS type_enabled
            FROM evaluations e
            INNER JOIN players p ON p.id = e.player_id
            INNER JOIN evaluation_types t ON t.id = e.type_id
            WHERE e.player_id = $1
            ORDER BY e.evaluated_at DESC, e.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(player_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM evaluations WHERE player_id = $1")
            .bind(player_id)
            .fetch_one(&self.pool)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.get("id")).collect();
        let mut details = self.details_for(&ids).await?;

        let data = rows
            .iter()
            .map(|row| {
                let id: i32 = row.get("id");
                evaluation_from_row(row, details.remove(&id).unwrap_or_default())
            })
            .collect();

        Ok(Page::new(data, total, page))
    }

    /// Details of the given evaluations, grouped by evaluation id
    async fn details_for(&self, evaluation_ids: &[i32]) -> RepoResult<HashMap<i32, Vec<EvaluationDetail>>> {
        if evaluation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT d.id, d.evaluation_id, d.value,
                   pe.id AS parameter_id, pe.type_id, pe.name, pe.description, pe.enabled
            FROM evaluation_details d
            INNER JOIN evaluation_parameters pe ON pe.id = d.parameter_id
            WHERE d.evaluation_id = ANY($1)
            ORDER BY d.evaluation_id, pe.id
            "#,
        )
        .bind(evaluation_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<EvaluationDetail>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.get("evaluation_id"))
                .or_default()
                .push(EvaluationDetail {
                    id: row.get("id"),
                    value: row.get("value"),
                    parameter: EvaluationParameter {
                        id: row.get("parameter_id"),
                        type_id: row.get("type_id"),
                        name: row.get("name"),
                        description: row.get("description"),
                        enabled: row.get("enabled"),
                    },
                });
        }
        Ok(grouped)
    }
}
