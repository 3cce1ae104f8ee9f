//! Player repository for database operations

use common::{
    error::{RepoError, RepoResult},
    pagination::{Page, PageRequest},
};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::{contains_pattern, user_summary};
use crate::models::player::{NewPlayer, Player, PlayerChanges, PlayerDetail, TopPlayer};

const IDENTIFICATION_TAKEN: &str = "The identification is already registered";

/// Player repository for database operations
#[derive(Clone)]
pub struct PlayerRepository {
    pool: PgPool,
}

pub(crate) fn player_from_row(row: &PgRow) -> Player {
    Player {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        birth_date: row.get("birth_date"),
        registered_on: row.get("registered_on"),
        identification: row.get("identification"),
        country: row.get("country"),
        total_spent: row.get("total_spent_cents"),
        height: row.get("height"),
        weight: row.get("weight"),
        dominant_foot: row.get("dominant_foot"),
        position: row.get("position"),
        active: row.get("active"),
        prospect: row.get("prospect"),
    }
}

impl PlayerRepository {
    /// Create a new player repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn identification_taken(&self, identification: &str, except: Option<i32>) -> RepoResult<bool> {
        let taken = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM players WHERE identification = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(identification)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Register a player on behalf of `created_by`
    pub async fn create(&self, input: &NewPlayer, created_by: i32) -> RepoResult<Player> {
        info!("Creating player: {}", input.identification);

        if self.identification_taken(&input.identification, None).await? {
            return Err(RepoError::Conflict(IDENTIFICATION_TAKEN.to_string()));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO players (first_name, last_name, birth_date, registered_on, identification,
                                 country, height, weight, dominant_foot, position, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, first_name, last_name, birth_date, registered_on, identification, country,
                      total_spent_cents, height, weight, dominant_foot, position, active, prospect
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.birth_date)
        .bind(input.registered_on)
        .bind(&input.identification)
        .bind(&input.country)
        .bind(input.height)
        .bind(input.weight)
        .bind(&input.dominant_foot)
        .bind(&input.position)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, IDENTIFICATION_TAKEN))?;

        Ok(player_from_row(&row))
    }

    /// Players by registration date, newest first
    pub async fn list(&self, page: PageRequest) -> RepoResult<Page<Player>> {
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, birth_date, registered_on, identification, country,
                   total_spent_cents, height, weight, dominant_foot, position, active, prospect
            FROM players
            ORDER BY registered_on DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(rows.iter().map(player_from_row).collect(), total, page))
    }

    /// Case-insensitive substring search over first and last names
    pub async fn search(&self, term: &str) -> RepoResult<Vec<Player>> {
        info!("Searching players: {}", term);

        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, birth_date, registered_on, identification, country,
                   total_spent_cents, height, weight, dominant_foot, position, active, prospect
            FROM players
            WHERE first_name ILIKE $1 OR last_name ILIKE $1
            ORDER BY last_name, first_name, id
            "#,
        )
        .bind(contains_pattern(term))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(player_from_row).collect())
    }

    /// Get a player with the user who registered it
    pub async fn get(&self, id: i32) -> RepoResult<PlayerDetail> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.first_name, p.last_name, p.birth_date, p.registered_on, p.identification,
                   p.country, p.total_spent_cents, p.height, p.weight, p.dominant_foot, p.position,
                   p.active, p.prospect,
                   u.id AS creator_id, u.email AS creator_email, u.first_name AS creator_first_name,
                   u.last_name AS creator_last_name, u.photo AS creator_photo
            FROM players p
            LEFT JOIN users u ON u.id = p.created_by
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Player"))?;

        let creator_id: Option<i32> = row.get("creator_id");

        Ok(PlayerDetail {
            player: player_from_row(&row),
            created_by: creator_id.map(|_| user_summary(&row, "creator_")),
        })
    }

    /// Fail with `NotFound` unless the player exists
    pub async fn ensure_exists(&self, id: i32) -> RepoResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(RepoError::not_found("Player"))
        }
    }

    /// Apply a partial update
    pub async fn update(&self, id: i32, changes: &PlayerChanges) -> RepoResult<Player> {
        info!("Updating player: {}", id);

        if let Some(identification) = &changes.identification {
            if self.identification_taken(identification, Some(id)).await? {
                return Err(RepoError::Conflict(IDENTIFICATION_TAKEN.to_string()));
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE players SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                birth_date = COALESCE($4, birth_date),
                registered_on = COALESCE($5, registered_on),
                identification = COALESCE($6, identification),
                country = COALESCE($7, country),
                height = COALESCE($8, height),
                weight = COALESCE($9, weight),
                dominant_foot = COALESCE($10, dominant_foot),
                position = COALESCE($11, position)
            WHERE id = $1
            RETURNING id, first_name, last_name, birth_date, registered_on, identification, country,
                      total_spent_cents, height, weight, dominant_foot, position, active, prospect
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.birth_date)
        .bind(changes.registered_on)
        .bind(&changes.identification)
        .bind(&changes.country)
        .bind(changes.height)
        .bind(changes.weight)
        .bind(&changes.dominant_foot)
        .bind(&changes.position)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::conflict_or_database(e, IDENTIFICATION_TAKEN))?
        .ok_or_else(|| RepoError::not_found("Player"))?;

        Ok(player_from_row(&row))
    }

    /// Delete a player; refused while evaluations or expenses reference it
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting player: {}", id);

        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepoError::conflict_or_database(
                    e,
                    "The player cannot be deleted, it has associated records",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Player"));
        }
        Ok(())
    }

    /// Flip the active flag
    pub async fn toggle_active(&self, id: i32) -> RepoResult<Player> {
        let row = sqlx::query(
            r#"
            UPDATE players SET active = NOT active
            WHERE id = $1
            RETURNING id, first_name, last_name, birth_date, registered_on, identification, country,
                      total_spent_cents, height, weight, dominant_foot, position, active, prospect
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Player"))?;

        Ok(player_from_row(&row))
    }

    /// Flip the prospect flag
    pub async fn toggle_prospect(&self, id: i32) -> RepoResult<Player> {
        let row = sqlx::query(
            r#"
            UPDATE players SET prospect = NOT prospect
            WHERE id = $1
            RETURNING id, first_name, last_name, birth_date, registered_on, identification, country,
                      total_spent_cents, height, weight, dominant_foot, position, active, prospect
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Player"))?;

        Ok(player_from_row(&row))
    }

    /// Players ranked by their mean value for the parameter named `parameter`
    pub async fn top_by_parameter(&self, parameter: &str, page: PageRequest) -> RepoResult<Page<TopPlayer>> {
        info!("Ranking players by parameter: {}", parameter);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT e.player_id)
            FROM evaluations e
            INNER JOIN evaluation_details d ON d.evaluation_id = e.id
            INNER JOIN evaluation_parameters pe ON pe.id = d.parameter_id
            WHERE pe.name = $1
            "#,
        )
        .bind(parameter)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT p.id AS player_id, p.first_name, p.last_name, p.position,
                   pe.name AS parameter, AVG(d.value)::float8 AS average
            FROM players p
            INNER JOIN evaluations e ON e.player_id = p.id
            INNER JOIN evaluation_details d ON d.evaluation_id = e.id
            INNER JOIN evaluation_parameters pe ON pe.id = d.parameter_id
            WHERE pe.name = $1
            GROUP BY p.id, p.first_name, p.last_name, p.position, pe.name
            ORDER BY average DESC, p.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(parameter)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let data = rows
            .iter()
            .map(|row| TopPlayer {
                player_id: row.get("player_id"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                position: row.get("position"),
                parameter: row.get("parameter"),
                average: row.get("average"),
            })
            .collect();

        Ok(Page::new(data, total, page))
    }
}
