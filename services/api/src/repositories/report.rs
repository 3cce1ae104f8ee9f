//! Player report queries

use chrono::{DateTime, Utc};
use common::error::RepoResult;
use sqlx::{PgPool, Row};
use tracing::info;

use super::PlayerRepository;
use crate::models::report::{
    EvaluationRow, ExpenseSummary, PlayerReport, age_on, group_averages, monthly_totals,
    trailing_months, window_start,
};

/// Evaluation rows listed at the end of a report
const RECENT_EVALUATION_ROWS: i64 = 20;

/// Builds player reports from players, evaluations and expenses
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
    players: PlayerRepository,
    months: u32,
}

impl ReportRepository {
    /// `months` is the length of the monthly expense window
    pub fn new(pool: PgPool, months: u32) -> Self {
        Self {
            players: PlayerRepository::new(pool.clone()),
            pool,
            months,
        }
    }

    /// Assemble the report of a player as of `now`
    pub async fn player_report(&self, player_id: i32, now: DateTime<Utc>) -> RepoResult<PlayerReport> {
        info!("Building report for player: {}", player_id);

        let player = self.players.get(player_id).await?;
        let today = now.date_naive();

        // Every enabled parameter is listed, unscored ones at 0; disabled ones
        // only while the player still has scores for them
        let average_rows = sqlx::query(
            r#"
            SELECT t.name AS type_name, pe.name AS parameter,
                   COALESCE(AVG(s.value), 0)::float8 AS average
            FROM evaluation_types t
            INNER JOIN evaluation_parameters pe ON pe.type_id = t.id
            LEFT JOIN (
                SELECT d.parameter_id, d.value
                FROM evaluation_details d
                INNER JOIN evaluations e ON e.id = d.evaluation_id
                WHERE e.player_id = $1
            ) s ON s.parameter_id = pe.id
            GROUP BY t.id, t.name, pe.id, pe.name
            HAVING (t.enabled AND pe.enabled) OR COUNT(s.value) > 0
            ORDER BY t.id, pe.id
            "#,
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        let averages = group_averages(
            average_rows
                .iter()
                .map(|row| {
                    (
                        row.get::<String, _>("type_name"),
                        row.get::<String, _>("parameter"),
                        row.get::<f64, _>("average"),
                    )
                })
                .collect(),
        );

        let month_rows = sqlx::query(
            r#"
            SELECT EXTRACT(YEAR FROM occurred_on)::int4 AS year,
                   EXTRACT(MONTH FROM occurred_on)::int4 AS month,
                   SUM(amount_cents)::int8 AS total
            FROM expenses
            WHERE player_id = $1 AND occurred_on >= $2
            GROUP BY 1, 2
            "#,
        )
        .bind(player_id)
        .bind(window_start(today, self.months))
        .fetch_all(&self.pool)
        .await?;
        let sums: Vec<(i32, u32, i64)> = month_rows
            .iter()
            .map(|row| {
                let month: i32 = row.get("month");
                (row.get("year"), month.unsigned_abs(), row.get("total"))
            })
            .collect();
        let monthly_expenses = monthly_totals(&trailing_months(today, self.months), &sums);

        let last_expense = sqlx::query(
            r#"
            SELECT amount_cents, description, occurred_on
            FROM expenses
            WHERE player_id = $1
            ORDER BY occurred_on DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| ExpenseSummary {
            amount: row.get("amount_cents"),
            description: row.get("description"),
            occurred_on: row.get("occurred_on"),
        });

        let recent_evaluations: Vec<EvaluationRow> = sqlx::query(
            r#"
            SELECT e.id AS evaluation_id, e.evaluated_at, t.name AS type_name,
                   pe.name AS parameter, d.value
            FROM evaluations e
            INNER JOIN evaluation_types t ON t.id = e.type_id
            INNER JOIN evaluation_details d ON d.evaluation_id = e.id
            INNER JOIN evaluation_parameters pe ON pe.id = d.parameter_id
            WHERE e.player_id = $1
            ORDER BY e.evaluated_at DESC, e.id DESC, pe.id
            LIMIT $2
            "#,
        )
        .bind(player_id)
        .bind(RECENT_EVALUATION_ROWS)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| EvaluationRow {
            evaluation_id: row.get("evaluation_id"),
            evaluated_at: row.get("evaluated_at"),
            evaluation_type: row.get("type_name"),
            parameter: row.get("parameter"),
            value: row.get("value"),
        })
        .collect();

        Ok(PlayerReport {
            generated_at: now,
            age: age_on(player.player.birth_date, today),
            total_spent: player.player.total_spent,
            player,
            averages,
            monthly_expenses,
            last_expense,
            recent_evaluations,
        })
    }
}
