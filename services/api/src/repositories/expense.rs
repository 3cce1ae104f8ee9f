//! Expense repository for database operations
//!
//! Every expense mutation adjusts the owning player's running total in the
//! same transaction, so the total always equals the sum of its expenses.

use common::{
    error::{RepoError, RepoResult},
    pagination::{Page, PageRequest},
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;

use super::user_summary;
use crate::{
    models::expense::{Expense, ExpenseChanges, ExpensePlayer, NewExpense},
    money::amount_delta,
};

/// Expense repository for database operations
#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

fn expense_from_row(row: &PgRow) -> Expense {
    Expense {
        id: row.get("id"),
        amount: row.get("amount_cents"),
        description: row.get("description"),
        occurred_on: row.get("occurred_on"),
        user: user_summary(row, "user_"),
        player: ExpensePlayer {
            id: row.get("player_id"),
            first_name: row.get("player_first_name"),
            last_name: row.get("player_last_name"),
            identification: row.get("player_identification"),
        },
    }
}

async fn adjust_total(tx: &mut Transaction<'_, Postgres>, player_id: i32, delta: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE players SET total_spent_cents = total_spent_cents + $2 WHERE id = $1",
    )
    .bind(player_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an expense for a player on behalf of `user_id`
    pub async fn create(&self, input: &NewExpense, user_id: i32) -> RepoResult<Expense> {
        info!(
            "Recording expense of {} cents for player {}",
            input.amount_cents, input.player_id
        );

        let mut tx = self.pool.begin().await?;

        if !adjust_total(&mut tx, input.player_id, input.amount_cents).await? {
            return Err(RepoError::not_found("Player"));
        }

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO expenses (player_id, user_id, amount_cents, description, occurred_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.player_id)
        .bind(user_id)
        .bind(input.amount_cents)
        .bind(&input.description)
        .bind(input.occurred_on)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(id).await
    }

    /// Apply a partial update, moving the player's total by the amount change
    pub async fn update(&self, id: i32, changes: &ExpenseChanges) -> RepoResult<Expense> {
        info!("Updating expense: {}", id);

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query("SELECT player_id, amount_cents FROM expenses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepoError::not_found("Expense"))?;
        let player_id: i32 = current.get("player_id");
        let old_amount: i64 = current.get("amount_cents");
        let new_amount = changes.amount_cents.unwrap_or(old_amount);

        sqlx::query(
            r#"
            UPDATE expenses SET
                amount_cents = $2,
                description = COALESCE($3, description),
                occurred_on = COALESCE($4, occurred_on)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_amount)
        .bind(&changes.description)
        .bind(changes.occurred_on)
        .execute(&mut *tx)
        .await?;

        let delta = amount_delta(old_amount, new_amount);
        if delta != 0 {
            adjust_total(&mut tx, player_id, delta).await?;
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete an expense and take its amount off the player's total
    pub async fn delete(&self, id: i32) -> RepoResult<()> {
        info!("Deleting expense: {}", id);

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM expenses WHERE id = $1 RETURNING player_id, amount_cents")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepoError::not_found("Expense"))?;

        let player_id: i32 = removed.get("player_id");
        let amount: i64 = removed.get("amount_cents");
        adjust_total(&mut tx, player_id, -amount).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get an expense with the recording user and the player
    pub async fn get(&self, id: i32) -> RepoResult<Expense> {
        let row = sqlx::query(
            r#"
            SELECT x.id, x.amount_cents, x.description, x.occurred_on,
                   u.id AS user_id, u.email AS user_email, u.first_name AS user_first_name,
                   u.last_name AS user_last_name, u.photo AS user_photo,
                   p.id AS player_id, p.first_name AS player_first_name,
                   p.last_name AS player_last_name, p.identification AS player_identification
            FROM expenses x
            INNER JOIN users u ON u.id = x.user_id
            INNER JOIN players p ON p.id = x.player_id
            WHERE x.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepoError::not_found("Expense"))?;

        Ok(expense_from_row(&row))
    }

    /// All expenses, most recent first
    pub async fn list(&self, page: PageRequest) -> RepoResult<Page<Expense>> {
        self.list_filtered(None, page).await
    }

    /// Expenses of one player, most recent first
    pub async fn list_for_player(&self, player_id: i32, page: PageRequest) -> RepoResult<Page<Expense>> {
        self.list_filtered(Some(player_id), page).await
    }

    async fn list_filtered(&self, player_id: Option<i32>, page: PageRequest) -> RepoResult<Page<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT x.id, x.amount_cents, x.description, x.occurred_on,
                   u.id AS user_id, u.email AS user_email, u.first_name AS user_first_name,
                   u.last_name AS user_last_name, u.photo AS user_photo,
                   p.id AS player_id, p.first_name AS player_first_name,
                   p.last_name AS player_last_name, p.identification AS player_identification
            FROM expenses x
            INNER JOIN users u ON u.id = x.user_id
            INNER JOIN players p ON p.id = x.player_id
            WHERE $1::int4 IS NULL OR x.player_id = $1
            ORDER BY x.occurred_on DESC, x.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(player_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM expenses WHERE $1::int4 IS NULL OR player_id = $1",
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(rows.iter().map(expense_from_row).collect(), total, page))
    }
}
