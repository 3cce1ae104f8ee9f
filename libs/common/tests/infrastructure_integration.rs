//! Integration tests for the infrastructure components
//!
//! These tests verify that PostgreSQL is reachable, that the migrations apply
//! cleanly, and that the seeded access-control data resolves into principals.
//! They need a live database: `cargo test -- --ignored` with `DATABASE_URL`.

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    error::RepoError,
    principal::{ADMIN_ROLE, permissions, resolve_principal},
};
use sqlx::{PgPool, Row};

async fn migrated_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = migrated_pool().await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn seeded_admin_user_resolves_with_every_permission() -> Result<(), Box<dyn std::error::Error>> {
    let pool = migrated_pool().await?;

    let email = format!(
        "principal-{}@academy.test",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let user_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role_id)
        SELECT $1, 'not-a-hash', 'Test', 'Admin', id FROM roles WHERE name = $2
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(ADMIN_ROLE)
    .fetch_one(&pool)
    .await?;

    let principal = resolve_principal(&pool, user_id).await?;
    assert!(principal.is_admin());
    assert!(principal.enabled);
    for name in [
        permissions::EXPENSES,
        permissions::MANAGE_PLAYERS,
        permissions::MANAGE_EVALUATIONS,
        permissions::REPORTS,
    ] {
        assert!(principal.require_permission(name).is_ok(), "missing {name}");
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?;

    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn unknown_user_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let pool = migrated_pool().await?;

    let result = resolve_principal(&pool, i32::MAX).await;
    assert!(matches!(result, Err(RepoError::NotFound(_))));

    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn deleting_a_role_in_use_is_a_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let pool = migrated_pool().await?;

    let email = format!(
        "conflict-{}@academy.test",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let role_id: i32 = sqlx::query_scalar("SELECT id FROM roles WHERE name = 'evaluador'")
        .fetch_one(&pool)
        .await?;
    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, first_name, last_name, role_id) \
         VALUES ($1, 'x', 'Test', 'Evaluator', $2) RETURNING id",
    )
    .bind(&email)
    .bind(role_id)
    .fetch_one(&pool)
    .await?;

    let err = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(role_id)
        .execute(&pool)
        .await
        .expect_err("role is referenced by a user");
    assert!(matches!(RepoError::from(err), RepoError::Conflict(_)));

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?;

    Ok(())
}
