//! Password recovery against a live database
//!
//! Run with `cargo test -p auth -- --ignored` and `DATABASE_URL` set.

use auth::repositories::{ResetTokenRepository, UserRepository};
use common::{
    credentials::{hash_password, verify_password},
    database::{DatabaseConfig, init_pool, run_migrations},
    error::RepoError,
};
use sqlx::PgPool;

async fn setup() -> Result<(PgPool, i32, String), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;

    let email = format!(
        "reset-{}@academy.test",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let user_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role_id)
        SELECT $1, $2, 'Reset', 'Tester', id FROM roles WHERE name = 'entrenador'
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(hash_password("old-password")?)
    .fetch_one(&pool)
    .await?;

    Ok((pool, user_id, email))
}

async fn cleanup(pool: &PgPool, user_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn reset_code_is_single_use() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, user_id, _) = setup().await?;
    let tokens = ResetTokenRepository::new(pool.clone());

    let issued = tokens.issue(user_id).await?;
    assert_eq!(issued.value.len(), 5);

    // Verification does not consume the code
    tokens.find_valid(&issued.value).await?;
    tokens.find_valid(&issued.value).await?;

    tokens
        .consume(&issued.value, &hash_password("new-password")?)
        .await?;

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await?;
    assert!(verify_password("new-password", &hash));

    assert!(matches!(
        tokens.find_valid(&issued.value).await,
        Err(RepoError::Invalid(_))
    ));
    assert!(matches!(
        tokens.consume(&issued.value, "irrelevant").await,
        Err(RepoError::Invalid(_))
    ));

    cleanup(&pool, user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn expired_code_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, user_id, _) = setup().await?;
    let tokens = ResetTokenRepository::new(pool.clone());

    let issued = tokens.issue(user_id).await?;
    sqlx::query("UPDATE reset_tokens SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(issued.id)
        .execute(&pool)
        .await?;

    assert!(matches!(
        tokens.find_valid(&issued.value).await,
        Err(RepoError::Invalid(_))
    ));

    cleanup(&pool, user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn issuing_replaces_previous_code() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, user_id, _) = setup().await?;
    let tokens = ResetTokenRepository::new(pool.clone());

    let first = tokens.issue(user_id).await?;
    let second = tokens.issue(user_id).await?;

    let outstanding: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reset_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(outstanding, 1);
    tokens.find_valid(&second.value).await?;
    if first.value != second.value {
        assert!(tokens.find_valid(&first.value).await.is_err());
    }

    cleanup(&pool, user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn email_lookup_ignores_case() -> Result<(), Box<dyn std::error::Error>> {
    let (pool, user_id, email) = setup().await?;
    let users = UserRepository::new(pool.clone());

    let found = users.find_by_email(&email.to_uppercase()).await?;
    assert_eq!(found.map(|u| u.id), Some(user_id));
    assert!(users.find_by_email("nobody@academy.test").await?.is_none());

    cleanup(&pool, user_id).await?;
    Ok(())
}
