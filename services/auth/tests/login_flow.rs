//! Login and session checks against a live database
//!
//! Run with `cargo test -p auth -- --ignored` and `DATABASE_URL` set.

use auth::{
    AppState,
    mailer::Mailer,
    repositories::{ResetTokenRepository, UserRepository},
    routes,
    settings::Settings,
};
use common::{
    credentials::hash_password,
    database::{DatabaseConfig, init_pool, run_migrations},
    http::Authenticator,
    jwt::{JwtConfig, TokenService},
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const PASSWORD: &str = "correct-password";

fn token_service() -> TokenService {
    TokenService::new(JwtConfig {
        secret: "login-flow-secret".to_string(),
        session_expiry: 300,
    })
}

async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn create_user(pool: &PgPool, enabled: bool) -> Result<(i32, String), Box<dyn std::error::Error>> {
    let email = format!(
        "login-{}@academy.test",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role_id, enabled)
        SELECT $1, $2, 'Login', 'Tester', id, $3 FROM roles WHERE name = 'entrenador'
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(hash_password(PASSWORD)?)
    .bind(enabled)
    .fetch_one(pool)
    .await?;
    Ok((id, email))
}

async fn delete_user(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn spawn_app(pool: PgPool) -> Result<String, Box<dyn std::error::Error>> {
    let state = AppState {
        users: UserRepository::new(pool.clone()),
        reset_tokens: ResetTokenRepository::new(pool.clone()),
        authenticator: Authenticator::new(pool.clone(), token_service()),
        mailer: Mailer::Log,
        settings: Settings {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
        },
        pool,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}", address))
}

async fn login(base: &str, email: &str, password: &str) -> Result<(StatusCode, Value), reqwest::Error> {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    let status = response.status();
    Ok((status, response.json().await?))
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn wrong_password_is_rejected_without_token() -> TestResult {
    let pool = connect().await?;
    let (user_id, email) = create_user(&pool, true).await?;
    let base = spawn_app(pool.clone()).await?;

    let (status, body) = login(&base, &email, "wrong-password").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("token").is_none());

    let (status, body) = login(&base, &email, PASSWORD).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id);
    let token = body["token"].as_str().unwrap_or_default();
    assert!(!token.is_empty());

    let response = reqwest::Client::new()
        .get(format!("{base}/api/auth/verify"))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    delete_user(&pool, user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn disabled_account_cannot_log_in() -> TestResult {
    let pool = connect().await?;
    let (user_id, email) = create_user(&pool, false).await?;
    let base = spawn_app(pool.clone()).await?;

    let (status, body) = login(&base, &email, PASSWORD).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert!(body.get("token").is_none());

    delete_user(&pool, user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn disabling_an_account_revokes_its_sessions() -> TestResult {
    let pool = connect().await?;
    let (user_id, _) = create_user(&pool, true).await?;
    let authenticator = Authenticator::new(pool.clone(), token_service());

    let token = authenticator.tokens().issue(user_id)?;
    assert_eq!(authenticator.authenticate(&token).await?.id, user_id);

    sqlx::query("UPDATE users SET enabled = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?;

    let err = match authenticator.authenticate(&token).await {
        Ok(principal) => panic!("disabled user authenticated as {}", principal.id),
        Err(err) => err,
    };
    assert_eq!(err.status().as_u16(), 403);

    // A token for a removed user is an authentication failure instead
    delete_user(&pool, user_id).await?;
    let err = match authenticator.authenticate(&token).await {
        Ok(principal) => panic!("deleted user authenticated as {}", principal.id),
        Err(err) => err,
    };
    assert_eq!(err.status().as_u16(), 401);
    Ok(())
}
