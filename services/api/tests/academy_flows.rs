//! Composite repository behavior against a live database
//!
//! Run with `cargo test -p api -- --ignored` and `DATABASE_URL` set.

use api::{
    models::{
        evaluation::{CreateEvaluationRequest, ParameterScore},
        evaluation_type::{CreateEvaluationTypeRequest, CreateParameterRequest},
        expense::{ExpenseChanges, NewExpense},
        player::NewPlayer,
    },
    repositories::{
        EvaluationRepository, EvaluationTypeRepository, ExpenseRepository, PlayerRepository,
        ReportRepository, RoleRepository,
    },
};
use chrono::NaiveDate;
use common::{
    credentials::hash_password,
    database::{DatabaseConfig, init_pool, run_migrations},
    error::RepoError,
    principal::resolve_principal,
};
use sqlx::PgPool;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn unique(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn create_user(pool: &PgPool, role: &str) -> Result<i32, Box<dyn std::error::Error>> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role_id)
        SELECT $1, $2, 'Flow', 'Tester', id FROM roles WHERE name = $3
        RETURNING id
        "#,
    )
    .bind(format!("{}@academy.test", unique("flow")))
    .bind(hash_password("secret")?)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

fn new_player(last_name: &str) -> NewPlayer {
    NewPlayer {
        first_name: "Teo".to_string(),
        last_name: last_name.to_string(),
        birth_date: NaiveDate::from_ymd_opt(2012, 4, 2).unwrap(),
        registered_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        identification: unique("ID"),
        country: "Peru".to_string(),
        height: Some(150.0),
        weight: None,
        dominant_foot: "izquierdo".to_string(),
        position: "defensa".to_string(),
    }
}

async fn delete_rows(pool: &PgPool, table: &str, column: &str, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {table} WHERE {column} = $1"))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn player_total_tracks_expense_changes() -> TestResult {
    let pool = connect().await?;
    let user_id = create_user(&pool, "admin").await?;
    let players = PlayerRepository::new(pool.clone());
    let expenses = ExpenseRepository::new(pool.clone());

    let player = players.create(&new_player("Totals"), user_id).await?;
    assert_eq!(player.total_spent, 0);

    let expense = expenses
        .create(
            &NewExpense {
                player_id: player.id,
                amount_cents: 10_000,
                description: "Boots".to_string(),
                occurred_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            },
            user_id,
        )
        .await?;
    assert_eq!(players.get(player.id).await?.player.total_spent, 10_000);

    expenses
        .update(
            expense.id,
            &ExpenseChanges {
                amount_cents: Some(6_000),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(players.get(player.id).await?.player.total_spent, 6_000);

    // Description-only edits leave the total alone
    expenses
        .update(
            expense.id,
            &ExpenseChanges {
                description: Some("Boots and socks".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(players.get(player.id).await?.player.total_spent, 6_000);

    expenses.delete(expense.id).await?;
    assert_eq!(players.get(player.id).await?.player.total_spent, 0);

    players.delete(player.id).await?;
    delete_rows(&pool, "users", "id", user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn expense_for_missing_player_changes_nothing() -> TestResult {
    let pool = connect().await?;
    let user_id = create_user(&pool, "admin").await?;
    let expenses = ExpenseRepository::new(pool.clone());

    let result = expenses
        .create(
            &NewExpense {
                player_id: i32::MAX,
                amount_cents: 500,
                description: "Ghost".to_string(),
                occurred_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            },
            user_id,
        )
        .await;
    assert!(matches!(result, Err(RepoError::NotFound(_))));

    delete_rows(&pool, "users", "id", user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn role_grants_are_replaced_as_a_whole() -> TestResult {
    let pool = connect().await?;
    let roles = RoleRepository::new(pool.clone());

    let role = roles.create(&unique("Coach")).await?;
    assert_eq!(role.name, role.name.to_lowercase());
    assert!(roles.get_detail(role.id).await?.selected.is_empty());

    let ids: Vec<i32> = sqlx::query_scalar(
        "SELECT id FROM permissions WHERE name IN ('gastos', 'top_jugadores') ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;
    let excluded: i32 =
        sqlx::query_scalar("SELECT id FROM permissions WHERE name = 'mantener_jugadores'")
            .fetch_one(&pool)
            .await?;

    let detail = roles.replace_permissions(role.id, &ids).await?;
    assert_eq!(detail.selected, ids);

    let user_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role_id)
        VALUES ($1, 'x', 'Role', 'Tester', $2)
        RETURNING id
        "#,
    )
    .bind(format!("{}@academy.test", unique("role")))
    .bind(role.id)
    .fetch_one(&pool)
    .await?;

    let principal = resolve_principal(&pool, user_id).await?;
    assert!(principal.require_permission("gastos").is_ok());
    assert!(principal.require_permission("top_jugadores").is_ok());
    assert!(principal.require_permission("mantener_jugadores").is_err());

    // Replacing twice with the same set is idempotent
    let again = roles.replace_permissions(role.id, &ids).await?;
    assert_eq!(again.selected, ids);

    // Unknown ids abort without touching the current grants
    let result = roles.replace_permissions(role.id, &[excluded, i32::MAX]).await;
    assert!(matches!(result, Err(RepoError::NotFound(_))));
    assert_eq!(roles.get_detail(role.id).await?.selected, ids);

    // A role still held by a user cannot be deleted
    assert!(matches!(roles.delete(role.id).await, Err(RepoError::Conflict(_))));

    let cleared = roles.replace_permissions(role.id, &[]).await?;
    assert!(cleared.selected.is_empty());
    assert!(resolve_principal(&pool, user_id).await?.permissions.is_empty());

    delete_rows(&pool, "users", "id", user_id).await?;
    roles.delete(role.id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn search_matches_substrings_ignoring_case() -> TestResult {
    let pool = connect().await?;
    let user_id = create_user(&pool, "entrenador").await?;
    let players = PlayerRepository::new(pool.clone());

    let last_name = unique("Zamorano");
    let player = players.create(&new_player(&last_name), user_id).await?;

    let found = players.search(&last_name[2..8].to_uppercase()).await?;
    assert!(found.iter().any(|p| p.id == player.id));

    let none = players.search("%").await?;
    assert!(none.iter().all(|p| p.first_name.contains('%') || p.last_name.contains('%')));

    players.delete(player.id).await?;
    delete_rows(&pool, "users", "id", user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn referenced_player_is_not_deleted() -> TestResult {
    let pool = connect().await?;
    let user_id = create_user(&pool, "admin").await?;
    let players = PlayerRepository::new(pool.clone());
    let expenses = ExpenseRepository::new(pool.clone());

    let player = players.create(&new_player("Referenced"), user_id).await?;
    let expense = expenses
        .create(
            &NewExpense {
                player_id: player.id,
                amount_cents: 2_500,
                description: "Transport".to_string(),
                occurred_on: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            },
            user_id,
        )
        .await?;

    assert!(matches!(players.delete(player.id).await, Err(RepoError::Conflict(_))));
    assert_eq!(players.get(player.id).await?.player.total_spent, 2_500);

    let duplicate = NewPlayer {
        identification: player.identification.clone(),
        ..new_player("Duplicate")
    };
    assert!(matches!(
        players.create(&duplicate, user_id).await,
        Err(RepoError::Conflict(_))
    ));

    expenses.delete(expense.id).await?;
    players.delete(player.id).await?;
    delete_rows(&pool, "users", "id", user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn evaluation_edit_rejects_unscored_parameters() -> TestResult {
    let pool = connect().await?;
    let user_id = create_user(&pool, "evaluador").await?;
    let players = PlayerRepository::new(pool.clone());
    let types = EvaluationTypeRepository::new(pool.clone());
    let evaluations = EvaluationRepository::new(pool.clone());

    let player = players.create(&new_player("Evaluated"), user_id).await?;
    let evaluation_type = types
        .create(&CreateEvaluationTypeRequest {
            name: unique("Fisico"),
            icon: None,
        })
        .await?;
    let speed = types
        .create_parameter(&CreateParameterRequest {
            name: "Velocidad".to_string(),
            description: "Sprint time".to_string(),
            type_id: evaluation_type.id,
        })
        .await?;
    let stamina = types
        .create_parameter(&CreateParameterRequest {
            name: "Resistencia".to_string(),
            description: "Endurance".to_string(),
            type_id: evaluation_type.id,
        })
        .await?;
    assert_eq!(speed.name, "velocidad");

    let evaluation = evaluations
        .create(&CreateEvaluationRequest {
            player_id: player.id,
            type_id: evaluation_type.id,
            parameters: vec![ParameterScore {
                parameter_id: speed.id,
                value: 7.5,
            }],
        })
        .await?;
    assert_eq!(evaluation.details.len(), 1);

    let result = evaluations
        .update_scores(
            evaluation.id,
            &[
                ParameterScore {
                    parameter_id: speed.id,
                    value: 9.0,
                },
                ParameterScore {
                    parameter_id: stamina.id,
                    value: 4.0,
                },
            ],
        )
        .await;
    match result {
        Err(RepoError::NotFound(message)) => assert!(message.contains(&stamina.id.to_string())),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(evaluations.get(evaluation.id).await?.details[0].value, 7.5);

    let updated = evaluations
        .update_scores(
            evaluation.id,
            &[ParameterScore {
                parameter_id: speed.id,
                value: 9.0,
            }],
        )
        .await?;
    assert_eq!(updated.details[0].value, 9.0);

    // Parameters that have been scored cannot be deleted
    assert!(matches!(
        types.delete_parameter(speed.id).await,
        Err(RepoError::Conflict(_))
    ));

    evaluations.delete(evaluation.id).await?;
    types.delete_parameter(speed.id).await?;
    types.delete_parameter(stamina.id).await?;
    types.delete(evaluation_type.id).await?;
    players.delete(player.id).await?;
    delete_rows(&pool, "users", "id", user_id).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn report_lists_unscored_parameters_as_zero() -> TestResult {
    let pool = connect().await?;
    let user_id = create_user(&pool, "evaluador").await?;
    let players = PlayerRepository::new(pool.clone());
    let types = EvaluationTypeRepository::new(pool.clone());
    let evaluations = EvaluationRepository::new(pool.clone());
    let reports = ReportRepository::new(pool.clone(), 4);

    let player = players.create(&new_player("Reported"), user_id).await?;
    let evaluation_type = types
        .create(&CreateEvaluationTypeRequest {
            name: unique("Tecnico"),
            icon: None,
        })
        .await?;
    let mut parameters = Vec::new();
    for name in ["Pase", "Control", "Remate"] {
        parameters.push(
            types
                .create_parameter(&CreateParameterRequest {
                    name: name.to_string(),
                    description: format!("{name} drill"),
                    type_id: evaluation_type.id,
                })
                .await?,
        );
    }

    let evaluation = evaluations
        .create(&CreateEvaluationRequest {
            player_id: player.id,
            type_id: evaluation_type.id,
            parameters: vec![ParameterScore {
                parameter_id: parameters[0].id,
                value: 8.0,
            }],
        })
        .await?;

    let report = reports.player_report(player.id, chrono::Utc::now()).await?;
    let group = report
        .averages
        .iter()
        .find(|group| group.evaluation_type == evaluation_type.name)
        .ok_or("evaluation type missing from report")?;
    let listed: Vec<(&str, f64)> = group
        .parameters
        .iter()
        .map(|p| (p.parameter.as_str(), p.average))
        .collect();
    assert_eq!(listed, [("pase", 8.0), ("control", 0.0), ("remate", 0.0)]);
    assert_eq!(report.monthly_expenses.len(), 4);
    assert!(report.monthly_expenses.iter().all(|month| month.total == 0));

    evaluations.delete(evaluation.id).await?;
    for parameter in &parameters {
        types.delete_parameter(parameter.id).await?;
    }
    types.delete(evaluation_type.id).await?;
    players.delete(player.id).await?;
    delete_rows(&pool, "users", "id", user_id).await?;
    Ok(())
}
