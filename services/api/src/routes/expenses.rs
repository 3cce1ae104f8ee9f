//! Expense routes

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use common::{
    envelope::Envelope,
    http::{ApiResult, EntityId, JsonBody},
    pagination::{Page, PageQuery},
    principal::{Principal, permissions},
};

use crate::{
    models::expense::{CreateExpenseRequest, Expense, UpdateExpenseRequest},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Expense>>> {
    Ok(Json(state.expenses.list(query.resolve()).await?))
}

/// Record an expense in the name of the calling user
pub async fn create_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Expense>>)> {
    principal.require_permission(permissions::EXPENSES)?;
    let expense = body.validated()?.into_new_expense()?;

    let expense = state.expenses.create(&expense, principal.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Expense registered successfully", expense)),
    ))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Expense>> {
    principal.require_permission(permissions::EXPENSES)?;
    Ok(Json(state.expenses.get(id).await?))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdateExpenseRequest>,
) -> ApiResult<Json<Envelope<Expense>>> {
    principal.require_permission(permissions::EXPENSES)?;
    let changes = body.validated()?.into_changes()?;

    let expense = state.expenses.update(id, &changes).await?;
    Ok(Json(Envelope::with_data("Expense updated successfully", expense)))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_permission(permissions::EXPENSES)?;

    state.expenses.delete(id).await?;
    Ok(Json(Envelope::message("Expense deleted successfully")))
}
