//! Evaluation routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use common::{
    envelope::Envelope,
    http::{ApiResult, EntityId, JsonBody},
    principal::{Principal, permissions},
};

use crate::{
    models::evaluation::{CreateEvaluationRequest, Evaluation, UpdateEvaluationRequest},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/evaluations", post(create_evaluation))
        .route(
            "/evaluations/:id",
            get(get_evaluation)
                .put(update_evaluation)
                .delete(delete_evaluation),
        )
}

pub async fn create_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreateEvaluationRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Evaluation>>)> {
    principal.require_permission(permissions::MANAGE_EVALUATIONS)?;
    let request = body.validated()?;

    let evaluation = state.evaluations.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Evaluation registered successfully", evaluation)),
    ))
}

pub async fn get_evaluation(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Evaluation>> {
    Ok(Json(state.evaluations.get(id).await?))
}

/// Rescore parameters the evaluation already holds
pub async fn update_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdateEvaluationRequest>,
) -> ApiResult<Json<Envelope<Evaluation>>> {
    principal.require_permission(permissions::MANAGE_EVALUATIONS)?;
    let request = body.validated()?;

    let evaluation = state.evaluations.update_scores(id, &request.parameters).await?;
    Ok(Json(Envelope::with_data("Evaluation updated successfully", evaluation)))
}

pub async fn delete_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_permission(permissions::MANAGE_EVALUATIONS)?;

    state.evaluations.delete(id).await?;
    Ok(Json(Envelope::message("Evaluation deleted successfully")))
}
