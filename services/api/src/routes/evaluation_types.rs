//! Evaluation type and parameter routes
//!
//! Reads are open to any authenticated user; changes need the admin role.

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use common::{
    envelope::Envelope,
    http::{ApiResult, EntityId, JsonBody},
    principal::Principal,
};

use crate::{
    models::evaluation_type::{
        CreateEvaluationTypeRequest, CreateParameterRequest, EvaluationParameter, EvaluationType,
        EvaluationTypeDetail, UpdateEvaluationTypeRequest, UpdateParameterRequest,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/evaluation-types", get(list_types).post(create_type))
        .route(
            "/evaluation-types/:id",
            get(get_type).put(update_type).delete(delete_type),
        )
        .route("/evaluation-types/:id/status", patch(toggle_type))
        .route("/evaluation-types/:id/parameters", get(type_parameters))
        .route("/evaluation-parameters", post(create_parameter))
        .route(
            "/evaluation-parameters/:id",
            get(get_parameter)
                .put(update_parameter)
                .delete(delete_parameter),
        )
        .route("/evaluation-parameters/:id/status", patch(toggle_parameter))
}

pub async fn list_types(State(state): State<AppState>) -> ApiResult<Json<Vec<EvaluationType>>> {
    Ok(Json(state.evaluation_types.list().await?))
}

pub async fn create_type(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreateEvaluationTypeRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<EvaluationType>>)> {
    principal.require_admin()?;
    let request = body.validated()?;

    let evaluation_type = state.evaluation_types.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Evaluation type created successfully", evaluation_type)),
    ))
}

pub async fn get_type(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<EvaluationTypeDetail>> {
    Ok(Json(state.evaluation_types.get(id).await?))
}

pub async fn update_type(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdateEvaluationTypeRequest>,
) -> ApiResult<Json<Envelope<EvaluationType>>> {
    principal.require_admin()?;
    let request = body.validated()?;

    let evaluation_type = state.evaluation_types.update(id, &request).await?;
    Ok(Json(Envelope::with_data("Evaluation type updated successfully", evaluation_type)))
}

pub async fn delete_type(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_admin()?;

    state.evaluation_types.delete(id).await?;
    Ok(Json(Envelope::message("Evaluation type deleted successfully")))
}

pub async fn toggle_type(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<EvaluationType>>> {
    principal.require_admin()?;

    let evaluation_type = state.evaluation_types.toggle(id).await?;
    let message = if evaluation_type.enabled {
        "Evaluation type enabled"
    } else {
        "Evaluation type disabled"
    };
    Ok(Json(Envelope::with_data(message, evaluation_type)))
}

pub async fn type_parameters(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Vec<EvaluationParameter>>> {
    Ok(Json(state.evaluation_types.parameters_of(id).await?))
}

pub async fn create_parameter(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreateParameterRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<EvaluationParameter>>)> {
    principal.require_admin()?;
    let request = body.validated()?;

    let parameter = state.evaluation_types.create_parameter(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Parameter created successfully", parameter)),
    ))
}

pub async fn get_parameter(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<EvaluationParameter>> {
    Ok(Json(state.evaluation_types.get_parameter(id).await?))
}

pub async fn update_parameter(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdateParameterRequest>,
) -> ApiResult<Json<Envelope<EvaluationParameter>>> {
    principal.require_admin()?;
    let request = body.validated()?;

    let parameter = state.evaluation_types.update_parameter(id, &request).await?;
    Ok(Json(Envelope::with_data("Parameter updated successfully", parameter)))
}

pub async fn delete_parameter(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_admin()?;

    state.evaluation_types.delete_parameter(id).await?;
    Ok(Json(Envelope::message("Parameter deleted successfully")))
}

pub async fn toggle_parameter(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<EvaluationParameter>>> {
    principal.require_admin()?;

    let parameter = state.evaluation_types.toggle_parameter(id).await?;
    let message = if parameter.enabled {
        "Parameter enabled"
    } else {
        "Parameter disabled"
    };
    Ok(Json(Envelope::with_data(message, parameter)))
}
