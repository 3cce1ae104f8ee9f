//! Role routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use common::{
    envelope::Envelope,
    http::{ApiResult, EntityId, JsonBody},
    principal::Principal,
};

use crate::{
    models::role::{AssignPermissionsRequest, Role, RoleDetail, RoleRequest},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/:id",
            get(get_role).put(rename_role).delete(delete_role),
        )
        .route("/roles/:id/permissions", put(assign_permissions))
}

pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Json<Vec<Role>>> {
    Ok(Json(state.roles.list().await?))
}

pub async fn create_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<RoleRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Role>>)> {
    principal.require_admin()?;
    let request = body.validated()?;

    let role = state.roles.create(&request.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Role created successfully", role)),
    ))
}

/// Role with the permission catalogue and its current grants
pub async fn get_role(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<RoleDetail>> {
    Ok(Json(state.roles.get_detail(id).await?))
}

pub async fn rename_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<RoleRequest>,
) -> ApiResult<Json<Envelope<Role>>> {
    principal.require_admin()?;
    let request = body.validated()?;

    let role = state.roles.rename(id, &request.name).await?;
    Ok(Json(Envelope::with_data("Role updated successfully", role)))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_admin()?;

    state.roles.delete(id).await?;
    Ok(Json(Envelope::message("Role deleted successfully")))
}

/// Replace every permission granted to the role
pub async fn assign_permissions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    JsonBody(request): JsonBody<AssignPermissionsRequest>,
) -> ApiResult<Json<Envelope<RoleDetail>>> {
    principal.require_admin()?;

    let role = state
        .roles
        .replace_permissions(id, &request.distinct_ids())
        .await?;
    Ok(Json(Envelope::with_data("Permissions assigned successfully", role)))
}
