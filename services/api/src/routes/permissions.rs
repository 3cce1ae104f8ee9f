//! Permission routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use common::{
    envelope::Envelope,
    http::{ApiResult, EntityId, JsonBody},
    principal::Principal,
};

use crate::{
    models::permission::{CreatePermissionRequest, Permission, UpdatePermissionRequest},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/permissions", get(list_permissions).post(create_permission))
        .route(
            "/permissions/:id",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
}

pub async fn list_permissions(State(state): State<AppState>) -> ApiResult<Json<Vec<Permission>>> {
    Ok(Json(state.permissions.list().await?))
}

/// Create a permission, granted straight away to the caller's role
pub async fn create_permission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Permission>>)> {
    principal.require_admin()?;
    let request = body.validated()?;

    let permission = state
        .permissions
        .create(&request, principal.role.id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Permission created successfully", permission)),
    ))
}

pub async fn get_permission(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Permission>> {
    Ok(Json(state.permissions.get(id).await?))
}

pub async fn update_permission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdatePermissionRequest>,
) -> ApiResult<Json<Envelope<Permission>>> {
    principal.require_admin()?;
    let request = body.validated()?;

    let permission = state.permissions.update(id, &request).await?;
    Ok(Json(Envelope::with_data("Permission updated successfully", permission)))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_admin()?;

    state.permissions.delete(id).await?;
    Ok(Json(Envelope::message("Permission deleted successfully")))
}
