//! API service routes
//!
//! Everything under `/api` requires a session token. Role and permission
//! guards are checked at the top of each handler.

use axum::{
    Json, Router, middleware::from_fn_with_state, response::IntoResponse, routing::get,
};
use common::http::require_auth;
use serde_json::json;

use crate::state::AppState;

pub mod evaluation_types;
pub mod evaluations;
pub mod expenses;
pub mod permissions;
pub mod players;
pub mod roles;
pub mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let authenticated = from_fn_with_state(state.authenticator.clone(), require_auth);

    let api_routes = Router::new()
        .merge(players::routes())
        .merge(evaluations::routes())
        .merge(expenses::routes())
        .merge(evaluation_types::routes())
        .merge(roles::routes())
        .merge(permissions::routes())
        .merge(users::routes())
        .route_layer(authenticated);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
