//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use common::{
    credentials::{hash_password, verify_password},
    envelope::Envelope,
    http::{ApiError, ApiResult, ValidJson, require_auth},
    principal::{AuthzError, Principal, resolve_principal},
};
use tracing::{error, info, warn};

use crate::{
    AppState,
    mailer::reset_code_message,
    models::{
        ForgotPasswordRequest, LoginCredentials, LoginResponse, ResetPasswordRequest,
        VerifyCodeRequest,
    },
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let authenticated = from_fn_with_state(state.authenticator.clone(), require_auth);

    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify).route_layer(authenticated))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-code", post(verify_code))
        .route("/reset-password", post(reset_password));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginCredentials>,
) -> ApiResult<Json<LoginResponse>> {
    info!("Login attempt for user: {}", payload.email);

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::InvalidCredentials("User is not registered".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!("Wrong password for user: {}", user.id);
        return Err(ApiError::InvalidCredentials("Incorrect password".to_string()));
    }

    if !user.enabled {
        return Err(AuthzError::AccountDisabled.into());
    }

    let principal = resolve_principal(&state.pool, user.id).await?;
    let token = state.authenticator.tokens().issue(user.id).map_err(|e| {
        error!("Failed to issue session token: {}", e);
        ApiError::internal(e)
    })?;

    Ok(Json(LoginResponse {
        success: true,
        user: principal,
        token,
    }))
}

/// Current principal of a valid session token
pub async fn verify(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

/// Mail a recovery code to a registered address
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ForgotPasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("The email is not registered".to_string()))?;

    let token = state.reset_tokens.issue(user.id).await?;

    let message = reset_code_message(
        &user.email,
        &user.first_name,
        &token.value,
        &state.settings.frontend_url,
    );
    state.mailer.send(&message).await.map_err(|e| {
        error!("Failed to send recovery mail to {}: {}", user.email, e);
        ApiError::internal(e)
    })?;

    Ok(Json(Envelope::message(
        "Instructions to reset your password have been sent to your email",
    )))
}

/// Check a recovery code without consuming it
pub async fn verify_code(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<VerifyCodeRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    state.reset_tokens.find_valid(&payload.code).await?;
    Ok(Json(Envelope::message("The recovery code is valid")))
}

/// Set a new password with a recovery code, consuming it
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ResetPasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    state.reset_tokens.find_valid(&payload.code).await?;

    let password_hash = hash_password(&payload.password)?;
    state
        .reset_tokens
        .consume(&payload.code, &password_hash)
        .await?;

    Ok(Json(Envelope::message("Password updated successfully")))
}
