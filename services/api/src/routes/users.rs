//! Staff account routes
//!
//! Account management is reserved to admins. The profile, password and
//! photo endpoints always act on the calling user.

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use common::{
    credentials::{hash_password, verify_password},
    envelope::Envelope,
    http::{ApiError, ApiResult, EntityId, JsonBody, ValidJson},
    pagination::{Page, PageQuery},
    principal::Principal,
};
use tracing::{info, warn};

use crate::{
    models::{
        SearchQuery,
        user::{
            ChangePasswordRequest, CreateUserRequest, NewUser, UpdateProfileRequest,
            UpdateUserRequest, User, UserChanges, normalize_email,
        },
    },
    state::AppState,
    uploads::content_type_for,
};

/// Multipart field carrying the photo
const PHOTO_FIELD: &str = "photo";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/search", get(search_users))
        .route("/users/profile", get(get_profile).put(update_profile))
        .route("/users/change-password", put(change_password))
        .route("/users/photo", post(upload_photo))
        .route("/users/photo/:filename", get(get_photo))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<User>>> {
    principal.require_admin()?;
    Ok(Json(state.users.list(query.resolve()).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: JsonBody<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<User>>)> {
    principal.require_admin()?;
    let request = body.validated()?;

    let user = state
        .users
        .create(&NewUser {
            email: normalize_email(&request.email),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            role_id: request.role_id,
            password_hash: hash_password(&request.password)?,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("User registered successfully", user)),
    ))
}

/// Blank queries match nothing
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let Some(term) = query.term() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.users.search(term).await?))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get(principal.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> ApiResult<Json<Envelope<User>>> {
    let user = state.users.update(principal.id, &UserChanges::from(request)).await?;
    Ok(Json(Envelope::with_data("Profile updated successfully", user)))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(request): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let current = state.users.password_hash(principal.id).await?;
    if !verify_password(&request.current_password, &current) {
        warn!("Wrong current password for user: {}", principal.id);
        return Err(ApiError::InvalidCredentials(
            "The current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&request.new_password)?;
    state
        .users
        .set_password_hash(principal.id, &password_hash)
        .await?;

    info!("Password changed for user: {}", principal.id);
    Ok(Json(Envelope::message("Password updated successfully")))
}

/// Replace the caller's photo; a request without a file clears it
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> ApiResult<Json<Envelope<User>>> {
    let mut stored = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if !bytes.is_empty() {
            stored = Some(state.photos.save(&content_type, &bytes).await?);
        }
        break;
    }

    let previous = match state.users.replace_photo(principal.id, stored.as_deref()).await {
        Ok(previous) => previous,
        Err(e) => {
            if let Some(name) = &stored {
                if let Err(cleanup) = state.photos.remove(name).await {
                    warn!("Failed to remove unsaved photo {}: {}", name, cleanup);
                }
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous.filter(|old| Some(old) != stored.as_ref()) {
        if let Err(e) = state.photos.remove(&old).await {
            warn!("Failed to remove previous photo {}: {}", old, e);
        }
    }

    let user = state.users.get(principal.id).await?;
    let message = if stored.is_some() {
        "Photo updated successfully"
    } else {
        "Photo removed successfully"
    };
    Ok(Json(Envelope::with_data(message, user)))
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.photos.read(&filename).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], bytes))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<User>> {
    principal.require_admin()?;
    Ok(Json(state.users.get(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
    body: JsonBody<UpdateUserRequest>,
) -> ApiResult<Json<Envelope<User>>> {
    principal.require_admin()?;
    let request = body.validated()?;

    let user = state.users.update(id, &UserChanges::from(request)).await?;
    Ok(Json(Envelope::with_data("User updated successfully", user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    EntityId(id): EntityId,
) -> ApiResult<Json<Envelope<()>>> {
    principal.require_admin()?;
    if id == principal.id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let user = state.users.get(id).await?;
    state.users.delete(id).await?;

    if let Some(photo) = user.photo {
        if let Err(e) = state.photos.remove(&photo).await {
            warn!("Failed to remove photo {} of deleted user {}: {}", photo, id, e);
        }
    }

    Ok(Json(Envelope::message("User deleted successfully")))
}
